//! Normalization of raw AsyncAPI text into a schema-tooling friendly document.
//!
//! Schema tooling built for OpenAPI keys on the `openapi` version marker and chokes
//! on AsyncAPI's `servers` layout, which carries no schema information anyway.

use crate::error::{Error, Result};
use log::debug;
use serde_json::Value;

/// Version marker injected into documents that lack one
pub const OPENAPI_MARKER_KEY: &str = "openapi";
pub const DEFAULT_OPENAPI_VERSION: &str = "3.0.1";

pub struct SpecNormalizer;

impl SpecNormalizer {
    /// Parses JSON or YAML spec text and normalizes it.
    ///
    /// YAML is a superset of JSON, so a single YAML parse covers both. Key order of
    /// the source document is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the text is not valid YAML/JSON or its top level is
    /// not a mapping.
    pub fn normalize(source_name: &str, text: &str) -> Result<Value> {
        debug!("Normalizing spec: {}", source_name);

        let document: Value =
            serde_yaml::from_str(text).map_err(|e| Error::parse(source_name, e))?;
        Self::normalize_value(source_name, document)
    }

    /// Normalizes an already parsed document.
    pub fn normalize_value(source_name: &str, document: Value) -> Result<Value> {
        let Value::Object(mut map) = document else {
            return Err(Error::parse(
                source_name,
                "the top level of a spec document must be a mapping",
            ));
        };

        if !map.contains_key(OPENAPI_MARKER_KEY) {
            map.insert(
                OPENAPI_MARKER_KEY.to_string(),
                Value::String(DEFAULT_OPENAPI_VERSION.to_string()),
            );
        }

        if map.shift_remove("servers").is_some() {
            debug!("Removed servers section from {}", source_name);
        }

        Ok(Value::Object(map))
    }

    /// Normalizes and renders the canonical compact JSON text.
    pub fn normalize_to_string(source_name: &str, text: &str) -> Result<String> {
        let document = Self::normalize(source_name, text)?;
        serde_json::to_string(&document).map_err(|e| Error::parse(source_name, e))
    }
}
