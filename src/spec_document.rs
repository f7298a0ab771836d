//! Spec inputs and their lazily loaded contents.

use crate::error::{Error, Result};
use crate::naming::{spec_namespace, to_pascal_case};
use crate::normalizer::SpecNormalizer;
use log::debug;
use serde_json::Value;
use std::cell::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};

/// One AsyncAPI spec file to generate code for.
///
/// File contents are read on first access and cached; the normalized document is
/// derived from them once. Nothing is cached when reading or parsing fails.
#[derive(Debug)]
pub struct SpecToGenerate {
    namespace_name: String,
    spec_file_path: PathBuf,
    contents: OnceCell<String>,
    normalized: OnceCell<Value>,
}

/// The identity of a spec input, used as the key of generated output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecIdentity {
    pub namespace_name: String,
    pub spec_name: String,
    pub spec_file_path: PathBuf,
}

impl SpecToGenerate {
    pub fn new(namespace_name: impl Into<String>, spec_file_path: impl Into<PathBuf>) -> Self {
        Self {
            namespace_name: namespace_name.into(),
            spec_file_path: spec_file_path.into(),
            contents: OnceCell::new(),
            normalized: OnceCell::new(),
        }
    }

    pub fn namespace_name(&self) -> &str {
        &self.namespace_name
    }

    pub fn spec_file_path(&self) -> &Path {
        &self.spec_file_path
    }

    /// Spec file name, Pascal cased, without extension (`orders.yaml` -> `Orders`).
    pub fn spec_name(&self) -> String {
        let stem = self
            .spec_file_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        to_pascal_case(&stem)
    }

    /// Spec file name including its extension.
    pub fn spec_file_name(&self) -> String {
        self.spec_file_path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// Module path the generated code for this spec lives at.
    pub fn target_namespace(&self) -> String {
        spec_namespace(&self.namespace_name, &self.spec_name())
    }

    pub fn identity(&self) -> SpecIdentity {
        SpecIdentity {
            namespace_name: self.namespace_name.clone(),
            spec_name: self.spec_name(),
            spec_file_path: self.spec_file_path.clone(),
        }
    }

    /// Raw spec text, read from disk at most once.
    pub fn contents(&self) -> Result<&str> {
        if let Some(contents) = self.contents.get() {
            return Ok(contents.as_str());
        }
        debug!("Reading spec file: {}", self.spec_file_path.display());
        let text = fs::read_to_string(&self.spec_file_path)
            .map_err(|e| Error::io(&self.spec_file_path, e))?;
        Ok(self.contents.get_or_init(|| text).as_str())
    }

    /// The normalized document, derived at most once.
    pub fn normalized(&self) -> Result<&Value> {
        if let Some(document) = self.normalized.get() {
            return Ok(document);
        }
        let document = SpecNormalizer::normalize(&self.spec_file_name(), self.contents()?)?;
        Ok(self.normalized.get_or_init(|| document))
    }

    /// Whether the contents are already held in memory.
    pub fn is_loaded(&self) -> bool {
        self.contents.get().is_some()
    }

    /// Seeds the contents cache, for hosts that already hold the text in memory.
    pub fn with_contents(self, contents: impl Into<String>) -> Self {
        let _ = self.contents.set(contents.into());
        self
    }
}
