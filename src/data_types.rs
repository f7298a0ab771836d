//! Payload type emission with cross-spec deduplication.
//!
//! A type name is emitted once per run, by the first spec that declares it. Specs
//! processed later skip the declaration and import the type from the module that owns
//! it instead.

use crate::error::{Error, Result};
use crate::schema::payload_schemas;
use crate::type_translator::TypeTranslator;
use log::{debug, info};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// A type emitted earlier in the run
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedType {
    /// Module path that declares the type
    pub namespace: String,
    /// Schema the type was declared for
    pub schema: Value,
}

/// Types emitted so far within one generation run.
///
/// Lives for exactly one orchestrator invocation and is never shared between runs.
#[derive(Debug, Default)]
pub struct GenerationState {
    emitted: BTreeMap<String, EmittedType>,
    namespaces: Vec<String>,
}

impl GenerationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.emitted.contains_key(type_name)
    }

    /// Namespace that declared `type_name`, if any spec did.
    pub fn owner(&self, type_name: &str) -> Option<&str> {
        self.emitted.get(type_name).map(|t| t.namespace.as_str())
    }

    pub fn emitted_names(&self) -> BTreeSet<String> {
        self.emitted.keys().cloned().collect()
    }

    /// Namespaces in the order their types were emitted.
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    pub fn len(&self) -> usize {
        self.emitted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emitted.is_empty()
    }

    /// Records a declaration; the first writer of a name wins.
    fn record(&mut self, type_name: &str, namespace: &str, schema: Value) -> bool {
        if self.emitted.contains_key(type_name) {
            return false;
        }
        self.emitted.insert(
            type_name.to_string(),
            EmittedType {
                namespace: namespace.to_string(),
                schema,
            },
        );
        true
    }
}

/// Emits the payload types of one spec through a [`TypeTranslator`].
pub struct DataTypeEmitter<'t> {
    translator: &'t dyn TypeTranslator,
}

impl<'t> DataTypeEmitter<'t> {
    pub fn new(translator: &'t dyn TypeTranslator) -> Self {
        Self { translator }
    }

    /// Emits the types `document` declares that no earlier spec emitted.
    ///
    /// # Arguments
    ///
    /// * `document` - The normalized spec document
    /// * `namespace` - Module path the output is mounted at
    /// * `state` - Run state, updated with every name the document declares
    ///
    /// # Returns
    ///
    /// Import lines for reused types followed by the new declarations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeConflict`] if the document declares a name an earlier spec
    /// emitted with a different schema.
    pub fn emit(&self, document: &Value, namespace: &str, state: &mut GenerationState) -> Result<String> {
        let payloads = payload_schemas(document);

        for payload in &payloads {
            let Some(existing) = state.emitted.get(&payload.type_name) else {
                continue;
            };
            if existing.schema != *payload.schema {
                return Err(Error::TypeConflict {
                    name: payload.type_name.clone(),
                    first: existing.namespace.clone(),
                    second: namespace.to_string(),
                });
            }
        }

        let excluded = state.emitted_names();
        let translation = self.translator.translate(document, &excluded, namespace)?;

        let imports: Vec<String> = payloads
            .iter()
            .filter_map(|payload| {
                let owner = state.owner(&payload.type_name)?;
                (owner != namespace).then(|| format!("use crate::{}::{};", owner, payload.type_name))
            })
            .collect();
        if !imports.is_empty() {
            debug!("{} reuses {} types", namespace, imports.len());
        }

        let mut added = 0;
        for (name, schema) in translation.declared {
            if state.record(&name, namespace, schema) {
                added += 1;
            }
        }
        if !state.namespaces.iter().any(|n| n == namespace) {
            state.namespaces.push(namespace.to_string());
        }
        info!("Emitted {} types for {}", added, namespace);

        let mut output = String::new();
        if !imports.is_empty() {
            output.push_str(&imports.join("\n"));
            output.push('\n');
        }
        if !translation.code.is_empty() {
            if !output.is_empty() {
                output.push('\n');
            }
            output.push_str(&translation.code);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_translator::RustTypeTranslator;
    use serde_json::json;

    fn orders() -> Value {
        json!({
            "components": { "schemas": {
                "order": { "type": "object", "properties": { "id": { "type": "string" } } },
                "shipment": { "type": "object", "properties": { "carrier": { "type": "string" } } }
            }}
        })
    }

    fn customers() -> Value {
        json!({
            "components": { "schemas": {
                "customer": { "type": "object", "properties": { "name": { "type": "string" } } },
                "order": { "type": "object", "properties": { "id": { "type": "string" } } }
            }}
        })
    }

    #[test]
    fn test_shared_type_emitted_once() {
        let translator = RustTypeTranslator;
        let emitter = DataTypeEmitter::new(&translator);
        let mut state = GenerationState::new();

        let first = emitter.emit(&orders(), "foo::orders::api", &mut state).unwrap();
        let second = emitter.emit(&customers(), "foo::customers::api", &mut state).unwrap();

        assert!(first.contains("pub struct Order {"));
        assert!(first.contains("pub struct Shipment {"));
        assert!(!second.contains("pub struct Order {"));
        assert!(second.contains("pub struct Customer {"));
        assert!(second.starts_with("use crate::foo::orders::api::Order;\n"));
        assert_eq!(state.owner("Order"), Some("foo::orders::api"));
        assert_eq!(state.len(), 3);
        assert_eq!(state.namespaces(), ["foo::orders::api", "foo::customers::api"]);
    }

    #[test]
    fn test_first_writer_depends_on_order() {
        let translator = RustTypeTranslator;
        let emitter = DataTypeEmitter::new(&translator);
        let mut state = GenerationState::new();

        let first = emitter.emit(&customers(), "foo::customers::api", &mut state).unwrap();
        let second = emitter.emit(&orders(), "foo::orders::api", &mut state).unwrap();

        assert!(first.contains("pub struct Order {"));
        assert!(second.contains("use crate::foo::customers::api::Order;"));
        assert!(!second.contains("pub struct Order {"));
        assert_eq!(state.owner("Order"), Some("foo::customers::api"));
    }

    #[test]
    fn test_conflicting_schema_is_rejected() {
        let translator = RustTypeTranslator;
        let emitter = DataTypeEmitter::new(&translator);
        let mut state = GenerationState::new();
        emitter.emit(&orders(), "foo::orders::api", &mut state).unwrap();

        let other = json!({
            "components": { "schemas": {
                "order": { "type": "object", "properties": { "number": { "type": "integer" } } }
            }}
        });
        let err = emitter.emit(&other, "foo::billing::api", &mut state).unwrap_err();
        assert!(matches!(err, Error::TypeConflict { ref name, .. } if name == "Order"));
    }

    #[test]
    fn test_same_namespace_twice_emits_nothing_new() {
        let translator = RustTypeTranslator;
        let emitter = DataTypeEmitter::new(&translator);
        let mut state = GenerationState::new();
        emitter.emit(&orders(), "foo::orders::api", &mut state).unwrap();

        let again = emitter.emit(&orders(), "foo::orders::api", &mut state).unwrap();
        assert_eq!(again, "");
        assert_eq!(state.namespaces().len(), 1);
    }

    #[test]
    fn test_schema_named_like_earlier_inline_type_is_rejected() {
        let translator = RustTypeTranslator;
        let emitter = DataTypeEmitter::new(&translator);
        let mut state = GenerationState::new();

        let spec_a = json!({
            "components": { "schemas": {
                "order": { "type": "object", "properties": {
                    "status": { "type": "string", "enum": ["a", "b"] }
                }}
            }}
        });
        let spec_b = json!({
            "components": { "schemas": {
                "orderStatus": { "type": "string", "enum": ["x", "y"] },
                "shipment": { "type": "object", "properties": {
                    "state": { "$ref": "#/components/schemas/orderStatus" }
                }}
            }}
        });

        emitter.emit(&spec_a, "foo::a::api", &mut state).unwrap();
        assert_eq!(state.owner("OrderStatus"), Some("foo::a::api"));

        let err = emitter.emit(&spec_b, "foo::b::api", &mut state).unwrap_err();
        assert!(matches!(
            err,
            Error::TypeConflict { ref name, ref first, ref second }
                if name == "OrderStatus" && first == "foo::a::api" && second == "foo::b::api"
        ));
    }

    #[test]
    fn test_schema_matching_earlier_inline_type_is_reused() {
        let translator = RustTypeTranslator;
        let emitter = DataTypeEmitter::new(&translator);
        let mut state = GenerationState::new();

        let first = json!({
            "components": { "schemas": {
                "order": { "type": "object", "properties": {
                    "status": { "type": "string", "enum": ["a", "b"] }
                }}
            }}
        });
        let second = json!({
            "components": { "schemas": {
                "orderStatus": { "type": "string", "enum": ["a", "b"] }
            }}
        });

        emitter.emit(&first, "foo::a::api", &mut state).unwrap();
        let code = emitter.emit(&second, "foo::b::api", &mut state).unwrap();
        assert_eq!(code, "use crate::foo::a::api::OrderStatus;\n");
    }

    #[test]
    fn test_inline_type_does_not_shadow_earlier_schema() {
        let translator = RustTypeTranslator;
        let emitter = DataTypeEmitter::new(&translator);
        let mut state = GenerationState::new();

        let first = json!({
            "components": { "schemas": { "orderStatus": { "type": "string", "enum": ["x", "y"] } } }
        });
        let second = json!({
            "components": { "schemas": {
                "order": { "type": "object", "properties": {
                    "status": { "type": "string", "enum": ["a", "b"] }
                }}
            }}
        });

        emitter.emit(&first, "foo::a::api", &mut state).unwrap();
        let code = emitter.emit(&second, "foo::b::api", &mut state).unwrap();
        assert!(!code.contains("use crate::foo::a::api::OrderStatus;"));
        assert!(code.contains("pub status: Option<OrderStatus2>,"));
        assert!(code.contains("pub enum OrderStatus2 {"));
        assert_eq!(state.owner("OrderStatus2"), Some("foo::b::api"));
    }
}
