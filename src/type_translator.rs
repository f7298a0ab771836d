use crate::error::Result;
use crate::naming::{to_rust_ident, to_type_name};
use crate::schema::{
    deref, is_declarable, is_object_like, nested_type_name, payload_schemas, rust_type,
    schema_type, string_enum, DYNAMIC_TYPE,
};
use log::debug;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

/// Output of one translation: declaration text and every type the document
/// declares, emitted or not, with the schema it was declared for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Translation {
    pub code: String,
    pub declared: BTreeMap<String, Value>,
}

/// Translates the payload schemas of a normalized document into type declarations.
///
/// Implementations must skip every top-level name in `excluded`, must not reuse an
/// excluded name for a nested inline type, and must report all names the document
/// declares in [`Translation::declared`].
pub trait TypeTranslator {
    fn translate(
        &self,
        document: &Value,
        excluded: &BTreeSet<String>,
        namespace: &str,
    ) -> Result<Translation>;
}

/// Translator producing serde-ready Rust structs, enums and aliases.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustTypeTranslator;

/// Inline schemas that were named while rendering their parent
type Nested<'a> = Vec<(String, &'a Value)>;

/// Per-call translation state
struct Declarations<'a> {
    document: &'a Value,
    excluded: &'a BTreeSet<String>,
    /// Top-level payload names of the document
    reserved: BTreeSet<String>,
    declared: BTreeMap<String, Value>,
    blocks: Vec<String>,
    needs_serde: bool,
}

impl TypeTranslator for RustTypeTranslator {
    fn translate(
        &self,
        document: &Value,
        excluded: &BTreeSet<String>,
        namespace: &str,
    ) -> Result<Translation> {
        let payloads = payload_schemas(document);
        let mut declarations = Declarations {
            document,
            excluded,
            reserved: payloads.iter().map(|p| p.type_name.clone()).collect(),
            declared: BTreeMap::new(),
            blocks: Vec::new(),
            needs_serde: false,
        };

        for payload in &payloads {
            declarations.declare(&payload.type_name, payload.schema);
        }

        debug!(
            "Translated {} declarations for {} ({} excluded)",
            declarations.blocks.len(),
            namespace,
            excluded.len()
        );

        let mut code = String::new();
        if declarations.needs_serde {
            code.push_str("use serde::{Deserialize, Serialize};\n\n");
        }
        code.push_str(&declarations.blocks.join("\n"));

        Ok(Translation {
            code,
            declared: declarations.declared,
        })
    }
}

impl<'a> Declarations<'a> {
    /// Declares a top-level payload unless it is excluded or already declared.
    fn declare(&mut self, name: &str, schema: &'a Value) {
        if self.declared.contains_key(name) {
            return;
        }
        self.declared.insert(name.to_string(), schema.clone());
        if self.excluded.contains(name) {
            debug!("Skipping already generated type {}", name);
            return;
        }
        self.render(name, schema);
    }

    /// Renders the declaration of `name`, then the inline types it named.
    fn render(&mut self, name: &str, schema: &'a Value) {
        let mut nested = Nested::new();

        if let Some(values) = string_enum(schema) {
            let block = render_enum(name, schema, &values);
            self.needs_serde = true;
            self.blocks.push(block);
        } else if is_object_like(schema) {
            let block = self.render_struct(name, schema, &mut nested);
            self.needs_serde = true;
            self.blocks.push(block);
        } else {
            let target = self.type_expression(name, schema, &mut nested);
            if target == name {
                return;
            }
            let mut block = doc_comment(schema, "");
            let _ = writeln!(block, "pub type {} = {};", name, target);
            self.blocks.push(block);
        }

        for (nested_name, nested_schema) in nested {
            self.render(&nested_name, nested_schema);
        }
    }

    /// Rust type for an inline schema. Declarable parts get a fresh name derived from
    /// `hint` and are queued on `nested`.
    fn type_expression(&mut self, hint: &str, schema: &'a Value, nested: &mut Nested<'a>) -> String {
        if schema.get("$ref").is_some() {
            return rust_type(self.document, schema, None);
        }
        if is_declarable(schema) {
            let name = self.claim(hint);
            self.declared.insert(name.clone(), schema.clone());
            nested.push((name.clone(), schema));
            return name;
        }
        if schema_type(schema) == Some("array") {
            let item = match schema.get("items") {
                Some(items) => self.type_expression(&format!("{}Item", hint), items, nested),
                None => DYNAMIC_TYPE.to_string(),
            };
            return format!("Vec<{}>", item);
        }
        let map_values = schema.get("additionalProperties").filter(|v| v.is_object());
        if let (Some("object") | None, Some(values)) = (schema_type(schema), map_values) {
            let value = self.type_expression(&format!("{}Value", hint), values, nested);
            return format!("std::collections::HashMap<String, {}>", value);
        }
        rust_type(self.document, schema, None)
    }

    /// First of `hint`, `hint2`, `hint3`... not taken by a payload, an earlier
    /// declaration or a type emitted by another spec.
    fn claim(&self, hint: &str) -> String {
        let mut candidate = hint.to_string();
        let mut suffix = 2;
        while self.reserved.contains(&candidate)
            || self.declared.contains_key(&candidate)
            || self.excluded.contains(&candidate)
        {
            candidate = format!("{}{}", hint, suffix);
            suffix += 1;
        }
        if candidate != hint {
            debug!("Inline type {} is taken, declaring {}", hint, candidate);
        }
        candidate
    }

    fn render_struct(&mut self, name: &str, schema: &'a Value, nested: &mut Nested<'a>) -> String {
        let (properties, required) = collect_properties(self.document, schema);

        let mut block = doc_comment(schema, "");
        block.push_str("#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]\n");
        let _ = writeln!(block, "pub struct {} {{", name);

        let mut used = BTreeSet::new();
        for (wire_name, property) in &properties {
            let mut field_type = self.type_expression(&nested_type_name(name, wire_name), *property, nested);
            if field_type == name {
                field_type = format!("Box<{}>", field_type);
            }

            let mut ident = to_rust_ident(wire_name);
            let base = ident.clone();
            let mut suffix = 2;
            while !used.insert(ident.clone()) {
                ident = format!("{}_{}", base, suffix);
                suffix += 1;
            }

            let mut serde_args = Vec::new();
            if ident.trim_start_matches("r#") != wire_name {
                serde_args.push(format!("rename = \"{}\"", escape(wire_name)));
            }
            let optional = !required.contains(wire_name.as_str());
            if optional {
                serde_args.push("default".to_string());
                serde_args.push("skip_serializing_if = \"Option::is_none\"".to_string());
                field_type = format!("Option<{}>", field_type);
            }

            block.push_str(&doc_comment(property, "    "));
            if !serde_args.is_empty() {
                let _ = writeln!(block, "    #[serde({})]", serde_args.join(", "));
            }
            let _ = writeln!(block, "    pub {}: {},", ident, field_type);
        }
        block.push_str("}\n");
        block
    }
}

/// Properties and required names of an object schema, `allOf` parts merged in order.
fn collect_properties<'a>(document: &'a Value, schema: &'a Value) -> (Vec<(String, &'a Value)>, BTreeSet<String>) {
    let mut properties: Vec<(String, &'a Value)> = Vec::new();
    let mut required = BTreeSet::new();

    if let Some(parts) = schema.get("allOf").and_then(Value::as_array) {
        for part in parts {
            let (part_properties, part_required) = collect_properties(document, deref(document, part));
            for (key, value) in part_properties {
                upsert(&mut properties, key, value);
            }
            required.extend(part_required);
        }
    }

    if let Some(own) = schema.get("properties").and_then(Value::as_object) {
        for (key, value) in own {
            upsert(&mut properties, key.clone(), value);
        }
    }
    if let Some(names) = schema.get("required").and_then(Value::as_array) {
        required.extend(names.iter().filter_map(Value::as_str).map(str::to_string));
    }

    (properties, required)
}

fn upsert<'a>(properties: &mut Vec<(String, &'a Value)>, key: String, value: &'a Value) {
    match properties.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => properties.push((key, value)),
    }
}

fn render_enum(name: &str, schema: &Value, values: &[&str]) -> String {
    let mut block = doc_comment(schema, "");
    block.push_str("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]\n");
    let _ = writeln!(block, "pub enum {} {{", name);

    let mut used = BTreeSet::new();
    for value in values {
        let mut variant = if value.is_empty() {
            "Empty".to_string()
        } else {
            to_type_name(value)
        };
        let base = variant.clone();
        let mut suffix = 2;
        while !used.insert(variant.clone()) {
            variant = format!("{}{}", base, suffix);
            suffix += 1;
        }
        if variant != *value {
            let _ = writeln!(block, "    #[serde(rename = \"{}\")]", escape(value));
        }
        let _ = writeln!(block, "    {},", variant);
    }
    block.push_str("}\n");
    block
}

fn doc_comment(schema: &Value, indent: &str) -> String {
    let mut out = String::new();
    if let Some(description) = schema.get("description").and_then(Value::as_str) {
        for line in description.trim().lines() {
            let _ = writeln!(out, "{}/// {}", indent, line.trim_end());
        }
    }
    out
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn translate(document: &Value, excluded: &[&str]) -> Translation {
        let excluded = excluded.iter().map(|s| s.to_string()).collect();
        RustTypeTranslator.translate(document, &excluded, "foo::orders::api").unwrap()
    }

    #[test]
    fn test_struct_with_renames_and_options() {
        let document = json!({
            "components": { "schemas": { "order": {
                "type": "object",
                "description": "A placed order.",
                "required": ["orderId"],
                "properties": {
                    "orderId": { "type": "string" },
                    "total": { "type": "number" },
                    "type": { "type": "string" }
                }
            }}}
        });
        let translation = translate(&document, &[]);
        assert_eq!(
            translation.code,
            r#"use serde::{Deserialize, Serialize};

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "orderId")]
    pub order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}
"#
        );
        assert_eq!(translation.declared.keys().collect::<Vec<_>>(), vec!["Order"]);
        assert_eq!(translation.declared["Order"]["required"], json!(["orderId"]));
    }

    #[test]
    fn test_string_enum() {
        let document = json!({
            "components": { "schemas": { "status": { "type": "string", "enum": ["open", "in-progress"] } } }
        });
        let code = translate(&document, &[]).code;
        assert!(code.contains("pub enum Status {"));
        assert!(code.contains("    #[serde(rename = \"in-progress\")]\n    InProgress,"));
        assert!(code.contains("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]"));
    }

    #[test]
    fn test_excluded_names_are_declared_but_not_emitted() {
        let document = json!({
            "components": { "schemas": {
                "order": { "type": "object", "properties": { "id": { "type": "string" } } },
                "customer": { "type": "object", "properties": { "name": { "type": "string" } } }
            }}
        });
        let translation = translate(&document, &["Order"]);
        assert!(!translation.code.contains("pub struct Order "));
        assert!(translation.code.contains("pub struct Customer {"));
        assert!(translation.declared.contains_key("Order"));
        assert!(translation.declared.contains_key("Customer"));
    }

    #[test]
    fn test_nested_inline_types() {
        let document = json!({
            "components": { "schemas": { "order": {
                "type": "object",
                "required": ["lines", "status"],
                "properties": {
                    "lines": { "type": "array", "items": {
                        "type": "object", "properties": { "sku": { "type": "string" } }
                    }},
                    "status": { "type": "string", "enum": ["new"] }
                }
            }}}
        });
        let translation = translate(&document, &[]);
        assert!(translation.code.contains("pub lines: Vec<OrderLinesItem>,"));
        assert!(translation.code.contains("pub struct OrderLinesItem {"));
        assert!(translation.code.contains("pub status: OrderStatus,"));
        assert!(translation.code.contains("pub enum OrderStatus {"));
        assert!(translation.declared.contains_key("OrderLinesItem"));
    }

    #[test]
    fn test_self_reference_is_boxed_and_alias_emitted() {
        let document = json!({
            "components": { "schemas": {
                "node": { "type": "object", "required": ["next"], "properties": {
                    "next": { "$ref": "#/components/schemas/node" },
                    "children": { "type": "array", "items": { "$ref": "#/components/schemas/node" } }
                }},
                "nodeIds": { "type": "array", "items": { "type": "integer", "format": "int32" } }
            }}
        });
        let code = translate(&document, &[]).code;
        assert!(code.contains("pub next: Box<Node>,"));
        assert!(code.contains("pub children: Option<Vec<Node>>,"));
        assert!(code.contains("pub type NodeIds = Vec<i32>;"));
    }

    #[test]
    fn test_all_of_merges_properties() {
        let document = json!({
            "components": { "schemas": {
                "base": { "type": "object", "required": ["id"], "properties": { "id": { "type": "string" } } },
                "extended": { "allOf": [
                    { "$ref": "#/components/schemas/base" },
                    { "type": "object", "properties": { "extra": { "type": "boolean" } } }
                ]}
            }}
        });
        let code = translate(&document, &[]).code;
        assert!(code.contains("pub struct Extended {\n    pub id: String,\n"));
        assert!(code.contains("pub extra: Option<bool>,"));
    }

    #[test]
    fn test_no_serde_import_without_declarations() {
        let translation = translate(&json!({ "asyncapi": "2.6.0" }), &[]);
        assert_eq!(translation.code, "");
        assert!(translation.declared.is_empty());
    }

    #[test]
    fn test_inline_type_named_like_a_schema_gets_suffix() {
        let document = json!({
            "components": { "schemas": {
                "order": { "type": "object", "required": ["status"], "properties": {
                    "status": { "type": "string", "enum": ["a", "b"] }
                }},
                "orderStatus": { "type": "string", "enum": ["x", "y"] },
                "shipment": { "type": "object", "required": ["state"], "properties": {
                    "state": { "$ref": "#/components/schemas/orderStatus" }
                }}
            }}
        });
        let translation = translate(&document, &[]);
        let code = &translation.code;

        assert!(code.contains("pub struct Order {\n    pub status: OrderStatus2,\n}"));
        assert!(code.contains("pub enum OrderStatus2 {\n    #[serde(rename = \"a\")]\n    A,"));
        assert!(code.contains("pub enum OrderStatus {\n    #[serde(rename = \"x\")]\n    X,"));
        assert!(code.contains("pub struct Shipment {\n    pub state: OrderStatus,\n}"));
        assert_eq!(code.matches("pub enum OrderStatus {").count(), 1);
        assert_eq!(translation.declared["OrderStatus"]["enum"], json!(["x", "y"]));
        assert_eq!(translation.declared["OrderStatus2"]["enum"], json!(["a", "b"]));
    }

    #[test]
    fn test_inline_type_avoids_names_emitted_elsewhere() {
        let document = json!({
            "components": { "schemas": { "order": {
                "type": "object",
                "properties": { "lines": { "type": "array", "items": {
                    "type": "object", "properties": { "sku": { "type": "string" } }
                }}}
            }}}
        });
        let translation = translate(&document, &["OrderLinesItem"]);
        assert!(translation.code.contains("pub lines: Option<Vec<OrderLinesItem2>>,"));
        assert!(translation.code.contains("pub struct OrderLinesItem2 {"));
        assert!(!translation.declared.contains_key("OrderLinesItem"));
    }
}
