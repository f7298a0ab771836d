//! Lookups over the schema and message sections of a normalized AsyncAPI document.
//!
//! The binder and the type translator must agree on the Rust type name every payload
//! gets, so both go through the naming rules in this module.

use crate::naming::{to_pascal_case, to_snake_case, to_type_name};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";
pub const MESSAGE_REF_PREFIX: &str = "#/components/messages/";

/// Fallback type for anything without a usable schema
pub const DYNAMIC_TYPE: &str = "serde_json::Value";

/// Operation keys of an AsyncAPI 2.x channel item
pub const OPERATION_KEYS: [&str; 2] = ["publish", "subscribe"];

/// Operations of a channel item, in document order.
pub fn channel_operations(item: &Value) -> Vec<(&str, &Value)> {
    item.as_object()
        .map(|map| {
            map.iter()
                .filter(|(key, _)| OPERATION_KEYS.contains(&key.as_str()))
                .map(|(key, operation)| (key.as_str(), operation))
                .collect()
        })
        .unwrap_or_default()
}

/// A payload schema declared by a document under a Rust type name.
#[derive(Debug, Clone)]
pub struct PayloadSchema<'a> {
    pub type_name: String,
    pub schema: &'a Value,
}

/// Follows a local `#/...` reference.
pub fn resolve_ref<'a>(document: &'a Value, reference: &str) -> Option<&'a Value> {
    document.pointer(reference.strip_prefix('#')?)
}

/// Follows `$ref` chains until a concrete value is reached.
pub fn deref<'a>(document: &'a Value, value: &'a Value) -> &'a Value {
    let mut current = value;
    // Bounded to stay clear of reference cycles.
    for _ in 0..16 {
        match current.get("$ref").and_then(Value::as_str) {
            Some(reference) => match resolve_ref(document, reference) {
                Some(target) => current = target,
                None => break,
            },
            None => break,
        }
    }
    current
}

pub fn component_schemas(document: &Value) -> Option<&Map<String, Value>> {
    document.pointer("/components/schemas").and_then(Value::as_object)
}

pub fn component_messages(document: &Value) -> Option<&Map<String, Value>> {
    document.pointer("/components/messages").and_then(Value::as_object)
}

pub fn channels(document: &Value) -> Option<&Map<String, Value>> {
    document.get("channels").and_then(Value::as_object)
}

/// The schema `type`, taking the first non-null entry of a type array.
pub fn schema_type(schema: &Value) -> Option<&str> {
    match schema.get("type")? {
        Value::String(s) => Some(s.as_str()),
        Value::Array(types) => types.iter().filter_map(Value::as_str).find(|t| *t != "null"),
        _ => None,
    }
}

/// String values of an `enum` made only of strings.
pub fn string_enum(schema: &Value) -> Option<Vec<&str>> {
    let values = schema.get("enum")?.as_array()?;
    if !matches!(schema_type(schema), None | Some("string")) {
        return None;
    }
    values.iter().map(Value::as_str).collect()
}

pub fn is_object_like(schema: &Value) -> bool {
    schema.get("$ref").is_none() && (schema.get("properties").is_some() || schema.get("allOf").is_some())
}

/// Whether a schema needs a named declaration of its own (struct or enum).
pub fn is_declarable(schema: &Value) -> bool {
    schema.get("$ref").is_none() && (is_object_like(schema) || string_enum(schema).is_some())
}

/// Maps a schema to a Rust type expression.
///
/// `hint` names inline object/enum schemas and seeds names for nested array items
/// (`<hint>Item`) and map values (`<hint>Value`).
pub fn rust_type(document: &Value, schema: &Value, hint: Option<&str>) -> String {
    if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
        return ref_type_name(document, reference);
    }

    if is_declarable(schema) {
        return hint.map_or_else(|| DYNAMIC_TYPE.to_string(), str::to_string);
    }

    match schema_type(schema) {
        Some("string") => "String".to_string(),
        Some("integer") => match schema.get("format").and_then(Value::as_str) {
            Some("int32") => "i32".to_string(),
            _ => "i64".to_string(),
        },
        Some("number") => match schema.get("format").and_then(Value::as_str) {
            Some("float") => "f32".to_string(),
            _ => "f64".to_string(),
        },
        Some("boolean") => "bool".to_string(),
        Some("array") => {
            let item_hint = hint.map(|h| format!("{}Item", h));
            let item = schema
                .get("items")
                .map(|items| rust_type(document, items, item_hint.as_deref()))
                .unwrap_or_else(|| DYNAMIC_TYPE.to_string());
            format!("Vec<{}>", item)
        }
        Some("object") | None => match schema.get("additionalProperties") {
            Some(values) if values.is_object() => {
                let value_hint = hint.map(|h| format!("{}Value", h));
                format!(
                    "std::collections::HashMap<String, {}>",
                    rust_type(document, values, value_hint.as_deref())
                )
            }
            _ => DYNAMIC_TYPE.to_string(),
        },
        Some(_) => DYNAMIC_TYPE.to_string(),
    }
}

/// Rust type name a `$ref` points at.
pub fn ref_type_name(document: &Value, reference: &str) -> String {
    if let Some(name) = reference.strip_prefix(SCHEMA_REF_PREFIX) {
        return to_type_name(name);
    }
    if let Some(name) = reference.strip_prefix(MESSAGE_REF_PREFIX) {
        return match resolve_ref(document, reference) {
            Some(message) => message_payload_type(document, message, || {
                message_payload_type_name(document, name)
            }),
            None => DYNAMIC_TYPE.to_string(),
        };
    }
    DYNAMIC_TYPE.to_string()
}

/// Payload type of a message object, `inline_name` naming an inline declarable payload.
pub fn message_payload_type(
    document: &Value,
    message: &Value,
    inline_name: impl FnOnce() -> String,
) -> String {
    if let Some(reference) = message.get("$ref").and_then(Value::as_str) {
        return ref_type_name(document, reference);
    }
    if message.get("oneOf").is_some() {
        return DYNAMIC_TYPE.to_string();
    }
    match message.get("payload") {
        Some(payload) if is_declarable(payload) => inline_name(),
        Some(payload) => rust_type(document, payload, None),
        None => DYNAMIC_TYPE.to_string(),
    }
}

/// Type name of an inline payload declared on `components.messages.<message_key>`.
///
/// Falls back to `<Message>Payload` when the plain name is taken by a schema.
pub fn message_payload_type_name(document: &Value, message_key: &str) -> String {
    let name = to_type_name(message_key);
    let taken = component_schemas(document)
        .is_some_and(|schemas| schemas.keys().any(|key| to_type_name(key) == name));
    if taken {
        format!("{}Payload", name)
    } else {
        name
    }
}

/// Type name of an inline payload declared directly on an operation message.
///
/// `<Method>Payload`, or `<Method>MessagePayload` (then numbered) when a component
/// schema or component message payload already uses the name.
pub fn operation_payload_type_name(document: &Value, method_name: &str) -> String {
    let method = to_type_name(method_name);
    let mut taken: BTreeSet<String> = component_schemas(document)
        .map(|schemas| schemas.keys().map(|key| to_type_name(key)).collect())
        .unwrap_or_default();
    if let Some(messages) = component_messages(document) {
        for (key, message) in messages {
            if message.get("payload").is_some_and(is_declarable) {
                taken.insert(message_payload_type_name(document, key));
            }
        }
    }

    let name = format!("{}Payload", method);
    if !taken.contains(&name) {
        return name;
    }
    let base = format!("{}MessagePayload", method);
    let mut candidate = base.clone();
    let mut suffix = 2;
    while taken.contains(&candidate) {
        candidate = format!("{}{}", base, suffix);
        suffix += 1;
    }
    candidate
}

/// Method name of a channel operation: its `operationId`, or direction plus address.
pub fn operation_method_name(address: &str, direction: &str, operation: &Value) -> String {
    match operation.get("operationId").and_then(Value::as_str) {
        Some(id) if !id.trim().is_empty() => to_snake_case(id),
        _ => to_snake_case(&format!("{} {}", direction, address)),
    }
}

/// All payload schemas a document declares, in document order, first name wins.
///
/// Covers `components.schemas`, inline payloads of `components.messages` and inline
/// payloads of operation messages.
pub fn payload_schemas(document: &Value) -> Vec<PayloadSchema<'_>> {
    let mut found: Vec<PayloadSchema<'_>> = Vec::new();

    if let Some(schemas) = component_schemas(document) {
        for (key, schema) in schemas {
            add_payload(&mut found, to_type_name(key), schema);
        }
    }

    if let Some(messages) = component_messages(document) {
        for (key, message) in messages {
            if let Some(payload) = message.get("payload").filter(|p| is_declarable(p)) {
                add_payload(&mut found, message_payload_type_name(document, key), payload);
            }
        }
    }

    if let Some(channels) = channels(document) {
        for (address, item) in channels {
            for (direction, operation) in channel_operations(item) {
                let Some(message) = operation.get("message") else {
                    continue;
                };
                if message.get("$ref").is_some() {
                    continue;
                }
                if let Some(payload) = message.get("payload").filter(|p| is_declarable(p)) {
                    let method = operation_method_name(address, direction, operation);
                    add_payload(&mut found, operation_payload_type_name(document, &method), payload);
                }
            }
        }
    }

    found
}

fn add_payload<'a>(found: &mut Vec<PayloadSchema<'a>>, type_name: String, schema: &'a Value) {
    if !found.iter().any(|p| p.type_name == type_name) {
        found.push(PayloadSchema { type_name, schema });
    }
}

/// PascalCase field-derived name for a nested inline type.
pub fn nested_type_name(parent: &str, field: &str) -> String {
    format!("{}{}", parent, to_pascal_case(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "channels": {
                "orders.{customerId}.created": {
                    "subscribe": {
                        "operationId": "onOrderCreated",
                        "message": { "$ref": "#/components/messages/orderCreated" }
                    }
                },
                "audit": {
                    "publish": {
                        "message": {
                            "payload": {
                                "type": "object",
                                "properties": { "action": { "type": "string" } }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "order": { "type": "object", "properties": { "id": { "type": "string" } } },
                    "status": { "type": "string", "enum": ["open", "closed"] }
                },
                "messages": {
                    "orderCreated": { "payload": { "$ref": "#/components/schemas/order" } },
                    "order": {
                        "payload": { "type": "object", "properties": { "n": { "type": "integer" } } }
                    }
                }
            }
        })
    }

    #[test]
    fn test_rust_type_primitives() {
        let doc = json!({});
        assert_eq!(rust_type(&doc, &json!({"type": "string"}), None), "String");
        assert_eq!(rust_type(&doc, &json!({"type": "integer", "format": "int32"}), None), "i32");
        assert_eq!(rust_type(&doc, &json!({"type": "integer"}), None), "i64");
        assert_eq!(rust_type(&doc, &json!({"type": "number", "format": "float"}), None), "f32");
        assert_eq!(rust_type(&doc, &json!({"type": "number"}), None), "f64");
        assert_eq!(rust_type(&doc, &json!({"type": ["boolean", "null"]}), None), "bool");
        assert_eq!(rust_type(&doc, &json!({}), None), DYNAMIC_TYPE);
    }

    #[test]
    fn test_rust_type_containers() {
        let doc = json!({});
        assert_eq!(
            rust_type(&doc, &json!({"type": "array", "items": {"$ref": "#/components/schemas/order"}}), None),
            "Vec<Order>"
        );
        assert_eq!(
            rust_type(&doc, &json!({"type": "object", "additionalProperties": {"type": "integer"}}), None),
            "std::collections::HashMap<String, i64>"
        );
        assert_eq!(
            rust_type(
                &doc,
                &json!({"type": "array", "items": {"type": "object", "properties": {"a": {}}}}),
                Some("Line")
            ),
            "Vec<LineItem>"
        );
    }

    #[test]
    fn test_message_ref_resolves_to_payload_schema() {
        let doc = document();
        assert_eq!(ref_type_name(&doc, "#/components/messages/orderCreated"), "Order");
        // `order` collides with the `order` schema
        assert_eq!(ref_type_name(&doc, "#/components/messages/order"), "OrderPayload");
    }

    #[test]
    fn test_payload_schemas_in_document_order() {
        let doc = document();
        let names: Vec<_> = payload_schemas(&doc).into_iter().map(|p| p.type_name).collect();
        assert_eq!(names, vec!["Order", "Status", "OrderPayload", "PublishAuditPayload"]);
    }

    #[test]
    fn test_operation_method_name() {
        assert_eq!(
            operation_method_name("orders", "subscribe", &json!({"operationId": "onOrderCreated"})),
            "on_order_created"
        );
        assert_eq!(
            operation_method_name("light/{id}/measured", "publish", &json!({})),
            "publish_light_id_measured"
        );
    }

    #[test]
    fn test_deref_follows_chain() {
        let doc = json!({
            "components": {
                "parameters": {
                    "a": { "$ref": "#/components/parameters/b" },
                    "b": { "schema": { "type": "string" } }
                }
            }
        });
        let start = json!({ "$ref": "#/components/parameters/a" });
        assert_eq!(deref(&doc, &start)["schema"]["type"], "string");
    }

    #[test]
    fn test_operation_payload_name_avoids_component_names() {
        let doc = json!({
            "channels": {
                "orders": {
                    "publish": {
                        "operationId": "placeOrder",
                        "message": { "payload": { "type": "object", "properties": { "qty": { "type": "integer" } } } }
                    }
                }
            },
            "components": {
                "schemas": {
                    "placeOrderPayload": { "type": "object", "properties": { "other": { "type": "string" } } }
                }
            }
        });
        assert_eq!(operation_payload_type_name(&doc, "place_order"), "PlaceOrderMessagePayload");
        assert_eq!(operation_payload_type_name(&json!({}), "place_order"), "PlaceOrderPayload");

        let payloads = payload_schemas(&doc);
        let names: Vec<_> = payloads.iter().map(|p| p.type_name.as_str()).collect();
        assert_eq!(names, vec!["PlaceOrderPayload", "PlaceOrderMessagePayload"]);
        assert_eq!(payloads[1].schema["properties"]["qty"]["type"], "integer");
    }
}
