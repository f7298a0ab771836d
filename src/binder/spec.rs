use super::{ChannelBinder, ChannelBinding, ChannelParameter, Direction, MethodParameter};
use crate::error::{Error, Result};
use crate::naming::to_param_ident;
use crate::schema::{
    self, channel_operations, deref, message_payload_type, operation_method_name,
    operation_payload_type_name, rust_type, DYNAMIC_TYPE,
};
use log::debug;
use serde_json::Value;

/// Name of the payload parameter every spec-bound method takes last
pub const PAYLOAD_PARAMETER: &str = "payload";

/// Binder for AsyncAPI 2.x documents.
///
/// Produces one binding per `publish`/`subscribe` operation of every channel, in
/// document order. Each method takes the channel's parameters followed by the message
/// payload.
pub struct SpecBinder<'a> {
    document: &'a Value,
    owner: String,
}

impl<'a> SpecBinder<'a> {
    pub fn new(document: &'a Value, owner: impl Into<String>) -> Self {
        Self {
            document,
            owner: owner.into(),
        }
    }

    fn channel_parameters(&self, item: &Value) -> Vec<ChannelParameter> {
        let Some(parameters) = item.get("parameters").and_then(Value::as_object) else {
            return Vec::new();
        };

        parameters
            .iter()
            .map(|(name, parameter)| {
                let parameter = deref(self.document, parameter);
                let type_name = parameter
                    .get("schema")
                    .map(|schema| rust_type(self.document, schema, None))
                    .unwrap_or_else(|| "String".to_string());
                ChannelParameter::new(name.clone(), type_name)
            })
            .collect()
    }

    fn payload_type(&self, method_name: &str, operation: &Value) -> String {
        match operation.get("message") {
            Some(message) => message_payload_type(self.document, message, || {
                operation_payload_type_name(self.document, method_name)
            }),
            None => DYNAMIC_TYPE.to_string(),
        }
    }
}

impl ChannelBinder for SpecBinder<'_> {
    fn bind(&self) -> Result<Vec<ChannelBinding>> {
        let Some(channels) = schema::channels(self.document) else {
            debug!("No channels declared for {}", self.owner);
            return Ok(Vec::new());
        };

        let mut bindings: Vec<ChannelBinding> = Vec::new();

        for (address, item) in channels {
            if address.trim().is_empty() {
                debug!("Skipping channel without an address");
                continue;
            }

            let operations = channel_operations(item);
            if operations.is_empty() {
                debug!("Skipping channel '{}': no operations", address);
                continue;
            }

            let channel_parameters = self.channel_parameters(item);

            for (key, operation) in operations {
                let direction = if key == "publish" {
                    Direction::Publish
                } else {
                    Direction::Subscribe
                };
                let method_name = operation_method_name(address, key, operation);

                if bindings.iter().any(|b| b.method_name == method_name) {
                    return Err(Error::Binding(format!(
                        "Method '{}' is bound twice in {} (channel '{}').",
                        method_name, self.owner, address
                    )));
                }

                let mut parameters: Vec<MethodParameter> = channel_parameters
                    .iter()
                    .map(|p| MethodParameter::new(p.type_name.clone(), to_param_ident(&p.name)))
                    .collect();
                parameters.push(MethodParameter::new(
                    self.payload_type(&method_name, operation),
                    PAYLOAD_PARAMETER,
                ));

                debug!("Bound {} {} -> {}", direction, address, method_name);
                bindings.push(ChannelBinding {
                    method_name,
                    topic_template: address.clone(),
                    channel_parameters: channel_parameters.clone(),
                    parameters,
                    direction,
                    owner: self.owner.clone(),
                });
            }
        }

        Ok(bindings)
    }
}
