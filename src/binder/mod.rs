//! Channel binding module for mapping interface methods onto channel topics.
//!
//! This module provides a unified shape for the operations of an API surface, whatever
//! their source. Each source has its own binder implementation that knows how to read
//! it and produce [`ChannelBinding`]s, so that emission downstream does not care where
//! a binding came from.
//!
//! # Supported Sources
//!
//! - **AsyncAPI documents**: See [`spec::SpecBinder`]
//! - **Service descriptors** (parsed, annotated declarations): See
//!   [`annotation::AnnotationBinder`]
//!
//! # Example
//!
//! ```no_run
//! use asyncapi_codegen::binder::{ChannelBinder, spec::SpecBinder};
//! use asyncapi_codegen::normalizer::SpecNormalizer;
//!
//! let document = SpecNormalizer::normalize("orders.yaml", "asyncapi: 2.6.0").unwrap();
//! let bindings = SpecBinder::new(&document, "OrdersApi").bind().unwrap();
//! println!("Found {} bindings", bindings.len());
//! ```

pub mod annotation;
pub mod spec;

use crate::error::Result;
use crate::topic_resolver::TopicTemplateResolver;
use serde::Serialize;

/// Trait for extracting channel bindings from one interface or class.
pub trait ChannelBinder {
    /// Extracts the ordered bindings, one per bound operation.
    fn bind(&self) -> Result<Vec<ChannelBinding>>;
}

/// The association between one method and a channel topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelBinding {
    /// Name of the generated method
    pub method_name: String,
    /// Channel address, possibly holding `{name}` placeholders
    pub topic_template: String,
    /// Placeholders declared for the channel
    pub channel_parameters: Vec<ChannelParameter>,
    /// The method's own parameters, in signature order
    pub parameters: Vec<MethodParameter>,
    pub direction: Direction,
    /// Interface or class that owns the method
    pub owner: String,
}

/// A named placeholder declared at channel scope, with the type it expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelParameter {
    pub name: String,
    pub type_name: String,
}

/// One parameter of a bound method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodParameter {
    pub type_name: String,
    pub name: String,
}

/// Whether an operation publishes to or subscribes on its channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Publish,
    Subscribe,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Publish => "publish",
            Direction::Subscribe => "subscribe",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ChannelParameter {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }

    /// The `{name}` text this parameter occupies in a topic template.
    pub fn placeholder(&self) -> String {
        format!("{{{}}}", self.name)
    }
}

impl MethodParameter {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
        }
    }

    pub fn placeholder(&self) -> String {
        format!("{{{}}}", self.name)
    }
}

impl ChannelBinding {
    /// Substitutes the channel parameters into the topic template.
    ///
    /// # Errors
    ///
    /// Returns a binding error when a placeholder cannot be resolved against the
    /// method's parameters.
    pub fn resolved_topic(&self) -> Result<String> {
        TopicTemplateResolver::resolve(&self.topic_template, &self.channel_parameters, &self.parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(ChannelParameter::new("customerId", "String").placeholder(), "{customerId}");
        assert_eq!(MethodParameter::new("String", "id").placeholder(), "{id}");
    }

    #[test]
    fn test_binding_resolves_topic() {
        let binding = ChannelBinding {
            method_name: "order_created".to_string(),
            topic_template: "orders.{customerId}.created".to_string(),
            channel_parameters: vec![ChannelParameter::new("customerId", "String")],
            parameters: vec![MethodParameter::new("String", "id")],
            direction: Direction::Subscribe,
            owner: "OrdersApi".to_string(),
        };
        assert_eq!(binding.resolved_topic().unwrap(), "orders.{id}.created");
        assert_eq!(binding.direction.to_string(), "subscribe");
    }
}
