//! Substitution and validation of `{placeholder}` topic templates.

use crate::binder::{ChannelParameter, MethodParameter};
use crate::error::{Error, Result};
use crate::naming::{to_param_ident, to_snake_case};
use log::debug;
use std::collections::HashMap;

/// Characters that separate the segments of a topic
const SEGMENT_DELIMITERS: [char; 2] = ['.', '/'];

pub struct TopicTemplateResolver;

impl TopicTemplateResolver {
    /// Resolves a topic template against a method's parameters.
    ///
    /// Every declared channel parameter is matched to exactly one method parameter of
    /// the same type, and its `{placeholder}` is rewritten to reference that method
    /// parameter (`orders.{customerId}.created` with `id: String` bound to
    /// `customerId: String` becomes `orders.{id}.created`). The result is then checked
    /// segment by segment: a segment still holding `{` must be exactly the placeholder
    /// of a method parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Binding`] when a channel parameter matches no method parameter
    /// or several, or when a segment references an undeclared placeholder.
    pub fn resolve(
        topic: &str,
        channel_parameters: &[ChannelParameter],
        parameters: &[MethodParameter],
    ) -> Result<String> {
        let mut replacements = HashMap::new();
        for channel_parameter in channel_parameters {
            let parameter = Self::match_parameter(topic, channel_parameter, parameters)?;
            replacements.insert(channel_parameter.name.as_str(), parameter.placeholder());
        }

        let resolved = substitute(topic, &replacements);

        if resolved.contains('{') {
            let invalid = resolved.split(SEGMENT_DELIMITERS).find(|segment| {
                segment.contains('{') && !parameters.iter().any(|p| p.placeholder() == *segment)
            });
            if let Some(segment) = invalid {
                return Err(Error::Binding(format!(
                    "Channel '{}' contains unknown channel parameter: '{}'.",
                    topic, segment
                )));
            }
        }

        debug!("Resolved topic '{}' to '{}'", topic, resolved);
        Ok(resolved)
    }

    /// Finds the single method parameter a channel parameter binds to.
    ///
    /// Parameters match on type. Several parameters of the same type are told apart by
    /// name (verbatim, snake_case or keyword-suffixed); anything else is ambiguous.
    fn match_parameter<'a>(
        topic: &str,
        channel_parameter: &ChannelParameter,
        parameters: &'a [MethodParameter],
    ) -> Result<&'a MethodParameter> {
        let expected = channel_parameter.type_name.trim();
        let candidates: Vec<&MethodParameter> = parameters
            .iter()
            .filter(|p| p.type_name.trim() == expected)
            .collect();

        match candidates.as_slice() {
            [] => Err(Error::Binding(format!(
                "Unknown channel parameter '{}' of type '{}' in channel '{}'.",
                channel_parameter.name, channel_parameter.type_name, topic
            ))),
            [single] => Ok(*single),
            _ => {
                let snake = to_snake_case(&channel_parameter.name);
                let ident = to_param_ident(&channel_parameter.name);
                let named: Vec<&MethodParameter> = candidates
                    .into_iter()
                    .filter(|p| {
                        let name = p.name.trim_start_matches("r#");
                        name == channel_parameter.name || name == snake || p.name == ident
                    })
                    .collect();
                match named.as_slice() {
                    [single] => Ok(*single),
                    _ => Err(Error::Binding(format!(
                        "Ambiguous channel parameter '{}' of type '{}' in channel '{}'.",
                        channel_parameter.name, channel_parameter.type_name, topic
                    ))),
                }
            }
        }
    }
}

/// Replaces known `{name}` placeholders in one pass, leaving unknown ones untouched.
fn substitute(topic: &str, replacements: &HashMap<&str, String>) -> String {
    let mut result = String::with_capacity(topic.len());
    let mut rest = topic;

    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let after = &rest[open..];
        match after.find('}') {
            Some(close) => {
                let name = &after[1..close];
                match replacements.get(name) {
                    Some(replacement) => result.push_str(replacement),
                    None => result.push_str(&after[..=close]),
                }
                rest = &after[close + 1..];
            }
            None => {
                result.push_str(after);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}
