//! Rendering of bound operations into Rust source.
//!
//! Spec-bound operations become a trait contract plus a `topics` module of channel
//! address constants. Descriptor-bound operations are rendered through a MiniJinja
//! stub template supplied by the caller.

use crate::binder::{ChannelBinding, Direction, MethodParameter};
use crate::error::{Error, Result};
use crate::naming::{to_rust_ident, to_screaming_snake_case};
use log::debug;
use minijinja::{AutoEscape, Environment};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write as _;

pub struct InterfaceEmitter;

/// Values a stub template renders with.
#[derive(Debug, Clone, Serialize)]
pub struct StubContext {
    pub namespace: String,
    pub class_name: String,
    pub interfaces: Vec<String>,
    pub methods: Vec<StubMethod>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StubMethod {
    pub name: String,
    pub owner: String,
    /// Topic with placeholders rewritten to method parameter names
    pub topic: String,
    pub direction: Direction,
    pub parameters: Vec<MethodParameter>,
}

impl StubContext {
    /// Builds the context, resolving every binding's topic.
    ///
    /// # Errors
    ///
    /// Returns a binding error if a topic cannot be resolved.
    pub fn from_bindings(
        namespace: impl Into<String>,
        class_name: impl Into<String>,
        bindings: &[ChannelBinding],
    ) -> Result<Self> {
        let mut interfaces: Vec<String> = Vec::new();
        let mut methods = Vec::with_capacity(bindings.len());

        for binding in bindings {
            if !interfaces.contains(&binding.owner) {
                interfaces.push(binding.owner.clone());
            }
            methods.push(StubMethod {
                name: binding.method_name.clone(),
                owner: binding.owner.clone(),
                topic: binding.resolved_topic()?,
                direction: binding.direction,
                parameters: binding.parameters.clone(),
            });
        }

        Ok(Self {
            namespace: namespace.into(),
            class_name: class_name.into(),
            interfaces,
            methods,
        })
    }
}

impl InterfaceEmitter {
    /// Renders the trait contract for one spec's bindings.
    ///
    /// # Errors
    ///
    /// Returns a binding error if a topic cannot be resolved against its method.
    pub fn contract(trait_name: &str, title: &str, bindings: &[ChannelBinding]) -> Result<String> {
        let mut out = String::new();

        if !bindings.is_empty() {
            let _ = writeln!(out, "/// Channel addresses used by [`{}`].", trait_name);
            out.push_str("pub mod topics {\n");
            let mut names = BTreeSet::new();
            let mut seen = BTreeSet::new();
            for binding in bindings {
                if !seen.insert(binding.topic_template.as_str()) {
                    continue;
                }
                let name = unique(&mut names, topic_const_name(&binding.topic_template));
                let _ = writeln!(
                    out,
                    "    pub const {}: &str = \"{}\";",
                    name,
                    escape(&binding.topic_template)
                );
            }
            out.push_str("}\n\n");
        }

        let _ = writeln!(out, "/// Operations of the {} API.", title);
        let _ = writeln!(out, "pub trait {} {{", trait_name);
        for (index, binding) in bindings.iter().enumerate() {
            let topic = binding.resolved_topic()?;
            if index > 0 {
                out.push('\n');
            }
            let verb = match binding.direction {
                Direction::Publish => "Publishes to",
                Direction::Subscribe => "Receives from",
            };
            let _ = writeln!(out, "    /// {} `{}`.", verb, topic);

            let parameters: Vec<String> = binding
                .parameters
                .iter()
                .map(|p| format!("{}: {}", p.name, p.type_name))
                .collect();
            let mut signature = String::from("&self");
            for parameter in parameters {
                signature.push_str(", ");
                signature.push_str(&parameter);
            }
            let _ = writeln!(out, "    fn {}({});", to_rust_ident(&binding.method_name), signature);
        }
        out.push_str("}\n");

        debug!("Rendered {} with {} operations", trait_name, bindings.len());
        Ok(out)
    }

    /// Renders a stub template.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the template does not parse or fails to
    /// render.
    pub fn stub(template_name: &str, template_source: &str, context: &StubContext) -> Result<String> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|_| AutoEscape::None);

        env.add_template(template_name, template_source).map_err(|e| {
            Error::Configuration(format!("Template '{}' contains errors.\n{}", template_name, e))
        })?;
        let template = env.get_template(template_name).map_err(|e| {
            Error::Configuration(format!("Template '{}' could not be loaded: {}", template_name, e))
        })?;

        template.render(context).map_err(|e| {
            Error::Configuration(format!(
                "Template '{}' failed for class '{}': {}",
                template_name, context.class_name, e
            ))
        })
    }
}

fn topic_const_name(topic: &str) -> String {
    let name = to_screaming_snake_case(topic);
    if name.is_empty() {
        "TOPIC".to_string()
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("TOPIC_{}", name)
    } else {
        name
    }
}

fn unique(used: &mut BTreeSet<String>, name: String) -> String {
    let mut candidate = name.clone();
    let mut suffix = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{}_{}", name, suffix);
        suffix += 1;
    }
    candidate
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
