use super::{ChannelBinder, ChannelBinding, ChannelParameter, Direction, MethodParameter};
use crate::error::{Error, Result};
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// A service class and the AsyncAPI interfaces it implements, as described by a
/// language front-end.
///
/// Descriptors are YAML (or JSON) documents:
///
/// ```yaml
/// namespace: foo
/// class: Commands
/// template: templates/println_stub.rs.jinja
/// implements: [ICommands]
/// interfaces:
///   - name: ICommands
///     async_api: true
///     methods:
///       - name: something
///         channel: command.do
///         subscribe: { message: SomethingCommand }
///         parameters:
///           - { name: command, type: SomethingCommand }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceDescriptor {
    pub namespace: String,
    #[serde(rename = "class")]
    pub class_name: String,
    /// Stub template, relative to the descriptor file
    #[serde(default)]
    pub template: Option<String>,
    /// Interfaces named on the service marker itself
    #[serde(default)]
    pub service_interfaces: Vec<String>,
    /// Interfaces from the class's base list
    #[serde(default)]
    pub implements: Vec<String>,
    /// Interface declarations visible to the class
    #[serde(default)]
    pub interfaces: Vec<InterfaceDescriptor>,
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceDescriptor {
    pub name: String,
    /// Whether the interface carries the AsyncAPI marker
    #[serde(default)]
    pub async_api: bool,
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub channel_parameters: Vec<ParameterDescriptor>,
    #[serde(default)]
    pub publish: Option<OperationMarker>,
    #[serde(default)]
    pub subscribe: Option<OperationMarker>,
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Publish/subscribe marker on a method.
///
/// Only its presence matters. Descriptive keys such as `message` or `summary` are
/// accepted and not read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OperationMarker {}

impl ServiceDescriptor {
    /// Loads a descriptor file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid descriptor.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading service descriptor: {}", path.display());
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut descriptor = Self::from_str_named(&path.display().to_string(), &text)?;
        descriptor.source = Some(path.to_path_buf());
        Ok(descriptor)
    }

    pub fn from_str_named(name: &str, text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| Error::parse(name, e))
    }

    fn source_display(&self) -> String {
        self.source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<inline>".to_string())
    }

    /// The template path, resolved against the descriptor's directory.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no template is named.
    pub fn template_path(&self) -> Result<PathBuf> {
        let template = self
            .template
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "Template parameter was missing for class '{}' in {}.",
                    self.class_name,
                    self.source_display()
                ))
            })?;

        Ok(match self.source.as_ref().and_then(|s| s.parent()) {
            Some(dir) => dir.join(template),
            None => PathBuf::from(template),
        })
    }

    /// Output key of the stub generated for this class.
    pub fn artifact_name(&self) -> String {
        format!("{}.{}.g.rs", self.namespace, self.class_name)
    }
}

/// Binder for service descriptors.
///
/// Collects the methods of every qualifying interface: one named on the service
/// marker or in the base list, declared in the descriptor, and carrying the AsyncAPI
/// marker.
pub struct AnnotationBinder<'a> {
    descriptor: &'a ServiceDescriptor,
}

impl<'a> AnnotationBinder<'a> {
    pub fn new(descriptor: &'a ServiceDescriptor) -> Self {
        Self { descriptor }
    }

    /// Qualifying interfaces, service-marker entries first, each at most once.
    pub fn qualifying_interfaces(&self) -> Vec<&'a InterfaceDescriptor> {
        let descriptor = self.descriptor;
        let mut found: Vec<&'a InterfaceDescriptor> = Vec::new();

        for name in descriptor.service_interfaces.iter().chain(&descriptor.implements) {
            let Some(interface) = descriptor.interfaces.iter().find(|i| &i.name == name) else {
                debug!("Interface '{}' is not declared, ignoring", name);
                continue;
            };
            if !interface.async_api {
                debug!("Interface '{}' has no AsyncAPI marker, ignoring", name);
                continue;
            }
            if !found.iter().any(|i| i.name == interface.name) {
                found.push(interface);
            }
        }
        found
    }

    fn bind_method(
        &self,
        interface: &InterfaceDescriptor,
        method: &MethodDescriptor,
    ) -> Result<Option<ChannelBinding>> {
        let direction = match (&method.subscribe, &method.publish) {
            (Some(_), _) => Direction::Subscribe,
            (None, Some(_)) => Direction::Publish,
            (None, None) => {
                return Err(Error::Configuration(format!(
                    "Method '{}' does not define a publish nor a subscribe operation in {}.",
                    method.name,
                    self.descriptor.source_display()
                )));
            }
        };

        let Some(channel) = method.channel.as_ref() else {
            debug!("Method '{}' has no channel, skipping", method.name);
            return Ok(None);
        };

        Ok(Some(ChannelBinding {
            method_name: method.name.clone(),
            topic_template: channel.clone(),
            channel_parameters: method
                .channel_parameters
                .iter()
                .map(|p| ChannelParameter::new(p.name.clone(), p.type_name.clone()))
                .collect(),
            parameters: method
                .parameters
                .iter()
                .map(|p| MethodParameter::new(p.type_name.clone(), p.name.clone()))
                .collect(),
            direction,
            owner: interface.name.clone(),
        }))
    }
}

impl ChannelBinder for AnnotationBinder<'_> {
    fn bind(&self) -> Result<Vec<ChannelBinding>> {
        let interfaces = self.qualifying_interfaces();
        if interfaces.is_empty() {
            return Err(Error::Configuration(format!(
                "Class '{}' (file: {}) was marked as an AsyncAPI service but does not implement any interface marked as AsyncAPI.",
                self.descriptor.class_name,
                self.descriptor.source_display()
            )));
        }

        let mut bindings = Vec::new();
        for interface in interfaces {
            for method in &interface.methods {
                if let Some(binding) = self.bind_method(interface, method)? {
                    bindings.push(binding);
                }
            }
        }
        Ok(bindings)
    }
}
