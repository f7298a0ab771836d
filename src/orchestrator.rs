//! Coordination of whole generation runs.
//!
//! One call processes a batch of inputs in order and returns one artifact per input.
//! Any failure aborts the run; callers never see partial output.

use crate::binder::annotation::{AnnotationBinder, ServiceDescriptor};
use crate::binder::spec::SpecBinder;
use crate::binder::ChannelBinder;
use crate::data_types::{DataTypeEmitter, GenerationState};
use crate::error::{Error, Result};
use crate::interface_emitter::{InterfaceEmitter, StubContext};
use crate::spec_document::{SpecIdentity, SpecToGenerate};
use crate::type_translator::{RustTypeTranslator, TypeTranslator};
use log::{debug, info};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Generated source for one spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub spec: SpecIdentity,
    pub contents: String,
}

impl GeneratedArtifact {
    /// File name the artifact is written under (`Orders.g.rs`).
    pub fn file_name(&self) -> String {
        format!("{}.g.rs", self.spec.spec_name)
    }
}

/// Generated stub for one service descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubArtifact {
    pub descriptor: PathBuf,
    /// `<namespace>.<class>.g.rs`
    pub file_name: String,
    pub contents: String,
}

/// Drives binding, type emission and rendering over a batch of inputs.
pub struct GenerationOrchestrator<T: TypeTranslator = RustTypeTranslator> {
    translator: T,
}

impl GenerationOrchestrator {
    pub fn new() -> Self {
        Self::with_translator(RustTypeTranslator)
    }
}

impl Default for GenerationOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TypeTranslator> GenerationOrchestrator<T> {
    pub fn with_translator(translator: T) -> Self {
        Self { translator }
    }

    /// Generates one artifact per spec, in input order.
    ///
    /// Types shared between specs are emitted by the first spec that declares them;
    /// later specs import them.
    ///
    /// # Errors
    ///
    /// Fails before generating anything if a spec file does not exist. Otherwise fails
    /// on the first spec that cannot be read, parsed, bound or translated.
    pub fn from_specs(&self, specs: &[SpecToGenerate]) -> Result<Vec<GeneratedArtifact>> {
        for spec in specs {
            if !spec.is_loaded() && !spec.spec_file_path().exists() {
                return Err(Error::Input(format!(
                    "Provided spec does not exist: {}",
                    absolute(spec.spec_file_path()).display()
                )));
            }
        }

        let mut state = GenerationState::new();
        let emitter = DataTypeEmitter::new(&self.translator);
        let mut artifacts = Vec::with_capacity(specs.len());

        for spec in specs {
            info!("Generating code for {}", spec.spec_file_name());
            let document = spec.normalized()?;
            let namespace = spec.target_namespace();
            let spec_name = spec.spec_name();
            let trait_name = format!("{}Api", spec_name);

            let bindings = SpecBinder::new(document, trait_name.as_str()).bind()?;
            debug!("{} binds {} operations", spec_name, bindings.len());

            let interface = InterfaceEmitter::contract(&trait_name, &spec_name, &bindings)?;
            let types = emitter.emit(document, &namespace, &mut state)?;

            artifacts.push(GeneratedArtifact {
                spec: spec.identity(),
                contents: assemble(&spec.spec_file_name(), &namespace, &interface, &types),
            });
        }

        info!("Generated {} artifacts ({} types)", artifacts.len(), state.len());
        Ok(artifacts)
    }

    /// Renders one stub per service descriptor that binds at least one method.
    ///
    /// # Errors
    ///
    /// Fails before rendering anything if a descriptor file does not exist. Otherwise
    /// fails on the first descriptor that cannot be loaded or bound, or whose template
    /// is missing or broken.
    pub fn from_descriptors(&self, descriptors: &[PathBuf]) -> Result<Vec<StubArtifact>> {
        for path in descriptors {
            if !path.exists() {
                return Err(Error::Input(format!(
                    "Provided descriptor does not exist: {}",
                    absolute(path).display()
                )));
            }
        }

        let mut artifacts = Vec::new();
        for path in descriptors {
            let descriptor = ServiceDescriptor::load(path)?;
            let bindings = AnnotationBinder::new(&descriptor).bind()?;
            if bindings.is_empty() {
                debug!("{} binds no methods, skipping", descriptor.class_name);
                continue;
            }

            let template_path = descriptor.template_path()?;
            let template_source = match fs::read_to_string(&template_path) {
                Ok(source) => source,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    return Err(Error::Configuration(format!(
                        "Template '{}' not found for class '{}'.",
                        template_path.display(),
                        descriptor.class_name
                    )));
                }
                Err(e) => return Err(Error::io(&template_path, e)),
            };

            let context = StubContext::from_bindings(
                descriptor.namespace.as_str(),
                descriptor.class_name.as_str(),
                &bindings,
            )?;
            let template_name = template_path.display().to_string();
            let contents = InterfaceEmitter::stub(&template_name, &template_source, &context)?;

            info!("Rendered stub for {}", descriptor.class_name);
            artifacts.push(StubArtifact {
                descriptor: path.clone(),
                file_name: descriptor.artifact_name(),
                contents,
            });
        }
        Ok(artifacts)
    }
}

fn assemble(source: &str, namespace: &str, interface: &str, types: &str) -> String {
    let mut out = format!(
        "// @generated by asyncapi-codegen from {}. Do not edit.\n// Mount at `crate::{}`.\n\n",
        source, namespace
    );
    out.push_str(interface);
    if !types.is_empty() {
        out.push('\n');
        out.push_str(types);
    }
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ORDERS: &str = r#"
asyncapi: 2.6.0
channels:
  orders.{customerId}.created:
    parameters:
      customerId:
        schema:
          type: string
    subscribe:
      operationId: onOrderCreated
      message:
        payload:
          $ref: '#/components/schemas/order'
components:
  schemas:
    order:
      type: object
      properties:
        id:
          type: string
"#;

    #[test]
    fn test_from_specs_renders_contract_and_types() {
        let spec = SpecToGenerate::new("Foo", "orders.yaml").with_contents(ORDERS);
        let artifacts = GenerationOrchestrator::new().from_specs(&[spec]).unwrap();

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].file_name(), "Orders.g.rs");
        let code = &artifacts[0].contents;
        assert!(code.starts_with("// @generated by asyncapi-codegen from orders.yaml."));
        assert!(code.contains("// Mount at `crate::foo::orders::api`."));
        assert!(code.contains("pub trait OrdersApi {"));
        assert!(code.contains("fn on_order_created(&self, customer_id: String, payload: Order);"));
        assert!(code.contains("pub struct Order {"));
    }

    #[test]
    fn test_missing_spec_fails_before_generation() {
        let specs = [
            SpecToGenerate::new("Foo", "orders.yaml").with_contents(ORDERS),
            SpecToGenerate::new("Foo", "does/not/exist.yaml"),
        ];
        let err = GenerationOrchestrator::new().from_specs(&specs).unwrap_err();
        assert!(matches!(err, Error::Input(_)));
        assert!(err.to_string().contains("Provided spec does not exist:"));
        assert!(err.to_string().contains("exist.yaml"));
    }

    #[test]
    fn test_empty_input_yields_no_artifacts() {
        assert!(GenerationOrchestrator::new().from_specs(&[]).unwrap().is_empty());
        assert!(GenerationOrchestrator::new().from_descriptors(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_missing_template_is_configuration_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("commands.yaml");
        fs::write(
            &path,
            "namespace: foo\nclass: Commands\ntemplate: nope.jinja\nimplements: [ICommands]\ninterfaces:\n  - name: ICommands\n    async_api: true\n    methods:\n      - name: something\n        channel: command.do\n        subscribe: {}\n",
        )
        .unwrap();

        let err = GenerationOrchestrator::new().from_descriptors(&[path]).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("not found for class 'Commands'"));
    }
}
