//! Embedding in a host build, typically a `build.rs` script.
//!
//! The host hands over candidate files with their namespaces and receives generated
//! sources plus diagnostics. A missing namespace is reported but does not stop
//! generation.
//!
//! ```no_run
//! use asyncapi_codegen::host::{self, HostSpec};
//!
//! let inputs = vec![HostSpec::new("specs/orders.yaml", Some("events".to_string()))];
//! let output = host::generate(&inputs).unwrap();
//! host::emit_cargo_directives(&mut std::io::stdout(), &inputs, &output).unwrap();
//! if output.fails_build() {
//!     std::process::exit(1);
//! }
//! ```

use crate::error::Result;
use crate::orchestrator::GenerationOrchestrator;
use crate::scanner::is_spec_file;
use crate::spec_document::SpecToGenerate;
use crate::writer::write_to_file;
use log::{debug, warn};
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Diagnostic id reported when a spec input carries no namespace
pub const MISSING_NAMESPACE: &str = "ACG0001";

/// A candidate input file and the namespace configured for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSpec {
    pub path: PathBuf,
    pub namespace: Option<String>,
}

impl HostSpec {
    pub fn new(path: impl Into<PathBuf>, namespace: Option<String>) -> Self {
        Self {
            path: path.into(),
            namespace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub id: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{} {}: {}", level, self.id, self.message)
    }
}

/// One generated source, keyed by `<spec file name>.g.rs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSource {
    pub hint_name: String,
    pub contents: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostOutput {
    pub sources: Vec<HostSource>,
    pub diagnostics: Vec<Diagnostic>,
}

impl HostOutput {
    /// Whether any diagnostic should fail the host build.
    pub fn fails_build(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Writes every source into `dir` under its hint name.
    pub fn write_sources(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let path = dir.join(&source.hint_name);
            write_to_file(&source.contents, &path)?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Generates sources for every input with a spec extension.
///
/// Inputs without a namespace get a [`MISSING_NAMESPACE`] error diagnostic and are
/// generated with an empty namespace.
///
/// # Errors
///
/// Fails like [`GenerationOrchestrator::from_specs`].
pub fn generate(inputs: &[HostSpec]) -> Result<HostOutput> {
    let mut diagnostics = Vec::new();
    let mut specs = Vec::new();

    for input in inputs.iter().filter(|i| is_spec_file(&i.path)) {
        let file_name = input
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let namespace = match &input.namespace {
            Some(namespace) => namespace.clone(),
            None => {
                warn!("No namespace configured for {}", file_name);
                diagnostics.push(Diagnostic {
                    id: MISSING_NAMESPACE,
                    severity: Severity::Error,
                    message: format!("Missing 'Namespace' for {}", file_name),
                });
                String::new()
            }
        };
        specs.push(SpecToGenerate::new(namespace, &input.path));
    }
    debug!("Host supplied {} spec inputs", specs.len());

    let sources = GenerationOrchestrator::new()
        .from_specs(&specs)?
        .into_iter()
        .zip(&specs)
        .map(|(artifact, spec)| HostSource {
            hint_name: format!("{}.g.rs", spec.spec_file_name()),
            contents: artifact.contents,
        })
        .collect();

    Ok(HostOutput {
        sources,
        diagnostics,
    })
}

/// Writes `cargo:` directives for a build script: one rerun trigger per input and one
/// warning per diagnostic.
pub fn emit_cargo_directives(
    out: &mut impl Write,
    inputs: &[HostSpec],
    output: &HostOutput,
) -> io::Result<()> {
    for input in inputs {
        writeln!(out, "cargo:rerun-if-changed={}", input.path.display())?;
    }
    for diagnostic in &output.diagnostics {
        writeln!(out, "cargo:warning={}", diagnostic)?;
    }
    Ok(())
}
