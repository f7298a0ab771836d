use crate::error::Error;
use crate::orchestrator::GenerationOrchestrator;
use crate::spec_document::SpecToGenerate;
use crate::writer::{write_artifact, write_stub};
use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{debug, info};
use std::path::PathBuf;

/// AsyncAPI code generator - Generate Rust interfaces and payload types from AsyncAPI specs
#[derive(Parser, Debug)]
#[command(name = "asyncapi-codegen")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a trait contract and payload types per AsyncAPI spec
    #[command(name = "fromspec")]
    FromSpec {
        /// Specs to generate, each as NamespaceName,OutputDirectory,SpecFilePath
        #[arg(value_name = "SPEC", required = true)]
        specs: Vec<String>,
    },

    /// Render stub implementations for service descriptors
    Stub {
        /// Directory the stubs are written to
        #[arg(short = 'o', long = "output", value_name = "DIR")]
        output: PathBuf,

        /// Service descriptor files (YAML or JSON)
        #[arg(value_name = "DESCRIPTOR", required = true)]
        descriptors: Vec<PathBuf>,
    },
}

/// One `NamespaceName,OutputDirectory,SpecFilePath` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecArgument {
    pub namespace_name: String,
    pub output_directory: PathBuf,
    pub spec_file_path: PathBuf,
}

/// Parses a `NamespaceName,OutputDirectory,SpecFilePath` argument.
///
/// # Errors
///
/// Returns [`Error::Input`] unless the argument has exactly three non-empty parts.
pub fn parse_spec_argument(arg: &str) -> Result<SpecArgument, Error> {
    let parts: Vec<&str> = arg.split(',').map(str::trim).collect();
    match parts.as_slice() {
        [namespace, output, spec] if !namespace.is_empty() && !output.is_empty() && !spec.is_empty() => {
            Ok(SpecArgument {
                namespace_name: namespace.to_string(),
                output_directory: PathBuf::from(output),
                spec_file_path: PathBuf::from(spec),
            })
        }
        _ => Err(Error::Input(format!(
            "Malformed spec argument '{}', expected NamespaceName,OutputDirectory,SpecFilePath",
            arg
        ))),
    }
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    match &args.command {
        Command::FromSpec { specs } => {
            for spec in specs {
                parse_spec_argument(spec)?;
            }
            info!("Specs: {}", specs.len());
        }
        Command::Stub { output, descriptors } => {
            if output.is_file() {
                anyhow::bail!("Output path is not a directory: {}", output.display());
            }
            info!("Descriptors: {}", descriptors.len());
            info!("Output directory: {}", output.display());
        }
    }

    Ok(args)
}

/// Run the main workflow, returning the paths written
pub fn run(args: CliArgs) -> Result<Vec<PathBuf>> {
    match args.command {
        Command::FromSpec { specs } => run_from_spec(&specs),
        Command::Stub {
            output,
            descriptors,
        } => run_stub(&output, &descriptors),
    }
}

fn run_from_spec(specs: &[String]) -> Result<Vec<PathBuf>> {
    let arguments = specs
        .iter()
        .map(|s| parse_spec_argument(s))
        .collect::<Result<Vec<_>, _>>()?;

    let inputs: Vec<SpecToGenerate> = arguments
        .iter()
        .map(|a| SpecToGenerate::new(a.namespace_name.as_str(), a.spec_file_path.as_path()))
        .collect();

    info!("Generating code for {} specs...", inputs.len());
    let artifacts = GenerationOrchestrator::new().from_specs(&inputs)?;

    // Artifacts come back in input order.
    let mut written = Vec::with_capacity(artifacts.len());
    for (artifact, argument) in artifacts.iter().zip(&arguments) {
        written.push(write_artifact(artifact, &argument.output_directory)?);
    }

    info!("Generation complete!");
    info!("  - Specs processed: {}", inputs.len());
    info!("  - Files written: {}", written.len());
    Ok(written)
}

fn run_stub(output: &std::path::Path, descriptors: &[PathBuf]) -> Result<Vec<PathBuf>> {
    info!("Rendering stubs for {} descriptors...", descriptors.len());
    let artifacts = GenerationOrchestrator::new().from_descriptors(descriptors)?;

    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in &artifacts {
        written.push(write_stub(artifact, output)?);
    }

    info!("Generation complete!");
    info!("  - Stubs written: {}", written.len());
    Ok(written)
}
