//! AsyncAPI code generator - command-line tool for spec-first and descriptor-first generation.
//!
//! # Usage
//!
//! ```bash
//! asyncapi-codegen [OPTIONS] <COMMAND>
//! ```
//!
//! # Examples
//!
//! Generate a trait contract and payload types for two specs sharing types:
//! ```bash
//! asyncapi-codegen fromspec Events,./src/gen,./specs/orders.yaml Events,./src/gen,./specs/customers.yaml
//! ```
//!
//! Render stubs for a service descriptor:
//! ```bash
//! asyncapi-codegen stub --output ./src/gen ./services/commands.yaml
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! asyncapi-codegen -v fromspec Events,./src/gen,./specs/orders.yaml
//! ```

use anyhow::Result;
use asyncapi_codegen::cli;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("AsyncAPI code generator starting...");

    let args = cli::parse_args_from_parsed(args)?;
    let written = cli::run(args)?;

    info!("Code generation completed successfully ({} files)", written.len());

    Ok(())
}
