//! AsyncAPI code generator - Rust interfaces and payload types from AsyncAPI documents.
//!
//! Two generation paths share one pipeline:
//!
//! - **Spec-first**: an AsyncAPI 2.x document becomes a trait with one method per
//!   channel operation, a `topics` module of channel addresses, and serde payload
//!   types. Types shared by several specs in one run are emitted once.
//! - **Descriptor-first**: a service descriptor (a class and the AsyncAPI interfaces
//!   it implements) is rendered into a stub through a MiniJinja template.
//!
//! # Architecture
//!
//! 1. [`spec_document`] - Spec inputs with lazily loaded contents
//! 2. [`normalizer`] - Parses JSON/YAML into a normalized document
//! 3. [`binder`] - Maps operations onto channel topics
//! 4. [`topic_resolver`] - Rewrites and validates `{placeholder}` topics
//! 5. [`type_translator`] - Translates payload schemas into Rust declarations
//! 6. [`data_types`] - Emits payload types, deduplicated across a run
//! 7. [`interface_emitter`] - Renders trait contracts and stubs
//! 8. [`orchestrator`] - Runs whole batches of inputs
//! 9. [`writer`] - Writes artifacts to disk
//!
//! # Example Usage
//!
//! ```no_run
//! use asyncapi_codegen::{orchestrator::GenerationOrchestrator, spec_document::SpecToGenerate};
//!
//! let specs = vec![
//!     SpecToGenerate::new("Events", "specs/orders.yaml"),
//!     SpecToGenerate::new("Events", "specs/customers.yaml"),
//! ];
//! for artifact in GenerationOrchestrator::new().from_specs(&specs).unwrap() {
//!     println!("{}:\n{}", artifact.file_name(), artifact.contents);
//! }
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module. Build scripts should use [`host`].

pub mod binder;
pub mod cli;
pub mod data_types;
pub mod error;
pub mod host;
pub mod interface_emitter;
pub mod naming;
pub mod normalizer;
pub mod orchestrator;
pub mod scanner;
pub mod schema;
pub mod spec_document;
pub mod topic_resolver;
pub mod type_translator;
pub mod writer;
