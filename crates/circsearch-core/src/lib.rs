//! Core types, errors and configuration shared by the circsearch crates.
//!
//! This crate defines the document shape handed to index backends
//! (`SubmittableDocument`), the catalog schema, the write-side
//! `IndexSession` trait, the `IngestError` type, run configuration, the
//! bundled stopword lists and tracing conventions.
//!
//! It has minimal external dependencies and is depended on by every other
//! crate in the workspace.

pub mod config;
pub mod error;
pub mod stopwords;
pub mod tracing_config;
pub mod traits;
pub mod types;

pub use config::{DEFAULT_WRITER_HEAP_BYTES, IngestConfig, MIN_WRITER_HEAP_BYTES};
pub use error::{IngestError, IngestResult};
pub use stopwords::{SUPPORTED_LANGUAGES, StopwordSet};
pub use traits::IndexSession;
pub use types::{CatalogFields, FieldKind, FieldSpec, SubmittableDocument, catalog_schema, fields};
