//! # circsearch
//!
//! Builds a full-text index over a library's circulation catalog.
//!
//! The catalog arrives as one flat file of `<item id="N">…</item>` blocks
//! mixed with unrelated lines. circsearch streams the file, cuts out each
//! block, extracts `copies`, `url`, `id`, `title` and `isbn`, and indexes
//! them with Tantivy. The title is analyzed (case folding, stopwords,
//! stemming) and also reduced to a double-metaphone fingerprint so titles
//! can be found by how they sound.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use circsearch::prelude::*;
//!
//! circsearch::init_subscriber(Verbosity::Normal, false)?;
//! let stats = CatalogIndexBuilder::new("records.xml", "index")
//!     .verbose(true)
//!     .build()?;
//! println!("indexed {} documents from {} records", stats.documents, stats.units);
//! ```
//!
//! # Pipeline
//!
//! ```text
//!  source ─► RecordSplitter ─► ParsedRecord ─► DocumentAssembler ─► IndexSession
//!            (line automaton)  (per unit)      (fields, title       (define_schema,
//!                                               normalize,           submit, commit)
//!                                               fingerprint)
//! ```
//!
//! ## Crate Layout
//!
//! | Crate | Purpose |
//! |-------|---------|
//! | [`circsearch-core`](core) | Types, `IndexSession`, errors, config, stopwords |
//! | [`circsearch-ingest`](ingest) | Splitter, parser, normalizer, fingerprinter, pipeline |
//! | [`circsearch-lexical`](lexical) | Tantivy `IndexSession` |

pub mod index_builder;
pub mod tracing_setup;

pub use circsearch_core as core;
pub use circsearch_ingest as ingest;
pub use circsearch_lexical as lexical;

pub use circsearch_core::{
    CatalogFields, FieldKind, FieldSpec, IndexSession, IngestConfig, IngestError, IngestResult,
    StopwordSet, SubmittableDocument, catalog_schema, fields,
};
pub use circsearch_ingest::{
    DocumentAssembler, IngestProgress, IngestStats, PhoneticFingerprinter, PipelineContext,
    RawRecordUnit, RecordSplitter, TextNormalizer, build_from_file,
};
pub use circsearch_lexical::TantivySession;
pub use index_builder::CatalogIndexBuilder;
pub use tracing_setup::{Verbosity, init_subscriber};

/// Common imports.
///
/// ```rust,ignore
/// use circsearch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        CatalogIndexBuilder, IndexSession, IngestConfig, IngestError, IngestProgress,
        IngestResult, IngestStats, SubmittableDocument, TantivySession, Verbosity,
    };
}
