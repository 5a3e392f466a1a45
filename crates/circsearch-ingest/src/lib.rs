//! Streaming ingestion of circulation records.
//!
//! The source file is split into record units ([`splitter`]), each unit is
//! parsed ([`record`]) and its items are turned into documents
//! ([`assembler`]) carrying a phonetic fingerprint of the normalized title
//! ([`normalize`], [`phonetic`]). [`pipeline`] drives one run against an
//! [`IndexSession`](circsearch_core::IndexSession).

pub mod assembler;
pub mod field;
pub mod normalize;
pub mod phonetic;
pub mod pipeline;
pub mod record;
pub mod splitter;

#[cfg(test)]
mod test_support;

pub use assembler::DocumentAssembler;
pub use field::{extract, extract_catalog_fields};
pub use normalize::TextNormalizer;
pub use phonetic::PhoneticFingerprinter;
pub use pipeline::{
    IngestProgress, IngestStats, PipelineContext, PipelineCounters, ProgressCallback,
    build_from_file, carriage_return_progress,
};
pub use record::{ItemShape, ParsedRecord, XmlValue};
pub use splitter::{RawRecordUnit, RecordSplitter};
