//! Seams between the ingestion pipeline and its collaborators.

use crate::error::IngestResult;
use crate::types::{FieldSpec, SubmittableDocument};

// ─── Index Session Trait ────────────────────────────────────────────────────

/// Write-side contract of a full-text index backend.
///
/// The pipeline calls [`define_schema`](Self::define_schema) once before the
/// streaming loop, [`submit`](Self::submit) once per document in source order,
/// and [`commit`](Self::commit) exactly once after the source is exhausted.
/// The pipeline never reads the index back during a run.
pub trait IndexSession {
    /// Establish the field layout. Must be called before any submit.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::InvalidSchema` for unusable field lists, or
    /// `IngestError::IndexOpen` if the backing store cannot be created.
    fn define_schema(&mut self, fields: &[FieldSpec]) -> IngestResult<()>;

    /// Accept one document. Backends may buffer; nothing is durable until
    /// [`commit`](Self::commit) returns.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::SchemaNotDefined` when called before
    /// `define_schema`, or `IngestError::IndexSubmit` if the backend rejects
    /// the document.
    fn submit(&mut self, document: &SubmittableDocument) -> IngestResult<()>;

    /// Flush and durably persist every submitted document.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::IndexCommit` if persistence fails.
    fn commit(&mut self) -> IngestResult<()>;

    /// Number of documents visible after the last commit.
    fn doc_count(&self) -> usize;
}

impl<S: IndexSession + ?Sized> IndexSession for &mut S {
    fn define_schema(&mut self, fields: &[FieldSpec]) -> IngestResult<()> {
        (**self).define_schema(fields)
    }

    fn submit(&mut self, document: &SubmittableDocument) -> IngestResult<()> {
        (**self).submit(document)
    }

    fn commit(&mut self) -> IngestResult<()> {
        (**self).commit()
    }

    fn doc_count(&self) -> usize {
        (**self).doc_count()
    }
}

impl<S: IndexSession + ?Sized> IndexSession for Box<S> {
    fn define_schema(&mut self, fields: &[FieldSpec]) -> IngestResult<()> {
        (**self).define_schema(fields)
    }

    fn submit(&mut self, document: &SubmittableDocument) -> IngestResult<()> {
        (**self).submit(document)
    }

    fn commit(&mut self) -> IngestResult<()> {
        (**self).commit()
    }

    fn doc_count(&self) -> usize {
        (**self).doc_count()
    }
}
