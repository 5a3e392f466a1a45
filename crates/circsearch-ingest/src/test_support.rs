use circsearch_core::error::{IngestError, IngestResult};
use circsearch_core::traits::IndexSession;
use circsearch_core::types::{FieldSpec, SubmittableDocument};

/// In-memory session that records every call.
#[derive(Debug, Default)]
pub struct RecordingSession {
    pub schema: Option<Vec<FieldSpec>>,
    pub schema_calls: usize,
    pub documents: Vec<SubmittableDocument>,
    pub commits: usize,
    /// Reject the submission with this zero-based index.
    pub fail_submit_at: Option<usize>,
    pub fail_commit: bool,
    submit_attempts: usize,
}

impl RecordingSession {
    /// Session that rejects the submission with zero-based index `index`.
    pub fn failing_submit_at(index: usize) -> Self {
        Self {
            fail_submit_at: Some(index),
            ..Self::default()
        }
    }

    /// Session whose every commit fails.
    pub fn failing_commit() -> Self {
        Self {
            fail_commit: true,
            ..Self::default()
        }
    }
}

impl IndexSession for RecordingSession {
    fn define_schema(&mut self, fields: &[FieldSpec]) -> IngestResult<()> {
        self.schema_calls += 1;
        self.schema = Some(fields.to_vec());
        self.documents.clear();
        Ok(())
    }

    fn submit(&mut self, document: &SubmittableDocument) -> IngestResult<()> {
        if self.schema.is_none() {
            return Err(IngestError::SchemaNotDefined);
        }
        let attempt = self.submit_attempts;
        self.submit_attempts += 1;
        if self.fail_submit_at == Some(attempt) {
            return Err(IngestError::IndexSubmit {
                doc_id: document.id().to_owned(),
                source: Box::new(std::io::Error::other("rejected")),
            });
        }
        self.documents.push(document.clone());
        Ok(())
    }

    fn commit(&mut self) -> IngestResult<()> {
        if self.fail_commit {
            return Err(IngestError::IndexCommit {
                source: Box::new(std::io::Error::other("disk full")),
            });
        }
        self.commits += 1;
        Ok(())
    }

    fn doc_count(&self) -> usize {
        self.documents.len()
    }
}
