//! Record unit to submittable documents.

use circsearch_core::error::IngestResult;
use circsearch_core::traits::IndexSession;
use circsearch_core::types::SubmittableDocument;
use tracing::{instrument, trace};

use crate::field::extract_catalog_fields;
use crate::normalize::TextNormalizer;
use crate::phonetic::PhoneticFingerprinter;
use crate::record::{ParsedRecord, XmlValue};
use crate::splitter::RawRecordUnit;

/// Builds one [`SubmittableDocument`] per item of a record unit.
#[derive(Debug)]
pub struct DocumentAssembler {
    normalizer: TextNormalizer,
    fingerprinter: PhoneticFingerprinter,
}

impl DocumentAssembler {
    #[must_use]
    pub const fn new(normalizer: TextNormalizer, fingerprinter: PhoneticFingerprinter) -> Self {
        Self {
            normalizer,
            fingerprinter,
        }
    }

    #[must_use]
    pub fn english() -> Self {
        Self::new(TextNormalizer::english(), PhoneticFingerprinter::new())
    }

    #[must_use]
    pub const fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    /// Document for a single parsed item.
    #[must_use]
    pub fn build_document(&self, item: &XmlValue) -> SubmittableDocument {
        let fields = extract_catalog_fields(item);
        let tokens = self.normalizer.normalize(&fields.title);
        let phonetic = self.fingerprinter.fingerprint(&tokens);
        SubmittableDocument::new(fields, phonetic)
    }

    /// Documents for every item of a parsed record, in document order.
    #[must_use]
    pub fn build_documents(&self, record: &ParsedRecord) -> Vec<SubmittableDocument> {
        record
            .items()
            .into_iter()
            .map(|item| self.build_document(item))
            .collect()
    }

    /// Parse a unit and submit its documents. Returns how many were submitted.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::MalformedRecord` if the unit does not parse, or
    /// whatever the session returns from `submit`. Documents submitted before
    /// a failing one stay submitted.
    #[instrument(name = "circsearch::assemble", level = "trace", skip_all, fields(line = unit.line()))]
    pub fn submit_unit<S: IndexSession + ?Sized>(
        &self,
        unit: &RawRecordUnit,
        session: &mut S,
    ) -> IngestResult<usize> {
        let record = ParsedRecord::parse(unit)?;
        let documents = self.build_documents(&record);
        for document in &documents {
            session.submit(document)?;
        }
        trace!(item_count = documents.len(), "record unit submitted");
        Ok(documents.len())
    }
}
