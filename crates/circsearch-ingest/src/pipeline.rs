//! The ingestion run: split, assemble, submit, commit.
//!
//! A run is a single pass over the source. The schema is defined once before
//! the first unit is read and the session is committed once after the last
//! one. Any error aborts the run without committing.

use std::fmt;
use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Instant;

use circsearch_core::config::IngestConfig;
use circsearch_core::error::{IngestError, IngestResult};
use circsearch_core::traits::IndexSession;
use circsearch_core::types::catalog_schema;
use tracing::{debug, info, instrument, warn};

use crate::assembler::DocumentAssembler;
use crate::normalize::TextNormalizer;
use crate::phonetic::PhoneticFingerprinter;
use crate::splitter::{RawRecordUnit, RecordSplitter};

/// Running totals of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineCounters {
    /// Record units parsed and submitted.
    pub units: u64,
    /// Documents submitted.
    pub documents: u64,
    /// Malformed units skipped.
    pub skipped_units: u64,
}

impl PipelineCounters {
    /// Account for one processed unit holding `items` documents.
    pub fn record_unit(&mut self, items: usize) {
        self.units += 1;
        self.documents += items as u64;
    }

    pub fn record_skipped(&mut self) {
        self.skipped_units += 1;
    }
}

/// Progress update, emitted after every record unit and once at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestProgress {
    pub units: u64,
    pub documents: u64,
    /// Set on the final update, after the commit.
    pub finished: bool,
}

/// Callback receiving progress updates.
pub type ProgressCallback = Box<dyn FnMut(IngestProgress) + Send>;

/// Statistics from a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestStats {
    /// Record units processed.
    pub units: u64,
    /// Documents submitted and committed.
    pub documents: u64,
    /// Malformed units skipped.
    pub skipped_units: u64,
    /// Unterminated trailing blocks discarded by the splitter.
    pub dropped_fragments: usize,
    /// Source lines read.
    pub lines_read: usize,
    /// Documents the session reported after commit.
    pub index_doc_count: usize,
    /// Wall time of the run in milliseconds.
    pub total_ms: f64,
}

/// Per-run state: the assembler, the counters and the error policy.
pub struct PipelineContext {
    assembler: DocumentAssembler,
    counters: PipelineCounters,
    skip_malformed_records: bool,
    on_progress: Option<ProgressCallback>,
}

impl fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineContext")
            .field("assembler", &self.assembler)
            .field("counters", &self.counters)
            .field("skip_malformed_records", &self.skip_malformed_records)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl PipelineContext {
    /// Context for a language code, failing fast on an unusable stemmer or
    /// stopword list.
    ///
    /// # Errors
    ///
    /// See [`TextNormalizer::new`].
    pub fn new(language: &str) -> IngestResult<Self> {
        let normalizer = TextNormalizer::new(language)?;
        Ok(Self::with_assembler(DocumentAssembler::new(
            normalizer,
            PhoneticFingerprinter::new(),
        )))
    }

    /// Context for a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::InvalidConfig` if the configuration does not
    /// validate, or the errors of [`PipelineContext::new`].
    pub fn from_config(config: &IngestConfig) -> IngestResult<Self> {
        config.validate()?;
        Ok(Self::new(&config.language)?.with_skip_malformed_records(config.skip_malformed_records))
    }

    #[must_use]
    pub fn english() -> Self {
        Self::with_assembler(DocumentAssembler::english())
    }

    const fn with_assembler(assembler: DocumentAssembler) -> Self {
        Self {
            assembler,
            counters: PipelineCounters {
                units: 0,
                documents: 0,
                skipped_units: 0,
            },
            skip_malformed_records: false,
            on_progress: None,
        }
    }

    /// Log and skip units that fail to parse instead of aborting.
    #[must_use]
    pub const fn with_skip_malformed_records(mut self, skip: bool) -> Self {
        self.skip_malformed_records = skip;
        self
    }

    /// Register a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: impl FnMut(IngestProgress) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Totals so far in the current (or last) run.
    #[must_use]
    pub const fn counters(&self) -> PipelineCounters {
        self.counters
    }

    #[must_use]
    pub const fn assembler(&self) -> &DocumentAssembler {
        &self.assembler
    }

    /// Submit the documents of one unit and update the counters.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::MalformedRecord` unless skipping is enabled, and
    /// any error from the session.
    pub fn process_unit<S: IndexSession + ?Sized>(
        &mut self,
        unit: &RawRecordUnit,
        session: &mut S,
    ) -> IngestResult<usize> {
        let submitted = match self.assembler.submit_unit(unit, session) {
            Ok(submitted) => submitted,
            Err(IngestError::MalformedRecord { line, detail }) if self.skip_malformed_records => {
                warn!(line, detail = %detail, "skipping malformed record");
                self.counters.record_skipped();
                return Ok(0);
            }
            Err(err) => return Err(err),
        };
        self.counters.record_unit(submitted);
        self.emit(false);
        Ok(submitted)
    }

    /// Run the whole pipeline over an open splitter.
    ///
    /// Counters are reset first. The schema is defined before the first unit
    /// is read and the session is committed exactly once at the end.
    ///
    /// # Errors
    ///
    /// The first error from the splitter, the assembler or the session. No
    /// commit is attempted after an error.
    pub fn run<R: BufRead, S: IndexSession + ?Sized>(
        &mut self,
        mut splitter: RecordSplitter<R>,
        session: &mut S,
    ) -> IngestResult<IngestStats> {
        let start = Instant::now();
        self.counters = PipelineCounters::default();

        session.define_schema(&catalog_schema())?;

        for unit in &mut splitter {
            let unit = unit?;
            self.process_unit(&unit, session)?;
        }

        {
            let _commit = tracing::debug_span!("circsearch::commit").entered();
            session.commit()?;
            debug!(doc_count = self.counters.documents, "index committed");
        }
        self.emit(true);

        let stats = IngestStats {
            units: self.counters.units,
            documents: self.counters.documents,
            skipped_units: self.counters.skipped_units,
            dropped_fragments: splitter.dropped_fragments(),
            lines_read: splitter.lines_read(),
            index_doc_count: session.doc_count(),
            total_ms: start.elapsed().as_secs_f64() * 1000.0,
        };
        info!(
            unit_count = stats.units,
            doc_count = stats.documents,
            skipped_units = stats.skipped_units,
            dropped_fragments = stats.dropped_fragments,
            lines_read = stats.lines_read,
            duration_ms = stats.total_ms,
            "ingestion complete"
        );
        Ok(stats)
    }

    fn emit(&mut self, finished: bool) {
        if let Some(callback) = self.on_progress.as_mut() {
            callback(IngestProgress {
                units: self.counters.units,
                documents: self.counters.documents,
                finished,
            });
        }
    }
}

/// Build an index from a source file.
///
/// The source is checked before the session is touched, so a missing or
/// unreadable source leaves any existing index untouched.
///
/// # Errors
///
/// `IngestError::SourceMissing` / `SourceUnavailable` for the source, then
/// anything [`PipelineContext::run`] returns.
#[instrument(name = "circsearch::ingest", skip_all, fields(source_path = %source.display()))]
pub fn build_from_file<S: IndexSession + ?Sized>(
    source: &Path,
    session: &mut S,
    context: &mut PipelineContext,
) -> IngestResult<IngestStats> {
    let splitter = RecordSplitter::open(source)?;
    context.run(splitter, session)
}

/// Progress sink that rewrites a single counter line in place.
///
/// Writes `\r<documents>` per update and a newline after the final one.
/// Write errors are ignored.
pub fn carriage_return_progress<W>(mut out: W) -> impl FnMut(IngestProgress) + Send
where
    W: Write + Send + 'static,
{
    move |progress: IngestProgress| {
        let _ = write!(out, "\r{}", progress.documents);
        if progress.finished {
            let _ = writeln!(out);
        }
        let _ = out.flush();
    }
}
