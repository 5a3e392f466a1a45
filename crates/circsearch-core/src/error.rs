use std::path::PathBuf;

/// Unified error type covering every failure mode of the ingestion pipeline.
///
/// The pipeline is a single-pass, fail-fast batch job: every variant that
/// reaches the caller aborts the run. Shape problems inside a record never
/// show up here, field extraction degrades to an empty string instead, and
/// unterminated trailing records are dropped by the splitter.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    // === Source errors ===
    /// The configured source path does not reference an existing regular file.
    #[error("Source file not found at {path}. Check CIRCSEARCH_SOURCE or the source_path setting.")]
    SourceMissing {
        /// Path that was checked.
        path: PathBuf,
    },

    /// The source exists but could not be opened for reading.
    #[error("Source file {path} could not be opened: {source}. Check file permissions.")]
    SourceUnavailable {
        /// Path that was attempted.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Reading the source failed part way through the stream.
    #[error("Read failed at line {line} of the source: {source}")]
    SourceRead {
        /// 1-based line number where the read failed.
        line: usize,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A complete record unit could not be parsed as markup.
    #[error(
        "Malformed record starting at line {line}: {detail}. Fix the source or set skip_malformed_records."
    )]
    MalformedRecord {
        /// 1-based line number of the record's start delimiter.
        line: usize,
        /// Parser diagnostic.
        detail: String,
    },

    // === Text analysis errors ===
    /// The stemming engine could not be constructed for the requested language.
    #[error("Stemmer unavailable for language \"{language}\": {reason}")]
    StemmerInit {
        /// Requested language code.
        language: String,
        /// Why it is unavailable.
        reason: String,
    },

    // === Index session errors ===
    /// A document was submitted before `define_schema` was called.
    #[error("Index schema not defined. Call define_schema() before submitting documents.")]
    SchemaNotDefined,

    /// The schema passed to `define_schema` is unusable.
    #[error("Invalid schema field \"{field}\": {reason}")]
    InvalidSchema {
        /// Offending field name.
        field: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The index could not be created or opened at the given location.
    #[error("Failed to open index at {path}: {source}")]
    IndexOpen {
        /// Index directory.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The index rejected a submitted document.
    #[error("Index rejected document \"{doc_id}\": {source}. The run is aborted.")]
    IndexSubmit {
        /// `id` field of the rejected document (may be empty).
        doc_id: String,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The final commit failed; nothing from this run is durable.
    #[error("Index commit failed: {source}. The index must be rebuilt.")]
    IndexCommit {
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // === Configuration errors ===
    /// A configuration value is invalid.
    #[error("Invalid config: {field} = \"{value}\" — {reason}")]
    InvalidConfig {
        /// Which config field.
        field: String,
        /// The invalid value.
        value: String,
        /// Why it is invalid.
        reason: String,
    },

    // === I/O errors ===
    /// Wraps `std::io::Error` for file operations outside the source stream.
    #[error("I/O error: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// Wraps errors from collaborating subsystems (index engine, progress sinks).
    #[error("{subsystem} error: {source}")]
    SubsystemError {
        /// Which subsystem produced the error.
        subsystem: &'static str,
        /// The underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl IngestError {
    /// Whether the error was raised before any record was processed.
    #[must_use]
    pub const fn is_startup(&self) -> bool {
        matches!(
            self,
            Self::SourceMissing { .. }
                | Self::SourceUnavailable { .. }
                | Self::StemmerInit { .. }
                | Self::InvalidConfig { .. }
                | Self::InvalidSchema { .. }
                | Self::IndexOpen { .. }
        )
    }
}

/// Convenience alias used throughout the circsearch crates.
pub type IngestResult<T> = Result<T, IngestError>;
