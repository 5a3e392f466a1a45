//! Configuration for one ingestion run.
//!
//! [`IngestConfig`] holds every knob of the pipeline. Values come from
//! defaults, an optional TOML file and environment variables, in that order.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IngestError, IngestResult};
use crate::stopwords::SUPPORTED_LANGUAGES;

/// Default heap size handed to the index writer (50 MB).
pub const DEFAULT_WRITER_HEAP_BYTES: usize = 50_000_000;

/// Smallest writer heap the Tantivy backend accepts (15 MB).
pub const MIN_WRITER_HEAP_BYTES: usize = 15_000_000;

/// Configuration for an ingestion run.
///
/// # Environment Variable Overrides
///
/// | Variable                       | Field                    | Default       |
/// |--------------------------------|--------------------------|---------------|
/// | `CIRCSEARCH_SOURCE`            | `source_path`            | `records.xml` |
/// | `CIRCSEARCH_INDEX_DIR`         | `index_path`             | `index`       |
/// | `CIRCSEARCH_LANGUAGE`          | `language`               | `en`          |
/// | `CIRCSEARCH_VERBOSE`           | `verbose`                | `false`       |
/// | `CIRCSEARCH_WRITER_HEAP_BYTES` | `writer_heap_bytes`      | `50000000`    |
/// | `CIRCSEARCH_SKIP_MALFORMED`    | `skip_malformed_records` | `false`       |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Flat file of `<item id="N">…</item>` record blocks.
    pub source_path: PathBuf,

    /// Directory where the index lives. Recreated on every run.
    pub index_path: PathBuf,

    /// Language code for stopwords and stemming. Only `en` is bundled.
    pub language: String,

    /// Emit the self-overwriting progress counter on stderr.
    pub verbose: bool,

    /// Memory budget for the index writer, in bytes.
    pub writer_heap_bytes: usize,

    /// Log and skip record units that fail to parse instead of aborting.
    pub skip_malformed_records: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from("records.xml"),
            index_path: PathBuf::from("index"),
            language: "en".to_owned(),
            verbose: false,
            writer_heap_bytes: DEFAULT_WRITER_HEAP_BYTES,
            skip_malformed_records: false,
        }
    }
}

impl IngestConfig {
    /// Config for the given source and index locations, other fields defaulted.
    #[must_use]
    pub fn new(source_path: impl Into<PathBuf>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            index_path: index_path.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::InvalidConfig` if the document is not valid TOML
    /// for this struct.
    pub fn from_toml_str(contents: &str) -> IngestResult<Self> {
        toml::from_str(contents).map_err(|e| IngestError::InvalidConfig {
            field: "toml".to_owned(),
            value: String::new(),
            reason: e.to_string(),
        })
    }

    /// Load a TOML config file.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::Io` if the file cannot be read and
    /// `IngestError::InvalidConfig` if it cannot be parsed.
    pub fn load(path: &Path) -> IngestResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), "loaded ingest config");
        Ok(config)
    }

    /// Load overrides from environment variables.
    ///
    /// Only overrides fields for which environment variables are set.
    /// Invalid values are ignored (current values are kept).
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("CIRCSEARCH_SOURCE")
            && !val.is_empty()
        {
            self.source_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("CIRCSEARCH_INDEX_DIR")
            && !val.is_empty()
        {
            self.index_path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("CIRCSEARCH_LANGUAGE")
            && !val.is_empty()
        {
            self.language = val;
        }
        if let Ok(val) = std::env::var("CIRCSEARCH_VERBOSE") {
            self.verbose = val == "true" || val == "1";
        }
        if let Ok(val) = std::env::var("CIRCSEARCH_WRITER_HEAP_BYTES")
            && let Ok(bytes) = val.parse::<usize>()
            && bytes >= MIN_WRITER_HEAP_BYTES
        {
            self.writer_heap_bytes = bytes;
        }
        if let Ok(val) = std::env::var("CIRCSEARCH_SKIP_MALFORMED") {
            self.skip_malformed_records = val == "true" || val == "1";
        }
        self
    }

    /// Toggle the progress counter.
    #[must_use]
    pub const fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Toggle skipping of unparseable record units.
    #[must_use]
    pub const fn with_skip_malformed_records(mut self, skip: bool) -> Self {
        self.skip_malformed_records = skip;
        self
    }

    /// Check field values before a run starts.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::InvalidConfig` naming the first bad field.
    pub fn validate(&self) -> IngestResult<()> {
        if self.source_path.as_os_str().is_empty() {
            return Err(invalid("source_path", "", "must not be empty"));
        }
        if self.index_path.as_os_str().is_empty() {
            return Err(invalid("index_path", "", "must not be empty"));
        }
        if source_inside_index(&self.source_path, &self.index_path) {
            return Err(invalid(
                "index_path",
                &self.index_path.display().to_string(),
                "must not be or contain source_path",
            ));
        }
        if !SUPPORTED_LANGUAGES.contains(&self.language.as_str()) {
            return Err(invalid(
                "language",
                &self.language,
                &format!("supported: {}", SUPPORTED_LANGUAGES.join(", ")),
            ));
        }
        if self.writer_heap_bytes < MIN_WRITER_HEAP_BYTES {
            return Err(invalid(
                "writer_heap_bytes",
                &self.writer_heap_bytes.to_string(),
                &format!("must be at least {MIN_WRITER_HEAP_BYTES}"),
            ));
        }
        Ok(())
    }
}

/// Whether recreating `index` would delete `source`. Paths that exist are
/// also compared after resolving links and `..`.
fn source_inside_index(source: &Path, index: &Path) -> bool {
    if source.starts_with(index) {
        return true;
    }
    match (source.canonicalize(), index.canonicalize()) {
        (Ok(source), Ok(index)) => source.starts_with(index),
        _ => false,
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> IngestError {
    IngestError::InvalidConfig {
        field: field.to_owned(),
        value: value.to_owned(),
        reason: reason.to_owned(),
    }
}
