//! Fluent builder that turns a circulation source file into a Tantivy index.

use std::path::PathBuf;

use circsearch_core::config::IngestConfig;
use circsearch_core::error::IngestResult;
use circsearch_ingest::pipeline::{
    IngestProgress, IngestStats, PipelineContext, ProgressCallback, build_from_file,
    carriage_return_progress,
};
use circsearch_lexical::TantivySession;
use tracing::{error, instrument, warn};

/// Fluent builder for a catalog index.
///
/// Every build recreates the index directory from scratch.
///
/// ```rust,ignore
/// use circsearch::CatalogIndexBuilder;
///
/// let stats = CatalogIndexBuilder::new("records.xml", "index")
///     .verbose(true)
///     .build()
///     .expect("build index");
/// println!("{} documents", stats.documents);
/// ```
pub struct CatalogIndexBuilder {
    config: IngestConfig,
    on_progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for CatalogIndexBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogIndexBuilder")
            .field("config", &self.config)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl CatalogIndexBuilder {
    /// Builder reading `source` and writing the index to `index_dir`.
    #[must_use]
    pub fn new(source: impl Into<PathBuf>, index_dir: impl Into<PathBuf>) -> Self {
        Self::with_config(IngestConfig::new(source, index_dir))
    }

    /// Builder from defaults overridden by `CIRCSEARCH_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_config(IngestConfig::default().with_env_overrides())
    }

    /// Builder from a complete configuration.
    #[must_use]
    pub const fn with_config(config: IngestConfig) -> Self {
        Self {
            config,
            on_progress: None,
        }
    }

    /// Print the running document count to stderr.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Skip record units that fail to parse instead of aborting.
    #[must_use]
    pub fn skip_malformed_records(mut self, skip: bool) -> Self {
        self.config.skip_malformed_records = skip;
        self
    }

    /// Receive a progress update after every record unit. Runs alongside the
    /// stderr counter when verbose.
    #[must_use]
    pub fn with_progress(mut self, callback: impl FnMut(IngestProgress) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub const fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Run the ingestion.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for a bad configuration, `SourceMissing` or
    /// `SourceUnavailable` before the index is touched, and any error from
    /// the pipeline or the index afterwards.
    #[instrument(skip_all, fields(
        source_path = %self.config.source_path.display(),
        index_path = %self.config.index_path.display(),
    ))]
    pub fn build(self) -> IngestResult<IngestStats> {
        self.run().inspect_err(|err| {
            if err.is_startup() {
                warn!(error = %err, "ingestion did not start");
            } else {
                error!(error = %err, "ingestion aborted");
            }
        })
    }

    fn run(self) -> IngestResult<IngestStats> {
        let Self {
            config,
            on_progress,
        } = self;

        let mut context = PipelineContext::from_config(&config)?;
        if let Some(progress) = progress_sink(config.verbose, on_progress) {
            context = context.with_progress(progress);
        }

        let mut session = TantivySession::create(&config.index_path, config.writer_heap_bytes)
            .with_language(&config.language)?;
        build_from_file(&config.source_path, &mut session, &mut context)
    }
}

fn progress_sink(verbose: bool, user: Option<ProgressCallback>) -> Option<ProgressCallback> {
    if !verbose {
        return user;
    }
    let mut counter = carriage_return_progress(std::io::stderr());
    let sink: ProgressCallback = match user {
        Some(mut user) => Box::new(move |progress: IngestProgress| {
            counter(progress);
            user(progress);
        }),
        None => Box::new(counter),
    };
    Some(sink)
}
