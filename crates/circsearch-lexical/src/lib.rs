//! Tantivy implementation of the write-side [`IndexSession`].
//!
//! # Field mapping
//!
//! | `FieldKind`           | Tantivy options                                           |
//! |-----------------------|-----------------------------------------------------------|
//! | `Opaque`              | `STORED`                                                  |
//! | `FulltextAnalyzed`    | `circsearch_en` tokenizer, freqs and positions, stored    |
//! | `FulltextUnsegmented` | `circsearch_whitespace` tokenizer, freqs only, stored     |
//!
//! `circsearch_en` is `SimpleTokenizer` → `RemoveLongFilter` → `LowerCaser` →
//! `StopWordFilter` (the bundled list) → English `Stemmer`. Positions are
//! kept on analyzed fields so hits can be highlighted.
//!
//! The index is created when the schema is defined. On-disk sessions always
//! start from an empty directory. An existing Tantivy index at the path is
//! removed first; any other non-empty directory is left alone and the
//! session fails with `IndexOpen`.

use std::path::{Path, PathBuf};

use circsearch_core::error::{IngestError, IngestResult};
use circsearch_core::stopwords::StopwordSet;
use circsearch_core::traits::IndexSession;
use circsearch_core::types::{FieldKind, FieldSpec, SubmittableDocument};
use tantivy::directory::MmapDirectory;
use tantivy::schema::{
    Field, IndexRecordOption, STORED, Schema, TextFieldIndexing, TextOptions,
};
use tantivy::tokenizer::{
    Language, LowerCaser, RemoveLongFilter, SimpleTokenizer, Stemmer, StopWordFilter,
    TextAnalyzer, WhitespaceTokenizer,
};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument};
use tracing::{debug, instrument};

// ─── Constants ──────────────────────────────────────────────────────────────

/// Tokenizer for `FulltextAnalyzed` fields.
pub const ANALYZED_TOKENIZER: &str = "circsearch_en";

/// Tokenizer for `FulltextUnsegmented` fields.
pub const WHITESPACE_TOKENIZER: &str = "circsearch_whitespace";

/// Tokens longer than this are dropped by the analyzed tokenizer.
const MAX_TOKEN_LEN: usize = 40;

// ─── Analyzers ──────────────────────────────────────────────────────────────

fn stemmer_language(language: &str) -> Option<Language> {
    match language {
        "en" => Some(Language::English),
        _ => None,
    }
}

fn build_analyzed_tokenizer(stopwords: &StopwordSet, language: Language) -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(RemoveLongFilter::limit(MAX_TOKEN_LEN))
        .filter(LowerCaser)
        .filter(StopWordFilter::remove(
            stopwords.base_words().map(str::to_owned),
        ))
        .filter(Stemmer::new(language))
        .build()
}

fn build_whitespace_tokenizer() -> TextAnalyzer {
    TextAnalyzer::builder(WhitespaceTokenizer::default()).build()
}

// ─── Schema ─────────────────────────────────────────────────────────────────

fn text_options(tokenizer: &str, record: IndexRecordOption) -> TextOptions {
    TextOptions::default()
        .set_indexing_options(
            TextFieldIndexing::default()
                .set_tokenizer(tokenizer)
                .set_index_option(record),
        )
        .set_stored()
}

/// Translate field specs into a Tantivy schema.
///
/// # Errors
///
/// Returns `IngestError::InvalidSchema` for an empty spec list, an empty
/// field name or a duplicated name.
pub fn build_schema(specs: &[FieldSpec]) -> IngestResult<(Schema, Vec<(&'static str, Field)>)> {
    if specs.is_empty() {
        return Err(IngestError::InvalidSchema {
            field: String::new(),
            reason: "schema has no fields".to_owned(),
        });
    }

    let mut builder = Schema::builder();
    let mut fields: Vec<(&'static str, Field)> = Vec::with_capacity(specs.len());
    for spec in specs {
        if spec.name.is_empty() {
            return Err(IngestError::InvalidSchema {
                field: String::new(),
                reason: "field name is empty".to_owned(),
            });
        }
        if fields.iter().any(|(name, _)| *name == spec.name) {
            return Err(IngestError::InvalidSchema {
                field: spec.name.to_owned(),
                reason: "field defined twice".to_owned(),
            });
        }
        let field = match spec.kind {
            FieldKind::Opaque => builder.add_text_field(spec.name, STORED),
            FieldKind::FulltextAnalyzed => builder.add_text_field(
                spec.name,
                text_options(ANALYZED_TOKENIZER, IndexRecordOption::WithFreqsAndPositions),
            ),
            FieldKind::FulltextUnsegmented => builder.add_text_field(
                spec.name,
                text_options(WHITESPACE_TOKENIZER, IndexRecordOption::WithFreqs),
            ),
        };
        fields.push((spec.name, field));
    }
    Ok((builder.build(), fields))
}

// ─── TantivySession ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Location {
    Dir(PathBuf),
    Ram,
}

struct OpenIndex {
    index: Index,
    reader: IndexReader,
    writer: IndexWriter,
    fields: Vec<(&'static str, Field)>,
}

/// Write session against a Tantivy index.
///
/// Documents are buffered by a single-threaded Tantivy writer, so they land
/// in one segment in submission order, and become visible after
/// [`IndexSession::commit`].
pub struct TantivySession {
    location: Location,
    writer_heap_bytes: usize,
    stopwords: StopwordSet,
    language: Language,
    open: Option<OpenIndex>,
    committed_docs: usize,
}

impl std::fmt::Debug for TantivySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TantivySession")
            .field("location", &self.location)
            .field("writer_heap_bytes", &self.writer_heap_bytes)
            .field("schema_defined", &self.open.is_some())
            .field("committed_docs", &self.committed_docs)
            .finish_non_exhaustive()
    }
}

impl TantivySession {
    /// Session that will (re)create the index at `path`.
    ///
    /// Nothing touches the filesystem until `define_schema`.
    #[must_use]
    pub fn create(path: impl Into<PathBuf>, writer_heap_bytes: usize) -> Self {
        Self::at(Location::Dir(path.into()), writer_heap_bytes)
    }

    /// Session over a RAM-backed index.
    #[must_use]
    pub fn in_memory(writer_heap_bytes: usize) -> Self {
        Self::at(Location::Ram, writer_heap_bytes)
    }

    fn at(location: Location, writer_heap_bytes: usize) -> Self {
        Self {
            location,
            writer_heap_bytes,
            stopwords: StopwordSet::english(),
            language: Language::English,
            open: None,
            committed_docs: 0,
        }
    }

    /// Use the stopword list and stemmer of another language.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::StemmerInit` if Tantivy has no stemmer for
    /// `language`, or `IngestError::InvalidConfig` if no stopword list is
    /// bundled for it.
    pub fn with_language(mut self, language: &str) -> IngestResult<Self> {
        self.language = stemmer_language(language).ok_or_else(|| IngestError::StemmerInit {
            language: language.to_owned(),
            reason: "no tantivy stemmer for this language".to_owned(),
        })?;
        self.stopwords = StopwordSet::for_language(language)?;
        Ok(self)
    }

    /// Index directory, `None` for RAM sessions.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::Dir(path) => Some(path),
            Location::Ram => None,
        }
    }

    /// The underlying index once the schema is defined.
    #[must_use]
    pub fn index(&self) -> Option<&Index> {
        self.open.as_ref().map(|open| &open.index)
    }

    /// Tantivy field for a schema field name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Field> {
        self.open.as_ref().and_then(|open| {
            open.fields
                .iter()
                .find_map(|(field_name, field)| (*field_name == name).then_some(*field))
        })
    }

    fn open_error(&self, source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> IngestError {
        IngestError::IndexOpen {
            path: self.path().map_or_else(|| PathBuf::from(":memory:"), Path::to_path_buf),
            source: source.into(),
        }
    }

    fn create_index(&self, schema: Schema) -> IngestResult<Index> {
        match &self.location {
            Location::Ram => Ok(Index::create_in_ram(schema)),
            Location::Dir(path) => {
                self.remove_previous_index(path)?;
                std::fs::create_dir_all(path).map_err(|e| self.open_error(e))?;
                Index::create_in_dir(path, schema).map_err(|e| self.open_error(e))
            }
        }
    }

    fn remove_previous_index(&self, path: &Path) -> IngestResult<()> {
        if !path.exists() {
            return Ok(());
        }
        if !path.is_dir() {
            return Err(self.open_error("path exists and is not a directory"));
        }
        let mut entries = std::fs::read_dir(path).map_err(|e| self.open_error(e))?;
        if entries.next().is_none() {
            return Ok(());
        }

        let directory = MmapDirectory::open(path).map_err(|e| self.open_error(e))?;
        let is_index = Index::exists(&directory).map_err(|e| self.open_error(e))?;
        drop(directory);
        if !is_index {
            return Err(self.open_error(
                "directory is not empty and does not hold an index; refusing to clear it",
            ));
        }
        debug!(path = %path.display(), "removing previous index");
        std::fs::remove_dir_all(path).map_err(|e| self.open_error(e))
    }
}

impl IndexSession for TantivySession {
    #[instrument(skip_all, fields(field_count = fields.len()))]
    fn define_schema(&mut self, fields: &[FieldSpec]) -> IngestResult<()> {
        let (schema, field_map) = build_schema(fields)?;

        // Release the writer lock before the directory is wiped.
        self.open = None;
        self.committed_docs = 0;

        let index = self.create_index(schema)?;
        let tokenizers = index.tokenizers();
        tokenizers.register(
            ANALYZED_TOKENIZER,
            build_analyzed_tokenizer(&self.stopwords, self.language),
        );
        tokenizers.register(WHITESPACE_TOKENIZER, build_whitespace_tokenizer());

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| self.open_error(e))?;
        let writer: IndexWriter = index
            .writer_with_num_threads(1, self.writer_heap_bytes)
            .map_err(|e| self.open_error(e))?;

        debug!(path = ?self.path(), "index created");
        self.open = Some(OpenIndex {
            index,
            reader,
            writer,
            fields: field_map,
        });
        Ok(())
    }

    fn submit(&mut self, document: &SubmittableDocument) -> IngestResult<()> {
        let open = self.open.as_mut().ok_or(IngestError::SchemaNotDefined)?;

        let mut tantivy_doc = TantivyDocument::new();
        for (name, value) in document.fields() {
            if let Some((_, field)) = open.fields.iter().find(|(field_name, _)| *field_name == name) {
                tantivy_doc.add_text(*field, value);
            }
        }

        open.writer
            .add_document(tantivy_doc)
            .map_err(|e| IngestError::IndexSubmit {
                doc_id: document.id().to_owned(),
                source: Box::new(e),
            })?;
        Ok(())
    }

    #[instrument(skip_all)]
    fn commit(&mut self) -> IngestResult<()> {
        let open = self.open.as_mut().ok_or(IngestError::SchemaNotDefined)?;

        open.writer.commit().map_err(|e| IngestError::IndexCommit {
            source: Box::new(e),
        })?;
        open.reader.reload().map_err(|e| IngestError::IndexCommit {
            source: Box::new(e),
        })?;

        let actual = usize::try_from(open.reader.searcher().num_docs()).unwrap_or(usize::MAX);
        self.committed_docs = actual;
        debug!(doc_count = actual, "tantivy commit completed");
        Ok(())
    }

    fn doc_count(&self) -> usize {
        self.committed_docs
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
