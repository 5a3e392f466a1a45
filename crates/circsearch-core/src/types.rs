//! Document and schema types shared by the pipeline and the index backends.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Field names of a catalog document.
pub mod fields {
    /// Number of circulating copies.
    pub const COPIES: &str = "copies";
    /// Catalog URL of the record.
    pub const URL: &str = "url";
    /// Record identifier.
    pub const ID: &str = "id";
    /// Title text; the only analyzed source field.
    pub const TITLE: &str = "title";
    /// ISBN as it appears in the source.
    pub const ISBN: &str = "isbn";
    /// Space-joined double-metaphone codes of the title.
    pub const PHONETIC: &str = "phonetic";

    /// Fields read from each source record, in extraction order.
    pub const SOURCE: [&str; 5] = [COPIES, URL, ID, TITLE, ISBN];
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// How an index backend must treat a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    /// Stored verbatim, not searchable by content.
    Opaque,
    /// Tokenized, case-folded, stopword-filtered and stemmed, with positions
    /// kept so matches can be highlighted.
    FulltextAnalyzed,
    /// Split on whitespace only. No stemming or case folding.
    FulltextUnsegmented,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opaque => write!(f, "opaque"),
            Self::FulltextAnalyzed => write!(f, "fulltext-analyzed"),
            Self::FulltextUnsegmented => write!(f, "fulltext-unsegmented"),
        }
    }
}

/// One `(name, kind)` entry passed to `IndexSession::define_schema`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name as used in [`SubmittableDocument::fields`].
    pub name: &'static str,
    /// Storage and analysis behavior.
    pub kind: FieldKind,
}

impl FieldSpec {
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// The catalog schema: identifiers and bookkeeping fields are opaque, the
/// title is fully analyzed and the phonetic fingerprint is whitespace-split.
#[must_use]
pub const fn catalog_schema() -> [FieldSpec; 6] {
    [
        FieldSpec::new(fields::ID, FieldKind::Opaque),
        FieldSpec::new(fields::URL, FieldKind::Opaque),
        FieldSpec::new(fields::ISBN, FieldKind::Opaque),
        FieldSpec::new(fields::COPIES, FieldKind::Opaque),
        FieldSpec::new(fields::TITLE, FieldKind::FulltextAnalyzed),
        FieldSpec::new(fields::PHONETIC, FieldKind::FulltextUnsegmented),
    ]
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

/// Field values extracted from one source record.
///
/// Every value is a defined string; missing source values are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFields {
    pub copies: String,
    pub url: String,
    pub id: String,
    pub title: String,
    pub isbn: String,
}

/// A normalized document ready for submission to an index session.
///
/// Immutable once constructed; one instance per logical record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittableDocument {
    fields: CatalogFields,
    phonetic: String,
}

impl SubmittableDocument {
    /// Creates a document from extracted fields and the serialized phonetic
    /// fingerprint of its title.
    #[must_use]
    pub fn new(fields: CatalogFields, phonetic: impl Into<String>) -> Self {
        Self {
            fields,
            phonetic: phonetic.into(),
        }
    }

    #[must_use]
    pub fn copies(&self) -> &str {
        &self.fields.copies
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.fields.url
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.fields.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.fields.title
    }

    #[must_use]
    pub fn isbn(&self) -> &str {
        &self.fields.isbn
    }

    #[must_use]
    pub fn phonetic(&self) -> &str {
        &self.phonetic
    }

    /// All `(field name, value)` pairs, in schema order.
    #[must_use]
    pub fn fields(&self) -> [(&'static str, &str); 6] {
        [
            (fields::ID, self.id()),
            (fields::URL, self.url()),
            (fields::ISBN, self.isbn()),
            (fields::COPIES, self.copies()),
            (fields::TITLE, self.title()),
            (fields::PHONETIC, self.phonetic()),
        ]
    }

    /// Looks up a field value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields()
            .into_iter()
            .find_map(|(field, value)| (field == name).then_some(value))
    }
}
