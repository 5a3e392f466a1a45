//! Stopword resources.
//!
//! One list per supported language, compiled into the binary. The same list
//! feeds both the title normalizer in the ingestion pipeline and the
//! analyzed-field tokenizer of the Tantivy backend.

use std::collections::HashSet;

use crate::error::{IngestError, IngestResult};

const ENGLISH: &str = include_str!("../resources/stopwords_en.txt");

/// Language codes with a bundled stopword list.
pub const SUPPORTED_LANGUAGES: &[&str] = &["en"];

/// Read-only set of stopwords for one language.
///
/// Each listed word is loaded in lowercase, Capitalized and UPPERCASE form,
/// so membership is an exact string comparison that still catches
/// title-cased words at the start of a title.
#[derive(Debug, Clone)]
pub struct StopwordSet {
    language: &'static str,
    base: Vec<&'static str>,
    words: HashSet<String>,
}

impl StopwordSet {
    /// Load the set for a language code.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::InvalidConfig` when no list is bundled for `language`.
    pub fn for_language(language: &str) -> IngestResult<Self> {
        match language {
            "en" => Ok(Self::english()),
            other => Err(IngestError::InvalidConfig {
                field: "language".to_owned(),
                value: other.to_owned(),
                reason: format!("no stopword list; supported: {}", SUPPORTED_LANGUAGES.join(", ")),
            }),
        }
    }

    /// The bundled English list.
    #[must_use]
    pub fn english() -> Self {
        Self::from_list("en", ENGLISH)
    }

    fn from_list(language: &'static str, list: &'static str) -> Self {
        let base: Vec<&'static str> = list
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();

        let mut words = HashSet::with_capacity(base.len() * 3);
        for word in &base {
            words.insert((*word).to_owned());
            words.insert(capitalize(word));
            words.insert(word.to_uppercase());
        }

        Self {
            language,
            base,
            words,
        }
    }

    /// Exact membership test.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    /// Language code this set was loaded for.
    #[must_use]
    pub const fn language(&self) -> &'static str {
        self.language
    }

    /// The list as shipped, lowercase, without the case variants.
    pub fn base_words(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.base.iter().copied()
    }

    /// Number of distinct entries, case variants included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
