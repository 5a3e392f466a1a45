//! Title normalization: whitespace tokenization, stopword removal and
//! stem expansion.

use std::fmt;

use circsearch_core::error::{IngestError, IngestResult};
use circsearch_core::stopwords::StopwordSet;
use rust_stemmers::{Algorithm, Stemmer};

/// Turns a title into the token list fed to the phonetic fingerprinter.
///
/// The output holds the surviving surface tokens in order, followed by the
/// stem of each survivor in the same order. Duplicates are kept.
pub struct TextNormalizer {
    stopwords: StopwordSet,
    stemmer: Stemmer,
}

impl fmt::Debug for TextNormalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextNormalizer")
            .field("language", &self.stopwords.language())
            .finish_non_exhaustive()
    }
}

impl TextNormalizer {
    /// Normalizer for a language code.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::StemmerInit` if no stemmer exists for
    /// `language`, and `IngestError::InvalidConfig` if no stopword list is
    /// bundled for it.
    pub fn new(language: &str) -> IngestResult<Self> {
        let algorithm = stemmer_algorithm(language).ok_or_else(|| IngestError::StemmerInit {
            language: language.to_owned(),
            reason: "no snowball stemmer for this language".to_owned(),
        })?;
        let stopwords = StopwordSet::for_language(language)?;
        Ok(Self {
            stopwords,
            stemmer: Stemmer::create(algorithm),
        })
    }

    #[must_use]
    pub fn english() -> Self {
        Self {
            stopwords: StopwordSet::english(),
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    #[must_use]
    pub const fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }

    #[must_use]
    pub const fn language(&self) -> &'static str {
        self.stopwords.language()
    }

    /// Whitespace tokens of `text` that are not stopwords, in order.
    pub fn content_tokens<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        text.split_whitespace()
            .filter(|token| !self.stopwords.contains(token))
    }

    /// Stem of a single token.
    #[must_use]
    pub fn stem(&self, token: &str) -> String {
        self.stemmer.stem(token).into_owned()
    }

    /// Surface tokens followed by their stems.
    #[must_use]
    pub fn normalize(&self, title: &str) -> Vec<String> {
        let surviving: Vec<&str> = self.content_tokens(title).collect();
        let mut tokens = Vec::with_capacity(surviving.len() * 2);
        tokens.extend(surviving.iter().map(|token| (*token).to_owned()));
        tokens.extend(surviving.iter().map(|token| self.stem(token)));
        tokens
    }
}

fn stemmer_algorithm(language: &str) -> Option<Algorithm> {
    let algorithm = match language {
        "ar" => Algorithm::Arabic,
        "da" => Algorithm::Danish,
        "de" => Algorithm::German,
        "el" => Algorithm::Greek,
        "en" => Algorithm::English,
        "es" => Algorithm::Spanish,
        "fi" => Algorithm::Finnish,
        "fr" => Algorithm::French,
        "hu" => Algorithm::Hungarian,
        "it" => Algorithm::Italian,
        "nl" => Algorithm::Dutch,
        "no" => Algorithm::Norwegian,
        "pt" => Algorithm::Portuguese,
        "ro" => Algorithm::Romanian,
        "ru" => Algorithm::Russian,
        "sv" => Algorithm::Swedish,
        "ta" => Algorithm::Tamil,
        "tr" => Algorithm::Turkish,
        _ => return None,
    };
    Some(algorithm)
}
