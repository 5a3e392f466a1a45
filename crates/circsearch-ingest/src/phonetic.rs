//! Phonetic fingerprint of a normalized title.
//!
//! Every token contributes its double-metaphone primary and alternate code.
//! Codes are collected with their occurrence count; the serialized
//! fingerprint is the distinct codes, sorted, joined by single spaces. The
//! ordering makes the field deterministic across runs.

use std::collections::BTreeMap;
use std::fmt;

use rphonetic::{DoubleMetaphone, Encoder};

/// Double-metaphone fingerprinting of token lists.
pub struct PhoneticFingerprinter {
    encoder: DoubleMetaphone,
}

impl fmt::Debug for PhoneticFingerprinter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhoneticFingerprinter").finish_non_exhaustive()
    }
}

impl Default for PhoneticFingerprinter {
    fn default() -> Self {
        Self::new()
    }
}

impl PhoneticFingerprinter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            encoder: DoubleMetaphone::default(),
        }
    }

    /// `(primary, alternate)` codes of one token. Either may be empty.
    #[must_use]
    pub fn encode_token(&self, token: &str) -> (String, String) {
        (
            self.encoder.encode(token),
            self.encoder.encode_alternate(token),
        )
    }

    /// Non-empty codes of all tokens with their occurrence count.
    #[must_use]
    pub fn code_counts<S: AsRef<str>>(&self, tokens: &[S]) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for token in tokens {
            let (primary, alternate) = self.encode_token(token.as_ref());
            for code in [primary, alternate] {
                if !code.is_empty() {
                    *counts.entry(code).or_insert(0) += 1;
                }
            }
        }
        counts
    }

    /// Distinct codes, sorted, space-joined. Empty for an empty token list.
    #[must_use]
    pub fn fingerprint<S: AsRef<str>>(&self, tokens: &[S]) -> String {
        self.code_counts(tokens)
            .into_keys()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn expected_codes(tokens: &[&str]) -> BTreeSet<String> {
        let encoder = DoubleMetaphone::default();
        tokens
            .iter()
            .flat_map(|t| [encoder.encode(t), encoder.encode_alternate(t)])
            .filter(|code| !code.is_empty())
            .collect()
    }

    #[test]
    fn empty_tokens_give_empty_fingerprint() {
        let fp = PhoneticFingerprinter::new();
        let tokens: [&str; 0] = [];
        assert_eq!(fp.fingerprint(&tokens), "");
        assert!(fp.code_counts(&tokens).is_empty());
    }

    #[test]
    fn fingerprint_is_sorted_distinct_codes() {
        let fp = PhoneticFingerprinter::new();
        let tokens = ["Great", "Gatsby", "great", "gatsbi"];
        let fingerprint = fp.fingerprint(&tokens);
        let codes: Vec<&str> = fingerprint.split(' ').collect();

        let mut sorted = codes.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(codes, sorted);

        let expected: Vec<String> = expected_codes(&tokens).into_iter().collect();
        assert_eq!(codes, expected);
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let fp = PhoneticFingerprinter::new();
        let tokens = vec!["Smith".to_owned(), "Schmidt".to_owned()];
        assert_eq!(fp.fingerprint(&tokens), fp.fingerprint(&tokens));
    }

    #[test]
    fn repeated_tokens_raise_counts() {
        let fp = PhoneticFingerprinter::new();
        let (primary, _) = fp.encode_token("Gatsby");
        let counts = fp.code_counts(&["Gatsby", "Gatsby"]);
        assert!(counts[&primary] >= 2);
    }

    #[test]
    fn tokens_without_letters_contribute_nothing() {
        let fp = PhoneticFingerprinter::new();
        assert_eq!(fp.fingerprint(&["123", "--"]), "");
    }

    #[test]
    fn no_separator_at_ends() {
        let fp = PhoneticFingerprinter::new();
        let fingerprint = fp.fingerprint(&["Great", "Gatsby"]);
        assert!(!fingerprint.is_empty());
        assert!(!fingerprint.starts_with(' '));
        assert!(!fingerprint.ends_with(' '));
        assert!(!fingerprint.contains("  "));
    }
}
