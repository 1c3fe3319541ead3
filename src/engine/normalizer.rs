//! # Text Normalizer
//!
//! Pulizia del nome grezzo di una cartella prima dell'estrazione dei campi.
//!
//! ## Responsabilità:
//! - Sostituzione caratteri tramite tabella (`@`, `~`, parentesi quadre/graffe)
//! - Uniformazione di trattini e apostrofi tipografici
//! - Collasso degli spazi e rimozione dei separatori finali
//!
//! La funzione è totale: non fallisce mai, al peggio restituisce una stringa ripulita.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Character substitutions applied before whitespace cleanup.
const CHAR_RULES: &[(char, &str)] = &[
    ('@', " "),
    ('~', " "),
    ('[', "("),
    (']', ")"),
    ('{', "("),
    ('}', ")"),
    ('\u{2010}', "-"),
    ('\u{2011}', "-"),
    ('\u{2012}', "-"),
    ('\u{2013}', "-"), // en dash
    ('\u{2014}', "-"), // em dash
    ('\u{2212}', "-"), // minus sign
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{02BC}', "'"),
    ('\u{00B4}', "'"),
    ('`', "'"),
];

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static OPEN_PAREN_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s+").unwrap());
static CLOSE_PAREN_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+\)").unwrap());
static TRAILING_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s.\-]+$").unwrap());

/// Folder name after character and whitespace cleanup.
///
/// Never contains double spaces, `@`, `~`, square or curly brackets, typographic
/// dashes or apostrophes, and never ends with a separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedName(String);

impl NormalizedName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for NormalizedName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a raw folder name
pub fn normalize(raw: &str) -> NormalizedName {
    let mut text = String::with_capacity(raw.len());
    for c in raw.chars() {
        match CHAR_RULES.iter().find(|(from, _)| *from == c) {
            Some((_, to)) => text.push_str(to),
            None => text.push(c),
        }
    }

    let text = WHITESPACE.replace_all(&text, " ");
    let text = OPEN_PAREN_SPACE.replace_all(&text, "(");
    let text = CLOSE_PAREN_SPACE.replace_all(&text, ")");
    let text = TRAILING_SEPARATORS.replace(text.trim(), "");

    NormalizedName(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brackets_become_parentheses() {
        assert_eq!(normalize("Album [1999]").as_str(), "Album (1999)");
        assert_eq!(normalize("Album {Live}").as_str(), "Album (Live)");
    }

    #[test]
    fn test_disallowed_characters_removed() {
        assert_eq!(normalize("Live @ Wembley").as_str(), "Live Wembley");
        assert_eq!(normalize("~Odds~ and Ends").as_str(), "Odds and Ends");
    }

    #[test]
    fn test_whitespace_collapsed_and_trimmed() {
        assert_eq!(normalize("  A   Night\tat the  Opera ").as_str(), "A Night at the Opera");
        assert_eq!(normalize("Album ( 1975 )").as_str(), "Album (1975)");
    }

    #[test]
    fn test_trailing_separators_removed() {
        assert_eq!(normalize("Album -").as_str(), "Album");
        assert_eq!(normalize("Album \u{2014} ").as_str(), "Album");
        assert_eq!(normalize("Album...").as_str(), "Album");
    }

    #[test]
    fn test_dash_and_apostrophe_variants() {
        assert_eq!(normalize("1992\u{2013}2012 - The Anthology").as_str(), "1992-2012 - The Anthology");
        assert_eq!(normalize("Queen\u{2019}s Greatest").as_str(), "Queen's Greatest");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize(" Greatest  Hits [Disc 1] \u{2013} ");
        let twice = normalize(once.as_str());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_garbage_input_still_cleaned() {
        assert_eq!(normalize("").as_str(), "");
        assert_eq!(normalize(" - . - ").as_str(), "");
        assert_eq!(normalize("@~").as_str(), "");
    }
}
