//! # Pattern Extractor
//!
//! Estrae i campi strutturati da un nome già normalizzato.
//!
//! ## Stadi (in ordine):
//! 1. Anni: intervalli (`1980-1990`) e anni isolati nel range 1900-2099
//! 2. Casi limite: tabella keyword per categoria (remaster / deluxe), anthology dagli anni
//! 3. Disco: `cd1`, `cd 1`, `disc 2`, `(Disc 3)`, `d1`
//! 4. Residuo: rimozione di anni, marcatori disco e parentesi con keyword
//!
//! Il residuo non è ancora il titolo finale: il prefisso artista viene rimosso dal classificatore.

use super::normalizer::NormalizedName;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Edge-case categories that are skipped unless explicitly enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeCategory {
    Remaster,
    Deluxe,
    Anthology,
}

impl EdgeCategory {
    pub const ALL: [EdgeCategory; 3] = [Self::Remaster, Self::Deluxe, Self::Anthology];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remaster => "remaster",
            Self::Deluxe => "deluxe",
            Self::Anthology => "anthology",
        }
    }

    /// Parse a CLI edge option: short letters and the long spellings the tool has always accepted
    pub fn from_option(option: &str) -> Option<Self> {
        match option.trim().to_lowercase().as_str() {
            "r" | "remaster" => Some(Self::Remaster),
            "d" | "delux" | "deluxe" => Some(Self::Deluxe),
            "m" | "multiyears" | "anthology" => Some(Self::Anthology),
            _ => None,
        }
    }
}

impl fmt::Display for EdgeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set over the edge categories.
///
/// Used both for the flags detected on a folder and for the categories enabled in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeFlags {
    pub remaster: bool,
    pub deluxe: bool,
    pub anthology: bool,
}

impl EdgeFlags {
    pub fn all() -> Self {
        Self { remaster: true, deluxe: true, anthology: true }
    }

    pub fn insert(&mut self, category: EdgeCategory) {
        match category {
            EdgeCategory::Remaster => self.remaster = true,
            EdgeCategory::Deluxe => self.deluxe = true,
            EdgeCategory::Anthology => self.anthology = true,
        }
    }

    pub fn contains(&self, category: EdgeCategory) -> bool {
        match category {
            EdgeCategory::Remaster => self.remaster,
            EdgeCategory::Deluxe => self.deluxe,
            EdgeCategory::Anthology => self.anthology,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.remaster || self.deluxe || self.anthology)
    }

    pub fn iter(&self) -> impl Iterator<Item = EdgeCategory> + '_ {
        EdgeCategory::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl FromIterator<EdgeCategory> for EdgeFlags {
    fn from_iter<I: IntoIterator<Item = EdgeCategory>>(iter: I) -> Self {
        let mut flags = Self::default();
        for category in iter {
            flags.insert(category);
        }
        flags
    }
}

/// A tie-break the extractor had to apply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ambiguity {
    /// More than one disc marker with different numbers; the first one is kept
    ConflictingDiscs { kept: u32, ignored: u32 },
}

/// Structured data extracted from a normalized folder name
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedFields {
    /// Distinct years in order of detection (range bounds first)
    pub years: Vec<u16>,
    /// First parenthesized or bare `YYYY-YYYY` range, if any
    pub year_range: Option<(u16, u16)>,
    /// 1-based disc number
    pub disc: Option<u32>,
    pub edge_flags: EdgeFlags,
    /// Residual text with years, disc markers and edge parentheticals removed.
    /// The classifier replaces it with the artist-stripped title.
    pub title: String,
    pub ambiguities: Vec<Ambiguity>,
}

impl ParsedFields {
    /// Year selected for the target name.
    ///
    /// Anthologies have no year unless forced, in which case the earliest year wins.
    pub fn chosen_year(&self, force_anthology: bool) -> Option<u16> {
        if self.edge_flags.anthology {
            if force_anthology {
                self.years.iter().min().copied()
            } else {
                None
            }
        } else {
            self.years.first().copied()
        }
    }
}

/// Keyword patterns per edge category. Anthology is derived from years, not keywords.
const EDGE_KEYWORDS: &[(EdgeCategory, &[&str])] = &[
    (
        EdgeCategory::Remaster,
        &[r"re-?master(?:ed|s)?", r"re-?mastering"],
    ),
    (
        EdgeCategory::Deluxe,
        &[
            r"delux(?:e)?",
            r"expanded",
            r"anniversary\s+edition",
            r"\d+(?:st|nd|rd|th)\s+anniversary",
            r"collector'?s\s+edition",
            r"legacy\s+edition",
        ],
    ),
];

static EDGE_PATTERNS: Lazy<Vec<(EdgeCategory, Regex)>> = Lazy::new(|| {
    EDGE_KEYWORDS
        .iter()
        .flat_map(|(category, patterns)| {
            patterns.iter().map(move |pattern| {
                (*category, Regex::new(&format!(r"(?i)\b(?:{})\b", pattern)).unwrap())
            })
        })
        .collect()
});

static YEAR_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b((?:19|20)\d{2})\s*-\s*((?:19|20)\d{2})\b").unwrap());
static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());
static DISC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\((?:cd|dis[ck])[\s._-]?(\d{1,2})\)|\b(?:cd|dis[ck])[\s._-]?(\d{1,2})\b|\bd([1-9])\b",
    )
    .unwrap()
});
static PAREN_GROUP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^()]*\)").unwrap());
static EMPTY_PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(\s*\)").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static REPEATED_DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:\s*-\s*){2,}").unwrap());
static LEADING_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\s\-:,._]+").unwrap());
static TRAILING_SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\-:,._]+$").unwrap());

/// Extract years, disc number, edge flags and residual title from a normalized name
pub fn extract(text: &NormalizedName) -> ParsedFields {
    let text = text.as_str();
    let separated = separate_words(text);

    let (years, year_range) = detect_years(&separated);

    let mut edge_flags = detect_edges(&separated);
    if year_range.is_some() || years.len() > 1 {
        edge_flags.insert(EdgeCategory::Anthology);
    }

    let (disc, ambiguities) = detect_disc(&separated);

    ParsedFields {
        years,
        year_range,
        disc,
        edge_flags,
        title: residual(text),
        ambiguities,
    }
}

/// `_` stands in for `:` in folder names, so it separates words for the patterns.
/// Same byte length, so match offsets stay valid on the original text.
fn separate_words(text: &str) -> String {
    text.replace('_', " ")
}

/// Cut from `text` every match of `pattern` (found on the word-separated text) that `remove` accepts
fn strip_matches<F>(text: &str, pattern: &Regex, remove: F) -> String
where
    F: Fn(&Captures) -> bool,
{
    let separated = separate_words(text);
    let mut kept = String::with_capacity(text.len());
    let mut last = 0;

    for caps in pattern.captures_iter(&separated) {
        let Some(m) = caps.get(0) else {
            continue;
        };
        if remove(&caps) {
            kept.push_str(&text[last..m.start()]);
            last = m.end();
        }
    }
    kept.push_str(&text[last..]);
    kept
}

fn parse_year(digits: &str) -> Option<u16> {
    digits.parse().ok()
}

fn push_unique(years: &mut Vec<u16>, year: u16) {
    if !years.contains(&year) {
        years.push(year);
    }
}

/// A range only counts when it goes forward in time
fn as_range(caps: &Captures) -> Option<(u16, u16)> {
    let start = parse_year(&caps[1])?;
    let end = parse_year(&caps[2])?;
    (start < end).then_some((start, end))
}

fn detect_years(text: &str) -> (Vec<u16>, Option<(u16, u16)>) {
    let mut years = Vec::new();
    let mut year_range = None;
    let mut masked = text.to_string();

    for caps in YEAR_RANGE.captures_iter(text) {
        let Some((start, end)) = as_range(&caps) else {
            continue;
        };
        year_range.get_or_insert((start, end));
        push_unique(&mut years, start);
        push_unique(&mut years, end);

        let span = caps.get(0).map(|m| m.range()).unwrap_or_default();
        let blank = " ".repeat(span.len());
        masked.replace_range(span, &blank);
    }

    for m in YEAR.find_iter(&masked) {
        if let Some(year) = parse_year(m.as_str()) {
            push_unique(&mut years, year);
        }
    }

    (years, year_range)
}

fn detect_edges(text: &str) -> EdgeFlags {
    EDGE_PATTERNS
        .iter()
        .filter(|(_, pattern)| pattern.is_match(text))
        .map(|(category, _)| *category)
        .collect()
}

fn disc_number(caps: &Captures) -> Option<u32> {
    (1..=3)
        .find_map(|i| caps.get(i))
        .and_then(|m| m.as_str().parse().ok())
        .filter(|n| *n > 0)
}

fn detect_disc(text: &str) -> (Option<u32>, Vec<Ambiguity>) {
    let mut disc = None;
    let mut ambiguities = Vec::new();

    for caps in DISC.captures_iter(text) {
        let Some(number) = disc_number(&caps) else {
            continue;
        };
        match disc {
            None => disc = Some(number),
            Some(kept) if kept != number => {
                ambiguities.push(Ambiguity::ConflictingDiscs { kept, ignored: number });
            }
            Some(_) => {}
        }
    }

    (disc, ambiguities)
}

fn residual(text: &str) -> String {
    let text = PAREN_GROUP.replace_all(text, |caps: &Captures| {
        let group = separate_words(&caps[0]);
        if EDGE_PATTERNS.iter().any(|(_, pattern)| pattern.is_match(&group)) {
            String::new()
        } else {
            caps[0].to_string()
        }
    });
    let text = strip_matches(&text, &YEAR_RANGE, |caps| as_range(caps).is_some());
    let text = strip_matches(&text, &YEAR, |_| true);
    let text = strip_matches(&text, &DISC, |_| true);

    tidy_title(&text)
}

/// Drop parentheses with no partner, keeping their content
fn balance_parentheses(text: &str) -> String {
    let mut chars: Vec<Option<char>> = Vec::with_capacity(text.len());
    let mut open = Vec::new();

    for c in text.chars() {
        match c {
            '(' => {
                open.push(chars.len());
                chars.push(Some(c));
            }
            ')' => {
                if open.pop().is_some() {
                    chars.push(Some(c));
                }
            }
            _ => chars.push(Some(c)),
        }
    }
    for index in open {
        chars[index] = None;
    }

    chars.into_iter().flatten().collect()
}

/// Remove leftover separators, empty or unbalanced parentheses and extra spaces
pub fn tidy_title(text: &str) -> String {
    let mut text = text.to_string();
    while EMPTY_PARENS.is_match(&text) {
        text = EMPTY_PARENS.replace_all(&text, " ").into_owned();
    }

    let text = balance_parentheses(&text);
    let text = WHITESPACE.replace_all(&text, " ");
    let text = REPEATED_DASHES.replace_all(&text, " - ");
    let text = LEADING_SEPARATORS.replace(&text, "");
    let text = TRAILING_SEPARATORS.replace(&text, "");

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::normalizer::normalize;

    fn parse(raw: &str) -> ParsedFields {
        extract(&normalize(raw))
    }

    #[test]
    fn test_single_year_in_parentheses() {
        let fields = parse("A Night at the Opera (1975)");
        assert_eq!(fields.years, vec![1975]);
        assert_eq!(fields.chosen_year(false), Some(1975));
        assert!(fields.edge_flags.is_empty());
        assert_eq!(fields.title, "A Night at the Opera");
    }

    #[test]
    fn test_year_must_be_standalone_and_plausible() {
        assert!(parse("12000 Days").years.is_empty());
        assert!(parse("Track 19999").years.is_empty());
        assert!(parse("1812 Overture").years.is_empty());
        assert!(parse("Area51 2199").years.is_empty());
    }

    #[test]
    fn test_year_range_is_anthology() {
        let fields = parse("Greatest Hits (1980-1990)");
        assert_eq!(fields.years, vec![1980, 1990]);
        assert_eq!(fields.year_range, Some((1980, 1990)));
        assert!(fields.edge_flags.anthology);
        assert_eq!(fields.chosen_year(false), None);
        assert_eq!(fields.chosen_year(true), Some(1980));
        assert_eq!(fields.title, "Greatest Hits");
    }

    #[test]
    fn test_en_dash_range_after_normalization() {
        let fields = parse("1992\u{2013}2012 - The Anthology");
        assert_eq!(fields.year_range, Some((1992, 2012)));
        assert_eq!(fields.title, "The Anthology");
    }

    #[test]
    fn test_multiple_standalone_years_are_anthology() {
        let fields = parse("The Best Of 1990 1980 & B Sides");
        assert_eq!(fields.years, vec![1990, 1980]);
        assert!(fields.edge_flags.anthology);
        assert_eq!(fields.chosen_year(true), Some(1980));
    }

    #[test]
    fn test_repeated_year_is_not_anthology() {
        let fields = parse("1984 (1984)");
        assert_eq!(fields.years, vec![1984]);
        assert!(!fields.edge_flags.anthology);
    }

    #[test]
    fn test_remaster_keywords() {
        assert!(parse("Greatest Hits (2011 Remaster)").edge_flags.remaster);
        assert!(parse("Abbey Road (Remastered)").edge_flags.remaster);
        assert!(parse("Physical Graffiti - Re-Mastered").edge_flags.remaster);
        assert!(!parse("Mastered by Bob").edge_flags.remaster);
        assert!(!parse("Unremastered Tapes").edge_flags.remaster);
    }

    #[test]
    fn test_deluxe_keywords() {
        assert!(parse("Rumours (Deluxe Edition)").edge_flags.deluxe);
        assert!(parse("Nevermind [20th Anniversary Edition]").edge_flags.deluxe);
        assert!(parse("Hybrid Theory (Expanded)").edge_flags.deluxe);
        assert!(!parse("Delusions of Grandeur").edge_flags.deluxe);
    }

    #[test]
    fn test_bare_anniversary_is_not_deluxe() {
        assert!(!parse("Anniversary (1999)").edge_flags.deluxe);
        assert!(!parse("Happy Anniversary").edge_flags.deluxe);
        assert!(parse("OK Computer (20th Anniversary)").edge_flags.deluxe);
        assert!(parse("Ten - Anniversary Edition").edge_flags.deluxe);
    }

    #[test]
    fn test_underscore_separates_words() {
        let fields = parse("Jazz_1978");
        assert_eq!(fields.years, vec![1978]);
        assert_eq!(fields.title, "Jazz");

        let fields = parse("In Time_ The Best Of_1988-2003");
        assert_eq!(fields.year_range, Some((1988, 2003)));
        assert_eq!(fields.title, "In Time_ The Best Of");

        assert_eq!(parse("Live_cd2").disc, Some(2));
        assert!(parse("Hits_Remastered").edge_flags.remaster);
    }

    #[test]
    fn test_disc_markers() {
        assert_eq!(parse("Album cd1").disc, Some(1));
        assert_eq!(parse("Album CD 2").disc, Some(2));
        assert_eq!(parse("Album disc3").disc, Some(3));
        assert_eq!(parse("Album Disk-4").disc, Some(4));
        assert_eq!(parse("Album d5").disc, Some(5));
        assert_eq!(parse("Album [CD 6]").disc, Some(6));
        assert_eq!(parse("Album (Disc 7)").disc, Some(7));
        assert_eq!(parse("AC DC Live").disc, None);
        assert_eq!(parse("D12 World").disc, None);
        assert_eq!(parse("Album cd0").disc, None);
    }

    #[test]
    fn test_conflicting_discs_first_wins() {
        let fields = parse("Album cd1 disc2");
        assert_eq!(fields.disc, Some(1));
        assert_eq!(
            fields.ambiguities,
            vec![Ambiguity::ConflictingDiscs { kept: 1, ignored: 2 }]
        );
        assert_eq!(fields.title, "Album");
    }

    #[test]
    fn test_residual_drops_year_disc_and_edge_groups() {
        assert_eq!(parse("Band Name Something (2011) cd1").title, "Band Name Something");
        assert_eq!(parse("Greatest Hits (2011 Remaster)").title, "Greatest Hits");
        assert_eq!(parse("1975 - A Night at the Opera").title, "A Night at the Opera");
        assert_eq!(parse("Live (Disc 2) (1999)").title, "Live");
    }

    #[test]
    fn test_tidy_title() {
        assert_eq!(tidy_title("Artist -  - Album"), "Artist - Album");
        assert_eq!(tidy_title("(Live at Leeds"), "Live at Leeds");
        assert_eq!(tidy_title(" - Something () "), "Something");
        assert_eq!(tidy_title("Title (( ))"), "Title");
        assert_eq!(tidy_title("Keep (This)"), "Keep (This)");
    }

    #[test]
    fn test_edge_option_parsing() {
        assert_eq!(EdgeCategory::from_option("r"), Some(EdgeCategory::Remaster));
        assert_eq!(EdgeCategory::from_option(" Delux "), Some(EdgeCategory::Deluxe));
        assert_eq!(EdgeCategory::from_option("multiyears"), Some(EdgeCategory::Anthology));
        assert_eq!(EdgeCategory::from_option("x"), None);
    }
}
