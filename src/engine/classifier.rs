//! # Classification & Rename Engine
//!
//! Decide, per singola cartella, se saltarla, rinominarla o chiedere l'anno
//! al servizio di metadata esterno.
//!
//! ## Pipeline:
//! 1. Normalizzazione del nome grezzo
//! 2. Estrazione campi + rimozione prefisso artista dal residuo
//! 3. Nome già canonico → `Skip(already-formatted)`
//! 4. Caso limite non abilitato → `Skip(edge-case:<categoria>)`
//! 5. Anno disponibile → `Rename("YYYY - Titolo[ (Disc n)]")` oppure `Skip(unchanged)`
//! 6. Nessun anno, lookup configurato → `NeedsLookup(query)`
//! 7. Nessun anno → `Skip(no-year-found)`
//!
//! Funzione pura: nessun accesso al filesystem, nessuno stato condiviso tra cartelle.

use super::artist::strip_artist_prefix;
use super::extractor::{extract, tidy_title, Ambiguity, EdgeCategory, EdgeFlags, ParsedFields};
use super::normalizer::{normalize, NormalizedName};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use tracing::debug;

static CANONICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4} - \S").unwrap());

/// A candidate folder as handed over by the traversal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawName {
    pub name: String,
    pub artist: Option<String>,
    /// Depth relative to the run root
    pub level: i32,
}

impl RawName {
    pub fn new(name: impl Into<String>, artist: Option<&str>, level: i32) -> Self {
        Self {
            name: name.into(),
            artist: artist.map(str::to_string),
            level,
        }
    }
}

/// Engine configuration, derived once from [`crate::Config`]
#[derive(Debug, Clone, Default)]
pub struct ClassifyOptions {
    /// Edge categories that are processed instead of skipped
    pub enabled_edges: EdgeFlags,
    /// Whether a year lookup collaborator is available
    pub lookup_enabled: bool,
    /// Case-insensitive name fragments that are always skipped
    pub skip_names: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyFormatted,
    EdgeCase(EdgeCategory),
    Listed,
    Unchanged,
    EmptyTitle,
    NoYearFound,
    NotFound,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyFormatted => f.write_str("already-formatted"),
            Self::EdgeCase(category) => write!(f, "edge-case:{}", category),
            Self::Listed => f.write_str("listed"),
            Self::Unchanged => f.write_str("unchanged"),
            Self::EmptyTitle => f.write_str("empty-title"),
            Self::NoYearFound => f.write_str("no-year-found"),
            Self::NotFound => f.write_str("not-found"),
        }
    }
}

/// Artist and title to resolve through the metadata lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupQuery {
    pub artist: Option<String>,
    pub title: String,
}

impl fmt::Display for LookupQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.artist {
            Some(artist) => write!(f, "{} {}", artist, self.title),
            None => f.write_str(&self.title),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Skip(SkipReason),
    Rename(String),
    NeedsLookup(LookupQuery),
}

/// Run normalization, extraction and artist stripping for one folder
pub fn parse(raw: &RawName) -> (NormalizedName, ParsedFields) {
    let normalized = normalize(&raw.name);
    let mut fields = extract(&normalized);
    fields.title = tidy_title(&strip_artist_prefix(&fields.title, raw.artist.as_deref()));

    for ambiguity in &fields.ambiguities {
        match ambiguity {
            Ambiguity::ConflictingDiscs { kept, ignored } => {
                debug!("'{}': conflicting disc markers, keeping {} over {}", raw.name, kept, ignored);
            }
        }
    }

    (normalized, fields)
}

/// Classify a folder from its name alone
pub fn classify(raw: &RawName, options: &ClassifyOptions) -> Decision {
    decide(raw, options, None)
}

/// Classify again with a year obtained from the metadata lookup
pub fn classify_with_year(raw: &RawName, options: &ClassifyOptions, year: u16) -> Decision {
    decide(raw, options, Some(year))
}

/// Classify, resolving `NeedsLookup` synchronously through `lookup`
pub fn classify_with_lookup<F>(raw: &RawName, options: &ClassifyOptions, lookup: F) -> Decision
where
    F: FnOnce(&LookupQuery) -> Option<u16>,
{
    match classify(raw, options) {
        Decision::NeedsLookup(query) => match lookup(&query) {
            Some(year) => classify_with_year(raw, options, year),
            None => Decision::Skip(SkipReason::NotFound),
        },
        decision => decision,
    }
}

fn is_listed(name: &NormalizedName, skip_names: &[String]) -> bool {
    let name = name.as_str().to_lowercase();
    skip_names
        .iter()
        .map(|pattern| pattern.trim().to_lowercase())
        .any(|pattern| !pattern.is_empty() && name.contains(&pattern))
}

fn disc_suffix(disc: u32) -> String {
    format!(" (Disc {})", disc)
}

/// `YYYY - Title` with at most one disc marker, already in its final `(Disc n)` spelling
fn is_canonical(name: &NormalizedName, fields: &ParsedFields) -> bool {
    if !CANONICAL.is_match(name.as_str()) {
        return false;
    }
    match fields.disc {
        None => true,
        Some(disc) => fields.ambiguities.is_empty() && name.as_str().ends_with(&disc_suffix(disc)),
    }
}

fn target_name(year: u16, fields: &ParsedFields) -> Option<String> {
    if fields.title.is_empty() {
        return None;
    }
    let mut target = format!("{:04} - {}", year, fields.title);
    if let Some(disc) = fields.disc {
        target.push_str(&disc_suffix(disc));
    }
    Some(target)
}

fn decide(raw: &RawName, options: &ClassifyOptions, resolved_year: Option<u16>) -> Decision {
    let (normalized, fields) = parse(raw);
    debug!(
        "'{}' (level {}): years {:?}, disc {:?}, title '{}'",
        raw.name, raw.level, fields.years, fields.disc, fields.title
    );

    if is_listed(&normalized, &options.skip_names) {
        return Decision::Skip(SkipReason::Listed);
    }

    if fields.edge_flags.is_empty() && is_canonical(&normalized, &fields) {
        return if normalized.as_str() == raw.name {
            Decision::Skip(SkipReason::AlreadyFormatted)
        } else {
            Decision::Rename(normalized.into_string())
        };
    }

    if let Some(category) = fields
        .edge_flags
        .iter()
        .find(|category| !options.enabled_edges.contains(*category))
    {
        return Decision::Skip(SkipReason::EdgeCase(category));
    }

    let year = fields
        .chosen_year(options.enabled_edges.anthology)
        .or(resolved_year);

    match year {
        Some(year) => match target_name(year, &fields) {
            Some(target) if target == raw.name => Decision::Skip(SkipReason::Unchanged),
            Some(target) => Decision::Rename(target),
            None => Decision::Skip(SkipReason::EmptyTitle),
        },
        None if options.lookup_enabled && !fields.title.is_empty() => {
            Decision::NeedsLookup(LookupQuery {
                artist: raw.artist.clone(),
                title: fields.title,
            })
        }
        None => Decision::Skip(SkipReason::NoYearFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> ClassifyOptions {
        ClassifyOptions::default()
    }

    fn with_edges(edges: &[EdgeCategory]) -> ClassifyOptions {
        ClassifyOptions {
            enabled_edges: edges.iter().copied().collect(),
            ..Default::default()
        }
    }

    fn album(name: &str, artist: &str) -> RawName {
        RawName::new(name, Some(artist), 2)
    }

    #[test]
    fn test_remaster_skipped_by_default() {
        let decision = classify(&album("Queen Greatest Hits (2011 Remaster)", "Queen"), &options());
        assert_eq!(decision, Decision::Skip(SkipReason::EdgeCase(EdgeCategory::Remaster)));
        assert_eq!(SkipReason::EdgeCase(EdgeCategory::Remaster).to_string(), "edge-case:remaster");
    }

    #[test]
    fn test_remaster_processed_when_enabled() {
        let decision = classify(
            &album("Queen Greatest Hits (2011 Remaster)", "Queen"),
            &with_edges(&[EdgeCategory::Remaster]),
        );
        assert_eq!(decision, Decision::Rename("2011 - Greatest Hits".to_string()));
    }

    #[test]
    fn test_year_moved_to_front() {
        let decision = classify(&album("A Night at the Opera (1975)", "Queen"), &options());
        assert_eq!(decision, Decision::Rename("1975 - A Night at the Opera".to_string()));
    }

    #[test]
    fn test_artist_prefix_and_disc() {
        let decision = classify(&album("Band Name Something (2011) cd1", "Band Name"), &options());
        assert_eq!(decision, Decision::Rename("2011 - Something (Disc 1)".to_string()));
    }

    #[test]
    fn test_anthology_range() {
        let raw = album("Greatest Hits (1980-1990)", "Queen");
        assert_eq!(
            classify(&raw, &options()),
            Decision::Skip(SkipReason::EdgeCase(EdgeCategory::Anthology))
        );
        assert_eq!(
            classify(&raw, &with_edges(&[EdgeCategory::Anthology])),
            Decision::Rename("1980 - Greatest Hits".to_string())
        );
    }

    #[test]
    fn test_multiple_edge_categories_need_all_enabled() {
        let raw = album("Greatest Hits (1980-1990) (Remastered)", "Queen");
        assert_eq!(
            classify(&raw, &with_edges(&[EdgeCategory::Anthology])),
            Decision::Skip(SkipReason::EdgeCase(EdgeCategory::Remaster))
        );
        assert_eq!(
            classify(&raw, &with_edges(&[EdgeCategory::Anthology, EdgeCategory::Remaster])),
            Decision::Rename("1980 - Greatest Hits".to_string())
        );
    }

    #[test]
    fn test_no_year_without_lookup() {
        let decision = classify(&album("Jazz", "Queen"), &options());
        assert_eq!(decision, Decision::Skip(SkipReason::NoYearFound));
    }

    #[test]
    fn test_no_year_with_lookup() {
        let lookup = ClassifyOptions { lookup_enabled: true, ..Default::default() };
        let raw = album("Queen - News of the World", "Queen");
        let expected = LookupQuery {
            artist: Some("Queen".to_string()),
            title: "News of the World".to_string(),
        };
        assert_eq!(classify(&raw, &lookup), Decision::NeedsLookup(expected.clone()));
        assert_eq!(expected.to_string(), "Queen News of the World");

        assert_eq!(
            classify_with_lookup(&raw, &lookup, |_| Some(1977)),
            Decision::Rename("1977 - News of the World".to_string())
        );
        assert_eq!(
            classify_with_lookup(&raw, &lookup, |_| None),
            Decision::Skip(SkipReason::NotFound)
        );
    }

    #[test]
    fn test_already_formatted() {
        for name in [
            "1975 - A Night at the Opera",
            "2011 - Something (Disc 1)",
            "1977 - Queen's News",
            "1999 - Live at Wembley",
        ] {
            assert_eq!(
                classify(&album(name, "Queen"), &options()),
                Decision::Skip(SkipReason::AlreadyFormatted),
                "{}",
                name
            );
        }
    }

    #[test]
    fn test_canonical_but_dirty_name_is_cleaned() {
        let decision = classify(&album("1975 - A Night  at the Opera ", "Queen"), &options());
        assert_eq!(decision, Decision::Rename("1975 - A Night at the Opera".to_string()));
    }

    #[test]
    fn test_canonical_with_raw_disc_marker_is_reprocessed() {
        let decision = classify(&album("1999 - Live cd2", "Queen"), &options());
        assert_eq!(decision, Decision::Rename("1999 - Live (Disc 2)".to_string()));
    }

    #[test]
    fn test_forced_edge_keyword_outside_parentheses_is_unchanged() {
        let raw = album("2000 - Deluxe Hits", "Queen");
        assert_eq!(
            classify(&raw, &with_edges(&[EdgeCategory::Deluxe])),
            Decision::Skip(SkipReason::Unchanged)
        );
    }

    #[test]
    fn test_year_only_folder_has_empty_title() {
        let decision = classify(&album("(1984)", "Van Halen"), &options());
        assert_eq!(decision, Decision::Skip(SkipReason::EmptyTitle));
    }

    #[test]
    fn test_artist_words_must_line_up() {
        let decision = classify(&album("Que En Vivo (1999)", "Queen"), &options());
        assert_eq!(decision, Decision::Rename("1999 - Que En Vivo".to_string()));
    }

    #[test]
    fn test_underscore_before_year() {
        let decision = classify(&album("Jazz_1978", "Queen"), &options());
        assert_eq!(decision, Decision::Rename("1978 - Jazz".to_string()));
    }

    #[test]
    fn test_bare_anniversary_is_a_title_word() {
        let decision = classify(&album("Anniversary (1999)", "Queen"), &options());
        assert_eq!(decision, Decision::Rename("1999 - Anniversary".to_string()));
    }

    #[test]
    fn test_self_titled_album() {
        let decision = classify(&album("Queen (1973)", "Queen"), &options());
        assert_eq!(decision, Decision::Rename("1973 - Queen".to_string()));
    }

    #[test]
    fn test_listed_names_are_skipped() {
        let options = ClassifyOptions {
            skip_names: vec!["in time_ the best of".to_string()],
            ..Default::default()
        };
        let decision = classify(&album("In Time_ The Best Of R.E.M. (2003)", "R.E.M."), &options);
        assert_eq!(decision, Decision::Skip(SkipReason::Listed));
    }

    #[test]
    fn test_conflicting_discs_first_wins() {
        let decision = classify(&album("Live (2001) cd1 disc2", "Queen"), &options());
        assert_eq!(decision, Decision::Rename("2001 - Live (Disc 1)".to_string()));
    }

    #[test]
    fn test_malformed_input_never_panics() {
        for name in ["", "   ", "()", "((", "- - -", "@@@", "cd1", "1999-2000", "\u{2014}"] {
            let _ = classify(&album(name, "Queen"), &with_edges(&EdgeCategory::ALL));
            let _ = classify(&RawName::new(name, None, 0), &options());
        }
    }

    #[test]
    fn test_renaming_is_idempotent() {
        let everything = ClassifyOptions {
            enabled_edges: EdgeFlags::all(),
            ..Default::default()
        };
        let inputs = [
            ("A Night at the Opera (1975)", "Queen"),
            ("Band Name Something (2011) cd1", "Band Name"),
            ("Greatest Hits (1980-1990)", "Queen"),
            ("Queen Greatest Hits (2011 Remaster)", "Queen"),
            ("Rumours [Deluxe Edition] 1977", "Fleetwood Mac"),
            ("The Best Of 1980 1990 & B Sides", "R.E.M."),
            ("Live @ Wembley  (1986) {Disc 2}", "Queen"),
            ("Queen's Jazz \u{2013} 1978", "Queen"),
        ];

        for (name, artist) in inputs {
            let Decision::Rename(target) = classify(&album(name, artist), &everything) else {
                panic!("expected a rename for {}", name);
            };
            let again = classify(&album(&target, artist), &everything);
            assert!(
                matches!(
                    again,
                    Decision::Skip(SkipReason::AlreadyFormatted) | Decision::Skip(SkipReason::Unchanged)
                ),
                "{} -> {} -> {:?}",
                name,
                target,
                again
            );
        }
    }
}
