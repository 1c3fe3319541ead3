//! # Artist-Prefix Stripper
//!
//! Rimuove il nome dell'artista padre dall'inizio del titolo di un album.
//! Il confronto ignora maiuscole, accenti e punteggiatura minore,
//! ma lavora solo su parole intere allineate a quelle dell'artista.

use unicode_normalization::UnicodeNormalization;

/// Characters dropped after the artist name
fn is_separator(c: char) -> bool {
    matches!(c, ' ' | '-' | ':' | ',' | '.' | '_')
}

/// One alphanumeric char of a name, case and accent folded
struct Folded {
    /// Byte offset just past the source character
    end: usize,
    c: char,
    /// Whitespace separates it from the previous folded char
    after_space: bool,
    /// Anything non-alphanumeric separates it from the previous folded char
    after_gap: bool,
}

fn significant_chars(text: &str) -> Vec<Folded> {
    let mut folded: Vec<Folded> = Vec::new();
    let (mut space, mut gap) = (false, false);

    for (index, c) in text.char_indices() {
        let end = index + c.len_utf8();
        let before = folded.len();
        folded.extend(
            std::iter::once(c)
                .nfd()
                .flat_map(char::to_lowercase)
                .filter(|f| f.is_alphanumeric())
                .map(|f| Folded { end, c: f, after_space: false, after_gap: false }),
        );

        match folded.get_mut(before) {
            Some(first) => {
                first.after_space = space;
                first.after_gap = gap;
                space = false;
                gap = false;
            }
            None => {
                space |= c.is_whitespace();
                gap = true;
            }
        }
    }
    folded
}

/// Byte offset in `text` where a leading `artist` (and possessive `'s`) ends.
///
/// A word break in the text must line up with a break in the artist name:
/// `"AC DC"` matches `AC/DC` but `"Que En"` does not match `Queen`.
fn prefix_end(text: &str, artist: &str) -> Option<usize> {
    let wanted = significant_chars(artist);
    if wanted.is_empty() {
        return None;
    }

    let found = significant_chars(text);
    if found.len() < wanted.len() {
        return None;
    }
    let aligned = found
        .iter()
        .zip(&wanted)
        .enumerate()
        .all(|(i, (a, b))| a.c == b.c && (i == 0 || !a.after_space || b.after_gap));
    if !aligned {
        return None;
    }

    let mut end = found[wanted.len() - 1].end;
    let at_boundary = |offset: usize| {
        text[offset..]
            .chars()
            .next()
            .map_or(true, |next| !next.is_alphanumeric())
    };

    if !at_boundary(end) {
        return None;
    }
    if text[end..].starts_with("'s") && at_boundary(end + 2) {
        end += 2;
    }
    Some(end)
}

/// Remove `artist` from the start of `text`, with any separator that follows it.
///
/// No-op when the artist is absent, does not match as whole leading words, or
/// when nothing would be left (self-titled albums).
pub fn strip_artist_prefix(text: &str, artist: Option<&str>) -> String {
    let Some(artist) = artist else {
        return text.to_string();
    };
    let Some(end) = prefix_end(text, artist) else {
        return text.to_string();
    };

    let rest = text[end..].trim_start_matches(is_separator).trim_end();
    if rest.is_empty() {
        text.to_string()
    } else {
        rest.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_leading_artist() {
        assert_eq!(strip_artist_prefix("Queen Greatest Hits", Some("Queen")), "Greatest Hits");
        assert_eq!(strip_artist_prefix("Band Name Something", Some("Band Name")), "Something");
        assert_eq!(strip_artist_prefix("queen - Jazz", Some("Queen")), "Jazz");
        assert_eq!(strip_artist_prefix("Queen: Innuendo", Some("Queen")), "Innuendo");
    }

    #[test]
    fn test_strips_possessive() {
        assert_eq!(strip_artist_prefix("Queen's Greatest Hits", Some("Queen")), "Greatest Hits");
    }

    #[test]
    fn test_tolerates_punctuation_and_accents() {
        assert_eq!(strip_artist_prefix("ACDC Back in Black", Some("AC/DC")), "Back in Black");
        assert_eq!(strip_artist_prefix("R.E.M. - Green", Some("REM")), "Green");
        assert_eq!(strip_artist_prefix("Motörhead - Ace of Spades", Some("Motorhead")), "Ace of Spades");
        assert_eq!(strip_artist_prefix("Guns N' Roses: Appetite", Some("Guns N Roses")), "Appetite");
    }

    #[test]
    fn test_never_strips_partial_words() {
        assert_eq!(strip_artist_prefix("Queensryche Live", Some("Queen")), "Queensryche Live");
        assert_eq!(strip_artist_prefix("The Queen Is Dead", Some("Queen")), "The Queen Is Dead");
    }

    #[test]
    fn test_word_breaks_must_line_up() {
        assert_eq!(strip_artist_prefix("Que En Vivo", Some("Queen")), "Que En Vivo");
        assert_eq!(strip_artist_prefix("AC DC Live", Some("AC/DC")), "Live");
        assert_eq!(strip_artist_prefix("Blink 182 Enema of the State", Some("Blink-182")), "Enema of the State");
        assert_eq!(strip_artist_prefix("Bandname Something", Some("Band Name")), "Something");
    }

    #[test]
    fn test_self_titled_album_is_kept() {
        assert_eq!(strip_artist_prefix("Weezer", Some("Weezer")), "Weezer");
        assert_eq!(strip_artist_prefix("Weezer -", Some("Weezer")), "Weezer -");
    }

    #[test]
    fn test_no_artist_is_noop() {
        assert_eq!(strip_artist_prefix("Queen Greatest Hits", None), "Queen Greatest Hits");
        assert_eq!(strip_artist_prefix("Queen Greatest Hits", Some("")), "Queen Greatest Hits");
        assert_eq!(strip_artist_prefix("Queen Greatest Hits", Some("...")), "Queen Greatest Hits");
    }
}
