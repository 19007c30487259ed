//! Fuzzy comparison of free-text guesses against canonical artist and song names.

use unicode_normalization::UnicodeNormalization;

/// Minimum bigram similarity for two normalized names to be considered equal.
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

/// Articles (English and Spanish) ignored when comparing names.
const STOP_WORDS: &[&str] = &["the", "a", "an", "el", "la", "los", "las", "le", "les"];
/// Featuring markers ignored when comparing names. Trailing dots are stripped later.
const FEATURING_MARKERS: &[&str] = &["feat", "ft", "featuring"];

/// Return whether `guess` designates the same name as `actual`.
///
/// Both inputs are normalized first (see [`normalize`]); equal or mutually contained
/// names match, everything else is compared with a Sørensen–Dice bigram similarity.
pub fn is_match(guess: &str, actual: &str) -> bool {
    if guess.trim().is_empty() {
        return false;
    }

    let guess = normalize(guess);
    let actual = normalize(actual);

    if guess.is_empty() || actual.is_empty() {
        return false;
    }

    if guess == actual {
        return true;
    }

    if actual.contains(&guess) || guess.contains(&actual) {
        return true;
    }

    // `sorensen_dice` ignores whitespace, so "ac dc" and "acdc" score 1.0.
    strsim::sorensen_dice(&guess, &actual) >= SIMILARITY_THRESHOLD
}

/// Return whether `guess` names the primary artist or any credited artist.
pub fn is_artist_match(guess: &str, primary_artist: &str, all_artists: &[String]) -> bool {
    is_match(guess, primary_artist) || all_artists.iter().any(|artist| is_match(guess, artist))
}

/// Reduce a name to lowercase ASCII words without accents, annotations, articles or
/// featuring markers.
pub fn normalize(input: &str) -> String {
    let lowered: String = input
        .to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect();

    let without_annotations = strip_enclosed(&strip_enclosed(&lowered, '(', ')'), '[', ']');
    let without_words = strip_words(&without_annotations);

    without_words
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove every `open … close` segment, pairing each opener with the nearest closer.
/// Unbalanced openers are left in place.
fn strip_enclosed(input: &str, open: char, close: char) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find(open) {
        let after_open = &rest[start + open.len_utf8()..];
        match after_open.find(close) {
            Some(end) => {
                output.push_str(&rest[..start]);
                rest = &after_open[end + close.len_utf8()..];
            }
            None => break,
        }
    }

    output.push_str(rest);
    output
}

/// Drop stop words and featuring markers appearing as whole words.
///
/// Words are runs of ASCII alphanumerics or underscores, so `the-beatles` loses its
/// article while `theatre` is untouched.
fn strip_words(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut word = String::new();

    let flush = |word: &mut String, output: &mut String| {
        if !is_ignored_word(word) {
            output.push_str(word);
        }
        word.clear();
    };

    for c in input.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            word.push(c);
        } else {
            flush(&mut word, &mut output);
            output.push(c);
        }
    }
    flush(&mut word, &mut output);

    output
}

fn is_ignored_word(word: &str) -> bool {
    STOP_WORDS.contains(&word) || FEATURING_MARKERS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_accents_annotations_and_articles() {
        assert_eq!(normalize("Hey Jude (Remastered 2015)"), "hey jude");
        assert_eq!(normalize("Canción [Live]"), "cancion");
        assert_eq!(normalize("The Beatles"), "beatles");
        assert_eq!(normalize("Los Prisioneros"), "prisioneros");
        assert_eq!(normalize("Daft Punk feat. Pharrell"), "daft punk pharrell");
        assert_eq!(normalize("  Björk!!  "), "bjork");
    }

    #[test]
    fn normalize_only_removes_whole_words() {
        assert_eq!(normalize("Theatre of Tragedy"), "theatre of tragedy");
        assert_eq!(normalize("Lana Del Rey"), "lana del rey");
        assert_eq!(normalize("The-Beatles"), "beatles");
    }

    #[test]
    fn normalize_keeps_unbalanced_parenthesis_content() {
        assert_eq!(normalize("Song (live"), "song live");
        assert_eq!(normalize("(A) Song (B)"), "song");
    }

    #[test]
    fn empty_guess_never_matches() {
        assert!(!is_match("", "Hey Jude"));
        assert!(!is_match("   ", "Hey Jude"));
    }

    #[test]
    fn guess_reduced_to_nothing_does_not_match() {
        assert!(!is_match("The", "The Beatles"));
        assert!(!is_match("(Remastered)", "Hey Jude"));
    }

    #[test]
    fn article_and_substring_rules_match() {
        assert!(is_match("Beatles", "The Beatles"));
        assert!(is_match("the beatles", "The Beatles"));
        assert!(is_match("hey jude", "Hey Jude - Remastered 2015"));
        assert!(is_match("Bohemian Rhapsody (Live Aid)", "Bohemian Rhapsody"));
    }

    #[test]
    fn close_spelling_matches_by_similarity() {
        assert!(is_match("Bohemian Rapsody", "Bohemian Rhapsody"));
        assert!(is_match("Coldplya", "Coldplay"));
    }

    #[test]
    fn similarity_ignores_word_breaks() {
        assert_eq!(normalize("AC/DC"), "acdc");
        assert_eq!(strsim::sorensen_dice("ac dc", "acdc"), 1.0);
        assert!(is_match("AC DC", "AC/DC"));
        assert!(is_match("Day Tripper", "Daytripper"));
    }

    #[test]
    fn unrelated_names_do_not_match() {
        assert!(!is_match("Queen", "The Beatles"));
        assert!(!is_match("Yesterday", "Hey Jude"));
    }

    #[test]
    fn artist_match_checks_every_credited_artist() {
        let artists = vec!["Daft Punk".to_string(), "Pharrell Williams".to_string()];
        assert!(is_artist_match("daft punk", "Daft Punk", &artists));
        assert!(is_artist_match("Pharrell Williams", "Daft Punk", &artists));
        assert!(!is_artist_match("Justice", "Daft Punk", &artists));
    }
}
