//! Point breakdown of a round.

use crate::{
    engine::matcher::{is_artist_match, is_match},
    state::game::{Guess, RoundResult, Track},
};

/// Awarded when the artist guess matches any credited artist.
pub const ARTIST_POINTS: f64 = 0.5;
/// Awarded when the song guess matches the track title.
pub const SONG_POINTS: f64 = 0.5;
/// Awarded when the track was placed in a chronologically valid slot.
pub const YEAR_RANGE_POINTS: f64 = 1.0;
/// Extra award for a valid placement with the exact release year.
pub const YEAR_EXACT_BONUS: f64 = 0.5;

/// Score a guess for `track`, given whether the team placed it correctly on its timeline.
///
/// The year guess only counts when the placement was correct, and then only on exact
/// equality.
pub fn score_round(guess: &Guess, track: &Track, placement_correct: bool) -> RoundResult {
    let artist_points = if is_artist_match(&guess.artist, &track.artist, &track.all_artists) {
        ARTIST_POINTS
    } else {
        0.0
    };
    let song_points = if is_match(&guess.song, &track.title) {
        SONG_POINTS
    } else {
        0.0
    };

    let (year_range_points, year_exact_bonus) = match placement_correct {
        false => (0.0, 0.0),
        true if guess.year == track.release_year => (YEAR_RANGE_POINTS, YEAR_EXACT_BONUS),
        true => (YEAR_RANGE_POINTS, 0.0),
    };

    RoundResult {
        track_id: track.id.clone(),
        song_name: track.title.clone(),
        artist_name: track.artist.clone(),
        actual_year: track.release_year,
        guess: guess.clone(),
        artist_points,
        song_points,
        year_range_points,
        year_exact_bonus,
        total_points: artist_points + song_points + year_range_points + year_exact_bonus,
        timeline_placement_correct: placement_correct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hey_jude() -> Track {
        Track {
            id: "hey-jude".into(),
            uri: "spotify:track:hey-jude".into(),
            title: "Hey Jude".into(),
            artist: "The Beatles".into(),
            all_artists: vec!["The Beatles".into()],
            album_name: "Hey Jude".into(),
            album_art: String::new(),
            release_year: 1968,
        }
    }

    fn guess(artist: &str, song: &str, year: i32) -> Guess {
        Guess {
            artist: artist.into(),
            song: song.into(),
            year,
        }
    }

    #[test]
    fn perfect_round_scores_maximum() {
        let result = score_round(&guess("the beatles", "Hey Jude", 1968), &hey_jude(), true);

        assert_eq!(result.artist_points, 0.5);
        assert_eq!(result.song_points, 0.5);
        assert_eq!(result.year_range_points, 1.0);
        assert_eq!(result.year_exact_bonus, 0.5);
        assert_eq!(result.total_points, 2.5);
        assert!(result.timeline_placement_correct);
        assert_eq!(result.track_id, "hey-jude");
        assert_eq!(result.actual_year, 1968);
    }

    #[test]
    fn wrong_placement_voids_year_points() {
        let result = score_round(&guess("the beatles", "Hey Jude", 1968), &hey_jude(), false);

        assert_eq!(result.year_range_points, 0.0);
        assert_eq!(result.year_exact_bonus, 0.0);
        assert_eq!(result.total_points, 1.0);
        assert!(!result.timeline_placement_correct);
    }

    #[test]
    fn near_year_gets_no_bonus() {
        let result = score_round(&guess("", "", 1969), &hey_jude(), true);

        assert_eq!(result.year_range_points, 1.0);
        assert_eq!(result.year_exact_bonus, 0.0);
        assert_eq!(result.total_points, 1.0);
    }

    #[test]
    fn timed_out_guess_scores_nothing_without_placement() {
        let result = score_round(&Guess::timed_out(2000), &hey_jude(), false);

        assert_eq!(result.total_points, 0.0);
        assert_eq!(result.guess, Guess::timed_out(2000));
    }

    #[test]
    fn scoring_is_deterministic() {
        let guess = guess("Beatles", "Hey Jud", 1968);
        let first = score_round(&guess, &hey_jude(), true);
        let second = score_round(&guess, &hey_jude(), true);
        assert_eq!(first, second);
    }
}
