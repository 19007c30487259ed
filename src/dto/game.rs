use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        phase::VisibleGamePhase,
        validation::{validate_members, validate_not_blank},
    },
    state::{
        game::{GameState, Guess, RoundResult, Team, TimelineEntry, Track},
        state_machine::{GamePhase, Snapshot},
    },
};

/// Payload used to set up a new session.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGameRequest {
    #[validate(length(equal = 2, message = "exactly two teams are required"), nested)]
    pub teams: Vec<TeamInput>,
    #[validate(length(min = 1, message = "select at least one playlist"))]
    pub playlist_ids: Vec<String>,
    /// Falls back to the configured default when omitted.
    #[serde(default)]
    pub target_score: Option<u32>,
    /// Falls back to the configured default when omitted.
    #[serde(default)]
    pub round_seconds: Option<u32>,
}

/// Incoming team definition.
///
/// `Serialize` lets validation errors on `teams` carry the rejected value.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TeamInput {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    /// Member names; blank entries are dropped.
    #[validate(custom(function = "validate_members"))]
    pub members: Vec<String>,
}

/// Free-text guess typed by the team in turn.
#[derive(Debug, Deserialize, Validate)]
pub struct GuessRequest {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub artist: String,
    #[serde(default)]
    #[validate(length(max = 200))]
    pub song: String,
    pub year: i32,
}

impl From<GuessRequest> for Guess {
    fn from(value: GuessRequest) -> Self {
        Self {
            artist: value.artist,
            song: value.song,
            year: value.year,
        }
    }
}

/// Slot chosen on the current team's timeline.
#[derive(Debug, Deserialize)]
pub struct PlacementRequest {
    pub position: usize,
}

/// Full projection of the session for the local UI.
#[derive(Debug, Serialize)]
pub struct GameView {
    pub phase: VisibleGamePhase,
    pub version: usize,
    pub round_number: u32,
    pub teams: Vec<TeamView>,
    /// Index of the team in turn.
    pub current_team: usize,
    pub target_score: f64,
    pub round_seconds: u32,
    pub tracks_remaining: usize,
    /// Revealed once the round has been scored.
    pub current_track: Option<TrackView>,
    pub current_guess: Option<GuessView>,
    pub current_result: Option<RoundResultView>,
    pub winner: Option<usize>,
    /// Milliseconds left on the running countdown, if any.
    pub remaining_ms: Option<u64>,
}

impl GameView {
    pub fn new(game: &GameState, snapshot: Snapshot, remaining_ms: Option<u64>) -> Self {
        let reveal_track = matches!(game.phase, GamePhase::Result | GamePhase::GameOver);
        Self {
            phase: game.phase.into(),
            version: snapshot.version,
            round_number: game.round_number,
            teams: game.teams.iter().map(TeamView::from).collect(),
            current_team: game.current_team.index(),
            target_score: game.target_score,
            round_seconds: game.round_seconds,
            tracks_remaining: game.available_tracks().count(),
            current_track: game
                .current_track
                .as_ref()
                .filter(|_| reveal_track)
                .map(TrackView::from),
            current_guess: game.current_guess.as_ref().map(GuessView::from),
            current_result: game.current_result.as_ref().map(RoundResultView::from),
            winner: game.winner.map(|slot| slot.index()),
            remaining_ms,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TeamView {
    pub id: Uuid,
    pub name: String,
    pub members: Vec<String>,
    pub score: f64,
    pub timeline: Vec<TimelineEntryView>,
}

impl From<&Team> for TeamView {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id,
            name: team.name.clone(),
            members: team.members.iter().map(|member| member.name.clone()).collect(),
            score: team.score,
            timeline: team.timeline.iter().map(TimelineEntryView::from).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TimelineEntryView {
    pub track_id: String,
    pub title: String,
    pub artist: String,
    pub album_art: String,
    pub actual_year: i32,
    pub guessed_year: i32,
    pub position: usize,
}

impl From<&TimelineEntry> for TimelineEntryView {
    fn from(entry: &TimelineEntry) -> Self {
        Self {
            track_id: entry.track_id.clone(),
            title: entry.title.clone(),
            artist: entry.artist.clone(),
            album_art: entry.album_art.clone(),
            actual_year: entry.actual_year,
            guessed_year: entry.guessed_year,
            position: entry.position,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct TrackView {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub all_artists: Vec<String>,
    pub album_name: String,
    pub album_art: String,
    pub release_year: i32,
}

impl From<&Track> for TrackView {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            all_artists: track.all_artists.clone(),
            album_name: track.album_name.clone(),
            album_art: track.album_art.clone(),
            release_year: track.release_year,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct GuessView {
    pub artist: String,
    pub song: String,
    pub year: i32,
}

impl From<&Guess> for GuessView {
    fn from(guess: &Guess) -> Self {
        Self {
            artist: guess.artist.clone(),
            song: guess.song.clone(),
            year: guess.year,
        }
    }
}

/// Points breakdown of a scored round.
#[derive(Clone, Debug, Serialize)]
pub struct RoundResultView {
    pub track_id: String,
    pub song_name: String,
    pub artist_name: String,
    pub actual_year: i32,
    pub guess: GuessView,
    pub artist_points: f64,
    pub song_points: f64,
    pub year_range_points: f64,
    pub year_exact_bonus: f64,
    pub total_points: f64,
    pub timeline_placement_correct: bool,
}

impl From<&RoundResult> for RoundResultView {
    fn from(result: &RoundResult) -> Self {
        Self {
            track_id: result.track_id.clone(),
            song_name: result.song_name.clone(),
            artist_name: result.artist_name.clone(),
            actual_year: result.actual_year,
            guess: GuessView::from(&result.guess),
            artist_points: result.artist_points,
            song_points: result.song_points,
            year_range_points: result.year_range_points,
            year_exact_bonus: result.year_exact_bonus,
            total_points: result.total_points,
            timeline_placement_correct: result.timeline_placement_correct,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(value: serde_json::Value) -> CreateGameRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn accepts_two_named_teams_with_members() {
        let payload = request(json!({
            "teams": [
                { "name": "Red", "members": ["Ana", ""] },
                { "name": "Blue", "members": ["Luis"] }
            ],
            "playlist_ids": ["37i9dQZF1DX4o1oenSJRJd"]
        }));

        assert!(payload.validate().is_ok());
        assert_eq!(payload.target_score, None);
    }

    #[test]
    fn rejects_wrong_team_count_blank_names_and_empty_rosters() {
        let one_team = request(json!({
            "teams": [{ "name": "Red", "members": ["Ana"] }],
            "playlist_ids": ["x"]
        }));
        let errors = one_team.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("teams"));

        let blank = request(json!({
            "teams": [
                { "name": "  ", "members": ["Ana"] },
                { "name": "Blue", "members": ["  "] }
            ],
            "playlist_ids": ["x"]
        }));
        assert!(blank.validate().is_err());
    }

    #[test]
    fn team_count_error_carries_the_submitted_teams() {
        let three = request(json!({
            "teams": [
                { "name": "Red", "members": ["Ana"] },
                { "name": "Blue", "members": ["Luis"] },
                { "name": "Green", "members": ["Eva"] }
            ],
            "playlist_ids": ["x"]
        }));

        let errors = three.validate().unwrap_err();
        let field_errors = errors.field_errors();
        let teams = field_errors["teams"];
        assert_eq!(teams[0].code, "length");
        assert_eq!(teams[0].params["value"][2]["name"], "Green");
    }

    #[test]
    fn rejects_missing_playlists() {
        let payload = request(json!({
            "teams": [
                { "name": "Red", "members": ["Ana"] },
                { "name": "Blue", "members": ["Luis"] }
            ],
            "playlist_ids": []
        }));

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("playlist_ids"));
    }
}
