use std::sync::Arc;

use indexmap::IndexSet;
use uuid::Uuid;

use crate::state::state_machine::GamePhase;

/// Target score used before a session has been configured.
pub const DEFAULT_TARGET_SCORE: f64 = 10.0;
/// Per-round time budget (seconds) used before a session has been configured.
pub const DEFAULT_ROUND_SECONDS: u32 = 60;

/// Immutable catalog entry for a playable track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Catalog identifier, unique inside a track pool.
    pub id: String,
    /// URI handed to the playback controller.
    pub uri: String,
    /// Track title.
    pub title: String,
    /// Primary (first credited) artist.
    pub artist: String,
    /// Every credited artist, primary included.
    pub all_artists: Vec<String>,
    /// Album the track was released on.
    pub album_name: String,
    /// Album art URL, empty when the catalog had none.
    pub album_art: String,
    /// Four-digit release year.
    pub release_year: i32,
}

/// A track placed on a team's timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    /// Catalog identifier of the placed track.
    pub track_id: String,
    /// Track title.
    pub title: String,
    /// Primary artist.
    pub artist: String,
    /// Album art URL, possibly empty.
    pub album_art: String,
    /// Release year of the track, the value the timeline is ordered by.
    pub actual_year: i32,
    /// Year the team guessed when the track was placed.
    pub guessed_year: i32,
    /// Index of the entry inside the timeline.
    pub position: usize,
}

impl TimelineEntry {
    /// Build the timeline entry for `track` as guessed by a team.
    pub fn placed(track: &Track, guessed_year: i32, position: usize) -> Self {
        Self {
            track_id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            album_art: track.album_art.clone(),
            actual_year: track.release_year,
            guessed_year,
            position,
        }
    }
}

/// Member of a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMember {
    /// Identifier assigned at setup.
    pub id: Uuid,
    /// Trimmed display name.
    pub name: String,
}

/// One of the two competing teams.
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    /// Stable identifier for the team.
    pub id: Uuid,
    /// Display name chosen for the team.
    pub name: String,
    /// Members in the order they were registered.
    pub members: Vec<TeamMember>,
    /// Cumulative score, increments of 0.5 are possible.
    pub score: f64,
    /// Placed tracks, ordered by release year.
    pub timeline: Vec<TimelineEntry>,
}

impl Team {
    /// Create a team with no points and an empty timeline.
    pub fn new(name: impl Into<String>, members: Vec<TeamMember>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            members,
            score: 0.0,
            timeline: Vec::new(),
        }
    }
}

/// Free-text answer submitted by the team in turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guess {
    /// Artist as typed, possibly empty.
    pub artist: String,
    /// Song title as typed, possibly empty.
    pub song: String,
    /// Guessed release year.
    pub year: i32,
}

impl Guess {
    /// Guess recorded when the guessing countdown runs out before a submission.
    pub fn timed_out(default_year: i32) -> Self {
        Self {
            artist: String::new(),
            song: String::new(),
            year: default_year,
        }
    }
}

/// Scored outcome of a single round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundResult {
    /// Track the round was played with.
    pub track_id: String,
    /// Title of that track.
    pub song_name: String,
    /// Primary artist of that track.
    pub artist_name: String,
    /// Release year of that track.
    pub actual_year: i32,
    /// Guess the round was scored against.
    pub guess: Guess,
    /// 0.5 when the artist matched.
    pub artist_points: f64,
    /// 0.5 when the song matched.
    pub song_points: f64,
    /// 1.0 for a correct timeline placement.
    pub year_range_points: f64,
    /// 0.5 for the exact year, only with a correct placement.
    pub year_exact_bonus: f64,
    /// Sum of the four components.
    pub total_points: f64,
    /// Whether the track fit the chosen timeline slot.
    pub timeline_placement_correct: bool,
}

/// Identifies one of the two teams of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TeamSlot {
    /// The team registered first; it plays the first round and wins ties.
    #[default]
    First,
    /// The team registered second.
    Second,
}

impl TeamSlot {
    /// Position of the team inside [`GameState::teams`].
    pub fn index(self) -> usize {
        match self {
            TeamSlot::First => 0,
            TeamSlot::Second => 1,
        }
    }

    /// The opposing team.
    pub fn other(self) -> Self {
        match self {
            TeamSlot::First => TeamSlot::Second,
            TeamSlot::Second => TeamSlot::First,
        }
    }
}

/// Root aggregate of a session, replaced wholesale on every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    /// Current phase.
    pub phase: GamePhase,
    /// Both teams, indexed by [`TeamSlot::index`].
    pub teams: [Team; 2],
    /// Team whose turn it is.
    pub current_team: TeamSlot,
    /// Score that ends the game when reached.
    pub target_score: f64,
    /// Seconds granted to each of the listening and guessing countdowns.
    pub round_seconds: u32,
    /// Shuffled pool, consumed front to back.
    pub track_pool: Arc<[Track]>,
    /// Identifiers of the tracks already served, in play order.
    pub played_track_ids: IndexSet<String>,
    /// Track of the round in progress.
    pub current_track: Option<Track>,
    /// Guess submitted for the round in progress.
    pub current_guess: Option<Guess>,
    /// Outcome of the last scored round, cleared on turn hand-over.
    pub current_result: Option<RoundResult>,
    /// Number of rounds started so far.
    pub round_number: u32,
    /// Winning team, set only once the game is over.
    pub winner: Option<TeamSlot>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            phase: GamePhase::Setup,
            teams: [
                Team::new("Team 1", Vec::new()),
                Team::new("Team 2", Vec::new()),
            ],
            current_team: TeamSlot::First,
            target_score: DEFAULT_TARGET_SCORE,
            round_seconds: DEFAULT_ROUND_SECONDS,
            track_pool: Arc::from(Vec::new()),
            played_track_ids: IndexSet::new(),
            current_track: None,
            current_guess: None,
            current_result: None,
            round_number: 0,
            winner: None,
        }
    }
}

impl GameState {
    /// Team whose turn it is.
    pub fn current_team(&self) -> &Team {
        &self.teams[self.current_team.index()]
    }

    /// Borrow a team by slot.
    pub fn team(&self, slot: TeamSlot) -> &Team {
        &self.teams[slot.index()]
    }

    /// The winning team once the game is over.
    pub fn winning_team(&self) -> Option<&Team> {
        self.winner.map(|slot| self.team(slot))
    }

    /// Tracks of the pool that have not been served yet, in pool order.
    pub fn available_tracks(&self) -> impl Iterator<Item = &Track> {
        self.track_pool
            .iter()
            .filter(|track| !self.played_track_ids.contains(&track.id))
    }
}
