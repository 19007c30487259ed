//! Session state machine.
//!
//! [`transition`] is a pure reducer over [`GameState`]: actions whose preconditions do not
//! hold leave the state untouched. [`GameStateMachine`] wraps it with a version counter.

use std::sync::Arc;

use indexmap::IndexSet;
use rand::{Rng, seq::SliceRandom};

use crate::{
    engine::{
        scoring::score_round,
        timeline::{insert, is_valid_placement},
    },
    state::game::{GameState, Guess, Team, TeamSlot, TimelineEntry, Track},
};

/// Phases a session goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    /// Teams and settings are known, no round has started yet.
    #[default]
    Setup,
    /// The current track is playing for the team in turn.
    Listening,
    /// The team is typing its artist, song and year guess.
    Guessing,
    /// The team chooses the slot of the track on its timeline.
    Placing,
    /// The round outcome is displayed.
    Result,
    /// A winner has been decided.
    GameOver,
}

/// Inputs accepted by the session setup action.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSetup {
    /// Competing teams, the first one plays first.
    pub teams: [Team; 2],
    /// Score that ends the game.
    pub target_score: f64,
    /// Length of each listening and guessing countdown.
    pub round_seconds: u32,
    /// Candidate tracks; duplicates are dropped and the rest shuffled.
    pub track_pool: Vec<Track>,
}

/// Actions driving the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum GameAction {
    /// Start a fresh session, shuffling the track pool once.
    Initialize(GameSetup),
    /// Serve the next unplayed track, or end the game when none is left.
    StartRound,
    /// Listening countdown elapsed or the team skipped ahead.
    ListeningComplete,
    /// Record the guess of the team in turn.
    SubmitGuess(Guess),
    /// Place the current track at an insertion index of the team's timeline.
    PlaceInTimeline {
        /// Insertion index, `0` being before every entry.
        position: usize,
    },
    /// Resolve the round without placing the track.
    SkipTimeline,
    /// Hand over to the other team or declare a winner.
    NextTurn,
    /// Discard the session.
    Reset,
}

impl GameAction {
    /// Short label used in logs and error messages.
    pub fn name(&self) -> &'static str {
        match self {
            GameAction::Initialize(_) => "initialize",
            GameAction::StartRound => "start round",
            GameAction::ListeningComplete => "finish listening",
            GameAction::SubmitGuess(_) => "submit guess",
            GameAction::PlaceInTimeline { .. } => "place in timeline",
            GameAction::SkipTimeline => "skip timeline",
            GameAction::NextTurn => "next turn",
            GameAction::Reset => "reset",
        }
    }
}

/// Outcome of applying an action through [`GameStateMachine::apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Phase before the action.
    pub from: GamePhase,
    /// Phase after the action.
    pub to: GamePhase,
    /// Whether the action changed the state. Actions whose preconditions are not met
    /// leave the state untouched.
    pub applied: bool,
}

/// Snapshot of the state machine bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Current phase of the state machine.
    pub phase: GamePhase,
    /// Incremented on every applied action.
    pub version: usize,
    /// Number of rounds started in the session.
    pub round_number: u32,
}

/// Apply `action` to `state`, returning the next state.
///
/// The function is total: actions that are not meaningful in the current phase return
/// `state` unchanged.
pub fn transition(state: GameState, action: GameAction) -> GameState {
    transition_with_rng(state, action, &mut rand::rng())
}

/// [`transition`] with an explicit random source for the initial shuffle.
pub fn transition_with_rng<R>(state: GameState, action: GameAction, rng: &mut R) -> GameState
where
    R: Rng + ?Sized,
{
    match (state.phase, action) {
        (_, GameAction::Initialize(setup)) => initialize(setup, rng),
        (_, GameAction::Reset) => GameState::default(),
        (GamePhase::Setup, GameAction::StartRound) => start_round(state),
        // A round may follow a result only once NextTurn handed over and cleared it.
        (GamePhase::Result, GameAction::StartRound) if state.current_result.is_none() => {
            start_round(state)
        }
        (GamePhase::Listening, GameAction::ListeningComplete) => GameState {
            phase: GamePhase::Guessing,
            ..state
        },
        (GamePhase::Guessing, GameAction::SubmitGuess(guess)) => GameState {
            phase: GamePhase::Placing,
            current_guess: Some(guess),
            ..state
        },
        (GamePhase::Placing, GameAction::PlaceInTimeline { position }) => {
            resolve_round(state, Some(position))
        }
        (GamePhase::Placing, GameAction::SkipTimeline) => resolve_round(state, None),
        (GamePhase::Result, GameAction::NextTurn) if state.current_result.is_some() => {
            next_turn(state)
        }
        _ => state,
    }
}

fn initialize<R>(setup: GameSetup, rng: &mut R) -> GameState
where
    R: Rng + ?Sized,
{
    let GameSetup {
        teams,
        target_score,
        round_seconds,
        mut track_pool,
    } = setup;

    let mut seen = IndexSet::new();
    track_pool.retain(|track| seen.insert(track.id.clone()));
    track_pool.shuffle(rng);

    GameState {
        teams,
        target_score,
        round_seconds,
        track_pool: Arc::from(track_pool),
        ..GameState::default()
    }
}

fn start_round(mut state: GameState) -> GameState {
    let next_track = state.available_tracks().next().cloned();
    let Some(track) = next_track else {
        let winner = if state.teams[1].score > state.teams[0].score {
            TeamSlot::Second
        } else {
            TeamSlot::First
        };
        return GameState {
            phase: GamePhase::GameOver,
            winner: Some(winner),
            ..state
        };
    };

    state.played_track_ids.insert(track.id.clone());
    GameState {
        phase: GamePhase::Listening,
        current_track: Some(track),
        current_guess: None,
        current_result: None,
        round_number: state.round_number + 1,
        ..state
    }
}

/// Score the round and, for a valid slot, insert the track. `position` is `None` when
/// the team skipped the placement.
fn resolve_round(mut state: GameState, position: Option<usize>) -> GameState {
    let (Some(track), Some(guess)) = (&state.current_track, &state.current_guess) else {
        return state;
    };

    let team = &state.teams[state.current_team.index()];
    let placement = position
        .filter(|position| is_valid_placement(&team.timeline, track.release_year, *position));
    let result = score_round(guess, track, placement.is_some());
    let timeline = placement.map(|position| {
        insert(
            &team.timeline,
            TimelineEntry::placed(track, guess.year, position),
            position,
        )
    });

    let team = &mut state.teams[state.current_team.index()];
    team.score += result.total_points;
    if let Some(timeline) = timeline {
        team.timeline = timeline;
    }

    GameState {
        phase: GamePhase::Result,
        current_result: Some(result),
        ..state
    }
}

fn next_turn(state: GameState) -> GameState {
    let played = state.current_team;
    let next = played.other();

    for candidate in [played, next] {
        if state.team(candidate).score >= state.target_score {
            return GameState {
                phase: GamePhase::GameOver,
                winner: Some(candidate),
                ..state
            };
        }
    }

    GameState {
        current_team: next,
        current_track: None,
        current_guess: None,
        current_result: None,
        ..state
    }
}

/// Owner of the session state, counting applied actions.
#[derive(Debug, Clone, Default)]
pub struct GameStateMachine {
    state: GameState,
    version: usize,
}

impl GameStateMachine {
    /// Create a state machine holding a fresh session in setup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Borrow the current session state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Create a snapshot of the current state machine bookkeeping.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.state.phase,
            version: self.version,
            round_number: self.state.round_number,
        }
    }

    /// Apply an action, replacing the whole state with its successor.
    pub fn apply(&mut self, action: GameAction) -> Transition {
        self.apply_with_rng(action, &mut rand::rng())
    }

    /// [`GameStateMachine::apply`] with an explicit random source.
    pub fn apply_with_rng<R>(&mut self, action: GameAction, rng: &mut R) -> Transition
    where
        R: Rng + ?Sized,
    {
        let from = self.state.phase;
        let next = transition_with_rng(self.state.clone(), action, rng);
        let applied = next != self.state;

        if applied {
            self.state = next;
            self.version += 1;
        }

        Transition {
            from,
            to: self.state.phase,
            applied,
        }
    }
}
