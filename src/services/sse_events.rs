use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    dto::{
        game::{RoundResultView, TeamView},
        sse::{GameOverEvent, PhaseChangedEvent, RoundResultEvent, RoundStartedEvent, ServerEvent},
    },
    state::{SharedState, game::GameState, state_machine::GamePhase},
};

const EVENT_PHASE_CHANGED: &str = "phase_changed";
const EVENT_ROUND_STARTED: &str = "round_started";
const EVENT_ROUND_RESULT: &str = "round_result";
const EVENT_GAME_OVER: &str = "game_over";
const EVENT_INFO: &str = "info";

/// Broadcast a gameplay phase change notification.
pub fn broadcast_phase_changed(state: &SharedState, previous: GamePhase, game: &GameState) {
    let payload = PhaseChangedEvent {
        phase: game.phase.into(),
        previous: previous.into(),
        round_number: game.round_number,
        current_team: game.current_team.index(),
    };
    send_event(state, EVENT_PHASE_CHANGED, &payload);
}

/// Broadcast that a new track is playing for the team in turn.
pub fn broadcast_round_started(state: &SharedState, game: &GameState) {
    let payload = RoundStartedEvent {
        round_number: game.round_number,
        team: game.current_team.index(),
        team_name: game.current_team().name.clone(),
        round_seconds: game.round_seconds,
        tracks_remaining: game.available_tracks().count(),
    };
    send_event(state, EVENT_ROUND_STARTED, &payload);
}

/// Broadcast the breakdown of the round that was just scored.
pub fn broadcast_round_result(state: &SharedState, game: &GameState) {
    let Some(result) = game.current_result.as_ref() else {
        return;
    };
    let payload = RoundResultEvent {
        team: game.current_team.index(),
        team_score: game.current_team().score,
        result: RoundResultView::from(result),
    };
    send_event(state, EVENT_ROUND_RESULT, &payload);
}

/// Broadcast the final standings.
pub fn broadcast_game_over(state: &SharedState, game: &GameState) {
    let payload = GameOverEvent {
        winner: game.winner.map(|slot| slot.index()),
        winner_name: game.winning_team().map(|team| team.name.clone()),
        teams: game.teams.iter().map(TeamView::from).collect(),
    };
    send_event(state, EVENT_GAME_OVER, &payload);
}

/// Send a human-readable info message onto the SSE stream.
pub fn broadcast_info(state: &SharedState, message: &str) {
    state.sse().broadcast(ServerEvent::new(
        Some(EVENT_INFO.to_string()),
        message.to_string(),
    ));
}

fn send_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(payload) => {
            let listeners = state.sse().broadcast(payload);
            debug!(event, listeners, "session event published");
        }
        Err(err) => warn!(event, error = %err, "failed to serialize SSE payload"),
    }
}
