use serde::Serialize;

use crate::dto::{
    game::{RoundResultView, TeamView},
    phase::VisibleGamePhase,
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across the SSE channel.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    pub fn new(event: Option<String>, data: String) -> Self {
        Self { event, data }
    }

    /// Convenience wrapper that serialises `payload` into the SSE data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize)]
/// Broadcast whenever the gameplay phase changes.
pub struct PhaseChangedEvent {
    pub phase: VisibleGamePhase,
    pub previous: VisibleGamePhase,
    pub round_number: u32,
    pub current_team: usize,
}

#[derive(Debug, Serialize)]
/// Broadcast when a track starts playing for the team in turn.
pub struct RoundStartedEvent {
    pub round_number: u32,
    pub team: usize,
    pub team_name: String,
    pub round_seconds: u32,
    pub tracks_remaining: usize,
}

#[derive(Debug, Serialize)]
/// Broadcast once the round has been scored.
pub struct RoundResultEvent {
    pub team: usize,
    pub team_score: f64,
    pub result: RoundResultView,
}

#[derive(Debug, Serialize)]
/// Broadcast when a winner has been decided.
pub struct GameOverEvent {
    pub winner: Option<usize>,
    pub winner_name: Option<String>,
    pub teams: Vec<TeamView>,
}
