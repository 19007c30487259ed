use serde::Serialize;

use crate::state::state_machine::GamePhase;

/// Publicly visible game phase exposed to clients (REST/SSE).
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisibleGamePhase {
    Setup,
    Listening,
    Guessing,
    Placing,
    Result,
    #[serde(rename = "gameover")]
    GameOver,
}

impl From<GamePhase> for VisibleGamePhase {
    fn from(value: GamePhase) -> Self {
        match value {
            GamePhase::Setup => VisibleGamePhase::Setup,
            GamePhase::Listening => VisibleGamePhase::Listening,
            GamePhase::Guessing => VisibleGamePhase::Guessing,
            GamePhase::Placing => VisibleGamePhase::Placing,
            GamePhase::Result => VisibleGamePhase::Result,
            GamePhase::GameOver => VisibleGamePhase::GameOver,
        }
    }
}
