pub mod game;
mod sse;
pub mod state_machine;

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::{
    config::AppConfig,
    dao::{credentials::CredentialProvider, playback::PlaybackController, track_source::TrackSource},
    services::{countdown::CountdownTimer, playback_worker::PlaybackWorker},
    state::{
        game::GameState,
        state_machine::{GameAction, GamePhase, GameStateMachine, Snapshot, Transition},
    },
};

pub use self::sse::SseHub;

pub type SharedState = Arc<AppState>;

const SSE_CAPACITY: usize = 32;

/// External services the session relies on.
#[derive(Clone)]
pub struct Collaborators {
    pub tracks: Arc<dyn TrackSource>,
    pub playback: Arc<dyn PlaybackController>,
    pub credentials: Arc<dyn CredentialProvider>,
}

/// Central application state: the session, its countdowns and collaborator handles.
pub struct AppState {
    config: AppConfig,
    sse: SseHub,
    game: RwLock<GameStateMachine>,
    transition_gate: Mutex<()>,
    collaborators: Collaborators,
    player: PlaybackWorker,
    listening_timer: CountdownTimer,
    guessing_timer: CountdownTimer,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// Must be called from within a Tokio runtime: the playback worker is spawned here.
    pub fn new(config: AppConfig, collaborators: Collaborators) -> SharedState {
        let player = PlaybackWorker::spawn(collaborators.playback.clone());
        Arc::new(Self {
            config,
            sse: SseHub::new(SSE_CAPACITY),
            game: RwLock::new(GameStateMachine::new()),
            transition_gate: Mutex::new(()),
            collaborators,
            player,
            listening_timer: CountdownTimer::new("listening"),
            guessing_timer: CountdownTimer::new("guessing"),
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Broadcast hub used for the SSE stream.
    pub fn sse(&self) -> &SseHub {
        &self.sse
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }

    /// Ordered queue of commands for the playback device.
    pub fn player(&self) -> &PlaybackWorker {
        &self.player
    }

    pub fn listening_timer(&self) -> &CountdownTimer {
        &self.listening_timer
    }

    pub fn guessing_timer(&self) -> &CountdownTimer {
        &self.guessing_timer
    }

    /// Serialize writers: only the holder of the gate may apply actions.
    pub async fn lock_transitions(&self) -> MutexGuard<'_, ()> {
        self.transition_gate.lock().await
    }

    /// Apply an action to the session. Callers hold the transition gate.
    pub async fn apply(&self, _gate: &MutexGuard<'_, ()>, action: GameAction) -> Transition {
        self.game.write().await.apply(action)
    }

    /// Snapshot the current phase of the shared game state machine.
    pub async fn phase(&self) -> GamePhase {
        self.game.read().await.phase()
    }

    /// Run `f` against the current session state.
    pub async fn read_game<R>(&self, f: impl FnOnce(&GameState) -> R) -> R {
        let guard = self.game.read().await;
        f(guard.state())
    }

    /// Run `f` against the session state and its bookkeeping, read atomically.
    pub async fn read_machine<R>(&self, f: impl FnOnce(&GameState, Snapshot) -> R) -> R {
        let guard = self.game.read().await;
        f(guard.state(), guard.snapshot())
    }
}
