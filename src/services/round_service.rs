//! Session driver: the single writer of the game state.
//!
//! Every action goes through the transition gate, and the effects of each applied transition
//! (playback, countdowns, SSE, automatic follow-up actions) are performed before the gate is
//! released.

use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use tokio::{
    sync::MutexGuard,
    time::{Instant, sleep_until},
};
use tracing::{debug, info};
use validator::Validate;

use crate::{
    dto::game::{GameView, GuessRequest},
    error::ServiceError,
    services::sse_events,
    state::{
        SharedState,
        game::{GameState, Guess},
        state_machine::{GameAction, GamePhase, Transition},
    },
};

/// Apply `action` and perform its side effects.
pub async fn dispatch(state: &SharedState, action: GameAction) -> Transition {
    let gate = state.lock_transitions().await;
    apply_and_react(state, &gate, action).await
}

/// Apply `action` only while `guard` accepts the current state, checked under the gate.
///
/// Entry point for background tasks whose trigger may have gone stale by the time they run.
fn dispatch_when<G>(
    state: SharedState,
    action: GameAction,
    guard: G,
) -> BoxFuture<'static, Option<Transition>>
where
    G: FnOnce(&GameState) -> bool + Send + 'static,
{
    Box::pin(async move {
        let gate = state.lock_transitions().await;
        if !state.read_game(guard).await {
            debug!(action = action.name(), "dropping stale action");
            return None;
        }
        Some(apply_and_react(&state, &gate, action).await)
    })
}

async fn apply_and_react(
    state: &SharedState,
    gate: &MutexGuard<'_, ()>,
    action: GameAction,
) -> Transition {
    let name = action.name();
    let first = state.apply(gate, action).await;
    if !first.applied {
        debug!(action = name, phase = ?first.from, "action ignored in current phase");
        return first;
    }

    let mut last = first;
    let mut follow_up = react(state, last, &state.read_game(GameState::clone).await);
    while let Some(action) = follow_up.take() {
        let name = action.name();
        let transition = state.apply(gate, action).await;
        if !transition.applied {
            debug!(action = name, "automatic action ignored");
            break;
        }
        last = transition;
        follow_up = react(state, last, &state.read_game(GameState::clone).await);
    }

    Transition {
        from: first.from,
        to: last.to,
        applied: true,
    }
}

/// Side effects of an applied transition, returning the action to chain, if any.
fn react(state: &SharedState, transition: Transition, game: &GameState) -> Option<GameAction> {
    let Transition { from, to, .. } = transition;

    if from == GamePhase::Listening && to != GamePhase::Listening {
        state.listening_timer().stop();
        state.player().pause();
    }
    if from == GamePhase::Guessing && to != GamePhase::Guessing {
        state.guessing_timer().stop();
    }
    if from != to {
        info!(from = ?from, to = ?to, round = game.round_number, "phase changed");
        sse_events::broadcast_phase_changed(state, from, game);
    }

    match to {
        GamePhase::Listening if from != GamePhase::Listening => {
            start_listening(state, game);
            None
        }
        GamePhase::Guessing if from != GamePhase::Guessing => {
            start_guessing(state, game);
            None
        }
        GamePhase::Placing if from != GamePhase::Placing => game
            .current_team()
            .timeline
            .is_empty()
            .then_some(GameAction::PlaceInTimeline { position: 0 }),
        GamePhase::Result if from == GamePhase::Placing => {
            if let Some(result) = &game.current_result {
                info!(
                    team = %game.current_team().name,
                    points = result.total_points,
                    placement_correct = result.timeline_placement_correct,
                    score = game.current_team().score,
                    "round scored"
                );
            }
            sse_events::broadcast_round_result(state, game);
            None
        }
        // Only a turn hand-over keeps the session in `Result`.
        GamePhase::Result if from == GamePhase::Result => {
            schedule_next_round(state, game.round_number);
            None
        }
        GamePhase::GameOver if from != GamePhase::GameOver => {
            info!(
                winner = game.winning_team().map(|team| team.name.as_str()),
                rounds = game.round_number,
                "game over"
            );
            sse_events::broadcast_game_over(state, game);
            None
        }
        _ => None,
    }
}

fn start_listening(state: &SharedState, game: &GameState) {
    let Some(track) = &game.current_track else {
        return;
    };
    info!(
        round = game.round_number,
        team = %game.current_team().name,
        track_id = %track.id,
        "round started"
    );
    state.player().play(track.uri.clone());

    let round = game.round_number;
    let weak = Arc::downgrade(state);
    state
        .listening_timer()
        .start(round_duration(game), move || async move {
            if let Some(state) = weak.upgrade() {
                dispatch_when(state, GameAction::ListeningComplete, move |game| {
                    game.phase == GamePhase::Listening && game.round_number == round
                })
                .await;
            }
        });

    sse_events::broadcast_round_started(state, game);
}

fn start_guessing(state: &SharedState, game: &GameState) {
    let round = game.round_number;
    let default_year = state.config().default_guess_year;
    let weak = Arc::downgrade(state);
    state
        .guessing_timer()
        .start(round_duration(game), move || async move {
            if let Some(state) = weak.upgrade() {
                let timed_out = GameAction::SubmitGuess(Guess::timed_out(default_year));
                dispatch_when(state, timed_out, move |game| {
                    game.phase == GamePhase::Guessing && game.round_number == round
                })
                .await;
            }
        });
}

/// Start the next round once the hand-over delay has passed, unless the session moved on.
///
/// The delay runs from the hand-over itself, not from when the task is first polled.
fn schedule_next_round(state: &SharedState, round: u32) {
    let deadline = Instant::now() + state.config().turn_delay;
    let state = state.clone();
    tokio::spawn(async move {
        sleep_until(deadline).await;
        dispatch_when(state, GameAction::StartRound, move |game| {
            game.phase == GamePhase::Result
                && game.current_result.is_none()
                && game.round_number == round
        })
        .await;
    });
}

fn round_duration(game: &GameState) -> Duration {
    Duration::from_secs(u64::from(game.round_seconds))
}

/// Snapshot of the session for the UI, including the running countdown.
pub async fn current_view(state: &SharedState) -> GameView {
    state
        .read_machine(|game, snapshot| {
            let remaining = match game.phase {
                GamePhase::Listening => state.listening_timer().remaining(),
                GamePhase::Guessing => state.guessing_timer().remaining(),
                _ => None,
            };
            let remaining_ms = remaining.map(|left| u64::try_from(left.as_millis()).unwrap_or(u64::MAX));
            GameView::new(game, snapshot, remaining_ms)
        })
        .await
}

async fn run(state: &SharedState, action: GameAction) -> Result<GameView, ServiceError> {
    let name = action.name();
    let transition = dispatch(state, action).await;
    if !transition.applied {
        return Err(ServiceError::InvalidState(format!(
            "cannot {name} while in {:?} phase",
            transition.from
        )));
    }
    Ok(current_view(state).await)
}

/// Start the first round once the playback device is ready.
pub async fn start_game(state: &SharedState) -> Result<GameView, ServiceError> {
    let ready = state.collaborators().playback.ready_device().await?;
    if ready.is_none() {
        return Err(ServiceError::InvalidState(
            "playback device is not ready".into(),
        ));
    }
    if !is_waiting_to_start(state).await {
        return Err(ServiceError::InvalidState(
            "no session is waiting to start".into(),
        ));
    }
    run(state, GameAction::StartRound).await
}

/// Whether a session has been set up and is waiting for its first round.
pub async fn is_waiting_to_start(state: &SharedState) -> bool {
    state
        .read_game(|game| game.phase == GamePhase::Setup && !game.track_pool.is_empty())
        .await
}

/// End the listening phase ahead of its countdown.
pub async fn skip_listening(state: &SharedState) -> Result<GameView, ServiceError> {
    run(state, GameAction::ListeningComplete).await
}

/// Record the guess of the team in turn.
pub async fn submit_guess(
    state: &SharedState,
    request: GuessRequest,
) -> Result<GameView, ServiceError> {
    request.validate()?;
    run(state, GameAction::SubmitGuess(request.into())).await
}

/// Place the current track on the team's timeline.
pub async fn place_in_timeline(
    state: &SharedState,
    position: usize,
) -> Result<GameView, ServiceError> {
    run(state, GameAction::PlaceInTimeline { position }).await
}

/// Resolve the round without placing the track.
pub async fn skip_placement(state: &SharedState) -> Result<GameView, ServiceError> {
    run(state, GameAction::SkipTimeline).await
}

/// Hand over to the other team; the next round follows after the hand-over delay.
pub async fn next_turn(state: &SharedState) -> Result<GameView, ServiceError> {
    run(state, GameAction::NextTurn).await
}

/// Discard the session.
pub async fn reset(state: &SharedState) -> Result<GameView, ServiceError> {
    run(state, GameAction::Reset).await
}
