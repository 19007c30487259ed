use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};

use crate::{
    config::PlaylistPreset,
    dto::game::{CreateGameRequest, GameView, GuessRequest, PlacementRequest},
    error::AppError,
    services::{game_service, round_service},
    state::SharedState,
};

/// Routes driving the session from the local UI.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/playlists", get(list_playlists))
        .route("/game", get(current_game).post(create_game))
        .route("/game/start", post(start_game))
        .route("/game/listening/skip", post(skip_listening))
        .route("/game/guess", post(submit_guess))
        .route("/game/placement", post(place_in_timeline))
        .route("/game/placement/skip", post(skip_placement))
        .route("/game/next-turn", post(next_turn))
        .route("/game/reset", post(reset))
}

/// Playlists offered on the setup screen.
pub async fn list_playlists(State(state): State<SharedState>) -> Json<Vec<PlaylistPreset>> {
    Json(game_service::playlists(&state))
}

/// Current session state, including the running countdown.
pub async fn current_game(State(state): State<SharedState>) -> Json<GameView> {
    Json(game_service::current_game(&state).await)
}

/// Set up a new session from teams, playlists and settings.
pub async fn create_game(
    State(state): State<SharedState>,
    Json(payload): Json<CreateGameRequest>,
) -> Result<Json<GameView>, AppError> {
    Ok(Json(game_service::create_game(&state, payload).await?))
}

/// Start the first round once the playback device is ready.
pub async fn start_game(State(state): State<SharedState>) -> Result<Json<GameView>, AppError> {
    Ok(Json(round_service::start_game(&state).await?))
}

pub async fn skip_listening(
    State(state): State<SharedState>,
) -> Result<Json<GameView>, AppError> {
    Ok(Json(round_service::skip_listening(&state).await?))
}

pub async fn submit_guess(
    State(state): State<SharedState>,
    Json(payload): Json<GuessRequest>,
) -> Result<Json<GameView>, AppError> {
    Ok(Json(round_service::submit_guess(&state, payload).await?))
}

pub async fn place_in_timeline(
    State(state): State<SharedState>,
    Json(payload): Json<PlacementRequest>,
) -> Result<Json<GameView>, AppError> {
    Ok(Json(
        round_service::place_in_timeline(&state, payload.position).await?,
    ))
}

pub async fn skip_placement(
    State(state): State<SharedState>,
) -> Result<Json<GameView>, AppError> {
    Ok(Json(round_service::skip_placement(&state).await?))
}

/// Hand over to the other team, or end the game when the target is reached.
pub async fn next_turn(State(state): State<SharedState>) -> Result<Json<GameView>, AppError> {
    Ok(Json(round_service::next_turn(&state).await?))
}

pub async fn reset(State(state): State<SharedState>) -> Result<Json<GameView>, AppError> {
    Ok(Json(round_service::reset(&state).await?))
}
