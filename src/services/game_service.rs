use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::PlaylistPreset,
    dto::game::{CreateGameRequest, GameView, TeamInput},
    error::ServiceError,
    services::{round_service, sse_events},
    state::{
        SharedState,
        game::{Team, TeamMember},
        state_machine::{GameAction, GameSetup},
    },
};

/// Playlists offered on the setup screen.
pub fn playlists(state: &SharedState) -> Vec<PlaylistPreset> {
    state.config().playlists.clone()
}

/// Validate the setup, fetch the track pool and start a fresh session.
///
/// The first round starts right away when the playback device is ready; otherwise the
/// session waits in setup for an explicit start.
pub async fn create_game(
    state: &SharedState,
    request: CreateGameRequest,
) -> Result<GameView, ServiceError> {
    request.validate()?;
    let config = state.config();

    let target_score = request.target_score.unwrap_or(config.default_target_score);
    if !config.accepts_target_score(target_score) {
        return Err(ServiceError::InvalidInput(format!(
            "target score must be within {}..={}",
            config.target_score_range.start(),
            config.target_score_range.end()
        )));
    }
    let round_seconds = request
        .round_seconds
        .unwrap_or(config.default_round_seconds);
    if !config.accepts_round_seconds(round_seconds) {
        return Err(ServiceError::InvalidInput(format!(
            "round seconds must be a multiple of {} within {}..={}",
            config.round_seconds_step,
            config.round_seconds_range.start(),
            config.round_seconds_range.end()
        )));
    }

    let collaborators = state.collaborators().clone();
    let Some(token) = collaborators.credentials.bearer_token().await else {
        warn!("setup blocked: no music service credential");
        return Err(ServiceError::MissingCredentials);
    };

    let track_pool = collaborators
        .tracks
        .fetch_tracks(request.playlist_ids.clone(), token)
        .await
        .inspect_err(|err| warn!(error = %err, "failed to fetch track pool"))?;
    if track_pool.is_empty() {
        return Err(ServiceError::InvalidInput(
            "the selected playlists have no playable tracks".into(),
        ));
    }

    let mut team_inputs = request.teams.into_iter().map(build_team);
    let (Some(first), Some(second)) = (team_inputs.next(), team_inputs.next()) else {
        return Err(ServiceError::InvalidInput(
            "exactly two teams are required".into(),
        ));
    };

    info!(
        tracks = track_pool.len(),
        playlists = request.playlist_ids.len(),
        target_score,
        round_seconds,
        "session created"
    );
    round_service::dispatch(
        state,
        GameAction::Initialize(GameSetup {
            teams: [first, second],
            target_score: f64::from(target_score),
            round_seconds,
            track_pool,
        }),
    )
    .await;

    match collaborators.playback.ready_device().await {
        Ok(Some(device)) => {
            info!(%device, "playback ready; starting first round");
            round_service::dispatch(state, GameAction::StartRound).await;
        }
        Ok(None) => sse_events::broadcast_info(state, "waiting for the playback device"),
        Err(err) => {
            warn!(error = %err, "playback readiness check failed");
            sse_events::broadcast_info(state, "playback device unavailable");
        }
    }

    Ok(round_service::current_view(state).await)
}

/// Current session projection.
pub async fn current_game(state: &SharedState) -> GameView {
    round_service::current_view(state).await
}

fn build_team(input: TeamInput) -> Team {
    let members = input
        .members
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .map(|name| TeamMember {
            id: Uuid::new_v4(),
            name,
        })
        .collect();
    Team::new(input.name.trim(), members)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures::future::BoxFuture;
    use serde_json::json;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            credentials::StaticCredentials,
            playback::{LoggingPlayback, PlaybackController, PlaybackResult},
        },
        dto::phase::VisibleGamePhase,
        services::round_service::tests::{FixedTracks, app, track},
        state::{AppState, Collaborators},
    };

    fn request(value: serde_json::Value) -> CreateGameRequest {
        serde_json::from_value(value).unwrap()
    }

    fn valid_request() -> CreateGameRequest {
        request(json!({
            "teams": [
                { "name": " Red ", "members": ["Ana", "  "] },
                { "name": "Blue", "members": ["Luis"] }
            ],
            "playlist_ids": ["37i9dQZF1DX4o1oenSJRJd"],
            "target_score": 5,
            "round_seconds": 30
        }))
    }

    /// Device that never becomes ready.
    struct OfflinePlayback;

    impl PlaybackController for OfflinePlayback {
        fn play_track(&self, _uri: String) -> BoxFuture<'static, PlaybackResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn pause(&self) -> BoxFuture<'static, PlaybackResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn resume(&self) -> BoxFuture<'static, PlaybackResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn ready_device(&self) -> BoxFuture<'static, PlaybackResult<Option<String>>> {
            Box::pin(async { Ok(None) })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn creates_session_and_auto_starts_when_device_ready() {
        let (state, _device) = app(vec![track("a", 1968), track("b", 1975)]);

        let view = create_game(&state, valid_request()).await.unwrap();

        assert_eq!(view.phase, VisibleGamePhase::Listening);
        assert_eq!(view.round_number, 1);
        assert_eq!(view.target_score, 5.0);
        assert_eq!(view.round_seconds, 30);
        assert_eq!(view.teams[0].name, "Red");
        assert_eq!(view.teams[0].members, vec!["Ana"]);
        assert_eq!(view.tracks_remaining, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_in_setup_when_device_not_ready() {
        let state = AppState::new(
            AppConfig::default(),
            Collaborators {
                tracks: Arc::new(FixedTracks(vec![track("a", 1968)])),
                playback: Arc::new(OfflinePlayback),
                credentials: Arc::new(StaticCredentials::new(Some("token".into()))),
            },
        );

        let view = create_game(&state, valid_request()).await.unwrap();

        assert_eq!(view.phase, VisibleGamePhase::Setup);
        assert!(round_service::is_waiting_to_start(&state).await);
    }

    #[tokio::test]
    async fn missing_credentials_block_setup() {
        let state = AppState::new(
            AppConfig::default(),
            Collaborators {
                tracks: Arc::new(FixedTracks(vec![track("a", 1968)])),
                playback: Arc::new(LoggingPlayback::new("test")),
                credentials: Arc::new(StaticCredentials::new(None)),
            },
        );

        let err = create_game(&state, valid_request()).await.unwrap_err();

        assert!(matches!(err, ServiceError::MissingCredentials));
        assert!(!round_service::is_waiting_to_start(&state).await);
    }

    #[tokio::test]
    async fn empty_pool_and_out_of_range_settings_are_rejected() {
        let (state, _device) = app(Vec::new());
        let err = create_game(&state, valid_request()).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let (state, _device) = app(vec![track("a", 1968)]);
        let mut payload = valid_request();
        payload.round_seconds = Some(33);
        let err = create_game(&state, payload).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        let mut payload = valid_request();
        payload.target_score = Some(31);
        let err = create_game(&state, payload).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn playlists_come_from_config() {
        let (state, _device) = app(Vec::new());
        assert_eq!(playlists(&state), AppConfig::default().playlists);
    }
}
