//! Timeline Quiz backend entrypoint wiring the REST and SSE layers to the music collaborators.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use timeline_quiz_back::{
    config::AppConfig,
    dao::credentials::{CredentialProvider, StaticCredentials},
    routes,
    state::{AppState, Collaborators, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let credentials: Arc<dyn CredentialProvider> = Arc::new(StaticCredentials::from_env());
    if credentials.bearer_token().await.is_none() {
        warn!("no music service credential configured; sessions cannot be set up");
    }

    let collaborators = build_collaborators(&config, credentials)?;
    let app_state = AppState::new(config, collaborators);
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

#[cfg(feature = "spotify")]
fn build_collaborators(
    config: &AppConfig,
    credentials: Arc<dyn CredentialProvider>,
) -> anyhow::Result<Collaborators> {
    use timeline_quiz_back::dao::{
        playback::{LoggingPlayback, PlaybackController},
        spotify::{SpotifyClient, SpotifyConfig, SpotifyPlayback, SpotifyTrackSource},
    };

    let spotify_config = config
        .spotify_api_base_url
        .clone()
        .map(SpotifyConfig::new)
        .unwrap_or_default();
    let client = SpotifyClient::connect(&spotify_config).context("building Spotify client")?;

    let playback: Arc<dyn PlaybackController> = match &config.playback_device {
        Some(device) => {
            info!(%device, "driving Spotify Connect device");
            Arc::new(SpotifyPlayback::new(
                client.clone(),
                credentials.clone(),
                device.as_str(),
            ))
        }
        None => {
            info!("no playback device configured; logging playback commands");
            Arc::new(LoggingPlayback::new("headless"))
        }
    };

    Ok(Collaborators {
        tracks: Arc::new(SpotifyTrackSource::new(client)),
        playback,
        credentials,
    })
}

#[cfg(not(feature = "spotify"))]
fn build_collaborators(
    _config: &AppConfig,
    _credentials: Arc<dyn CredentialProvider>,
) -> anyhow::Result<Collaborators> {
    anyhow::bail!("built without a track source; enable the `spotify` feature")
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
