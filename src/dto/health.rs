use serde::Serialize;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Name of the playback device when it is ready.
    pub playback_device: Option<String>,
    pub credentials: bool,
}

impl HealthResponse {
    /// Everything needed to start a session is available.
    pub fn ok(playback_device: String) -> Self {
        Self {
            status: "ok".to_string(),
            playback_device: Some(playback_device),
            credentials: true,
        }
    }

    /// The server runs but a session cannot start yet.
    pub fn degraded(playback_device: Option<String>, credentials: bool) -> Self {
        Self {
            status: "degraded".to_string(),
            playback_device,
            credentials,
        }
    }
}
