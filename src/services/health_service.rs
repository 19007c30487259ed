use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether a session could be started right now.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let collaborators = state.collaborators();
    let credentials = collaborators.credentials.bearer_token().await.is_some();
    let device = match collaborators.playback.ready_device().await {
        Ok(device) => device,
        Err(err) => {
            warn!(error = %err, "playback readiness check failed");
            None
        }
    };

    match device {
        Some(device) if credentials => HealthResponse::ok(device),
        device => HealthResponse::degraded(device, credentials),
    }
}
