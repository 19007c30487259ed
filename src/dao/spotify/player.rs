use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, warn};

use crate::dao::{
    credentials::CredentialProvider,
    playback::{PlaybackController, PlaybackError, PlaybackResult},
};

use super::{
    client::SpotifyClient,
    error::{SpotifyError, SpotifyResult},
    models::DevicesResponse,
};

/// [`PlaybackController`] driving a named Spotify Connect device.
#[derive(Clone)]
pub struct SpotifyPlayback {
    client: SpotifyClient,
    credentials: Arc<dyn CredentialProvider>,
    device_name: Arc<str>,
}

impl SpotifyPlayback {
    pub fn new(
        client: SpotifyClient,
        credentials: Arc<dyn CredentialProvider>,
        device_name: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            client,
            credentials,
            device_name: device_name.into(),
        }
    }

    async fn token(&self) -> SpotifyResult<String> {
        self.credentials
            .bearer_token()
            .await
            .ok_or(SpotifyError::MissingToken)
    }

    /// Identifier of the configured device, `None` when it is not visible.
    async fn find_device(&self, token: &str) -> SpotifyResult<Option<String>> {
        let url = self.client.url("me/player/devices");
        let response: DevicesResponse = self.client.get_json(&url, token).await?;
        Ok(response
            .devices
            .into_iter()
            .find(|device| !device.is_restricted && device.name == *self.device_name)
            .and_then(|device| device.id))
    }

    async fn require_device(&self, token: &str) -> SpotifyResult<String> {
        self.find_device(token)
            .await?
            .ok_or_else(|| SpotifyError::DeviceNotFound {
                name: self.device_name.to_string(),
            })
    }

    async fn play(&self, uri: Option<String>) -> SpotifyResult<()> {
        let token = self.token().await?;
        let device_id = self.require_device(&token).await?;
        let url = self.client.url("me/player/play");
        let mut request = self
            .client
            .request(Method::PUT, &url, &token)
            .query(&[("device_id", device_id.as_str())]);
        request = match uri {
            Some(uri) => request.json(&json!({ "uris": [uri] })),
            None => request.header(reqwest::header::CONTENT_LENGTH, 0),
        };
        self.client.execute(request, &url).await
    }

    async fn pause_device(&self) -> SpotifyResult<()> {
        let token = self.token().await?;
        let device_id = self.require_device(&token).await?;
        let url = self.client.url("me/player/pause");
        let request = self
            .client
            .request(Method::PUT, &url, &token)
            .query(&[("device_id", device_id.as_str())])
            .header(reqwest::header::CONTENT_LENGTH, 0);
        self.client.execute(request, &url).await
    }
}

fn command_error(command: &'static str, err: SpotifyError) -> PlaybackError {
    match err {
        SpotifyError::DeviceNotFound { .. } => PlaybackError::NoDevice,
        other => PlaybackError::Command {
            command,
            message: other.to_string(),
            source: Some(Box::new(other)),
        },
    }
}

impl PlaybackController for SpotifyPlayback {
    fn play_track(&self, uri: String) -> BoxFuture<'static, PlaybackResult<()>> {
        let player = self.clone();
        Box::pin(async move {
            debug!(%uri, "starting playback");
            player
                .play(Some(uri))
                .await
                .map_err(|err| command_error("play", err))
        })
    }

    fn pause(&self) -> BoxFuture<'static, PlaybackResult<()>> {
        let player = self.clone();
        Box::pin(async move {
            player
                .pause_device()
                .await
                .map_err(|err| command_error("pause", err))
        })
    }

    fn resume(&self) -> BoxFuture<'static, PlaybackResult<()>> {
        let player = self.clone();
        Box::pin(async move {
            player
                .play(None)
                .await
                .map_err(|err| command_error("resume", err))
        })
    }

    fn ready_device(&self) -> BoxFuture<'static, PlaybackResult<Option<String>>> {
        let player = self.clone();
        Box::pin(async move {
            let Some(token) = player.credentials.bearer_token().await else {
                return Ok(None);
            };
            match player.find_device(&token).await {
                Ok(Some(_)) => Ok(Some(player.device_name.to_string())),
                Ok(None) => Ok(None),
                Err(err) => {
                    warn!(error = %err, "failed to list Spotify devices");
                    Err(command_error("devices", err))
                }
            }
        })
    }
}
