use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;

use super::{
    config::SpotifyConfig,
    error::{SpotifyError, SpotifyResult},
};

/// Thin authenticated wrapper around the Spotify Web API shared by the adapters.
#[derive(Clone)]
pub struct SpotifyClient {
    client: Client,
    base_url: Arc<str>,
}

impl SpotifyClient {
    /// Build the HTTP client for the configured API root.
    pub fn connect(config: &SpotifyConfig) -> SpotifyResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| SpotifyError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::<str>::from(config.api_base_url.trim_end_matches('/')),
        })
    }

    /// Absolute URL of an API path such as `playlists/{id}`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start a request against an absolute URL with the bearer token attached.
    pub fn request(&self, method: Method, url: &str, token: &str) -> RequestBuilder {
        self.client.request(method, url).bearer_auth(token)
    }

    /// GET an absolute URL and decode its JSON body.
    pub async fn get_json<T>(&self, url: &str, token: &str) -> SpotifyResult<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::GET, url, token), url).await?;
        response
            .json::<T>()
            .await
            .map_err(|source| SpotifyError::DecodeResponse {
                path: url.to_string(),
                source,
            })
    }

    /// Send a request whose response body is irrelevant on success.
    pub async fn execute(&self, builder: RequestBuilder, url: &str) -> SpotifyResult<()> {
        self.send(builder, url).await.map(|_| ())
    }

    async fn send(&self, builder: RequestBuilder, url: &str) -> SpotifyResult<reqwest::Response> {
        let response = builder
            .send()
            .await
            .map_err(|source| SpotifyError::RequestSend {
                path: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(SpotifyError::RequestStatus {
                path: url.to_string(),
                status,
                body,
            })
        }
    }
}
