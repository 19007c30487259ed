/// Default Spotify Web API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Runtime configuration describing how to reach the Spotify Web API.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub api_base_url: String,
}

impl SpotifyConfig {
    /// Construct a configuration from an explicit API root.
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
        }
    }
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}
