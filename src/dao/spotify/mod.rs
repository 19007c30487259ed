mod client;
mod config;
mod error;
mod models;
mod player;
mod source;

pub use client::SpotifyClient;
pub use config::SpotifyConfig;
pub use error::SpotifyError;
pub use player::SpotifyPlayback;
pub use source::SpotifyTrackSource;

use crate::dao::track_source::CatalogError;

impl From<SpotifyError> for CatalogError {
    fn from(err: SpotifyError) -> Self {
        CatalogError::unavailable(err.to_string(), err)
    }
}
