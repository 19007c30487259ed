use std::error::Error;

use futures::future::BoxFuture;
use thiserror::Error;

use crate::state::game::Track;

/// Result alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Error raised by track sources regardless of the underlying catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog could not be reached or answered with an error.
    #[error("catalog unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The requested playlist does not exist or is not accessible with the credential.
    #[error("playlist `{playlist_id}` not found")]
    PlaylistNotFound { playlist_id: String },
}

impl CatalogError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        CatalogError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}

/// Abstraction over the remote catalog the track pool is fetched from.
pub trait TrackSource: Send + Sync {
    /// Fetch the playable tracks of every playlist, deduplicated by track id with the
    /// first occurrence kept.
    fn fetch_tracks(
        &self,
        playlist_ids: Vec<String>,
        bearer_token: String,
    ) -> BoxFuture<'static, CatalogResult<Vec<Track>>>;
}

/// Keep the first occurrence of every track id, preserving order.
pub fn dedup_tracks(tracks: Vec<Track>) -> Vec<Track> {
    let mut seen = std::collections::HashSet::new();
    tracks
        .into_iter()
        .filter(|track| seen.insert(track.id.clone()))
        .collect()
}
