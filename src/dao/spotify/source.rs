use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::{
    dao::track_source::{CatalogError, CatalogResult, TrackSource, dedup_tracks},
    state::game::Track,
};

use super::{
    client::SpotifyClient,
    error::SpotifyResult,
    models::{FirstPage, PageResponse, PlaylistResponse, extract_tracks},
};

/// [`TrackSource`] backed by the Spotify playlist endpoints.
#[derive(Clone)]
pub struct SpotifyTrackSource {
    client: SpotifyClient,
}

impl SpotifyTrackSource {
    pub fn new(client: SpotifyClient) -> Self {
        Self { client }
    }

    async fn fetch_playlist(&self, playlist_id: &str, token: &str) -> CatalogResult<Vec<Track>> {
        let url = self.client.url(&format!("playlists/{playlist_id}"));
        let playlist: PlaylistResponse = match self.client.get_json(&url, token).await {
            Ok(playlist) => playlist,
            Err(err) if err.is_not_found() => {
                return Err(CatalogError::PlaylistNotFound {
                    playlist_id: playlist_id.to_string(),
                });
            }
            Err(err) => return Err(err.into()),
        };

        let (items, mut next) = match playlist.first_page() {
            FirstPage::Embedded { items, next } => (items, next),
            FirstPage::Linked(url) => {
                let page = self.fetch_page(&url, token).await?;
                (page.items, page.next)
            }
            FirstPage::Empty => {
                warn!(playlist_id, "playlist response carried no items");
                (Vec::new(), None)
            }
        };

        let mut tracks = extract_tracks(items);
        while let Some(url) = next.take() {
            match self.fetch_page(&url, token).await {
                Ok(page) => {
                    tracks.extend(extract_tracks(page.items));
                    next = page.next;
                }
                Err(err) => {
                    warn!(playlist_id, error = %err, "failed to fetch playlist page; keeping tracks fetched so far");
                }
            }
        }

        debug!(playlist_id, count = tracks.len(), "fetched playlist tracks");
        Ok(tracks)
    }

    async fn fetch_page(&self, url: &str, token: &str) -> SpotifyResult<PageResponse> {
        self.client.get_json::<PageResponse>(url, token).await
    }
}

impl TrackSource for SpotifyTrackSource {
    fn fetch_tracks(
        &self,
        playlist_ids: Vec<String>,
        bearer_token: String,
    ) -> BoxFuture<'static, CatalogResult<Vec<Track>>> {
        let source = self.clone();
        Box::pin(async move {
            let mut tracks = Vec::new();
            for playlist_id in &playlist_ids {
                tracks.extend(source.fetch_playlist(playlist_id, &bearer_token).await?);
            }

            let tracks = dedup_tracks(tracks);
            info!(
                playlists = playlist_ids.len(),
                count = tracks.len(),
                "track pool fetched"
            );
            Ok(tracks)
        })
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        Json, Router,
        extract::{Path, State},
        http::{HeaderMap, StatusCode},
        routing::get,
    };
    use serde_json::{Value, json};
    use tokio::net::TcpListener;

    use super::*;
    use crate::dao::spotify::config::SpotifyConfig;

    fn item(id: &str) -> Value {
        json!({
            "track": {
                "id": id,
                "uri": format!("spotify:track:{id}"),
                "name": format!("Song {id}"),
                "type": "track",
                "artists": [{ "name": "Artist" }],
                "album": { "name": "Album", "release_date": "1999-01-01", "images": [] }
            }
        })
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            == Some("Bearer token")
    }

    async fn playlist(
        State(base): State<String>,
        Path(id): Path<String>,
        headers: HeaderMap,
    ) -> Result<Json<Value>, StatusCode> {
        if !authorized(&headers) {
            return Err(StatusCode::UNAUTHORIZED);
        }
        match id.as_str() {
            "p1" => Ok(Json(json!({
                "tracks": { "items": [item("a"), item("b")], "next": format!("{base}/pages/p1-2") }
            }))),
            "p2" => Ok(Json(json!({ "items": [item("a"), item("d")], "next": null }))),
            _ => Err(StatusCode::NOT_FOUND),
        }
    }

    async fn page(
        State(base): State<String>,
        Path(id): Path<String>,
    ) -> Result<Json<Value>, StatusCode> {
        match id.as_str() {
            "p1-2" => Ok(Json(json!({
                "items": [item("c")],
                "next": format!("{base}/pages/broken")
            }))),
            _ => Err(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    async fn source() -> SpotifyTrackSource {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let router = Router::new()
            .route("/playlists/{id}", get(playlist))
            .route("/pages/{id}", get(page))
            .with_state(base.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        SpotifyTrackSource::new(SpotifyClient::connect(&SpotifyConfig::new(base)).unwrap())
    }

    #[tokio::test]
    async fn follows_pages_and_dedups_across_playlists() {
        let source = source().await;

        let tracks = source
            .fetch_tracks(vec!["p1".into(), "p2".into()], "token".into())
            .await
            .unwrap();

        let ids: Vec<_> = tracks.iter().map(|track| track.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert_eq!(tracks[0].release_year, 1999);
    }

    #[tokio::test]
    async fn missing_playlist_is_reported() {
        let source = source().await;

        let err = source
            .fetch_tracks(vec!["nope".into()], "token".into())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CatalogError::PlaylistNotFound { ref playlist_id } if playlist_id == "nope"
        ));
    }

    #[tokio::test]
    async fn rejected_credential_surfaces_as_unavailable() {
        let source = source().await;

        let err = source
            .fetch_tracks(vec!["p1".into()], "expired".into())
            .await
            .unwrap_err();

        assert!(matches!(err, CatalogError::Unavailable { .. }));
    }
}
