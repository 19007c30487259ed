use serde::Deserialize;

use crate::state::game::Track;

/// Preferred album art height in pixels.
const PREFERRED_ART_HEIGHT: u32 = 300;
/// Artist name used when Spotify credits nobody.
const UNKNOWN_ARTIST: &str = "Unknown";

/// Body of `GET /playlists/{id}`.
///
/// Spotify has shipped the first page of items under several shapes, all accepted here.
#[derive(Debug, Default, Deserialize)]
pub struct PlaylistResponse {
    #[serde(default)]
    pub tracks: Option<ItemsPage>,
    #[serde(default)]
    pub items: Option<ItemsField>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
}

/// `items` either holds the items directly or a paging object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ItemsField {
    List(Vec<PlaylistItem>),
    Page(ItemsPage),
}

/// Paging object wrapping playlist items.
#[derive(Debug, Default, Deserialize)]
pub struct ItemsPage {
    #[serde(default)]
    pub items: Option<Vec<PlaylistItem>>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub href: Option<String>,
}

/// Where the first page of a playlist lives.
#[derive(Debug)]
pub enum FirstPage {
    /// Items were embedded in the playlist body.
    Embedded {
        items: Vec<PlaylistItem>,
        next: Option<String>,
    },
    /// Items must be fetched from a separate URL.
    Linked(String),
    /// The playlist body carried no usable items.
    Empty,
}

impl PlaylistResponse {
    /// Locate the first page of items.
    pub fn first_page(self) -> FirstPage {
        if let Some(ItemsPage {
            items: Some(items),
            next,
            ..
        }) = self.tracks
        {
            return FirstPage::Embedded { items, next };
        }

        match self.items {
            Some(ItemsField::List(items)) => FirstPage::Embedded {
                items,
                next: self.next,
            },
            Some(ItemsField::Page(ItemsPage {
                items: Some(items),
                next,
                ..
            })) => FirstPage::Embedded { items, next },
            Some(ItemsField::Page(ItemsPage { href, .. })) => href
                .or(self.href)
                .map(FirstPage::Linked)
                .unwrap_or(FirstPage::Empty),
            None => FirstPage::Empty,
        }
    }
}

/// Body of a follow-up page request.
#[derive(Debug, Default, Deserialize)]
pub struct PageResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    #[serde(default)]
    pub next: Option<String>,
}

/// Playlist entry wrapping either a `track` or an `item` payload.
#[derive(Debug, Default, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub track: Option<RawTrack>,
    #[serde(default)]
    pub item: Option<RawTrack>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawTrack {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub is_playable: Option<bool>,
    #[serde(default)]
    pub artists: Vec<RawArtist>,
    #[serde(default)]
    pub album: Option<RawAlbum>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawArtist {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawAlbum {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<RawImage>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawImage {
    pub url: String,
    #[serde(default)]
    pub height: Option<u32>,
}

/// Body of `GET /me/player/devices`.
#[derive(Debug, Default, Deserialize)]
pub struct DevicesResponse {
    #[serde(default)]
    pub devices: Vec<RawDevice>,
}

#[derive(Debug, Deserialize)]
pub struct RawDevice {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub is_restricted: bool,
}

/// Keep the playable tracks of a page, skipping episodes, unplayable and album-less items.
pub fn extract_tracks(items: Vec<PlaylistItem>) -> Vec<Track> {
    items.into_iter().filter_map(into_track).collect()
}

fn into_track(item: PlaylistItem) -> Option<Track> {
    let raw = item.track.or(item.item)?;
    if raw.is_playable == Some(false) || raw.kind.as_deref() != Some("track") {
        return None;
    }
    let album = raw.album?;
    let id = raw.id?;
    let uri = raw.uri?;

    let album_art = album
        .images
        .iter()
        .find(|image| image.height == Some(PREFERRED_ART_HEIGHT))
        .or_else(|| album.images.first())
        .map(|image| image.url.clone())
        .unwrap_or_default();

    let all_artists: Vec<String> = raw.artists.into_iter().map(|artist| artist.name).collect();
    let artist = all_artists
        .first()
        .cloned()
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

    Some(Track {
        id,
        uri,
        title: raw.name,
        artist,
        all_artists,
        album_name: album.name,
        album_art,
        release_year: parse_release_year(album.release_date.as_deref()),
    })
}

/// Year from a Spotify release date (`1968`, `1968-08`, `1968-08-26`), `0` when unknown.
fn parse_release_year(release_date: Option<&str>) -> i32 {
    release_date
        .and_then(|date| date.get(..4))
        .and_then(|year| year.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw_item(id: &str) -> serde_json::Value {
        json!({
            "track": {
                "id": id,
                "uri": format!("spotify:track:{id}"),
                "name": "Hey Jude",
                "type": "track",
                "artists": [{ "name": "The Beatles" }, { "name": "George Martin" }],
                "album": {
                    "name": "Hey Jude",
                    "release_date": "1968-08-26",
                    "images": [
                        { "url": "https://img/640", "height": 640 },
                        { "url": "https://img/300", "height": 300 }
                    ]
                }
            }
        })
    }

    fn items(values: Vec<serde_json::Value>) -> Vec<PlaylistItem> {
        serde_json::from_value(serde_json::Value::Array(values)).unwrap()
    }

    #[test]
    fn extracts_track_fields() {
        let tracks = extract_tracks(items(vec![raw_item("a")]));

        assert_eq!(tracks.len(), 1);
        let track = &tracks[0];
        assert_eq!(track.id, "a");
        assert_eq!(track.uri, "spotify:track:a");
        assert_eq!(track.artist, "The Beatles");
        assert_eq!(track.all_artists, vec!["The Beatles", "George Martin"]);
        assert_eq!(track.album_art, "https://img/300");
        assert_eq!(track.release_year, 1968);
    }

    #[test]
    fn skips_unplayable_episodes_and_album_less_items() {
        let mut unplayable = raw_item("b");
        unplayable["track"]["is_playable"] = json!(false);
        let mut episode = raw_item("c");
        episode["track"]["type"] = json!("episode");
        let mut no_album = raw_item("d");
        no_album["track"]["album"] = serde_json::Value::Null;

        let tracks = extract_tracks(items(vec![
            unplayable,
            episode,
            no_album,
            json!({ "track": null }),
        ]));

        assert!(tracks.is_empty());
    }

    #[test]
    fn accepts_item_wrapper_and_fills_defaults() {
        let tracks = extract_tracks(items(vec![json!({
            "item": {
                "id": "e",
                "uri": "spotify:track:e",
                "name": "Untitled",
                "type": "track",
                "artists": [],
                "album": { "name": "Demo", "release_date": "n/a", "images": [] }
            }
        })]));

        assert_eq!(tracks[0].artist, "Unknown");
        assert_eq!(tracks[0].album_art, "");
        assert_eq!(tracks[0].release_year, 0);
    }

    #[test]
    fn first_page_shapes() {
        let standard: PlaylistResponse = serde_json::from_value(json!({
            "tracks": { "items": [raw_item("a")], "next": "https://next" }
        }))
        .unwrap();
        assert!(matches!(
            standard.first_page(),
            FirstPage::Embedded { ref items, next: Some(_) } if items.len() == 1
        ));

        let flat: PlaylistResponse = serde_json::from_value(json!({
            "items": [raw_item("a"), raw_item("b")],
            "next": null
        }))
        .unwrap();
        assert!(matches!(
            flat.first_page(),
            FirstPage::Embedded { ref items, next: None } if items.len() == 2
        ));

        let nested: PlaylistResponse = serde_json::from_value(json!({
            "items": { "items": [raw_item("a")], "next": "https://next" }
        }))
        .unwrap();
        assert!(matches!(nested.first_page(), FirstPage::Embedded { .. }));

        let linked: PlaylistResponse = serde_json::from_value(json!({
            "items": { "href": "https://api/playlists/x/tracks", "total": 40 }
        }))
        .unwrap();
        assert!(matches!(
            linked.first_page(),
            FirstPage::Linked(ref url) if url == "https://api/playlists/x/tracks"
        ));

        let empty: PlaylistResponse = serde_json::from_value(json!({ "name": "x" })).unwrap();
        assert!(matches!(empty.first_page(), FirstPage::Empty));
    }
}
