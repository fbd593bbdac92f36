//! Remote music API client
//!
//! Thin bearer-authenticated proxy over the provider's Web API. Every
//! call makes exactly one request and maps failures onto
//! [`SpotifyError`]. No retries anywhere; each failure is reported
//! once to the caller.
//!
//! The base URL is configurable so tests can point the client at a
//! local stand-in server.

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use pomod_common::api::types::{SearchItem, SearchItemKind, TrackInfo};

use super::SpotifyError;

/// Default timeout for provider API requests
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// URI prefix identifying a single track (as opposed to a context)
const TRACK_URI_PREFIX: &str = "spotify:track:";

/// Bearer-authenticated client for the provider Web API
pub struct SpotifyClient {
    http: Client,
    base_url: String,
}

impl SpotifyClient {
    /// Create a client against the given API base URL
    /// (e.g. `https://api.spotify.com/v1`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
        }
    }

    /// Fetch the currently playing track
    ///
    /// A 204 response, or a 200 with no item, means nothing is playing
    /// and maps to `Ok(None)`.
    pub async fn currently_playing(
        &self,
        access_token: &str,
    ) -> Result<Option<TrackInfo>, SpotifyError> {
        let url = format!("{}/me/player/currently-playing", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| SpotifyError::Network(e.to_string()))?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let response = check_status(response).await?;

        let payload: CurrentlyPlayingPayload = response
            .json()
            .await
            .map_err(|e| SpotifyError::Parse(format!("currently-playing response: {}", e)))?;

        Ok(payload.into_track_info())
    }

    /// Start or resume playback
    ///
    /// A track URI plays that single track; any other URI is treated as
    /// a context (playlist, album) started from the top. `device_id`
    /// routes playback to a specific device.
    pub async fn play(
        &self,
        access_token: &str,
        uri: &str,
        device_id: Option<&str>,
    ) -> Result<(), SpotifyError> {
        let body = if uri.starts_with(TRACK_URI_PREFIX) {
            json!({ "uris": [uri] })
        } else {
            json!({
                "context_uri": uri,
                "offset": { "position": 0 },
                "position_ms": 0,
            })
        };

        let mut request = self
            .http
            .put(format!("{}/me/player/play", self.base_url))
            .bearer_auth(access_token)
            .json(&body);
        if let Some(device_id) = device_id {
            request = request.query(&[("device_id", device_id)]);
        }

        debug!(uri = %uri, "Starting playback");
        let response = request
            .send()
            .await
            .map_err(|e| SpotifyError::Network(e.to_string()))?;
        check_status(response).await?;
        Ok(())
    }

    /// Toggle shuffle on the active (or given) device
    pub async fn set_shuffle(
        &self,
        access_token: &str,
        state: bool,
        device_id: Option<&str>,
    ) -> Result<(), SpotifyError> {
        let mut query: Vec<(&str, String)> = vec![("state", state.to_string())];
        if let Some(device_id) = device_id {
            query.push(("device_id", device_id.to_string()));
        }

        let response = self
            .http
            .put(format!("{}/me/player/shuffle", self.base_url))
            .bearer_auth(access_token)
            .query(&query)
            .send()
            .await
            .map_err(|e| SpotifyError::Network(e.to_string()))?;
        check_status(response).await?;
        Ok(())
    }

    /// Search the catalogue and return the merged result list
    ///
    /// `types` is the provider's comma-separated type filter
    /// (e.g. `track,playlist`).
    pub async fn search(
        &self,
        access_token: &str,
        query: &str,
        types: &str,
        limit: u32,
    ) -> Result<Vec<SearchItem>, SpotifyError> {
        let limit = limit.to_string();
        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .bearer_auth(access_token)
            .query(&[("q", query), ("type", types), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| SpotifyError::Network(e.to_string()))?;
        let response = check_status(response).await?;

        let payload: SearchPayload = response
            .json()
            .await
            .map_err(|e| SpotifyError::Parse(format!("search response: {}", e)))?;

        Ok(merge_search_results(payload))
    }

    /// Track recommendations seeded from one track
    ///
    /// The seed accepts a bare track id or a full track URI.
    pub async fn recommendations(
        &self,
        access_token: &str,
        seed_track: &str,
        limit: u32,
    ) -> Result<Vec<String>, SpotifyError> {
        let seed_id = seed_track.strip_prefix(TRACK_URI_PREFIX).unwrap_or(seed_track);

        let limit = limit.to_string();
        let response = self
            .http
            .get(format!("{}/recommendations", self.base_url))
            .bearer_auth(access_token)
            .query(&[("seed_tracks", seed_id), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| SpotifyError::Network(e.to_string()))?;
        let response = check_status(response).await?;

        let payload: RecommendationsPayload = response
            .json()
            .await
            .map_err(|e| SpotifyError::Parse(format!("recommendations response: {}", e)))?;

        Ok(payload.tracks.into_iter().map(|t| t.uri).collect())
    }
}

/// Map a non-success response to `SpotifyError::Api` with its body
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SpotifyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().await.unwrap_or_default();
    Err(SpotifyError::Api {
        status: status.as_u16(),
        detail,
    })
}

// ========================================
// Provider payload shapes
// ========================================

#[derive(Debug, Deserialize)]
struct CurrentlyPlayingPayload {
    item: Option<PlayableItem>,
    #[serde(default)]
    progress_ms: Option<u64>,
    #[serde(default)]
    is_playing: bool,
}

impl CurrentlyPlayingPayload {
    fn into_track_info(self) -> Option<TrackInfo> {
        let item = self.item?;
        Some(TrackInfo {
            id: item.id,
            name: item.name,
            artists: item
                .artists
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            album_art: item
                .album
                .and_then(|album| album.images.into_iter().next())
                .map(|image| image.url),
            is_playing: self.is_playing,
            progress_ms: self.progress_ms,
            duration_ms: item.duration_ms,
        })
    }
}

#[derive(Debug, Deserialize)]
struct PlayableItem {
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistRef>,
    #[serde(default)]
    album: Option<AlbumRef>,
    #[serde(default)]
    duration_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ArtistRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct AlbumRef {
    #[serde(default)]
    images: Vec<ImageRef>,
}

#[derive(Debug, Deserialize)]
struct ImageRef {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct SearchPayload {
    #[serde(default)]
    playlists: Option<ResultPage<PlaylistEntry>>,
    #[serde(default)]
    tracks: Option<ResultPage<TrackEntry>>,
}

/// One page of provider results; entries can be null and are skipped
#[derive(Debug, Deserialize)]
struct ResultPage<T> {
    #[serde(default = "Vec::new")]
    items: Vec<Option<T>>,
}

#[derive(Debug, Deserialize)]
struct PlaylistEntry {
    id: String,
    name: String,
    uri: String,
    #[serde(default)]
    images: Vec<ImageRef>,
    #[serde(default)]
    owner: Option<OwnerRef>,
}

#[derive(Debug, Deserialize)]
struct OwnerRef {
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrackEntry {
    id: String,
    name: String,
    uri: String,
    #[serde(default)]
    album: Option<AlbumRef>,
    #[serde(default)]
    artists: Vec<ArtistRef>,
}

#[derive(Debug, Deserialize)]
struct RecommendationsPayload {
    #[serde(default = "Vec::new")]
    tracks: Vec<RecommendedTrack>,
}

#[derive(Debug, Deserialize)]
struct RecommendedTrack {
    uri: String,
}

/// Merge the two provider result lists into one client-friendly list:
/// playlists first, then tracks, null entries dropped
fn merge_search_results(payload: SearchPayload) -> Vec<SearchItem> {
    let playlists = payload
        .playlists
        .map(|page| page.items)
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .map(|p| SearchItem {
            kind: SearchItemKind::Playlist,
            id: p.id,
            name: p.name,
            uri: p.uri,
            image: p.images.into_iter().next().map(|i| i.url),
            owner: p.owner.and_then(|o| o.display_name),
            artist: None,
        });

    let tracks = payload
        .tracks
        .map(|page| page.items)
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .map(|t| SearchItem {
            kind: SearchItemKind::Track,
            id: t.id,
            name: t.name,
            uri: t.uri,
            image: t
                .album
                .and_then(|album| album.images.into_iter().next())
                .map(|i| i.url),
            owner: None,
            artist: Some(
                t.artists
                    .iter()
                    .map(|a| a.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        });

    playlists.chain(tracks).collect()
}
