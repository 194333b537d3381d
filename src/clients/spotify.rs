use std::path::PathBuf;

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::clients::{
    entities::{
        Artist, ArtistGenres, Collection, PlaylistDetails, PlaylistSummary, TimeRange, Track,
    },
    errors::{Error, Result},
    service::MusicService,
};
use rspotify::{
    AuthCodeSpotify, Config, Credentials, OAuth,
    http::Query,
    model::{
        ArtistId, FullArtist, FullTrack, PlayableId, PlayableItem, PlaylistId,
        TimeRange as SpotifyTimeRange, TrackId, UserId,
    },
    prelude::*,
    scopes,
};

/// Largest page `GET /me/tracks` accepts, half of a playlist page.
pub const SAVED_TRACKS_LIMIT: u32 = 50;

/// Splits one collection page into saved-tracks requests as `(offset, limit)`.
fn saved_track_windows(offset: u32, limit: u32) -> Vec<(u32, u32)> {
    (0..limit)
        .step_by(SAVED_TRACKS_LIMIT as usize)
        .map(|start| (offset + start, SAVED_TRACKS_LIMIT.min(limit - start)))
        .collect()
}

// The several-artists endpoint answers `null` for ids it does not know
#[derive(Deserialize)]
struct SeveralArtists {
    artists: Vec<Option<FullArtist>>,
}

fn decode_artists(body: &str) -> Result<Vec<ArtistGenres>> {
    let response: SeveralArtists = serde_json::from_str(body)?;
    Ok(response
        .artists
        .into_iter()
        .flatten()
        .map(|a| ArtistGenres {
            id: a.id.id().to_string(),
            genres: a.genres,
        })
        .collect())
}

// Local files have no id, and so no uri we could write back
fn track_from_full(track: FullTrack) -> Option<Track> {
    let Some(id) = track.id.as_ref() else {
        debug!("Skipping track without id: {}", track.name);
        return None;
    };
    Some(Track {
        uri: id.uri(),
        name: track.name,
        artists: track
            .artists
            .into_iter()
            .map(|a| Artist {
                id: a.id.map(|id| id.id().to_string()),
                name: a.name,
            })
            .collect(),
    })
}

impl From<TimeRange> for SpotifyTimeRange {
    fn from(range: TimeRange) -> SpotifyTimeRange {
        match range {
            TimeRange::Short => SpotifyTimeRange::ShortTerm,
            TimeRange::Medium => SpotifyTimeRange::MediumTerm,
            TimeRange::Long => SpotifyTimeRange::LongTerm,
        }
    }
}

pub struct SpotifyClient {
    pub spotify: AuthCodeSpotify,
}

impl SpotifyClient {
    pub fn new(spotify: AuthCodeSpotify) -> Self {
        SpotifyClient { spotify }
    }

    // Authorize the Spotify client via CLI prompt and OAuth flow
    // This function requires the `cli` feature enabled.
    pub async fn authorize_client(&self) -> Result<()> {
        debug!("Starting Spotify authorization ...");
        let url = self.spotify.get_authorize_url(false)?;
        self.spotify.prompt_for_token(&url).await?;
        let user = self.spotify.me().await?;
        debug!("Authenticated as user: {:?}", user.display_name);
        Ok(())
    }

    // Create a SpotifyClient from environment variables or raise a configuration error
    pub fn try_default() -> Result<Self> {
        let creds = Credentials::from_env()
        .ok_or_else(|| Error::ConfigurationError("Missing Spotify credentials in environment variables. Set RSPOTIFY_CLIENT_ID and RSPOTIFY_CLIENT_SECRET.".into()))?;
        let oauth = OAuth::from_env(scopes!(
            "user-library-read",
            "playlist-read-private",
            "playlist-modify-private",
            "playlist-modify-public",
            "user-top-read"
        ))
        .ok_or_else(|| Error::ConfigurationError("Missing Spotify OAuth configuration in environment variables. Set RSPOTIFY_REDIRECT_URI.".into()))?;

        let cache_path = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp")) // Fallback to /tmp if cache directory can't be determined
            .join(".genre_sorter_token_cache");

        let spotify = AuthCodeSpotify::with_config(
            creds,
            oauth,
            Config {
                token_cached: true,
                cache_path,
                ..Default::default()
            },
        );

        Ok(Self { spotify })
    }
}

#[async_trait]
impl MusicService for SpotifyClient {
    async fn list_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        let mut playlists = Vec::new();
        let mut offset = 0;
        loop {
            let page = self
                .spotify
                .current_user_playlists_manual(Some(50), Some(offset))
                .await?;
            offset += u32::try_from(page.items.len()).unwrap_or(u32::MAX);
            playlists.extend(page.items.into_iter().map(|p| PlaylistSummary {
                id: p.id.id().to_string(),
                name: p.name,
                track_count: p.tracks.total,
            }));
            if page.next.is_none() {
                break;
            }
        }
        debug!("Fetched {} playlists", playlists.len());
        Ok(playlists)
    }

    async fn collection_size(&self, collection: &Collection) -> Result<u32> {
        let total = match collection {
            Collection::Playlist { id } => {
                let playlist_id = PlaylistId::from_id_or_uri(id.as_str())?;
                self.spotify
                    .playlist_items_manual(playlist_id, None, None, Some(1), None)
                    .await?
                    .total
            }
            Collection::LikedSongs => {
                self.spotify
                    .current_user_saved_tracks_manual(None, Some(1), None)
                    .await?
                    .total
            }
        };
        Ok(total)
    }

    async fn collection_page(
        &self,
        collection: &Collection,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Track>> {
        let tracks = match collection {
            Collection::Playlist { id } => {
                let playlist_id = PlaylistId::from_id_or_uri(id.as_str())?;
                let page = self
                    .spotify
                    .playlist_items_manual(playlist_id, None, None, Some(limit), Some(offset))
                    .await?;
                page.items
                    .into_iter()
                    .filter_map(|item| match item.track {
                        Some(PlayableItem::Track(track)) => track_from_full(track),
                        _ => None,
                    })
                    .collect()
            }
            Collection::LikedSongs => {
                let mut tracks = Vec::new();
                for (offset, limit) in saved_track_windows(offset, limit) {
                    let page = self
                        .spotify
                        .current_user_saved_tracks_manual(None, Some(limit), Some(offset))
                        .await?;
                    let last = page.next.is_none();
                    tracks.extend(
                        page.items
                            .into_iter()
                            .filter_map(|saved| track_from_full(saved.track)),
                    );
                    if last {
                        break;
                    }
                }
                tracks
            }
        };
        Ok(tracks)
    }

    async fn artists(&self, ids: &[String]) -> Result<Vec<ArtistGenres>> {
        let artist_ids = ids
            .iter()
            .map(|id| ArtistId::from_id(id.as_str()).map(|a| a.id().to_string()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let url = format!("artists/?ids={}", artist_ids.join(","));
        let body = self.spotify.api_get(&url, &Query::new()).await?;
        decode_artists(&body)
    }

    async fn current_user_id(&self) -> Result<String> {
        let user = self.spotify.me().await?;
        Ok(user.id.id().to_string())
    }

    async fn create_playlist(&self, owner_id: &str, details: &PlaylistDetails) -> Result<String> {
        let playlist = self
            .spotify
            .user_playlist_create(
                UserId::from_id(owner_id)?,
                &details.name,
                Some(details.public),
                Some(false),
                details.description.as_deref(),
            )
            .await?;
        Ok(playlist.id.id().to_string())
    }

    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        let items = uris
            .iter()
            .map(|uri| TrackId::from_uri(uri.as_str()).map(PlayableId::Track))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        self.spotify
            .playlist_add_items(PlaylistId::from_id_or_uri(playlist_id)?, items, None)
            .await?;
        Ok(())
    }

    async fn top_tracks(&self, limit: u32, range: TimeRange) -> Result<Vec<Track>> {
        let page = self
            .spotify
            .current_user_top_tracks_manual(Some(range.into()), Some(limit), None)
            .await?;
        Ok(page.items.into_iter().filter_map(track_from_full).collect())
    }
}
