use serde::{Deserialize, Serialize};

use crate::clients::errors::{Error, Result};

/// Longest playlist name accepted when creating a playlist.
pub const MAX_PLAYLIST_NAME_LEN: usize = 99;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    /// Missing for local files and some unavailable artists
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub uri: String,
    pub name: String,
    pub artists: Vec<Artist>,
}

impl Track {
    /// The first credited artist, used for genre attribution.
    pub fn primary_artist(&self) -> Option<&Artist> {
        self.artists.first()
    }

    /// Id of the first credited artist, if it has one.
    pub fn primary_artist_id(&self) -> Option<&str> {
        self.primary_artist().and_then(|a| a.id.as_deref())
    }
}

/// Artist record returned by a batch lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistGenres {
    pub id: String,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub track_count: u32,
}

/// A track collection that can be read page by page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collection {
    Playlist { id: String },
    LikedSongs,
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Collection::Playlist { id } => write!(f, "playlist {id}"),
            Collection::LikedSongs => write!(f, "liked songs"),
        }
    }
}

/// Window used when asking for the user's top tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum TimeRange {
    /// Roughly the last 4 weeks
    Short,
    /// Roughly the last 6 months
    Medium,
    /// All time
    Long,
}

/// Name, visibility and description of a playlist to be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistDetails {
    pub name: String,
    pub public: bool,
    pub description: Option<String>,
}

impl PlaylistDetails {
    pub fn new(name: &str, public: bool) -> Result<Self> {
        let name = name.trim();
        let len = name.chars().count();
        if len == 0 || len > MAX_PLAYLIST_NAME_LEN {
            return Err(Error::InvalidArgument(format!(
                "playlist name must be between 1 and {MAX_PLAYLIST_NAME_LEN} characters, got {len}"
            )));
        }
        Ok(PlaylistDetails {
            name: name.to_string(),
            public,
            description: None,
        })
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
