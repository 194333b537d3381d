use async_trait::async_trait;

use crate::clients::{
    entities::{ArtistGenres, Collection, PlaylistDetails, PlaylistSummary, TimeRange, Track},
    errors::Result,
};

/// Largest page the service returns for collection items.
pub const PAGE_LIMIT: u32 = 100;
/// Largest number of ids accepted by one artist lookup.
pub const ARTIST_BATCH_LIMIT: usize = 50;
/// Largest number of uris accepted by one add-items call.
pub const ADD_ITEMS_LIMIT: usize = 100;
/// Largest number of top tracks the service returns.
pub const TOP_TRACKS_LIMIT: u32 = 50;

/// Operations the sorting pipeline needs from a streaming service.
///
/// Implementations are free to authenticate and transport however they like.
/// Callers are responsible for respecting the size limits above; an
/// implementation may reject oversized requests.
#[async_trait]
pub trait MusicService: Send + Sync {
    /// Playlists owned or followed by the current user.
    async fn list_playlists(&self) -> Result<Vec<PlaylistSummary>>;

    /// Declared number of items in a collection.
    async fn collection_size(&self, collection: &Collection) -> Result<u32>;

    /// One page of a collection, `limit` is at most [`PAGE_LIMIT`].
    async fn collection_page(
        &self,
        collection: &Collection,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Track>>;

    /// Looks up at most [`ARTIST_BATCH_LIMIT`] artists.
    /// Unknown ids are left out of the result.
    async fn artists(&self, ids: &[String]) -> Result<Vec<ArtistGenres>>;

    async fn current_user_id(&self) -> Result<String>;

    /// Creates a playlist and returns its id.
    async fn create_playlist(&self, owner_id: &str, details: &PlaylistDetails) -> Result<String>;

    /// Appends at most [`ADD_ITEMS_LIMIT`] uris to a playlist.
    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<()>;

    async fn top_tracks(&self, limit: u32, range: TimeRange) -> Result<Vec<Track>>;
}
