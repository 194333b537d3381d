use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;

use crate::clients::{
    entities::{ArtistGenres, Collection, PlaylistDetails, PlaylistSummary, TimeRange, Track},
    errors::{Error, Result},
    service::{ADD_ITEMS_LIMIT, ARTIST_BATCH_LIMIT, MusicService, PAGE_LIMIT, TOP_TRACKS_LIMIT},
};

/// A call received by [`InMemoryService`], in the order it arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListPlaylists,
    CollectionSize(Collection),
    CollectionPage {
        collection: Collection,
        offset: u32,
        limit: u32,
    },
    Artists(Vec<String>),
    CurrentUser,
    CreatePlaylist {
        owner_id: String,
        details: PlaylistDetails,
    },
    AddItems {
        playlist_id: String,
        uris: Vec<String>,
    },
    TopTracks {
        limit: u32,
        range: TimeRange,
    },
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    created: Vec<(String, Vec<String>)>,
    add_items_calls: usize,
}

/// Music service kept entirely in memory.
///
/// Enforces the same size limits as the real service and records every call,
/// so pipelines can be run and inspected without network access.
pub struct InMemoryService {
    user_id: String,
    playlists: Vec<(PlaylistSummary, Vec<Track>)>,
    liked: Vec<Track>,
    artists: HashMap<String, Vec<String>>,
    top: Vec<Track>,
    fail_add_items_at: Option<usize>,
    state: Mutex<State>,
}

impl Default for InMemoryService {
    fn default() -> Self {
        InMemoryService::new("listener")
    }
}

impl InMemoryService {
    pub fn new(user_id: &str) -> Self {
        InMemoryService {
            user_id: user_id.to_string(),
            playlists: Vec::new(),
            liked: Vec::new(),
            artists: HashMap::new(),
            top: Vec::new(),
            fail_add_items_at: None,
            state: Mutex::new(State::default()),
        }
    }

    #[must_use]
    pub fn with_playlist(mut self, id: &str, name: &str, tracks: Vec<Track>) -> Self {
        let summary = PlaylistSummary {
            id: id.to_string(),
            name: name.to_string(),
            track_count: u32::try_from(tracks.len()).unwrap_or(u32::MAX),
        };
        self.playlists.push((summary, tracks));
        self
    }

    #[must_use]
    pub fn with_liked(mut self, tracks: Vec<Track>) -> Self {
        self.liked = tracks;
        self
    }

    #[must_use]
    pub fn with_artist(mut self, id: &str, genres: &[&str]) -> Self {
        self.artists.insert(
            id.to_string(),
            genres.iter().map(ToString::to_string).collect(),
        );
        self
    }

    #[must_use]
    pub fn with_top_tracks(mut self, tracks: Vec<Track>) -> Self {
        self.top = tracks;
        self
    }

    /// Makes the add-items call with this zero-based index fail.
    #[must_use]
    pub fn failing_add_items_at(mut self, call_index: usize) -> Self {
        self.fail_add_items_at = Some(call_index);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Created playlists as `(id, uris)` with their current content.
    pub fn created_playlists(&self) -> Vec<(String, Vec<String>)> {
        self.lock().created.clone()
    }

    pub fn page_calls(&self) -> usize {
        self.count(|c| matches!(c, Call::CollectionPage { .. }))
    }

    pub fn artist_calls(&self) -> Vec<Vec<String>> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Artists(ids) => Some(ids.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn add_items_calls(&self) -> Vec<Vec<String>> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::AddItems { uris, .. } => Some(uris.clone()),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| pred(c)).count()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A poisoned lock only means a test panicked while holding it
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn record(&self, call: Call) {
        self.lock().calls.push(call);
    }

    fn collection_tracks(&self, collection: &Collection) -> Result<&[Track]> {
        match collection {
            Collection::Playlist { id } => self
                .playlists
                .iter()
                .find(|(summary, _)| &summary.id == id)
                .map(|(_, tracks)| tracks.as_slice())
                .ok_or_else(|| Error::UnknownPlaylist(id.clone())),
            Collection::LikedSongs => Ok(&self.liked),
        }
    }
}

fn check_limit(what: &str, size: usize, limit: usize) -> Result<()> {
    if size > limit {
        return Err(Error::Service(format!(
            "{what} accepts at most {limit} entries, got {size}"
        )));
    }
    Ok(())
}

#[async_trait]
impl MusicService for InMemoryService {
    async fn list_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        self.record(Call::ListPlaylists);
        Ok(self.playlists.iter().map(|(s, _)| s.clone()).collect())
    }

    async fn collection_size(&self, collection: &Collection) -> Result<u32> {
        self.record(Call::CollectionSize(collection.clone()));
        let tracks = self.collection_tracks(collection)?;
        Ok(u32::try_from(tracks.len()).unwrap_or(u32::MAX))
    }

    async fn collection_page(
        &self,
        collection: &Collection,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Track>> {
        self.record(Call::CollectionPage {
            collection: collection.clone(),
            offset,
            limit,
        });
        check_limit("collection page", limit as usize, PAGE_LIMIT as usize)?;
        let tracks = self.collection_tracks(collection)?;
        Ok(tracks
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn artists(&self, ids: &[String]) -> Result<Vec<ArtistGenres>> {
        self.record(Call::Artists(ids.to_vec()));
        check_limit("artist lookup", ids.len(), ARTIST_BATCH_LIMIT)?;
        Ok(ids
            .iter()
            .filter_map(|id| {
                self.artists.get(id).map(|genres| ArtistGenres {
                    id: id.clone(),
                    genres: genres.clone(),
                })
            })
            .collect())
    }

    async fn current_user_id(&self) -> Result<String> {
        self.record(Call::CurrentUser);
        Ok(self.user_id.clone())
    }

    async fn create_playlist(&self, owner_id: &str, details: &PlaylistDetails) -> Result<String> {
        let mut state = self.lock();
        state.calls.push(Call::CreatePlaylist {
            owner_id: owner_id.to_string(),
            details: details.clone(),
        });
        let id = format!("created-{}", state.created.len() + 1);
        state.created.push((id.clone(), Vec::new()));
        Ok(id)
    }

    async fn add_items(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        let mut state = self.lock();
        state.calls.push(Call::AddItems {
            playlist_id: playlist_id.to_string(),
            uris: uris.to_vec(),
        });
        let index = state.add_items_calls;
        state.add_items_calls += 1;
        check_limit("add items", uris.len(), ADD_ITEMS_LIMIT)?;
        if self.fail_add_items_at == Some(index) {
            return Err(Error::Service(format!("add items call {index} rejected")));
        }
        let (_, content) = state
            .created
            .iter_mut()
            .find(|(id, _)| id == playlist_id)
            .ok_or_else(|| Error::UnknownPlaylist(playlist_id.to_string()))?;
        content.extend_from_slice(uris);
        Ok(())
    }

    async fn top_tracks(&self, limit: u32, range: TimeRange) -> Result<Vec<Track>> {
        self.record(Call::TopTracks { limit, range });
        check_limit("top tracks", limit as usize, TOP_TRACKS_LIMIT as usize)?;
        Ok(self.top.iter().take(limit as usize).cloned().collect())
    }
}
