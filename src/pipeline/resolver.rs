use std::collections::{HashMap, HashSet};

use log::{debug, info};

use crate::clients::{
    errors::Result,
    service::{ARTIST_BATCH_LIMIT, MusicService},
};

/// Genres of every artist looked up during one run.
///
/// Ids that were requested but came back without a record are remembered
/// too, so they are never requested again.
#[derive(Debug, Default)]
pub struct ArtistCache {
    genres: HashMap<String, Vec<String>>,
    unresolved: HashSet<String>,
}

impl ArtistCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` was already sent to the service.
    pub fn contains(&self, id: &str) -> bool {
        self.genres.contains_key(id) || self.unresolved.contains(id)
    }

    pub fn genres(&self, id: &str) -> Option<&[String]> {
        self.genres.get(id).map(Vec::as_slice)
    }

    /// Number of ids that resolved to an artist.
    pub fn len(&self) -> usize {
        self.genres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genres.is_empty()
    }

    fn insert(&mut self, id: String, genres: Vec<String>) {
        self.unresolved.remove(&id);
        self.genres.insert(id, genres);
    }

    fn mark_unresolved(&mut self, id: &str) {
        if !self.genres.contains_key(id) {
            self.unresolved.insert(id.to_string());
        }
    }
}

/// Resolves artist genres in batches, memoizing every lookup.
pub struct ArtistResolver<'a, S: ?Sized> {
    service: &'a S,
    cache: ArtistCache,
}

impl<'a, S: MusicService + ?Sized> ArtistResolver<'a, S> {
    pub fn new(service: &'a S) -> Self {
        Self::with_cache(service, ArtistCache::new())
    }

    pub fn with_cache(service: &'a S, cache: ArtistCache) -> Self {
        ArtistResolver { service, cache }
    }

    pub fn cache(&self) -> &ArtistCache {
        &self.cache
    }

    pub fn into_cache(self) -> ArtistCache {
        self.cache
    }

    /// Maps each requested id that names a known artist to its genres.
    ///
    /// Only ids never seen before are sent upstream, at most 50 per call.
    /// Ids without a matching artist are left out of the result.
    pub async fn resolve<I, T>(&mut self, ids: I) -> Result<HashMap<String, Vec<String>>>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let requested: Vec<String> = ids.into_iter().map(|id| id.as_ref().to_string()).collect();

        let mut pending: Vec<String> = Vec::new();
        let mut queued: HashSet<&str> = HashSet::new();
        for id in &requested {
            if !self.cache.contains(id) && queued.insert(id.as_str()) {
                pending.push(id.clone());
            }
        }
        debug!(
            "{} of {} artist ids need a lookup",
            pending.len(),
            requested.len()
        );

        for batch in pending.chunks(ARTIST_BATCH_LIMIT) {
            let artists = self.service.artists(batch).await?;
            debug!("Resolved {} of {} artists in batch", artists.len(), batch.len());
            for artist in artists {
                self.cache.insert(artist.id, artist.genres);
            }
            for id in batch {
                self.cache.mark_unresolved(id);
            }
        }
        if !pending.is_empty() {
            info!(
                "Looked up {} artists, {} known so far",
                pending.len(),
                self.cache.len()
            );
        }

        Ok(requested
            .into_iter()
            .filter_map(|id| {
                let genres = self.cache.genres(&id)?.to_vec();
                Some((id, genres))
            })
            .collect())
    }
}
