use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::clients::entities::Track;

/// Which credited artists a track inherits its genres from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtistAttribution {
    /// Only the first credited artist
    #[default]
    Primary,
    /// Every credited artist, each genre counted once per track
    AllArtists,
}

impl ArtistAttribution {
    /// Ids of the artists a track is attributed to, in credit order.
    pub fn artist_ids<'t>(self, track: &'t Track) -> Vec<&'t str> {
        match self {
            ArtistAttribution::Primary => track.primary_artist_id().into_iter().collect(),
            ArtistAttribution::AllArtists => track
                .artists
                .iter()
                .filter_map(|a| a.id.as_deref())
                .collect(),
        }
    }
}

/// Tracks grouped by genre, each bucket in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenreIndex {
    buckets: BTreeMap<String, Vec<Track>>,
}

impl GenreIndex {
    /// Genre labels in alphabetical order.
    pub fn genres(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    pub fn tracks(&self, genre: &str) -> &[Track] {
        self.buckets.get(genre).map_or(&[], Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of tracks per genre.
    pub fn counts(&self) -> BTreeMap<&str, usize> {
        self.buckets
            .iter()
            .map(|(genre, tracks)| (genre.as_str(), tracks.len()))
            .collect()
    }

    /// Tracks of the given genres, in selection order then bucket order,
    /// keeping only the first occurrence of each uri.
    pub fn select<'g>(&self, genres: impl IntoIterator<Item = &'g str>) -> Vec<&Track> {
        let mut seen = HashSet::new();
        genres
            .into_iter()
            .flat_map(|genre| self.tracks(genre))
            .filter(|track| seen.insert(track.uri.as_str()))
            .collect()
    }
}

/// Builds a [`GenreIndex`] from deduplicated tracks and resolved artists.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenreIndexBuilder {
    attribution: ArtistAttribution,
}

impl GenreIndexBuilder {
    pub fn new(attribution: ArtistAttribution) -> Self {
        GenreIndexBuilder { attribution }
    }

    /// Tracks whose attributed artists are missing from `artist_genres`
    /// land in no bucket.
    pub fn build(
        &self,
        tracks: &[Track],
        artist_genres: &HashMap<String, Vec<String>>,
    ) -> GenreIndex {
        let mut index = GenreIndex::default();
        for track in tracks {
            let mut genres: Vec<&str> = Vec::new();
            for id in self.attribution.artist_ids(track) {
                let Some(artist_genres) = artist_genres.get(id) else {
                    continue;
                };
                for genre in artist_genres {
                    if !genres.contains(&genre.as_str()) {
                        genres.push(genre);
                    }
                }
            }
            for genre in genres {
                index
                    .buckets
                    .entry(genre.to_string())
                    .or_default()
                    .push(track.clone());
            }
        }
        index
    }
}
