//! Fetch, classify and write stages of a sorting run.

/// Paginated collection reads
pub mod fetcher;
/// Genre index and its builder
pub mod index;
/// Batched, memoized artist lookups
pub mod resolver;
/// Chunked playlist writes
pub mod writer;

use std::collections::{BTreeSet, HashSet};

use crate::clients::entities::Track;

pub use fetcher::PageFetcher;
pub use index::{ArtistAttribution, GenreIndex, GenreIndexBuilder};
pub use resolver::{ArtistCache, ArtistResolver};
pub use writer::{PlaylistWriter, WriteReport};

/// Drops every track whose uri was already seen, keeping first occurrences.
pub fn dedup_by_uri(tracks: Vec<Track>) -> Vec<Track> {
    let mut seen = HashSet::new();
    tracks
        .into_iter()
        .filter(|t| seen.insert(t.uri.clone()))
        .collect()
}

/// Distinct, non-null artist ids the tracks are attributed to.
pub fn artist_ids(tracks: &[Track], attribution: ArtistAttribution) -> BTreeSet<String> {
    tracks
        .iter()
        .flat_map(|t| attribution.artist_ids(t))
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::clients::entities::Artist;

    pub(crate) fn track(uri: &str, artist_id: Option<&str>) -> Track {
        Track {
            uri: uri.to_string(),
            name: format!("Song {uri}"),
            artists: vec![Artist {
                id: artist_id.map(ToString::to_string),
                name: format!("Artist {}", artist_id.unwrap_or("unknown")),
            }],
        }
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let tracks = vec![
            track("t1", Some("a1")),
            track("t2", Some("a2")),
            track("t1", Some("a1")),
            track("t3", Some("a1")),
        ];
        let unique = dedup_by_uri(tracks);
        let uris: Vec<&str> = unique.iter().map(|t| t.uri.as_str()).collect();
        assert_eq!(uris, vec!["t1", "t2", "t3"]);
    }

    #[test]
    fn artist_ids_are_distinct_and_skip_missing() {
        let tracks = dedup_by_uri(vec![
            track("t1", Some("a1")),
            track("t1", Some("a1")),
            track("t2", None),
            track("t3", Some("a2")),
            track("t4", Some("a1")),
        ]);
        let ids = artist_ids(&tracks, ArtistAttribution::Primary);
        assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["a1", "a2"]);
    }
}
