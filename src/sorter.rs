use log::{debug, info, warn};

use crate::clients::{
    SpotifyClient,
    entities::{Collection, PlaylistDetails, PlaylistSummary, TimeRange},
    errors::{Error, Result},
    service::{MusicService, TOP_TRACKS_LIMIT},
};
use crate::pipeline::{
    ArtistAttribution, ArtistResolver, GenreIndex, GenreIndexBuilder, PageFetcher, PlaylistWriter,
    WriteReport, artist_ids, dedup_by_uri,
};

/// Environment variable switching genre attribution to every credited artist.
pub const ALL_ARTISTS_ENV: &str = "GENRE_SORTER_ALL_ARTISTS";

/// Configuration for the [`GenreSorter`]
pub struct Config<S> {
    pub service: S,
    pub attribution: ArtistAttribution,
}

/// Builds a [`Config`] backed by Spotify, filling gaps from the environment.
#[derive(Default)]
pub struct ConfigBuilder {
    spotify: Option<SpotifyClient>,
    attribution: Option<ArtistAttribution>,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn spotify(mut self, spotify: SpotifyClient) -> Self {
        self.spotify = Some(spotify);
        self
    }

    #[must_use]
    pub fn attribution(mut self, attribution: ArtistAttribution) -> Self {
        self.attribution = Some(attribution);
        self
    }

    pub fn build(self) -> Result<Config<SpotifyClient>> {
        let service = match self.spotify {
            Some(s) => s,
            None => SpotifyClient::try_default()?,
        };
        let attribution = match self.attribution {
            Some(a) => a,
            None => attribution_from_env()?,
        };
        Ok(Config {
            service,
            attribution,
        })
    }
}

fn attribution_from_env() -> Result<ArtistAttribution> {
    match std::env::var(ALL_ARTISTS_ENV) {
        Ok(value) => Ok(parse_attribution_flag(&value)),
        Err(std::env::VarError::NotPresent) => Ok(ArtistAttribution::default()),
        Err(e) => Err(e.into()),
    }
}

fn parse_attribution_flag(value: &str) -> ArtistAttribution {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => ArtistAttribution::AllArtists,
        _ => ArtistAttribution::Primary,
    }
}

/// Splits comma separated genre input into normalized labels.
///
/// Labels are trimmed and lowercased, empty and repeated labels dropped.
pub fn parse_genres(input: &str) -> Vec<String> {
    let mut genres: Vec<String> = Vec::new();
    for genre in input.split(',').map(|g| g.trim().to_lowercase()) {
        if !genre.is_empty() && !genres.contains(&genre) {
            genres.push(genre);
        }
    }
    genres
}

/// A playlist created by the sorter and what was written to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistOutcome {
    pub playlist_id: String,
    pub report: WriteReport,
}

// The main GenreSorter struct that runs both modes
pub struct GenreSorter<S> {
    config: Config<S>,
}

impl<S: MusicService> GenreSorter<S> {
    pub fn new(config: Config<S>) -> Self {
        GenreSorter { config }
    }

    pub fn service(&self) -> &S {
        &self.config.service
    }

    pub async fn list_playlists(&self) -> Result<Vec<PlaylistSummary>> {
        self.config.service.list_playlists().await
    }

    /// Finds a playlist by 1-based position in the listing, id or exact name.
    pub async fn find_playlist(&self, selector: &str) -> Result<PlaylistSummary> {
        let playlists = self.list_playlists().await?;
        let by_position = selector
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| playlists.get(i));
        if let Some(playlist) = by_position {
            return Ok(playlist.clone());
        }
        playlists
            .iter()
            .find(|p| p.id == selector)
            .or_else(|| playlists.iter().find(|p| p.name == selector))
            .cloned()
            .ok_or_else(|| Error::UnknownPlaylist(selector.to_string()))
    }

    pub async fn collection_size(&self, collection: &Collection) -> Result<u32> {
        self.config.service.collection_size(collection).await
    }

    /// Fetches `total` items of `collection` and groups them by genre.
    pub async fn build_genre_index(&self, collection: &Collection, total: u32) -> Result<GenreIndex> {
        info!("Extracting genres from {total} tracks of {collection} ...");
        let service = &self.config.service;
        let attribution = self.config.attribution;

        let raw = PageFetcher::new(service).fetch_all(collection, total).await?;
        let fetched = raw.len();
        let tracks = dedup_by_uri(raw);
        debug!(
            "Fetched {fetched} tracks, {} after removing duplicates",
            tracks.len()
        );

        let ids = artist_ids(&tracks, attribution);
        let mut resolver = ArtistResolver::new(service);
        let artist_genres = resolver.resolve(&ids).await?;
        debug!(
            "{} of {} artists have a known genre list",
            artist_genres.len(),
            ids.len()
        );

        let index = GenreIndexBuilder::new(attribution).build(&tracks, &artist_genres);
        info!("Found {} genres across {} tracks", index.len(), tracks.len());
        Ok(index)
    }

    /// Creates a playlist holding the tracks of the selected genres.
    ///
    /// The playlist is created even when nothing matches. Without an explicit
    /// description it is described by the selected genres.
    pub async fn create_genre_playlist(
        &self,
        index: &GenreIndex,
        genres: &[String],
        details: PlaylistDetails,
    ) -> Result<PlaylistOutcome> {
        let details = match details.description {
            Some(_) => details,
            None => {
                let description = genres.join(", ");
                details.with_description(description)
            }
        };
        let uris: Vec<String> = index
            .select(genres.iter().map(String::as_str))
            .into_iter()
            .map(|t| t.uri.clone())
            .collect();
        if uris.is_empty() {
            warn!("No tracks match genres {genres:?}, the playlist will be empty");
        }
        info!("Creating playlist {:?} with {} tracks", details.name, uris.len());
        self.create_and_fill(&details, &uris).await
    }

    /// Copies the user's top tracks into a new playlist.
    pub async fn copy_top_tracks(
        &self,
        limit: u32,
        range: TimeRange,
        details: PlaylistDetails,
    ) -> Result<PlaylistOutcome> {
        if !(1..=TOP_TRACKS_LIMIT).contains(&limit) {
            return Err(Error::InvalidArgument(format!(
                "top track limit must be between 1 and {TOP_TRACKS_LIMIT}, got {limit}"
            )));
        }
        let tracks = self.config.service.top_tracks(limit, range).await?;
        info!("Fetched {} top tracks ({range:?} term)", tracks.len());
        let uris: Vec<String> = tracks.into_iter().map(|t| t.uri).collect();
        self.create_and_fill(&details, &uris).await
    }

    async fn create_and_fill(
        &self,
        details: &PlaylistDetails,
        uris: &[String],
    ) -> Result<PlaylistOutcome> {
        let service = &self.config.service;
        let owner = service.current_user_id().await?;
        let playlist_id = service.create_playlist(&owner, details).await?;
        debug!("Created playlist {playlist_id} for {owner}");

        let report = match PlaylistWriter::new(service).write(&playlist_id, uris).await {
            Ok(report) => report,
            Err(e) => {
                warn!("Playlist {playlist_id} was left partially filled");
                return Err(e);
            }
        };
        info!(
            "Playlist {:?} created with {} tracks",
            details.name, report.written
        );
        Ok(PlaylistOutcome {
            playlist_id,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::memory::{Call, InMemoryService};
    use crate::pipeline::tests::track;

    fn sorter(service: InMemoryService) -> GenreSorter<InMemoryService> {
        GenreSorter::new(Config {
            service,
            attribution: ArtistAttribution::Primary,
        })
    }

    #[test]
    fn genre_input_is_normalized() {
        assert_eq!(
            parse_genres("Rap, synthpop ,JAZZ,, new wave, rap"),
            vec!["rap", "synthpop", "jazz", "new wave"]
        );
        assert!(parse_genres(" , ").is_empty());
    }

    #[test]
    fn attribution_flag_values() {
        assert_eq!(parse_attribution_flag("1"), ArtistAttribution::AllArtists);
        assert_eq!(parse_attribution_flag(" TRUE "), ArtistAttribution::AllArtists);
        assert_eq!(parse_attribution_flag("0"), ArtistAttribution::Primary);
        assert_eq!(parse_attribution_flag(""), ArtistAttribution::Primary);
    }

    #[tokio::test]
    async fn finds_playlist_by_position_id_or_name() {
        let s = sorter(
            InMemoryService::default()
                .with_playlist("p1", "Road Trip", vec![])
                .with_playlist("p2", "Focus", vec![track("t", Some("a"))]),
        );
        assert_eq!(s.find_playlist("2").await.unwrap().id, "p2");
        assert_eq!(s.find_playlist("p1").await.unwrap().name, "Road Trip");
        assert_eq!(s.find_playlist("Focus").await.unwrap().track_count, 1);
        assert!(matches!(
            s.find_playlist("7").await,
            Err(Error::UnknownPlaylist(_))
        ));
    }

    #[tokio::test]
    async fn genre_playlist_is_described_by_selection() {
        let s = sorter(
            InMemoryService::default()
                .with_playlist("p", "P", vec![track("t1", Some("a1"))])
                .with_artist("a1", &["jazz"]),
        );
        let index = s
            .build_genre_index(&Collection::Playlist { id: "p".into() }, 1)
            .await
            .unwrap();
        let genres = parse_genres("jazz, blues");
        let details = PlaylistDetails::new("Evening", true).unwrap();

        let outcome = s.create_genre_playlist(&index, &genres, details).await.unwrap();

        assert_eq!(outcome.report.written, 1);
        let created = s.service().calls().into_iter().find_map(|c| match c {
            Call::CreatePlaylist { owner_id, details } => Some((owner_id, details)),
            _ => None,
        });
        let (owner_id, details) = created.unwrap();
        assert_eq!(owner_id, "listener");
        assert!(details.public);
        assert_eq!(details.description.as_deref(), Some("jazz, blues"));
    }

    #[tokio::test]
    async fn top_tracks_are_copied_verbatim() {
        let top = vec![
            track("t3", Some("a")),
            track("t1", Some("b")),
            track("t2", None),
        ];
        let s = sorter(InMemoryService::default().with_top_tracks(top));
        let details = PlaylistDetails::new("Favorites", false).unwrap();

        let outcome = s
            .copy_top_tracks(3, TimeRange::Short, details)
            .await
            .unwrap();

        assert_eq!(outcome.report.calls, 1);
        let created = s.service().created_playlists();
        assert_eq!(created[0].0, outcome.playlist_id);
        assert_eq!(created[0].1, vec!["t3", "t1", "t2"]);
        assert!(s.service().calls().contains(&Call::TopTracks {
            limit: 3,
            range: TimeRange::Short
        }));
    }

    #[tokio::test]
    async fn top_track_limit_is_validated() {
        let s = sorter(InMemoryService::default());
        for limit in [0, 51] {
            let details = PlaylistDetails::new("Favorites", false).unwrap();
            let result = s.copy_top_tracks(limit, TimeRange::Long, details).await;
            assert!(matches!(result, Err(Error::InvalidArgument(_))));
        }
        assert!(s.service().calls().is_empty());
    }
}
