use genre_sorter::clients::{
    InMemoryService,
    entities::{Artist, Collection, PlaylistDetails, Track},
    memory::Call,
};
use genre_sorter::pipeline::ArtistAttribution;
use genre_sorter::sorter::{Config, GenreSorter, parse_genres};

fn track(uri: &str, artist_id: &str) -> Track {
    Track {
        uri: uri.to_string(),
        name: format!("Song {uri}"),
        artists: vec![Artist {
            id: Some(artist_id.to_string()),
            name: format!("Artist {artist_id}"),
        }],
    }
}

/// `unique` tracks cycling through `artists` artists, followed by
/// re-adds of the first `duplicates` tracks.
fn raw_playlist(unique: usize, artists: usize, duplicates: usize) -> Vec<Track> {
    let mut tracks: Vec<Track> = (0..unique)
        .map(|i| track(&format!("spotify:track:{i}"), &format!("artist{}", i % artists)))
        .collect();
    let repeats: Vec<Track> = tracks[..duplicates].to_vec();
    tracks.extend(repeats);
    tracks
}

fn service_for(raw: Vec<Track>, artists: usize, pop_artists: usize) -> InMemoryService {
    (0..artists).fold(
        InMemoryService::default().with_playlist("big", "Big Playlist", raw),
        |service, i| {
            let genres: &[&str] = if i < pop_artists { &["pop"] } else { &["rock"] };
            service.with_artist(&format!("artist{i}"), genres)
        },
    )
}

fn sorter(service: InMemoryService) -> GenreSorter<InMemoryService> {
    GenreSorter::new(Config {
        service,
        attribution: ArtistAttribution::Primary,
    })
}

async fn sort_into_playlist(sorter: &GenreSorter<InMemoryService>, genres: &str) -> usize {
    let playlist = sorter.find_playlist("Big Playlist").await.unwrap();
    let collection = Collection::Playlist { id: playlist.id };
    let index = sorter
        .build_genre_index(&collection, playlist.track_count)
        .await
        .unwrap();
    let details = PlaylistDetails::new("Sorted", false).unwrap();
    sorter
        .create_genre_playlist(&index, &parse_genres(genres), details)
        .await
        .unwrap()
        .report
        .written
}

#[tokio::test]
async fn sorts_large_playlist_with_duplicates() {
    let raw = raw_playlist(245, 40, 5);
    assert_eq!(raw.len(), 250);
    let s = sorter(service_for(raw, 40, 10));

    let playlist = s.find_playlist("1").await.unwrap();
    let index = s
        .build_genre_index(&Collection::Playlist { id: playlist.id }, playlist.track_count)
        .await
        .unwrap();

    assert_eq!(s.service().page_calls(), 3);
    let artist_calls = s.service().artist_calls();
    assert_eq!(artist_calls.len(), 1);
    assert_eq!(artist_calls[0].len(), 40);

    let expected: Vec<String> = (0..245)
        .filter(|i| i % 40 < 10)
        .map(|i| format!("spotify:track:{i}"))
        .collect();
    let pop: Vec<String> = index.tracks("pop").iter().map(|t| t.uri.clone()).collect();
    assert_eq!(pop, expected);
    assert_eq!(index.tracks("rock").len(), 245 - expected.len());

    let details = PlaylistDetails::new("Pop", true).unwrap();
    let outcome = s
        .create_genre_playlist(&index, &parse_genres("Pop"), details)
        .await
        .unwrap();
    assert_eq!(outcome.report.calls, 1);
    assert_eq!(s.service().created_playlists()[0].1, expected);
}

#[tokio::test]
async fn add_items_calls_follow_selection_size() {
    for (unique, calls) in [(250, 3), (150, 2), (100, 1), (37, 1)] {
        let s = sorter(service_for(raw_playlist(unique, 40, 5), 40, 40));

        let written = sort_into_playlist(&s, "pop").await;

        assert_eq!(written, unique);
        assert_eq!(s.service().add_items_calls().len(), calls, "unique = {unique}");
    }
}

#[tokio::test]
async fn artist_lookups_scale_with_distinct_artists_only() {
    let s = sorter(service_for(raw_playlist(400, 120, 0), 120, 60));

    sort_into_playlist(&s, "pop").await;

    let sizes: Vec<usize> = s.service().artist_calls().iter().map(Vec::len).collect();
    assert_eq!(sizes.len(), 3);
    assert_eq!(sizes.iter().sum::<usize>(), 120);
    assert!(sizes.iter().all(|&n| n <= 50));
}

#[tokio::test]
async fn empty_playlist_creates_empty_playlist() {
    let s = sorter(InMemoryService::default().with_playlist("big", "Big Playlist", vec![]));

    let written = sort_into_playlist(&s, "pop, jazz").await;

    assert_eq!(written, 0);
    assert_eq!(s.service().page_calls(), 0);
    assert!(s.service().artist_calls().is_empty());
    assert!(s.service().add_items_calls().is_empty());
    assert_eq!(s.service().created_playlists().len(), 1);
    assert!(
        s.service()
            .calls()
            .iter()
            .any(|c| matches!(c, Call::CreatePlaylist { .. }))
    );
}

#[tokio::test]
async fn unmatched_genre_still_creates_playlist() {
    let s = sorter(service_for(raw_playlist(30, 3, 0), 3, 3));

    let written = sort_into_playlist(&s, "gregorian chant").await;

    assert_eq!(written, 0);
    assert_eq!(s.service().created_playlists(), vec![("created-1".to_string(), vec![])]);
}

#[tokio::test]
async fn liked_songs_can_use_every_credited_artist() {
    let mut duet = track("spotify:track:duet", "singer");
    duet.artists.push(Artist {
        id: Some("guest".into()),
        name: "Guest".into(),
    });
    let local = Track {
        uri: "spotify:track:local".into(),
        name: "Demo".into(),
        artists: vec![Artist {
            id: None,
            name: "Me".into(),
        }],
    };
    let service = InMemoryService::default()
        .with_liked(vec![duet, local])
        .with_artist("singer", &["indie"])
        .with_artist("guest", &["soul"]);
    let s = GenreSorter::new(Config {
        service,
        attribution: ArtistAttribution::AllArtists,
    });

    let total = s.collection_size(&Collection::LikedSongs).await.unwrap();
    let index = s
        .build_genre_index(&Collection::LikedSongs, total)
        .await
        .unwrap();

    assert_eq!(total, 2);
    assert_eq!(index.genres().collect::<Vec<_>>(), vec!["indie", "soul"]);
    assert_eq!(index.tracks("soul")[0].uri, "spotify:track:duet");
    assert_eq!(s.service().artist_calls(), vec![vec!["guest", "singer"]]);
}

#[tokio::test]
async fn failed_write_reports_partial_progress() {
    let service = service_for(raw_playlist(250, 10, 0), 10, 10).failing_add_items_at(2);
    let s = sorter(service);
    let playlist = s.find_playlist("big").await.unwrap();
    let index = s
        .build_genre_index(&Collection::Playlist { id: playlist.id }, playlist.track_count)
        .await
        .unwrap();

    let err = s
        .create_genre_playlist(
            &index,
            &parse_genres("pop"),
            PlaylistDetails::new("Broken", false).unwrap(),
        )
        .await
        .unwrap_err();

    assert!(err.to_string().contains("wrote 200 of 250"));
    assert_eq!(s.service().created_playlists()[0].1.len(), 200);
}
