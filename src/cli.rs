use clap::{Args, Parser, Subcommand};
use genre_sorter::clients::{
    SpotifyClient,
    entities::{Collection, PlaylistDetails, TimeRange},
    errors::Result,
    service::TOP_TRACKS_LIMIT,
};
use genre_sorter::pipeline::{ArtistAttribution, GenreIndex};
use genre_sorter::sorter::{ConfigBuilder, GenreSorter, parse_genres};
use log::info;

const GENRE_COLUMNS: usize = 4;

#[derive(Parser)]
#[command(name = "genre-sorter")]
#[command(version, about = "Sort Spotify tracks by genre into new playlists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct Source {
    /// Playlist position in `playlists` output, id or exact name
    #[arg(long)]
    playlist: Option<String>,
    /// Use the liked songs library
    #[arg(long)]
    liked: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List your playlists
    Playlists {},
    /// Show the genres found in a playlist
    Genres {
        #[command(flatten)]
        source: Source,
        /// Attribute genres of every credited artist, not only the first
        #[arg(long)]
        all_artists: bool,
        /// Print track counts per genre as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a playlist from the tracks of some genres
    Sort {
        #[command(flatten)]
        source: Source,
        /// Comma separated genres, e.g. "rap, synthpop, chicago blues"
        #[arg(long)]
        genres: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        public: bool,
        /// Defaults to the selected genres
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        all_artists: bool,
    },
    /// Create a playlist from your top tracks
    Favorites {
        /// Number of tracks to pull
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=i64::from(TOP_TRACKS_LIMIT)))]
        limit: u32,
        /// short: ~4 weeks, medium: ~6 months, long: all time
        #[arg(long, value_enum, default_value = "medium")]
        range: TimeRange,
        #[arg(long)]
        name: String,
        #[arg(long)]
        public: bool,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Playlists {} => {
            let sorter = sorter(false).await?;
            for (i, playlist) in sorter.list_playlists().await?.iter().enumerate() {
                println!(
                    "\t{}.) {} ({} tracks)",
                    i + 1,
                    playlist.name,
                    playlist.track_count
                );
            }
        }
        Commands::Genres {
            source,
            all_artists,
            json,
        } => {
            let sorter = sorter(all_artists).await?;
            let index = genre_index(&sorter, &source).await?;
            if json {
                let counts = serde_json::to_string_pretty(&index.counts())?;
                println!("{counts}");
            } else {
                println!("Genre choices:");
                print!("{}", format_columns(&index, GENRE_COLUMNS));
            }
        }
        Commands::Sort {
            source,
            genres,
            name,
            public,
            description,
            all_artists,
        } => {
            let mut details = PlaylistDetails::new(&name, public)?;
            if let Some(description) = description {
                details = details.with_description(description);
            }
            let sorter = sorter(all_artists).await?;
            let index = genre_index(&sorter, &source).await?;
            let outcome = sorter
                .create_genre_playlist(&index, &parse_genres(&genres), details)
                .await?;
            println!(
                "\nPlaylist created! {} tracks added.\n",
                outcome.report.written
            );
        }
        Commands::Favorites {
            limit,
            range,
            name,
            public,
        } => {
            let details = PlaylistDetails::new(&name, public)?;
            let sorter = sorter(false).await?;
            let outcome = sorter.copy_top_tracks(limit, range, details).await?;
            println!(
                "\nPlaylist created! {} tracks added.\n",
                outcome.report.written
            );
        }
    }
    Ok(())
}

async fn sorter(all_artists: bool) -> Result<GenreSorter<SpotifyClient>> {
    info!("Building config ...");
    let mut builder = ConfigBuilder::new();
    if all_artists {
        builder = builder.attribution(ArtistAttribution::AllArtists);
    }
    let config = builder.build()?;
    info!("Authorizing client ...");
    // CLI prompt may be shown here
    config.service.authorize_client().await?;
    Ok(GenreSorter::new(config))
}

async fn genre_index(sorter: &GenreSorter<SpotifyClient>, source: &Source) -> Result<GenreIndex> {
    let (collection, total) = match &source.playlist {
        Some(selector) => {
            let playlist = sorter.find_playlist(selector).await?;
            info!("Sorting playlist {:?}", playlist.name);
            (
                Collection::Playlist { id: playlist.id },
                playlist.track_count,
            )
        }
        None => {
            let collection = Collection::LikedSongs;
            let total = sorter.collection_size(&collection).await?;
            (collection, total)
        }
    };
    sorter.build_genre_index(&collection, total).await
}

// Column-major layout, every cell padded to the longest genre
fn format_columns(index: &GenreIndex, columns: usize) -> String {
    let genres: Vec<&str> = index.genres().collect();
    if genres.is_empty() {
        return String::new();
    }
    let width = genres.iter().map(|g| g.chars().count()).max().unwrap_or(0);
    let rows = genres.len().div_ceil(columns);

    let mut out = String::new();
    for row in 0..rows {
        for col in 0..columns {
            if let Some(genre) = genres.get(row + col * rows) {
                out.push_str(&format!("\t{genre:<width$}\t"));
            }
        }
        out.push('\n');
    }
    out
}
