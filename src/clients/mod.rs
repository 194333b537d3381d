/// Data entities for tracks, artists and playlists
pub mod entities;
/// Error types and result aliases
pub mod errors;
/// In-memory music service
pub mod memory;
/// The music service seam used by the pipeline
pub mod service;
/// Spotify API client
pub mod spotify;

pub use memory::InMemoryService;
pub use service::MusicService;
pub use spotify::SpotifyClient;
