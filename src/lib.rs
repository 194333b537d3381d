//! Genre sorter - classify playlist tracks by artist genre
//!
//! This library fetches a Spotify playlist or the liked songs library, groups
//! its tracks by the genres of their artists and writes a selection of genres
//! into a new playlist. It can also copy the user's top tracks into a playlist.

/// Client modules for interacting with the music service
pub mod clients;
/// Fetch, classify and write stages
pub mod pipeline;
/// Runs the sorting and favorites modes end to end
pub mod sorter;
