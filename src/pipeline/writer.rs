use log::{debug, warn};

use crate::clients::{
    errors::{Error, Result},
    service::{ADD_ITEMS_LIMIT, MusicService},
};

/// Outcome of a successful [`PlaylistWriter::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    pub written: usize,
    pub calls: usize,
}

/// Appends uris to a playlist in chunks the service accepts.
pub struct PlaylistWriter<'a, S: ?Sized> {
    service: &'a S,
}

impl<'a, S: MusicService + ?Sized> PlaylistWriter<'a, S> {
    pub fn new(service: &'a S) -> Self {
        PlaylistWriter { service }
    }

    /// Sends `uris` in order, 100 per call, the remainder in a last shorter
    /// call. Duplicates are written as given.
    ///
    /// A failed call stops the write with [`Error::PartialWrite`]; chunks
    /// sent before it stay in the playlist.
    pub async fn write(&self, playlist_id: &str, uris: &[String]) -> Result<WriteReport> {
        let mut report = WriteReport {
            written: 0,
            calls: 0,
        };
        for chunk in uris.chunks(ADD_ITEMS_LIMIT) {
            if let Err(e) = self.service.add_items(playlist_id, chunk).await {
                warn!(
                    "Adding items to {playlist_id} failed after {} of {} items",
                    report.written,
                    uris.len()
                );
                return Err(Error::PartialWrite {
                    written: report.written,
                    total: uris.len(),
                    source: Box::new(e),
                });
            }
            report.written += chunk.len();
            report.calls += 1;
            debug!(
                "Added {} items to {playlist_id} ({}/{})",
                chunk.len(),
                report.written,
                uris.len()
            );
        }
        Ok(report)
    }
}
