use log::debug;

use crate::clients::{
    entities::{Collection, Track},
    errors::Result,
    service::{MusicService, PAGE_LIMIT},
};

/// Reads a whole collection page by page.
pub struct PageFetcher<'a, S: ?Sized> {
    service: &'a S,
}

impl<'a, S: MusicService + ?Sized> PageFetcher<'a, S> {
    pub fn new(service: &'a S) -> Self {
        PageFetcher { service }
    }

    /// Fetches `total` items of `collection` in server order.
    ///
    /// Issues `ceil(total / 100)` page calls and none when `total` is zero.
    /// The last page is whatever the server returns for the final offset.
    pub async fn fetch_all(&self, collection: &Collection, total: u32) -> Result<Vec<Track>> {
        let mut tracks = Vec::with_capacity(total as usize);
        for offset in (0..total).step_by(PAGE_LIMIT as usize) {
            let page = self
                .service
                .collection_page(collection, offset, PAGE_LIMIT)
                .await?;
            debug!(
                "Fetched {} items of {collection} at offset {offset}",
                page.len()
            );
            tracks.extend(page);
        }
        Ok(tracks)
    }
}
