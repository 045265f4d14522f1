//! Enrichment of new songs with details from an external lookup service.

mod client;
mod models;

pub use client::EnrichmentClient;
pub use models::{EnrichmentError, SongDetails};

use async_trait::async_trait;

/// Resolves a (group, title) pair into release date, lyrics and link.
#[async_trait]
pub trait SongDetailsProvider: Send + Sync {
    async fn fetch_details(
        &self,
        group: &str,
        title: &str,
    ) -> Result<SongDetails, EnrichmentError>;
}
