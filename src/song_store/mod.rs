//! Storage for the songs catalog.
//!
//! `SongStore` is the only way the rest of the server touches the database.
//! Every write goes through [`validation`] first.

mod models;
mod schema;
mod sqlite_song_store;
pub mod validation;

pub use models::{NewSong, Song};
pub use schema::SONGS_VERSIONED_SCHEMAS;
pub use sqlite_song_store::SqliteSongStore;
pub use validation::ValidationError;

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SongStoreError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("query failed: {0}")]
    Query(#[source] rusqlite::Error),

    #[error("failed to decode song row: {0}")]
    Scan(#[source] rusqlite::Error),

    #[error("song {id} violates data integrity: {reason}")]
    DataIntegrity { id: i64, reason: &'static str },

    #[error("song with id {0} not found")]
    NotFound(i64),

    #[error("store operation did not complete within {0:?}")]
    Timeout(Duration),
}

pub type SongStoreResult<T> = Result<T, SongStoreError>;

pub trait SongStore: Send + Sync {
    /// List songs whose group and title contain the given filters
    /// (case-insensitive). An empty filter matches every row.
    fn list_songs(
        &self,
        group_filter: &str,
        title_filter: &str,
        limit: i64,
        offset: i64,
    ) -> SongStoreResult<Vec<Song>>;

    fn get_song_text(&self, id: i64) -> SongStoreResult<String>;

    /// Deleting an id that does not exist is not an error.
    fn delete_song(&self, id: i64) -> SongStoreResult<()>;

    /// Overwrites every field of the song with the given id. Updating an id
    /// that does not exist is not an error.
    fn update_song(&self, id: i64, song: &NewSong) -> SongStoreResult<()>;

    /// Returns the id assigned to the new row.
    fn create_song(&self, song: &NewSong) -> SongStoreResult<i64>;
}
