//! SQLite schema for the songs database.
//!
//! Columns carry no NOT NULL constraints: song invariants are enforced by
//! validation at write time, not by the store.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};

const SONGS_TABLE_V1: Table = Table {
    name: "songs",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("group_name", &SqlType::Text),
        sqlite_column!("song_name", &SqlType::Text),
        sqlite_column!("release_date", &SqlType::Text),
        sqlite_column!("text", &SqlType::Text),
        sqlite_column!("link", &SqlType::Text),
    ],
    indices: &[("idx_songs_group_name", "group_name")],
};

pub const SONGS_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[SONGS_TABLE_V1],
}];
