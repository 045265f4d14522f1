use super::models::{NewSong, Song};
use super::schema::SONGS_VERSIONED_SCHEMAS;
use super::validation::validate_song;
use super::{SongStore, SongStoreError, SongStoreResult};
use crate::sqlite_persistence::{VersionedSchema, BASE_DB_VERSION};
use anyhow::{Context, Result};
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info};

/// Unicode-aware lowercase, registered on every connection. SQLite's own
/// `lower()` and `LIKE` only fold ASCII.
const CASEFOLD_FUNCTION: &str = "casefold";

const LIST_SONGS_SQL: &str = "SELECT id, group_name, song_name, release_date, text, link
    FROM songs
    WHERE instr(casefold(group_name), ?1) > 0 AND instr(casefold(song_name), ?2) > 0
    ORDER BY id
    LIMIT ?3 OFFSET ?4";

pub struct SqliteSongStore {
    conn: Arc<Mutex<Connection>>,
}

fn latest_schema() -> &'static VersionedSchema {
    &SONGS_VERSIONED_SCHEMAS[SONGS_VERSIONED_SCHEMAS.len() - 1]
}

impl SqliteSongStore {
    /// Opens (or creates) the songs database at `db_path`.
    ///
    /// A fresh file gets the latest schema; an existing one must carry a known
    /// schema version and match its table layout.
    pub fn new<P: AsRef<Path>>(db_path: P, busy_timeout: Duration) -> Result<Self> {
        let path = db_path.as_ref();
        let is_new_db = !path.exists();

        let conn = Connection::open(path).context("Failed to open songs database")?;
        conn.busy_timeout(busy_timeout)?;

        if is_new_db {
            info!("Creating new songs database at {:?}", path);
            latest_schema().create(&conn)?;
        } else {
            let raw_version: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
            let db_version = raw_version - BASE_DB_VERSION as i64;

            let schema = SONGS_VERSIONED_SCHEMAS
                .iter()
                .find(|s| s.version as i64 == db_version)
                .with_context(|| format!("Unknown songs database version {}", db_version))?;
            schema.validate(&conn).with_context(|| {
                format!(
                    "Songs database schema validation failed for version {}",
                    db_version
                )
            })?;
            info!("Opened songs database at {:?} (version {})", path, db_version);
        }

        Self::from_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        latest_schema().create(&conn)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.create_scalar_function(
            CASEFOLD_FUNCTION,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let value: Option<String> = ctx.get(0)?;
                Ok(value.map(|v| v.to_lowercase()))
            },
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn row_to_song(row: &rusqlite::Row) -> rusqlite::Result<Song> {
        Ok(Song {
            id: row.get("id")?,
            group_name: row.get("group_name")?,
            song_name: row.get("song_name")?,
            release_date: row.get("release_date")?,
            text: row.get("text")?,
            link: row.get("link")?,
        })
    }

    fn check_id(id: i64) -> SongStoreResult<()> {
        if id <= 0 {
            return Err(SongStoreError::InvalidArgument(format!(
                "song id must be positive, got {}",
                id
            )));
        }
        Ok(())
    }
}

/// Decoding problems are reported apart from failures to talk to the store.
fn classify_read_error(err: rusqlite::Error) -> SongStoreError {
    match err {
        rusqlite::Error::InvalidColumnType(..) | rusqlite::Error::FromSqlConversionFailure(..) => {
            SongStoreError::Scan(err)
        }
        other => SongStoreError::Query(other),
    }
}

impl SongStore for SqliteSongStore {
    fn list_songs(
        &self,
        group_filter: &str,
        title_filter: &str,
        limit: i64,
        offset: i64,
    ) -> SongStoreResult<Vec<Song>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare_cached(LIST_SONGS_SQL)
            .map_err(SongStoreError::Query)?;
        let mut rows = stmt
            .query(params![
                group_filter.to_lowercase(),
                title_filter.to_lowercase(),
                limit,
                offset
            ])
            .map_err(SongStoreError::Query)?;

        let mut songs = Vec::new();
        while let Some(row) = rows.next().map_err(SongStoreError::Query)? {
            let song = Self::row_to_song(row).map_err(SongStoreError::Scan)?;
            if song.group_name.is_empty() || song.song_name.is_empty() {
                return Err(SongStoreError::DataIntegrity {
                    id: song.id,
                    reason: "missing group name or song name",
                });
            }
            songs.push(song);
        }
        Ok(songs)
    }

    fn get_song_text(&self, id: i64) -> SongStoreResult<String> {
        Self::check_id(id)?;

        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT text FROM songs WHERE id = ?1",
            params![id],
            |row| row.get::<_, String>(0),
        )
        .map_err(|err| match err {
            rusqlite::Error::QueryReturnedNoRows => SongStoreError::NotFound(id),
            other => classify_read_error(other),
        })
    }

    fn delete_song(&self, id: i64) -> SongStoreResult<()> {
        Self::check_id(id)?;

        let conn = self.conn.lock().unwrap();
        let deleted = conn
            .execute("DELETE FROM songs WHERE id = ?1", params![id])
            .map_err(SongStoreError::Query)?;
        debug!("Deleted {} row(s) for song {}", deleted, id);
        Ok(())
    }

    fn update_song(&self, id: i64, song: &NewSong) -> SongStoreResult<()> {
        Self::check_id(id)?;
        validate_song(song)?;

        let conn = self.conn.lock().unwrap();
        let updated = conn
            .execute(
                "UPDATE songs
                 SET group_name = ?1, song_name = ?2, release_date = ?3, text = ?4, link = ?5
                 WHERE id = ?6",
                params![
                    song.group_name,
                    song.song_name,
                    song.release_date,
                    song.text,
                    song.link,
                    id
                ],
            )
            .map_err(SongStoreError::Query)?;
        debug!("Updated {} row(s) for song {}", updated, id);
        Ok(())
    }

    fn create_song(&self, song: &NewSong) -> SongStoreResult<i64> {
        validate_song(song)?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO songs (group_name, song_name, release_date, text, link)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                song.group_name,
                song.song_name,
                song.release_date,
                song.text,
                song.link
            ],
        )
        .map_err(SongStoreError::Query)?;
        Ok(conn.last_insert_rowid())
    }
}
