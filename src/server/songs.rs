//! `/songs` routes: listing, lyrics lookup, update, delete and enriched create.

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::error::ApiError;
use super::state::{GuardedDetailsProvider, GuardedSongStore, ServerState};
use super::ServerConfig;
use crate::song_store::{NewSong, Song, SongStore, SongStoreError, SongStoreResult};

const DEFAULT_LIMIT: i64 = 10;
const DEFAULT_OFFSET: i64 = 0;
const MIN_NAME_CHARS: usize = 3;

#[derive(Debug, Default)]
struct ListSongsQuery {
    group: Option<String>,
    song: Option<String>,
    limit: Option<String>,
    offset: Option<String>,
}

impl ListSongsQuery {
    /// Keeps the first value of each known key. Repeated and unknown keys are
    /// ignored.
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = ListSongsQuery::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "group" => &mut query.group,
                "song" => &mut query.song,
                "limit" => &mut query.limit,
                "offset" => &mut query.offset,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        query
    }
}

/// Fields left out of the body are treated as empty and rejected by the store.
#[derive(Deserialize, Debug, Default)]
#[serde(default, rename_all = "camelCase")]
struct UpdateSongBody {
    group_name: Option<String>,
    song_name: Option<String>,
    release_date: Option<String>,
    text: Option<String>,
    link: Option<String>,
}

impl From<UpdateSongBody> for NewSong {
    fn from(body: UpdateSongBody) -> Self {
        NewSong {
            group_name: body.group_name.unwrap_or_default(),
            song_name: body.song_name.unwrap_or_default(),
            release_date: body.release_date.unwrap_or_default(),
            text: body.text.unwrap_or_default(),
            link: body.link.unwrap_or_default(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct CreateSongBody {
    group: Option<String>,
    song: Option<String>,
}

fn parse_limit(raw: Option<&str>) -> i64 {
    match raw {
        None => DEFAULT_LIMIT,
        Some(value) => match value.parse::<i64>() {
            Ok(limit) if limit > 0 => limit,
            _ => {
                warn!("Invalid limit {:?}, using default {}", value, DEFAULT_LIMIT);
                DEFAULT_LIMIT
            }
        },
    }
}

fn parse_offset(raw: Option<&str>) -> i64 {
    match raw {
        None => DEFAULT_OFFSET,
        Some(value) => match value.parse::<i64>() {
            Ok(offset) if offset >= 0 => offset,
            _ => {
                warn!(
                    "Invalid offset {:?}, using default {}",
                    value, DEFAULT_OFFSET
                );
                DEFAULT_OFFSET
            }
        },
    }
}

fn parse_song_id(raw: &str) -> Result<i64, ApiError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::BadRequest("Invalid song ID")),
    }
}

fn is_too_short(value: &str) -> bool {
    value.chars().count() < MIN_NAME_CHARS
}

/// Runs a blocking store call off the async runtime, bounded by the configured
/// store timeout. A call that overruns keeps running on the blocking pool but
/// its result is dropped.
async fn call_store<T, F>(
    store: GuardedSongStore,
    timeout: Duration,
    message: &'static str,
    op: F,
) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn SongStore) -> SongStoreResult<T> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(move || op(store.as_ref()));
    let result = match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => {
            error!("Store task failed: {}", join_err);
            return Err(ApiError::Internal(message));
        }
        Err(_) => Err(SongStoreError::Timeout(timeout)),
    };
    result.map_err(|source| ApiError::Store { message, source })
}

async fn list_songs(
    State(store): State<GuardedSongStore>,
    State(config): State<ServerConfig>,
    pairs: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<Song>>, ApiError> {
    let query = match pairs {
        Ok(Query(pairs)) => ListSongsQuery::from_pairs(pairs),
        Err(rejection) => {
            warn!("Ignoring unreadable query string: {}", rejection);
            ListSongsQuery::default()
        }
    };
    let limit = parse_limit(query.limit.as_deref());
    let offset = parse_offset(query.offset.as_deref());
    let group = query.group.unwrap_or_default();
    let song = query.song.unwrap_or_default();

    if !group.is_empty() && is_too_short(&group) {
        return Err(ApiError::BadRequest("Group name is too short"));
    }
    if !song.is_empty() && is_too_short(&song) {
        return Err(ApiError::BadRequest("Song name is too short"));
    }

    debug!(
        "Listing songs group={:?} song={:?} limit={} offset={}",
        group, song, limit, offset
    );
    let songs = call_store(
        store,
        config.store_timeout,
        "Failed to fetch songs",
        move |store| store.list_songs(&group, &song, limit, offset),
    )
    .await?;

    Ok(Json(songs))
}

async fn get_song_text(
    State(store): State<GuardedSongStore>,
    State(config): State<ServerConfig>,
    Path(id): Path<String>,
) -> Result<String, ApiError> {
    let id = parse_song_id(&id)?;
    call_store(
        store,
        config.store_timeout,
        "Failed to fetch song text",
        move |store| store.get_song_text(id),
    )
    .await
}

async fn delete_song(
    State(store): State<GuardedSongStore>,
    State(config): State<ServerConfig>,
    Path(id): Path<String>,
) -> Result<&'static str, ApiError> {
    let id = parse_song_id(&id)?;
    call_store(
        store,
        config.store_timeout,
        "Failed to delete song",
        move |store| store.delete_song(id),
    )
    .await?;

    info!("Deleted song {}", id);
    Ok("Song deleted successfully")
}

async fn update_song(
    State(store): State<GuardedSongStore>,
    State(config): State<ServerConfig>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let id = parse_song_id(&id)?;
    let body: UpdateSongBody = serde_json::from_slice(&body).map_err(|err| {
        debug!("Could not decode update body: {}", err);
        ApiError::BadRequest("Invalid request body")
    })?;
    let song = NewSong::from(body);

    call_store(
        store,
        config.store_timeout,
        "Failed to update song",
        move |store| store.update_song(id, &song),
    )
    .await?;

    info!("Updated song {}", id);
    Ok("Song updated successfully")
}

async fn create_song(
    State(store): State<GuardedSongStore>,
    State(details_provider): State<GuardedDetailsProvider>,
    State(config): State<ServerConfig>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let body: CreateSongBody = serde_json::from_slice(&body).map_err(|err| {
        debug!("Could not decode create body: {}", err);
        ApiError::BadRequest("Invalid input")
    })?;
    let group = body.group.unwrap_or_default();
    let title = body.song.unwrap_or_default();

    if is_too_short(&group) || is_too_short(&title) {
        return Err(ApiError::BadRequest(
            "Group name and song name must be at least 3 characters long",
        ));
    }

    let details = details_provider
        .fetch_details(&group, &title)
        .await
        .map_err(|source| ApiError::Enrichment {
            message: "Failed to fetch song details",
            source,
        })?;

    let song = NewSong {
        group_name: group,
        song_name: title,
        release_date: details.release_date,
        text: details.text,
        link: details.link,
    };
    let id = call_store(
        store,
        config.store_timeout,
        "Failed to save song to DB",
        move |store| store.create_song(&song),
    )
    .await?;

    info!("Created song {}", id);
    Ok(StatusCode::CREATED)
}

pub fn make_songs_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(list_songs).post(create_song))
        .route("/text/{id}", get(get_song_text))
        .route("/{id}", put(update_song).delete(delete_song))
        .with_state(state)
}
