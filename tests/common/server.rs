//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own database and its own
//! stub lookup service.

use super::constants::*;
use axum::{extract::Query, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use songs_catalog_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use songs_catalog_server::song_store::{NewSong, SongStore, SqliteSongStore};
use songs_catalog_server::EnrichmentClient;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Stand-in for the external `/info` lookup endpoint.
async fn stub_info(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let group = params.get("group").cloned().unwrap_or_default();
    let song = params.get("song").cloned().unwrap_or_default();

    if group == BROKEN_GROUP {
        return (StatusCode::INTERNAL_SERVER_ERROR, "lookup exploded").into_response();
    }
    if group == SLOW_GROUP {
        tokio::time::sleep(Duration::from_millis(SLOW_RESPONSE_DELAY_MS)).await;
    }

    if group == KNOWN_GROUP && song == KNOWN_SONG {
        return Json(json!({
            "releaseDate": KNOWN_RELEASE_DATE,
            "text": KNOWN_TEXT,
            "link": KNOWN_LINK,
        }))
        .into_response();
    }

    // Echo the decoded query back so tests can check what actually arrived.
    Json(json!({
        "releaseDate": "2020-01-01",
        "text": format!("{}|{}", group, song),
        "link": "/songs/generic",
    }))
    .into_response()
}

async fn spawn_lookup_stub() -> (String, tokio::sync::oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind lookup stub");
    let port = listener
        .local_addr()
        .expect("Failed to get lookup stub address")
        .port();

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let router = Router::new().route("/info", get(stub_info));
    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            })
            .await
            .expect("Lookup stub failed");
    });

    (format!("http://127.0.0.1:{}", port), shutdown_tx)
}

/// Test server instance with isolated database and lookup stub
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Song store for direct database access in tests
    pub song_store: Arc<SqliteSongStore>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    _lookup_shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// This function:
    /// 1. Creates a temporary songs database
    /// 2. Starts the stub lookup service on its own random port
    /// 3. Binds to a random port (127.0.0.1:0)
    /// 4. Spawns the server in a background task
    /// 5. Waits for the server to be ready
    ///
    /// # Panics
    ///
    /// Panics if any of the above fails or the server doesn't become ready
    /// within timeout.
    pub async fn spawn() -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_db_dir.path().join("songs.db");
        let song_store = Arc::new(
            SqliteSongStore::new(&db_path, Duration::from_secs(1))
                .expect("Failed to open song store"),
        );

        let (lookup_url, lookup_shutdown_tx) = spawn_lookup_stub().await;
        let details_provider = Arc::new(
            EnrichmentClient::new(&lookup_url, Duration::from_millis(ENRICHMENT_TIMEOUT_MS))
                .expect("Failed to build enrichment client"),
        );

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            store_timeout: Duration::from_secs(2),
        };

        let app = make_app(config, song_store.clone(), details_provider);

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            song_store,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
            _lookup_shutdown_tx: Some(lookup_shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Inserts a song directly into the store, bypassing the lookup service.
    pub fn seed_song(&self, group: &str, title: &str) -> i64 {
        self.song_store
            .create_song(&NewSong {
                group_name: group.to_string(),
                song_name: title.to_string(),
                release_date: "2001-01-01".to_string(),
                text: format!("{} lyrics", title),
                link: "https://example.com/seed".to_string(),
            })
            .expect("Failed to seed song")
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(tx) = self._lookup_shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
