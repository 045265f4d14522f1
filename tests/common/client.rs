//! HTTP client for end-to-end tests
//!
//! This module provides a thin wrapper around reqwest with one method per
//! songs-server endpoint.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    pub async fn get_home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    // ========================================================================
    // Songs Endpoints
    // ========================================================================

    /// GET /songs with the given query pairs
    pub async fn list_songs(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/songs", self.base_url))
            .query(query)
            .send()
            .await
            .expect("List songs request failed")
    }

    /// GET /songs/text/{id}; the id is sent verbatim so invalid ids can be tested
    pub async fn get_song_text(&self, id: &str) -> Response {
        self.client
            .get(format!("{}/songs/text/{}", self.base_url, id))
            .send()
            .await
            .expect("Get song text request failed")
    }

    pub async fn delete_song(&self, id: &str) -> Response {
        self.client
            .delete(format!("{}/songs/{}", self.base_url, id))
            .send()
            .await
            .expect("Delete song request failed")
    }

    pub async fn update_song(&self, id: &str, body: serde_json::Value) -> Response {
        self.client
            .put(format!("{}/songs/{}", self.base_url, id))
            .json(&body)
            .send()
            .await
            .expect("Update song request failed")
    }

    /// PUT /songs/{id} with a raw, possibly malformed body
    pub async fn update_song_raw(&self, id: &str, body: &str) -> Response {
        self.client
            .put(format!("{}/songs/{}", self.base_url, id))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Update song request failed")
    }

    pub async fn create_song(&self, group: &str, song: &str) -> Response {
        self.create_song_raw(&json!({ "group": group, "song": song }).to_string())
            .await
    }

    /// POST /songs with a raw, possibly malformed body
    pub async fn create_song_raw(&self, body: &str) -> Response {
        self.client
            .post(format!("{}/songs", self.base_url))
            .header("content-type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .expect("Create song request failed")
    }
}
