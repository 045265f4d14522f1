use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Details returned by the lookup service's `/info` endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongDetails {
    pub release_date: String,
    pub text: String,
    pub link: String,
}

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("failed to reach lookup service: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("lookup service responded with {0}")]
    Remote(String),

    #[error("failed to decode lookup response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("lookup service did not respond within {0:?}")]
    Timeout(Duration),
}
