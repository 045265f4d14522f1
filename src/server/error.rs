//! Mapping of handler failures onto HTTP responses.
//!
//! Every failure is answered with a short plain-text message. The underlying
//! cause is logged, never sent to the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::enrichment::EnrichmentError;
use crate::song_store::SongStoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request itself is unusable: bad id, bad body, too-short filter.
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("{message}: {source}")]
    Store {
        message: &'static str,
        source: SongStoreError,
    },
    #[error("{message}: {source}")]
    Enrichment {
        message: &'static str,
        source: EnrichmentError,
    },
    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store { source, .. } => match source {
                SongStoreError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                // Missing rows and rejected payloads are reported like any other
                // storage failure.
                SongStoreError::NotFound(_)
                | SongStoreError::Validation(_)
                | SongStoreError::InvalidArgument(_)
                | SongStoreError::Query(_)
                | SongStoreError::Scan(_)
                | SongStoreError::DataIntegrity { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Enrichment { source, .. } => match source {
                EnrichmentError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                EnrichmentError::Transport(_)
                | EnrichmentError::Remote(_)
                | EnrichmentError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::BadRequest(message)
            | ApiError::Store { message, .. }
            | ApiError::Enrichment { message, .. }
            | ApiError::Internal(message) => message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_client_error() {
            warn!("{}", self);
        } else {
            error!("{}", self);
        }
        (status, self.message()).into_response()
    }
}
