use axum::extract::FromRef;

use crate::enrichment::SongDetailsProvider;
use crate::song_store::SongStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedSongStore = Arc<dyn SongStore>;
pub type GuardedDetailsProvider = Arc<dyn SongDetailsProvider>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub song_store: GuardedSongStore,
    pub details_provider: GuardedDetailsProvider,
    pub hash: String,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        song_store: GuardedSongStore,
        details_provider: GuardedDetailsProvider,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            song_store,
            details_provider,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

impl FromRef<ServerState> for GuardedSongStore {
    fn from_ref(input: &ServerState) -> Self {
        input.song_store.clone()
    }
}

impl FromRef<ServerState> for GuardedDetailsProvider {
    fn from_ref(input: &ServerState) -> Self {
        input.details_provider.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
