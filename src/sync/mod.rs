pub mod polling;
pub mod token;

use crate::fallback::FallbackProvider;
use crate::lastfm::{LastFm, ListeningHistory};
use crate::slack::Slack;
use crate::spotify::Spotify;
use crate::state::AppState;
use polling::StatusSync;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub fn start_sync(state: &AppState, cancel: CancellationToken) -> JoinHandle<()> {
    tracing::info!("[sync] Starting background sync");

    let config = &state.config;
    let history = config.lastfm_api_key.as_ref().map(|key| {
        Arc::new(LastFm::new(state.http.clone(), key.clone())) as Arc<dyn ListeningHistory>
    });

    let sync = StatusSync::new(
        state.auth.clone(),
        Arc::new(Spotify::new(state.http.clone(), config.clone())),
        Arc::new(Slack::new(state.http.clone(), config)),
        FallbackProvider::new(history, config.lastfm_username.clone()),
        config.playing_emoji.clone(),
        config.idle_emoji.clone(),
    );

    tokio::spawn(sync.run(cancel))
}
