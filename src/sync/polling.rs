use crate::fallback::FallbackProvider;
use crate::slack::StatusSink;
use crate::spotify::{MusicPlatform, PlaybackSnapshot, PlayerApi, SpotifyError};
use crate::status::{format_track_status, StatusPayload};
use crate::sync::token;
use crate::tokens::AuthState;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Fixed delay between polls. Failed polls are retried at the same pace.
pub const POLLING_INTERVAL: Duration = Duration::from_secs(5);
const CLEAR_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug)]
pub enum PollOutcome {
    PlayingTrack(PlaybackSnapshot),
    Idle,
    Unauthorized(String),
    Transient(SpotifyError),
    Unknown(SpotifyError),
}

pub fn classify(result: Result<Option<PlaybackSnapshot>, SpotifyError>) -> PollOutcome {
    match result {
        Ok(Some(snapshot)) if snapshot.is_playing_track() => PollOutcome::PlayingTrack(snapshot),
        Ok(_) => PollOutcome::Idle,
        Err(SpotifyError::Unauthorized(msg)) => PollOutcome::Unauthorized(msg),
        Err(e @ SpotifyError::Api { .. }) => PollOutcome::Transient(e),
        Err(e) => PollOutcome::Unknown(e),
    }
}

struct Connection {
    access_token: String,
    player: Box<dyn PlayerApi>,
}

pub struct StatusSync {
    auth: Arc<AuthState>,
    music: Arc<dyn MusicPlatform>,
    chat: Arc<dyn StatusSink>,
    fallback: FallbackProvider,
    playing_emoji: String,
    idle_emoji: String,
    interval: Duration,
    connection: Option<Connection>,
    waiting_for_login: bool,
    last_text: Option<String>,
}

impl StatusSync {
    pub fn new(
        auth: Arc<AuthState>,
        music: Arc<dyn MusicPlatform>,
        chat: Arc<dyn StatusSink>,
        fallback: FallbackProvider,
        playing_emoji: String,
        idle_emoji: String,
    ) -> Self {
        Self {
            auth,
            music,
            chat,
            fallback,
            playing_emoji,
            idle_emoji,
            interval: POLLING_INTERVAL,
            connection: None,
            waiting_for_login: false,
            last_text: None,
        }
    }

    #[cfg(test)]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::info!(
            "[sync] Starting status sync ({}s/cycle)",
            self.interval.as_secs_f32()
        );

        while !cancel.is_cancelled() {
            self.tick().await;

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!("[sync] Stopping, clearing status");
        self.clear_status().await;
    }

    async fn tick(&mut self) {
        let tokens = self.auth.get();
        if !tokens.is_authorized {
            if !self.waiting_for_login {
                tracing::info!("[sync] Not authorized yet, waiting for Spotify login");
                self.waiting_for_login = true;
            }
            return;
        }
        self.waiting_for_login = false;

        // The auth callback may have replaced the tokens since the last poll.
        let stale = self
            .connection
            .as_ref()
            .map_or(true, |c| c.access_token != tokens.access_token);
        if stale {
            self.connect(&tokens.access_token);
        }

        let result = match &self.connection {
            Some(c) => c.player.currently_playing().await,
            None => return,
        };
        self.act(classify(result)).await;
    }

    async fn act(&mut self, outcome: PollOutcome) {
        match outcome {
            PollOutcome::PlayingTrack(snapshot) => {
                let text = format_track_status(&snapshot);
                if self.last_text.as_deref() != Some(text.as_str()) {
                    tracing::info!(
                        "[sync] Playing {} {}",
                        text,
                        snapshot.external_url.as_deref().unwrap_or_default()
                    );
                }
                let payload = StatusPayload::new(&self.playing_emoji, text);
                if let Err(e) = self.chat.set_status(&payload).await {
                    tracing::error!("[slack] Failed to set playing status: {}", e);
                }
                self.last_text = Some(payload.text);
            }
            PollOutcome::Idle => {
                tracing::debug!("[sync] Nothing is playing");
                let message = self.fallback.message().await;
                let payload = StatusPayload::new(&self.idle_emoji, message);
                if let Err(e) = self.chat.set_status(&payload).await {
                    tracing::error!("[slack] Failed to set idle status: {}", e);
                    if let Err(e) = self.chat.set_status(&StatusPayload::cleared()).await {
                        tracing::error!("[slack] Failed to clear status: {}", e);
                    }
                }
                self.last_text = Some(payload.text);
            }
            PollOutcome::Unauthorized(msg) => {
                tracing::info!("[sync] Spotify unauthorized ({}), refreshing token", msg);
                if token::refresh_tokens(&self.auth, self.music.as_ref()).await {
                    let access_token = self.auth.get().access_token;
                    self.connect(&access_token);
                }
            }
            PollOutcome::Transient(e) => {
                tracing::info!("[sync] {}; resetting Spotify client", e);
                if let Some(access_token) = self.connection.as_ref().map(|c| c.access_token.clone())
                {
                    self.connect(&access_token);
                }
            }
            PollOutcome::Unknown(e) => {
                tracing::error!("[sync] Poll failed: {}", e);
            }
        }
    }

    fn connect(&mut self, access_token: &str) {
        self.connection = Some(Connection {
            access_token: access_token.to_string(),
            player: self.music.connect(access_token),
        });
    }

    async fn clear_status(&self) {
        match tokio::time::timeout(
            CLEAR_TIMEOUT,
            self.chat.set_status(&StatusPayload::cleared()),
        )
        .await
        {
            Ok(Ok(())) => tracing::info!("[sync] Status cleared"),
            Ok(Err(e)) => tracing::error!("[slack] Failed to clear status: {}", e),
            Err(_) => tracing::error!("[slack] Timed out clearing status"),
        }
    }
}
