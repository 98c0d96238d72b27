use std::env;

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub spotify_redirect_uri: String,
    pub slack_token: String,
    pub slack_user_id: String,
    pub playing_emoji: String,
    pub idle_emoji: String,
    pub lastfm_api_key: Option<String>,
    pub lastfm_username: String,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let spotify_client_id = env::var("SPOTIFY_CLIENT_ID").unwrap_or_default();
        let spotify_client_secret = env::var("SPOTIFY_CLIENT_SECRET").unwrap_or_default();
        let spotify_redirect_uri = env::var("SPOTIFY_REDIRECT_URI")
            .unwrap_or_else(|_| format!("http://localhost:{}/", port));

        let slack_token = env::var("SLACK_TOKEN").unwrap_or_default();
        let slack_user_id = env::var("SLACK_USER_ID").unwrap_or_default();
        let playing_emoji =
            env::var("SLACK_PLAYING_EMOJI").unwrap_or_else(|_| ":rainbowpls:".to_string());
        let idle_emoji = env::var("SLACK_IDLE_EMOJI").unwrap_or_else(|_| ":kumapls:".to_string());

        let lastfm_api_key = env::var("LASTFM_API_KEY").ok().filter(|s| !s.is_empty());
        let lastfm_username =
            env::var("LASTFM_USERNAME").unwrap_or_else(|_| "vladoms".to_string());

        if spotify_client_id.is_empty() || spotify_client_secret.is_empty() {
            tracing::warn!(
                "SPOTIFY_CLIENT_ID or SPOTIFY_CLIENT_SECRET not set. Spotify login will not work."
            );
        }

        if slack_token.is_empty() || slack_user_id.is_empty() {
            tracing::warn!("SLACK_TOKEN or SLACK_USER_ID not set. Status updates will fail.");
        }

        if lastfm_api_key.is_none() {
            tracing::warn!("LASTFM_API_KEY not set. Idle status will stay empty.");
        }

        Self {
            port,
            spotify_client_id,
            spotify_client_secret,
            spotify_redirect_uri,
            slack_token,
            slack_user_id,
            playing_emoji,
            idle_emoji,
            lastfm_api_key,
            lastfm_username,
        }
    }
}

#[cfg(test)]
impl Config {
    pub fn test() -> Self {
        Self {
            port: 3000,
            spotify_client_id: "test-client-id".to_string(),
            spotify_client_secret: "test-secret".to_string(),
            spotify_redirect_uri: "http://localhost:3000/".to_string(),
            slack_token: "xoxp-test".to_string(),
            slack_user_id: "U123".to_string(),
            playing_emoji: ":rainbowpls:".to_string(),
            idle_emoji: ":kumapls:".to_string(),
            lastfm_api_key: None,
            lastfm_username: "vladoms".to_string(),
        }
    }
}
