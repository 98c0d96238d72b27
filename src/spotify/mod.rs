pub mod player;

use crate::auth::{refresh_access_token, TokenResponse};
use crate::config::Config;
use async_trait::async_trait;

pub use player::PlaybackSnapshot;

const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

#[derive(Debug, thiserror::Error)]
pub enum SpotifyError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Spotify API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for SpotifyError {
    fn from(e: reqwest::Error) -> Self {
        match e.status() {
            Some(status) if status == reqwest::StatusCode::UNAUTHORIZED => {
                SpotifyError::Unauthorized(e.to_string())
            }
            Some(status) => SpotifyError::Api {
                status: status.as_u16(),
                message: e.to_string(),
            },
            None if e.is_decode() => SpotifyError::Decode(e.to_string()),
            None => SpotifyError::Transport(e.to_string()),
        }
    }
}

/// A player handle bound to one access token.
#[async_trait]
pub trait PlayerApi: Send + Sync {
    async fn currently_playing(&self) -> Result<Option<PlaybackSnapshot>, SpotifyError>;
}

/// Builds player handles and refreshes tokens against the accounts service.
#[async_trait]
pub trait MusicPlatform: Send + Sync {
    fn connect(&self, access_token: &str) -> Box<dyn PlayerApi>;

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, SpotifyError>;
}

pub struct Spotify {
    http: reqwest::Client,
    config: Config,
}

impl Spotify {
    pub fn new(http: reqwest::Client, config: Config) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl MusicPlatform for Spotify {
    fn connect(&self, access_token: &str) -> Box<dyn PlayerApi> {
        Box::new(SpotifyPlayer {
            http: self.http.clone(),
            access_token: access_token.to_string(),
        })
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, SpotifyError> {
        Ok(refresh_access_token(&self.http, &self.config, refresh_token).await?)
    }
}

pub struct SpotifyPlayer {
    http: reqwest::Client,
    access_token: String,
}

#[async_trait]
impl PlayerApi for SpotifyPlayer {
    async fn currently_playing(&self) -> Result<Option<PlaybackSnapshot>, SpotifyError> {
        let url = format!("{}/me/player/currently-playing", SPOTIFY_API_BASE);
        let res = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = res.status().as_u16();
        if status == 204 {
            return Ok(None);
        }
        if status >= 400 {
            let body: serde_json::Value = res.json().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        let body: serde_json::Value = res
            .json()
            .await
            .map_err(|e| SpotifyError::Decode(e.to_string()))?;
        Ok(player::parse_currently_playing(&body))
    }
}

fn api_error(status: u16, body: &serde_json::Value) -> SpotifyError {
    let message = body["error"]["message"]
        .as_str()
        .unwrap_or("no message")
        .to_string();
    if status == 401 {
        SpotifyError::Unauthorized(message)
    } else {
        SpotifyError::Api { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_401_is_unauthorized() {
        let body = json!({"error": {"status": 401, "message": "The access token expired"}});
        match api_error(401, &body) {
            SpotifyError::Unauthorized(msg) => assert_eq!(msg, "The access token expired"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_other_status_is_api_error() {
        let body = json!({"error": {"status": 503, "message": "Service unavailable"}});
        match api_error(503, &body) {
            SpotifyError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "Service unavailable");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_error_without_body() {
        match api_error(429, &serde_json::Value::Null) {
            SpotifyError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "no message");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_url_construction() {
        let url = format!("{}/me/player/currently-playing", SPOTIFY_API_BASE);
        assert_eq!(url, "https://api.spotify.com/v1/me/player/currently-playing");
    }

    async fn serve() -> String {
        use axum::{http::StatusCode, routing::get, Router};

        let app = Router::new()
            .route("/expired", get(|| async { StatusCode::UNAUTHORIZED }))
            .route("/limited", get(|| async { StatusCode::TOO_MANY_REQUESTS }))
            .route("/garbage", get(|| async { "not json" }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    async fn status_error(url: &str) -> SpotifyError {
        let res = reqwest::get(url).await.unwrap();
        res.error_for_status().unwrap_err().into()
    }

    #[tokio::test]
    async fn test_http_401_maps_to_unauthorized() {
        let base = serve().await;
        match status_error(&format!("{}/expired", base)).await {
            SpotifyError::Unauthorized(msg) => assert!(msg.contains("401")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_other_http_status_maps_to_api() {
        let base = serve().await;
        match status_error(&format!("{}/limited", base)).await {
            SpotifyError::Api { status, .. } => assert_eq!(status, 429),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_bad_body_maps_to_decode() {
        let base = serve().await;
        let err = reqwest::get(format!("{}/garbage", base))
            .await
            .unwrap()
            .json::<serde_json::Value>()
            .await
            .unwrap_err();
        assert!(matches!(SpotifyError::from(err), SpotifyError::Decode(_)));
    }

    #[tokio::test]
    async fn test_connection_failure_maps_to_transport() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = reqwest::get(format!("http://{}/", addr)).await.unwrap_err();
        assert!(matches!(SpotifyError::from(err), SpotifyError::Transport(_)));
    }
}
