use crate::config::Config;
use serde::Deserialize;

const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const SCOPE: &str = "user-read-currently-playing";

pub fn get_auth_url(config: &Config, state: &str) -> String {
    let params = [
        ("client_id", config.spotify_client_id.as_str()),
        ("response_type", "code"),
        ("redirect_uri", config.spotify_redirect_uri.as_str()),
        ("scope", SCOPE),
        ("state", state),
    ];
    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{}?{}", SPOTIFY_AUTH_URL, query)
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: i64,
}

pub async fn exchange_code(
    http: &reqwest::Client,
    config: &Config,
    code: &str,
) -> Result<TokenResponse, reqwest::Error> {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", &config.spotify_redirect_uri),
    ];
    http.post(SPOTIFY_TOKEN_URL)
        .basic_auth(&config.spotify_client_id, Some(&config.spotify_client_secret))
        .form(&params)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
}

pub async fn refresh_access_token(
    http: &reqwest::Client,
    config: &Config,
    refresh_token: &str,
) -> Result<TokenResponse, reqwest::Error> {
    let params = [
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
    ];
    http.post(SPOTIFY_TOKEN_URL)
        .basic_auth(&config.spotify_client_id, Some(&config.spotify_client_secret))
        .form(&params)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
}
