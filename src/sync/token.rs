use crate::spotify::MusicPlatform;
use crate::tokens::AuthState;

/// Exchanges the stored refresh token for a new pair.
/// Returns false if the refresh failed; the previous tokens stay in place and
/// the next poll retries.
pub async fn refresh_tokens(auth: &AuthState, music: &dyn MusicPlatform) -> bool {
    let current = auth.get();
    if current.refresh_token.is_empty() {
        tracing::warn!("[token] No refresh token, waiting for login");
        return false;
    }

    match music.refresh(&current.refresh_token).await {
        Ok(result) => {
            // Spotify may omit refresh_token; keep using the old one then.
            let refresh_token = result
                .refresh_token
                .unwrap_or_else(|| current.refresh_token.clone());
            let expires_in = result.expires_in;
            if auth.replace_refreshed(&current.refresh_token, result.access_token, refresh_token) {
                tracing::info!("[token] Access token refreshed, expires in {}s", expires_in);
            } else {
                tracing::info!("[token] Tokens changed during refresh, keeping newer login");
            }
            true
        }
        Err(e) => {
            tracing::error!("[token] Failed to refresh token: {}", e);
            false
        }
    }
}
