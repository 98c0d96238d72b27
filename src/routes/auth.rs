use crate::auth::{exchange_code, get_auth_url};
use crate::error::AppError;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_cookies::{Cookie, Cookies};

const STATE_COOKIE: &str = "oauth_state";

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(authorize))
}

#[derive(Deserialize)]
struct AuthorizeQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Spotify login entry-point and redirect target. Without a code it sends the
/// user to the consent page; with one it exchanges the code for tokens.
async fn authorize(
    State(state): State<AppState>,
    cookies: Cookies,
    Query(query): Query<AuthorizeQuery>,
) -> Result<Response, AppError> {
    if let Some(error) = query.error {
        return Err(AppError::BadRequest(format!(
            "Spotify authorization failed: {}",
            error
        )));
    }

    if let Some(code) = query.code.filter(|c| !c.trim().is_empty()) {
        let req_state = query
            .state
            .ok_or_else(|| AppError::BadRequest("Missing state".to_string()))?;

        let saved_state = cookies
            .get(STATE_COOKIE)
            .map(|c| c.value().to_string())
            .ok_or_else(|| AppError::BadRequest("Missing oauth_state cookie".to_string()))?;

        cookies.remove(Cookie::from(STATE_COOKIE));

        if req_state != saved_state {
            return Err(AppError::BadRequest("Invalid state".to_string()));
        }

        let tokens = exchange_code(&state.http, &state.config, &code).await?;
        let refresh_token = tokens.refresh_token.ok_or_else(|| {
            AppError::Upstream("Spotify did not return a refresh token".to_string())
        })?;

        state.auth.set_authorized(tokens.access_token, refresh_token);
        tracing::info!("[auth] Spotify account authorized");
        return Ok(Json(json!({"authorized": true})).into_response());
    }

    if state.auth.is_authorized() {
        return Ok(Json(json!({"authorized": true})).into_response());
    }

    let csrf_state = uuid::Uuid::new_v4().to_string();
    let mut cookie = Cookie::new(STATE_COOKIE, csrf_state.clone());
    cookie.set_http_only(true);
    cookie.set_same_site(tower_cookies::cookie::SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(tower_cookies::cookie::time::Duration::seconds(600));
    cookies.add(cookie);

    let url = get_auth_url(&state.config, &csrf_state);
    Ok(Redirect::temporary(&url).into_response())
}
