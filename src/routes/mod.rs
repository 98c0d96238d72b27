pub mod auth;

use crate::state::AppState;
use axum::extract::State;
use axum::routing::get;
use axum::Router;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/hello", get(|| async { "Hello World!" }))
        .route("/api/health", get(health))
        .merge(auth::routes())
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({"ok": true, "authorized": state.auth.is_authorized()}))
}
