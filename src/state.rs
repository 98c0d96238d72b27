use crate::config::Config;
use crate::tokens::AuthState;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthState>,
    pub config: Config,
    pub http: reqwest::Client,
}

#[cfg(test)]
impl AppState {
    pub fn test() -> Self {
        Self {
            auth: Arc::new(AuthState::new()),
            config: Config::test(),
            http: reqwest::Client::new(),
        }
    }
}
