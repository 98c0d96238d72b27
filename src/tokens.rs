use std::sync::Mutex;

/// OAuth token pair for the Spotify account, held for the process lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    pub is_authorized: bool,
    pub access_token: String,
    pub refresh_token: String,
}

/// Shared authorization state. Written by the auth callback and by the sync
/// loop on refresh; both tokens are always replaced together.
pub struct AuthState {
    inner: Mutex<Tokens>,
}

impl AuthState {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Tokens::default()),
        }
    }

    pub fn get(&self) -> Tokens {
        self.lock().clone()
    }

    pub fn is_authorized(&self) -> bool {
        self.lock().is_authorized
    }

    pub fn set_authorized(&self, access_token: String, refresh_token: String) {
        let mut inner = self.lock();
        *inner = Tokens {
            is_authorized: true,
            access_token,
            refresh_token,
        };
        tracing::info!("[auth] Authorization state updated");
    }

    /// Stores refreshed tokens unless the pair was re-authorized while the
    /// refresh was in flight, in which case the newer pair wins.
    pub fn replace_refreshed(
        &self,
        previous_refresh_token: &str,
        access_token: String,
        refresh_token: String,
    ) -> bool {
        let mut inner = self.lock();
        if inner.refresh_token != previous_refresh_token {
            return false;
        }
        *inner = Tokens {
            is_authorized: true,
            access_token,
            refresh_token,
        };
        true
    }

    // A poisoned lock still holds a whole token pair, so keep using it.
    fn lock(&self) -> std::sync::MutexGuard<'_, Tokens> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new()
    }
}
