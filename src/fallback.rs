use crate::lastfm::{LastFmError, ListeningHistory};
use std::sync::{Arc, Mutex};

/// "Top track of last week" text for the idle status. The first successful
/// lookup is kept for the rest of the process lifetime; failures are retried
/// on the next call.
pub struct FallbackProvider {
    history: Option<Arc<dyn ListeningHistory>>,
    username: String,
    cached: Mutex<Option<String>>,
}

impl FallbackProvider {
    pub fn new(history: Option<Arc<dyn ListeningHistory>>, username: String) -> Self {
        Self {
            history,
            username,
            cached: Mutex::new(None),
        }
    }

    pub async fn message(&self) -> String {
        if let Some(message) = self.cached() {
            return message;
        }

        let history = match &self.history {
            Some(h) => h,
            None => return String::new(),
        };

        match self.fetch(history.as_ref()).await {
            Ok(Some(message)) => {
                tracing::info!("[fallback] Cached \"{}\"", message);
                *self.cached.lock().unwrap_or_else(|e| e.into_inner()) = Some(message.clone());
                message
            }
            Ok(None) => {
                tracing::info!("[fallback] No weekly charts for {}", self.username);
                String::new()
            }
            Err(e) => {
                tracing::error!("[fallback] Failed to fetch weekly chart: {}", e);
                String::new()
            }
        }
    }

    fn cached(&self) -> Option<String> {
        self.cached
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    async fn fetch(&self, history: &dyn ListeningHistory) -> Result<Option<String>, LastFmError> {
        let periods = history.weekly_chart_periods(&self.username).await?;
        let last_week = match periods.into_iter().max_by_key(|p| p.to) {
            Some(p) => p,
            None => return Ok(None),
        };

        let tracks = history
            .weekly_track_chart(&self.username, &last_week)
            .await?;
        let top = tracks.into_iter().next().ok_or(LastFmError::Empty)?;

        Ok(Some(format!(
            "Last week top song: {} - {}",
            top.artist, top.name
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lastfm::{ChartPeriod, ChartTrack};
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeHistory {
        periods: Mutex<Vec<ChartPeriod>>,
        tracks: Vec<ChartTrack>,
        fail_periods: bool,
        calls: AtomicUsize,
        requested: Mutex<Vec<ChartPeriod>>,
    }

    impl FakeHistory {
        fn new(periods: Vec<ChartPeriod>, tracks: Vec<ChartTrack>) -> Self {
            Self {
                periods: Mutex::new(periods),
                tracks,
                fail_periods: false,
                calls: AtomicUsize::new(0),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ListeningHistory for FakeHistory {
        async fn weekly_chart_periods(
            &self,
            _username: &str,
        ) -> Result<Vec<ChartPeriod>, LastFmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_periods {
                return Err(LastFmError::Api {
                    code: 8,
                    message: "Operation failed".into(),
                });
            }
            Ok(self.periods.lock().unwrap().clone())
        }

        async fn weekly_track_chart(
            &self,
            _username: &str,
            period: &ChartPeriod,
        ) -> Result<Vec<ChartTrack>, LastFmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().unwrap().push(period.clone());
            Ok(self.tracks.clone())
        }
    }

    fn period(from: i64, to: i64) -> ChartPeriod {
        ChartPeriod {
            from: DateTime::from_timestamp(from, 0).unwrap(),
            to: DateTime::from_timestamp(to, 0).unwrap(),
        }
    }

    fn track(artist: &str, name: &str) -> ChartTrack {
        ChartTrack {
            artist: artist.into(),
            name: name.into(),
        }
    }

    fn provider(history: Arc<FakeHistory>) -> FallbackProvider {
        FallbackProvider::new(Some(history as Arc<dyn ListeningHistory>), "vladoms".into())
    }

    #[tokio::test]
    async fn test_formats_top_track_of_latest_period() {
        let history = Arc::new(FakeHistory::new(
            vec![period(100, 200), period(300, 400), period(200, 300)],
            vec![track("Boards of Canada", "Roygbiv"), track("Aphex Twin", "Xtal")],
        ));
        let message = provider(history.clone()).message().await;
        assert_eq!(message, "Last week top song: Boards of Canada - Roygbiv");
        assert_eq!(history.requested.lock().unwrap()[0], period(300, 400));
    }

    #[tokio::test]
    async fn test_second_call_uses_cache() {
        let history = Arc::new(FakeHistory::new(
            vec![period(100, 200)],
            vec![track("A", "B")],
        ));
        let p = provider(history.clone());
        let first = p.message().await;
        let calls = history.calls.load(Ordering::SeqCst);
        let second = p.message().await;
        assert_eq!(first, second);
        assert_eq!(history.calls.load(Ordering::SeqCst), calls);
    }

    #[tokio::test]
    async fn test_empty_periods_not_cached() {
        let history = Arc::new(FakeHistory::new(Vec::new(), vec![track("A", "B")]));
        let p = provider(history.clone());
        assert_eq!(p.message().await, "");
        assert!(p.cached().is_none());

        history.periods.lock().unwrap().push(period(100, 200));
        assert_eq!(p.message().await, "Last week top song: A - B");
    }

    #[tokio::test]
    async fn test_empty_track_chart_returns_empty() {
        let history = Arc::new(FakeHistory::new(vec![period(100, 200)], Vec::new()));
        let p = provider(history);
        assert_eq!(p.message().await, "");
        assert!(p.cached().is_none());
    }

    #[tokio::test]
    async fn test_failure_retried_next_call() {
        let mut fake = FakeHistory::new(vec![period(100, 200)], vec![track("A", "B")]);
        fake.fail_periods = true;
        let history = Arc::new(fake);
        let p = provider(history.clone());
        assert_eq!(p.message().await, "");
        assert_eq!(p.message().await, "");
        assert_eq!(history.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_disabled_without_history() {
        let p = FallbackProvider::new(None, "vladoms".into());
        assert_eq!(p.message().await, "");
    }
}
