use async_trait::async_trait;
use chrono::{DateTime, Utc};

const LASTFM_API_BASE: &str = "https://ws.audioscrobbler.com/2.0/";

#[derive(Debug, thiserror::Error)]
pub enum LastFmError {
    #[error("Last.fm HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Last.fm API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Last.fm returned an empty chart")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPeriod {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartTrack {
    pub artist: String,
    pub name: String,
}

#[async_trait]
pub trait ListeningHistory: Send + Sync {
    async fn weekly_chart_periods(&self, username: &str) -> Result<Vec<ChartPeriod>, LastFmError>;

    async fn weekly_track_chart(
        &self,
        username: &str,
        period: &ChartPeriod,
    ) -> Result<Vec<ChartTrack>, LastFmError>;
}

pub struct LastFm {
    http: reqwest::Client,
    api_key: String,
}

impl LastFm {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }

    async fn get(&self, params: &[(&str, &str)]) -> Result<serde_json::Value, LastFmError> {
        let mut query = vec![("api_key", self.api_key.as_str()), ("format", "json")];
        query.extend_from_slice(params);

        let body: serde_json::Value = self
            .http
            .get(LASTFM_API_BASE)
            .query(&query)
            .send()
            .await?
            .json()
            .await?;
        check_error(&body)?;
        Ok(body)
    }
}

#[async_trait]
impl ListeningHistory for LastFm {
    async fn weekly_chart_periods(&self, username: &str) -> Result<Vec<ChartPeriod>, LastFmError> {
        let body = self
            .get(&[("method", "user.getweeklychartlist"), ("user", username)])
            .await?;
        Ok(parse_chart_periods(&body))
    }

    async fn weekly_track_chart(
        &self,
        username: &str,
        period: &ChartPeriod,
    ) -> Result<Vec<ChartTrack>, LastFmError> {
        let from = period.from.timestamp().to_string();
        let to = period.to.timestamp().to_string();
        let body = self
            .get(&[
                ("method", "user.getweeklytrackchart"),
                ("user", username),
                ("from", from.as_str()),
                ("to", to.as_str()),
            ])
            .await?;
        Ok(parse_track_chart(&body))
    }
}

fn check_error(body: &serde_json::Value) -> Result<(), LastFmError> {
    match body["error"].as_i64() {
        Some(code) => Err(LastFmError::Api {
            code,
            message: body["message"].as_str().unwrap_or_default().to_string(),
        }),
        None => Ok(()),
    }
}

// Last.fm collapses single-element lists into a bare object.
fn as_list(value: &serde_json::Value) -> Vec<&serde_json::Value> {
    match value {
        serde_json::Value::Array(items) => items.iter().collect(),
        serde_json::Value::Object(_) => vec![value],
        _ => Vec::new(),
    }
}

fn parse_timestamp(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    let secs = match value {
        serde_json::Value::String(s) => s.parse().ok()?,
        other => other.as_i64()?,
    };
    DateTime::from_timestamp(secs, 0)
}

pub(crate) fn parse_chart_periods(body: &serde_json::Value) -> Vec<ChartPeriod> {
    as_list(&body["weeklychartlist"]["chart"])
        .into_iter()
        .filter_map(|chart| {
            Some(ChartPeriod {
                from: parse_timestamp(&chart["from"])?,
                to: parse_timestamp(&chart["to"])?,
            })
        })
        .collect()
}

pub(crate) fn parse_track_chart(body: &serde_json::Value) -> Vec<ChartTrack> {
    as_list(&body["weeklytrackchart"]["track"])
        .into_iter()
        .map(|track| ChartTrack {
            artist: track["artist"]["#text"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            name: track["name"].as_str().unwrap_or_default().to_string(),
        })
        .collect()
}
