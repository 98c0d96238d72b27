use crate::config::Config;
use crate::status::StatusPayload;
use async_trait::async_trait;
use serde_json::json;

const SLACK_PROFILE_SET_URL: &str = "https://slack.com/api/users.profile.set";

#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    #[error("Slack HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Slack API error: {0}")]
    Api(String),
}

#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn set_status(&self, payload: &StatusPayload) -> Result<(), SlackError>;
}

pub struct Slack {
    http: reqwest::Client,
    token: String,
    user_id: String,
}

impl Slack {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            token: config.slack_token.clone(),
            user_id: config.slack_user_id.clone(),
        }
    }
}

pub(crate) fn build_profile_body(user_id: &str, payload: &StatusPayload) -> serde_json::Value {
    json!({
        "user": user_id,
        "profile": {
            "status_text": payload.text,
            "status_emoji": payload.emoji,
            "status_expiration": 0,
        }
    })
}

pub(crate) fn check_response(body: &serde_json::Value) -> Result<(), SlackError> {
    if body["ok"].as_bool() == Some(true) {
        return Ok(());
    }
    let error = body["error"].as_str().unwrap_or("unknown_error");
    Err(SlackError::Api(error.to_string()))
}

#[async_trait]
impl StatusSink for Slack {
    async fn set_status(&self, payload: &StatusPayload) -> Result<(), SlackError> {
        if payload.is_cleared() {
            tracing::debug!("[slack] Clearing status for {}", self.user_id);
        }
        let body = build_profile_body(&self.user_id, payload);
        let res: serde_json::Value = self
            .http
            .post(SLACK_PROFILE_SET_URL)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        check_response(&res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_body_structure() {
        let payload = StatusPayload::new(":rainbowpls:", "Boards of Canada - Roygbiv".into());
        let body = build_profile_body("U123", &payload);
        assert_eq!(body["user"], "U123");
        assert_eq!(body["profile"]["status_emoji"], ":rainbowpls:");
        assert_eq!(body["profile"]["status_text"], "Boards of Canada - Roygbiv");
        assert_eq!(body["profile"]["status_expiration"], 0);
    }

    #[test]
    fn test_cleared_body_has_empty_fields() {
        let body = build_profile_body("U123", &StatusPayload::cleared());
        assert_eq!(body["profile"]["status_emoji"], "");
        assert_eq!(body["profile"]["status_text"], "");
    }

    #[test]
    fn test_ok_response() {
        assert!(check_response(&json!({"ok": true})).is_ok());
    }

    #[test]
    fn test_error_response() {
        let err = check_response(&json!({"ok": false, "error": "invalid_auth"})).unwrap_err();
        assert_eq!(err.to_string(), "Slack API error: invalid_auth");
    }

    #[test]
    fn test_malformed_response_is_error() {
        assert!(check_response(&json!({})).is_err());
    }
}
