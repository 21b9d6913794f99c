//! The configuration-string assistant.
//!
//! Given a proposal's candidate names it returns an opaque string that is
//! attached to the proposal at creation. Nothing inspects its content.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistError {
    #[error("assistant needs at least two candidate options, got {0}")]
    TooFewOptions(usize),

    #[error("assistant request failed: {0}")]
    Request(String),

    #[error("assistant returned an empty configuration")]
    Empty,
}

#[async_trait]
pub trait ConfigAssistant: Send + Sync {
    async fn configure(&self, candidate_options: &[String]) -> Result<String, AssistError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssistRequest<'a> {
    candidate_options: &'a [String],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssistResponse {
    zkp_configuration: String,
}

/// Calls a text-generation service over HTTP.
#[derive(Clone)]
pub struct HttpAssistant {
    http: reqwest::Client,
    url: String,
}

impl HttpAssistant {
    pub fn new(url: impl Into<String>) -> Result<Self, AssistError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| AssistError::Request(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ConfigAssistant for HttpAssistant {
    async fn configure(&self, candidate_options: &[String]) -> Result<String, AssistError> {
        if candidate_options.len() < 2 {
            return Err(AssistError::TooFewOptions(candidate_options.len()));
        }
        let response = self
            .http
            .post(&self.url)
            .json(&AssistRequest { candidate_options })
            .send()
            .await
            .map_err(|e| AssistError::Request(e.to_string()))?;
        if !response.status().is_success() {
            return Err(AssistError::Request(format!(
                "assistant returned HTTP {}",
                response.status()
            )));
        }
        let body: AssistResponse = response
            .json()
            .await
            .map_err(|e| AssistError::Request(format!("invalid response: {e}")))?;
        if body.zkp_configuration.trim().is_empty() {
            return Err(AssistError::Empty);
        }
        Ok(body.zkp_configuration)
    }
}

/// Deterministic offline assistant: a JSON description of the ballot.
#[derive(Clone, Copy, Debug, Default)]
pub struct TemplateAssistant;

#[async_trait]
impl ConfigAssistant for TemplateAssistant {
    async fn configure(&self, candidate_options: &[String]) -> Result<String, AssistError> {
        if candidate_options.len() < 2 {
            return Err(AssistError::TooFewOptions(candidate_options.len()));
        }
        let config = serde_json::json!({
            "scheme": "commit-reveal",
            "options": candidate_options,
            "option_count": candidate_options.len(),
        });
        Ok(config.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn template_is_deterministic() {
        let options = vec!["Yes".to_string(), "No".to_string()];
        let a = TemplateAssistant.configure(&options).await.unwrap();
        let b = TemplateAssistant.configure(&options).await.unwrap();
        assert_eq!(a, b);
        assert!(a.contains("\"Yes\""));
    }

    #[tokio::test]
    async fn template_rejects_single_option() {
        let err = TemplateAssistant
            .configure(&["Only".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AssistError::TooFewOptions(1)));
    }

    #[test]
    fn request_uses_camel_case() {
        let options = vec!["A".to_string(), "B".to_string()];
        let json = serde_json::to_value(AssistRequest {
            candidate_options: &options,
        })
        .unwrap();
        assert_eq!(json["candidateOptions"][1], "B");
        let parsed: AssistResponse =
            serde_json::from_str(r#"{"zkpConfiguration":"cfg"}"#).unwrap();
        assert_eq!(parsed.zkp_configuration, "cfg");
    }
}
