use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use std::sync::LazyLock;
use std::time::Duration;

use crate::api::oracle_structs::{Content, GenerateRequest, GenerateResponse, Part};
use crate::common::settings::Settings;

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Unexpected status {status}: {text}")]
    UnexpectedStatus { status: StatusCode, text: String },
    #[error("Response carried no text part")]
    EmptyResponse,
}

/// Stateless vision service: one instruction plus attached images in, one
/// text answer out. Production talks to a generative endpoint; tests
/// script the answers.
#[async_trait]
pub trait VisionOracle: Send + Sync {
    async fn generate(&self, parts: Vec<Part>) -> Result<String, OracleError>;
}

pub struct GenerativeOracleClient {
    http_client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GenerativeOracleClient {
    /// Create oracle client
    ///
    /// # Panics
    /// if it can't create the client.
    #[must_use]
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        Self {
            http_client: Client::builder()
                .connect_timeout(Duration::from_secs(5))
                .timeout(Duration::from_secs(60))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.oracle_url,
            &settings.oracle_model,
            &settings.oracle_api_key,
        )
    }
}

#[async_trait]
impl VisionOracle for GenerativeOracleClient {
    async fn generate(&self, parts: Vec<Part>) -> Result<String, OracleError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let request = GenerateRequest {
            contents: vec![Content { parts }],
        };
        let response = self.http_client.post(&url).json(&request).send().await?;

        match response.status() {
            StatusCode::OK => {
                let body: GenerateResponse = response.json().await?;
                body.first_text()
                    .map(ToString::to_string)
                    .ok_or(OracleError::EmptyResponse)
            }
            status => {
                let text = response.text().await?;
                Err(OracleError::UnexpectedStatus { status, text })
            }
        }
    }
}

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("invalid code fence regex")
});

/// Generative responses often wrap JSON in a markdown code fence; return
/// the payload inside it, or the trimmed text as-is.
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    CODE_FENCE
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map_or_else(|| text.trim(), |inner| inner.as_str())
}
