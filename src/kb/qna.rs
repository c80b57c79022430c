//! QnA Maker REST client — `KnowledgeSource` over a generateAnswer endpoint.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::error::KbError;
use crate::kb::{KbAnswer, KnowledgeSource, MetadataPair};

/// The qnaId the service uses for its "no good match" sentinel answer.
const NO_MATCH_SENTINEL_ID: i64 = -1;

/// Configuration for a QnA Maker knowledge base endpoint.
#[derive(Debug, Clone)]
pub struct QnaConfig {
    /// Base endpoint, e.g. `https://myservice.azurewebsites.net`.
    pub endpoint: String,
    /// Knowledge base id.
    pub kb_id: String,
    /// Endpoint key sent in the Authorization header.
    pub endpoint_key: SecretString,
}

impl QnaConfig {
    /// Build from environment variables. Returns `None` when the endpoint
    /// is not configured.
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var("QNA_ENDPOINT").ok()?;
        let kb_id = std::env::var("QNA_KB_ID").ok()?;
        let endpoint_key = std::env::var("QNA_ENDPOINT_KEY").ok()?;

        Some(Self {
            endpoint,
            kb_id,
            endpoint_key: SecretString::from(endpoint_key),
        })
    }
}

/// REST client for a QnA-Maker-style knowledge base service.
pub struct QnaMakerClient {
    http: reqwest::Client,
    config: QnaConfig,
}

impl QnaMakerClient {
    pub fn new(config: QnaConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn answer_url(&self) -> String {
        format!(
            "{}/qnamaker/knowledgebases/{}/generateAnswer",
            self.config.endpoint.trim_end_matches('/'),
            self.config.kb_id,
        )
    }
}

#[async_trait]
impl KnowledgeSource for QnaMakerClient {
    fn name(&self) -> &str {
        "qna-maker"
    }

    async fn query(&self, question: &str) -> Result<Vec<KbAnswer>, KbError> {
        let response = self
            .http
            .post(self.answer_url())
            .header(
                "Authorization",
                format!("EndpointKey {}", self.config.endpoint_key.expose_secret()),
            )
            .json(&json!({ "question": question }))
            .send()
            .await
            .map_err(|e| KbError::RequestFailed {
                reason: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(KbError::RequestFailed {
                reason: format!("generateAnswer endpoint returned {status}"),
            });
        }

        let body = response.text().await.map_err(|e| KbError::RequestFailed {
            reason: format!("failed to read response body: {e}"),
        })?;

        parse_answers(&body)
    }
}

// ── Wire format ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateAnswerResponse {
    #[serde(default)]
    answers: Vec<WireAnswer>,
}

#[derive(Debug, Deserialize)]
struct WireAnswer {
    answer: String,
    #[serde(default)]
    metadata: Vec<WireMetadata>,
    /// The service reports its no-match sentinel with id -1.
    #[serde(default)]
    id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct WireMetadata {
    name: String,
    value: String,
}

/// Parse a generateAnswer response body into ordered candidates.
///
/// The service never returns an empty `answers` array — an unanswerable
/// question yields a single sentinel answer with id -1. That sentinel is
/// filtered here so callers see an empty candidate list instead.
fn parse_answers(body: &str) -> Result<Vec<KbAnswer>, KbError> {
    let wire: GenerateAnswerResponse = serde_json::from_str(body)?;

    Ok(wire
        .answers
        .into_iter()
        .filter(|a| a.id != Some(NO_MATCH_SENTINEL_ID))
        .map(|a| KbAnswer {
            answer: a.answer,
            metadata: a
                .metadata
                .into_iter()
                .map(|m| MetadataPair {
                    name: m.name,
                    value: m.value,
                })
                .collect(),
        })
        .collect())
}
