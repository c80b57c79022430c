//! LUIS REST client — `IntentRecognizer` over a v2-style prediction endpoint.

use std::collections::HashMap;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::NluError;
use crate::nlu::{Classification, IntentRecognizer, IntentScore};

/// Configuration for the LUIS prediction endpoint.
#[derive(Debug, Clone)]
pub struct LuisConfig {
    /// Base endpoint, e.g. `https://westus.api.cognitive.microsoft.com`.
    pub endpoint: String,
    /// LUIS application id.
    pub app_id: String,
    /// Subscription key sent with every request.
    pub subscription_key: SecretString,
}

impl LuisConfig {
    /// Build from environment variables. Returns `None` when the endpoint
    /// is not configured (the recognizer is simply absent).
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var("LUIS_ENDPOINT").ok()?;
        let app_id = std::env::var("LUIS_APP_ID").ok()?;
        let subscription_key = std::env::var("LUIS_SUBSCRIPTION_KEY").ok()?;

        Some(Self {
            endpoint,
            app_id,
            subscription_key: SecretString::from(subscription_key),
        })
    }
}

/// REST client for a LUIS-style intent recognition service.
pub struct LuisClient {
    http: reqwest::Client,
    config: LuisConfig,
}

impl LuisClient {
    pub fn new(config: LuisConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn prediction_url(&self) -> String {
        format!(
            "{}/luis/v2.0/apps/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.app_id,
        )
    }
}

#[async_trait]
impl IntentRecognizer for LuisClient {
    fn name(&self) -> &str {
        "luis"
    }

    async fn classify(&self, utterance: &str) -> Result<Classification, NluError> {
        let response = self
            .http
            .get(self.prediction_url())
            .header(
                "Ocp-Apim-Subscription-Key",
                self.config.subscription_key.expose_secret(),
            )
            .query(&[("q", utterance), ("verbose", "true")])
            .send()
            .await
            .map_err(|e| NluError::RequestFailed {
                reason: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NluError::RequestFailed {
                reason: format!("prediction endpoint returned {status}"),
            });
        }

        let body = response.text().await.map_err(|e| NluError::RequestFailed {
            reason: format!("failed to read response body: {e}"),
        })?;

        parse_prediction(&body)
    }
}

// ── Wire format ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictionResponse {
    #[serde(default)]
    top_scoring_intent: Option<WireIntent>,
    #[serde(default)]
    entities: Vec<WireEntity>,
    #[serde(default)]
    sentiment_analysis: Option<WireSentiment>,
}

#[derive(Debug, Deserialize)]
struct WireIntent {
    intent: String,
    #[serde(default)]
    score: f32,
}

#[derive(Debug, Deserialize)]
struct WireEntity {
    /// Matched surface text.
    entity: String,
    /// Entity kind (e.g. "AMTSAddress").
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct WireSentiment {
    score: f32,
}

/// Parse a prediction response body into a `Classification`.
///
/// A missing top intent maps to the `None` label at score 0.0 rather
/// than an error: the service returns that shape for empty apps.
fn parse_prediction(body: &str) -> Result<Classification, NluError> {
    let wire: PredictionResponse = serde_json::from_str(body)?;

    let top_intent = wire
        .top_scoring_intent
        .map(|i| IntentScore {
            intent: i.intent,
            score: i.score,
        })
        .unwrap_or_else(IntentScore::none);

    let mut entities: HashMap<String, Vec<String>> = HashMap::new();
    for entity in wire.entities {
        entities.entry(entity.kind).or_default().push(entity.entity);
    }

    Ok(Classification {
        top_intent,
        entities,
        sentiment: wire.sentiment_analysis.map(|s| s.score),
    })
}
