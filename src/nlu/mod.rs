//! Intent recognition for the history assistant.
//!
//! The recognizer is an external service; this module defines the seam
//! (`IntentRecognizer`) and the REST client that talks to a LUIS-style
//! endpoint (`LuisClient`).

pub mod luis;

pub use luis::{LuisClient, LuisConfig};

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::NluError;

/// Intent label the recognizer reports when nothing matched.
pub const INTENT_NONE: &str = "None";

/// Top-scoring intent guess for one utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct IntentScore {
    /// Intent label (e.g. "AMTSRememberAddress").
    pub intent: String,
    /// Classifier confidence in [0, 1].
    pub score: f32,
}

impl IntentScore {
    /// The "nothing matched" intent.
    pub fn none() -> Self {
        Self {
            intent: INTENT_NONE.to_string(),
            score: 0.0,
        }
    }
}

/// Classifier output for one inbound message. Transient — never persisted.
#[derive(Debug, Clone)]
pub struct Classification {
    /// Top intent label and confidence.
    pub top_intent: IntentScore,
    /// Extracted entities, grouped by entity kind.
    pub entities: HashMap<String, Vec<String>>,
    /// Sentiment score for the utterance, when the service provides one.
    pub sentiment: Option<f32>,
}

impl Classification {
    /// First extracted entity of the given kind, if any was found.
    pub fn first_entity(&self, kind: &str) -> Option<&str> {
        self.entities
            .get(kind)
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

/// Trait for intent recognizer backends — pure classification, no routing.
#[async_trait]
pub trait IntentRecognizer: Send + Sync {
    /// Recognizer name (for logging).
    fn name(&self) -> &str;

    /// Classify one utterance.
    async fn classify(&self, utterance: &str) -> Result<Classification, NluError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_entity_returns_first_match() {
        let mut entities = HashMap::new();
        entities.insert(
            "AMTSAddress".to_string(),
            vec!["221b baker st".to_string(), "10 downing st".to_string()],
        );
        let classification = Classification {
            top_intent: IntentScore {
                intent: "AMTSRememberAddress".into(),
                score: 0.9,
            },
            entities,
            sentiment: Some(0.5),
        };
        assert_eq!(
            classification.first_entity("AMTSAddress"),
            Some("221b baker st")
        );
        assert_eq!(classification.first_entity("datetime"), None);
    }

    #[test]
    fn none_intent_has_zero_score() {
        let none = IntentScore::none();
        assert_eq!(none.intent, INTENT_NONE);
        assert_eq!(none.score, 0.0);
    }
}
