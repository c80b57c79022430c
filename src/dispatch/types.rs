//! Shared types for turn dispatch.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::kb::MetadataPair;

// ── Response discriminator ──────────────────────────────────────────

/// The `type` discriminator carried on every outbound response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseKind {
    /// Address was (or still needs to be) given for later recall.
    #[serde(rename = "AMTSRememberAddress")]
    RememberAddress,
    /// Previously stored address was asked for.
    #[serde(rename = "AMTSRecallAddress")]
    RecallAddress,
    /// Answered from the knowledge base.
    QnA,
    /// Knowledge base had no candidate answer.
    NoMatchFound,
}

impl ResponseKind {
    /// Short label for logging — matches the wire discriminator.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RememberAddress => "AMTSRememberAddress",
            Self::RecallAddress => "AMTSRecallAddress",
            Self::QnA => "QnA",
            Self::NoMatchFound => "NoMatchFound",
        }
    }
}

// ── Turn response ───────────────────────────────────────────────────

/// Outbound turn response, serialized to a single JSON text payload.
///
/// Exactly one is produced per inbound user message. Field order mirrors
/// the channel contract: sentiment, text, type, metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnResponse {
    /// Classifier sentiment score carried over from the turn, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<f32>,
    /// Human-readable response text.
    pub text: String,
    /// Response discriminator.
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    /// Flattened knowledge-base answer metadata, when answered from the KB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl TurnResponse {
    pub fn new(kind: ResponseKind, text: impl Into<String>, sentiment: Option<f32>) -> Self {
        Self {
            sentiment,
            text: text.into(),
            kind,
            metadata: None,
        }
    }

    /// Attach flattened metadata pairs (corpus order; JSON object member
    /// order is not significant on the wire).
    pub fn with_metadata(mut self, pairs: &[MetadataPair]) -> Self {
        let mut map = Map::new();
        for pair in pairs {
            map.insert(pair.name.clone(), Value::String(pair.value.clone()));
        }
        self.metadata = Some(map);
        self
    }

    /// Serialize to the single text payload sent on the channel.
    pub fn to_wire(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_labels_match_wire_discriminators() {
        assert_eq!(ResponseKind::RememberAddress.label(), "AMTSRememberAddress");
        assert_eq!(ResponseKind::RecallAddress.label(), "AMTSRecallAddress");
        assert_eq!(ResponseKind::QnA.label(), "QnA");
        assert_eq!(ResponseKind::NoMatchFound.label(), "NoMatchFound");
    }

    #[test]
    fn wire_payload_is_valid_json_with_legacy_field_order() {
        let response = TurnResponse::new(
            ResponseKind::RememberAddress,
            "Okay Doctor, 221B Baker St, I'll remember it.",
            Some(0.5),
        );
        let wire = response.to_wire().unwrap();
        assert_eq!(
            wire,
            r#"{"sentiment":0.5,"text":"Okay Doctor, 221B Baker St, I'll remember it.","type":"AMTSRememberAddress"}"#
        );
    }

    #[test]
    fn wire_payload_escapes_embedded_quotes() {
        let response = TurnResponse::new(
            ResponseKind::QnA,
            r#"The "address" question checks recall."#,
            None,
        );
        let wire = response.to_wire().unwrap();
        // Must round-trip: embedded quotes cannot corrupt the payload.
        let parsed: TurnResponse = serde_json::from_str(&wire).unwrap();
        assert_eq!(parsed, response);
    }

    #[test]
    fn absent_sentiment_and_metadata_are_omitted() {
        let response = TurnResponse::new(ResponseKind::NoMatchFound, "no match", None);
        let wire = response.to_wire().unwrap();
        assert_eq!(wire, r#"{"text":"no match","type":"NoMatchFound"}"#);
    }

    #[test]
    fn metadata_pairs_flatten_into_object() {
        let response = TurnResponse::new(ResponseKind::QnA, "answer", Some(0.8)).with_metadata(&[
            MetadataPair {
                name: "topic".into(),
                value: "amts".into(),
            },
            MetadataPair {
                name: "source".into(),
                value: "handbook".into(),
            },
        ]);

        let value: Value = serde_json::from_str(&response.to_wire().unwrap()).unwrap();
        assert_eq!(value["metadata"]["topic"], "amts");
        assert_eq!(value["metadata"]["source"], "handbook");
        assert_eq!(value["type"], "QnA");
    }

    #[test]
    fn kind_round_trips_through_serde() {
        for kind in [
            ResponseKind::RememberAddress,
            ResponseKind::RecallAddress,
            ResponseKind::QnA,
            ResponseKind::NoMatchFound,
        ] {
            let json = serde_json::to_string(&kind).unwrap();
            let back: ResponseKind = serde_json::from_str(&json).unwrap();
            assert_eq!(back, kind);
        }
    }
}
