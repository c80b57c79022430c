//! End-to-end turn flow: dispatcher + store + channel against mock services.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use history_assist::channels::{
    Channel, CliChannel, IncomingMessage, MessageStream, OutgoingResponse,
};
use history_assist::config::DispatcherConfig;
use history_assist::dispatch::{ADDRESS_ENTITY, ResponseKind, TurnDispatcher};
use history_assist::error::{ChannelError, KbError, NluError};
use history_assist::kb::{KbAnswer, KnowledgeSource, MetadataPair};
use history_assist::nlu::{Classification, IntentRecognizer, IntentScore};
use history_assist::store::{InMemoryStore, UserHistoryStore};

// ── Mock collaborators ──────────────────────────────────────────────

/// Recognizer scripted per utterance; unknown utterances classify as
/// `None` at score 0.0 (knowledge-base path).
struct ScriptedRecognizer {
    script: HashMap<String, Classification>,
}

impl ScriptedRecognizer {
    fn new() -> Self {
        Self {
            script: HashMap::new(),
        }
    }

    fn on(
        mut self,
        utterance: &str,
        intent: &str,
        score: f32,
        entities: &[(&str, &[&str])],
    ) -> Self {
        let mut map = HashMap::new();
        for (kind, values) in entities {
            map.insert(
                kind.to_string(),
                values.iter().map(|v| v.to_string()).collect(),
            );
        }
        self.script.insert(
            utterance.to_string(),
            Classification {
                top_intent: IntentScore {
                    intent: intent.into(),
                    score,
                },
                entities: map,
                sentiment: Some(0.5),
            },
        );
        self
    }
}

#[async_trait]
impl IntentRecognizer for ScriptedRecognizer {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn classify(&self, utterance: &str) -> Result<Classification, NluError> {
        Ok(self
            .script
            .get(utterance)
            .cloned()
            .unwrap_or(Classification {
                top_intent: IntentScore::none(),
                entities: HashMap::new(),
                sentiment: Some(0.5),
            }))
    }
}

struct FixedKnowledge {
    answers: Vec<KbAnswer>,
}

#[async_trait]
impl KnowledgeSource for FixedKnowledge {
    fn name(&self) -> &str {
        "fixed-kb"
    }

    async fn query(&self, _question: &str) -> Result<Vec<KbAnswer>, KbError> {
        Ok(self.answers.clone())
    }
}

/// Channel that records every delivered payload.
#[derive(Default)]
struct CapturingChannel {
    sent: Mutex<Vec<String>>,
}

#[async_trait]
impl Channel for CapturingChannel {
    fn name(&self) -> &str {
        "capture"
    }

    async fn start(&self) -> Result<MessageStream, ChannelError> {
        Ok(Box::pin(futures::stream::empty()))
    }

    async fn respond(
        &self,
        _msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError> {
        self.sent.lock().await.push(response.content);
        Ok(())
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn build_dispatcher(
    nlu: ScriptedRecognizer,
    answers: Vec<KbAnswer>,
    store: Arc<InMemoryStore>,
) -> TurnDispatcher {
    TurnDispatcher::new(
        Arc::new(nlu),
        Arc::new(FixedKnowledge { answers }),
        store,
        DispatcherConfig::default(),
    )
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn remember_then_recall_round_trip() {
    let store = Arc::new(InMemoryStore::new());
    let nlu = ScriptedRecognizer::new()
        .on(
            "remember 10 Downing St",
            "AMTSRememberAddress",
            0.9,
            &[(ADDRESS_ENTITY, &["10 Downing St"]), ("other", &["x"])],
        )
        .on("what was the address?", "AMTSRecallAddress", 0.88, &[]);
    let dispatcher = build_dispatcher(nlu, Vec::new(), store.clone());

    // Turn 1: remember
    let remember = dispatcher
        .handle_turn(&IncomingMessage::new(
            "cli",
            "dr-watson",
            "remember 10 Downing St",
        ))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(remember.kind, ResponseKind::RememberAddress);
    assert!(remember.text.contains("10 Downing St"));
    assert_eq!(
        store.get("dr-watson").await.unwrap().amts_address.as_deref(),
        Some("10 Downing St")
    );

    // Turn 2: recall
    let recall = dispatcher
        .handle_turn(&IncomingMessage::new(
            "cli",
            "dr-watson",
            "what was the address?",
        ))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(recall.kind, ResponseKind::RecallAddress);
    assert_eq!(recall.text, "I think it was 10 Downing St.");
}

#[tokio::test]
async fn memory_is_keyed_by_sender() {
    let store = Arc::new(InMemoryStore::new());
    let nlu = ScriptedRecognizer::new()
        .on(
            "remember 221B Baker St",
            "AMTSRememberAddress",
            0.92,
            &[(ADDRESS_ENTITY, &["221B Baker St"])],
        )
        .on("recall", "AMTSRecallAddress", 0.9, &[]);
    let dispatcher = build_dispatcher(nlu, Vec::new(), store);

    dispatcher
        .handle_turn(&IncomingMessage::new(
            "cli",
            "dr-watson",
            "remember 221B Baker St",
        ))
        .await
        .unwrap();

    // A different user has no stored address.
    let recall = dispatcher
        .handle_turn(&IncomingMessage::new("cli", "dr-bell", "recall"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        recall.text,
        "I don't think you told me an address Doctor."
    );
}

#[tokio::test]
async fn low_confidence_turn_is_answered_on_the_wire() {
    let channel = CapturingChannel::default();
    let dispatcher = build_dispatcher(
        ScriptedRecognizer::new(),
        vec![KbAnswer {
            answer: "The AMTS is scored out of ten.".into(),
            metadata: vec![MetadataPair {
                name: "topic".into(),
                value: "amts".into(),
            }],
        }],
        Arc::new(InMemoryStore::new()),
    );

    let msg = IncomingMessage::new("capture", "dr-watson", "how is the AMTS scored?");
    let response = dispatcher.handle_turn(&msg).await.unwrap().unwrap();
    channel
        .respond(&msg, OutgoingResponse::new(response.to_wire().unwrap()))
        .await
        .unwrap();

    let sent = channel.sent.lock().await;
    assert_eq!(sent.len(), 1);

    let payload: serde_json::Value = serde_json::from_str(&sent[0]).unwrap();
    assert_eq!(payload["type"], "QnA");
    assert_eq!(payload["text"], "The AMTS is scored out of ten.");
    assert_eq!(payload["metadata"]["topic"], "amts");
    assert_eq!(payload["sentiment"], 0.5);
}

#[tokio::test]
async fn unanswerable_turn_reports_no_match() {
    let dispatcher = build_dispatcher(
        ScriptedRecognizer::new(),
        Vec::new(),
        Arc::new(InMemoryStore::new()),
    );

    let response = dispatcher
        .handle_turn(&IncomingMessage::new("cli", "dr-watson", "xyzzy"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response.kind, ResponseKind::NoMatchFound);

    let payload: serde_json::Value =
        serde_json::from_str(&response.to_wire().unwrap()).unwrap();
    assert_eq!(payload["type"], "NoMatchFound");
    assert_eq!(payload["text"], "Sorry Doctor, I'm not sure what you mean.");
}

#[tokio::test]
async fn cli_channel_reports_its_name() {
    // Smoke check that the concrete channel wires into the trait object.
    let channel: Box<dyn Channel> = Box::new(CliChannel::new());
    assert_eq!(channel.name(), "cli");
}
