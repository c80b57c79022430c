//! Turn dispatcher — routes each inbound message to an intent handler or
//! the knowledge-base fallback.
//!
//! **Core invariant: exactly one response per inbound user message.**
//! The dispatcher is a pure async function over its collaborators; it holds
//! no per-turn state, so the invariant holds by construction.
//!
//! Flow:
//! 1. Guard — user text only; events are ignored
//! 2. Intent classification
//! 3. Confidence above threshold → intent handler; otherwise knowledge base
//! 4. Unrecognized intent labels fall through to the knowledge base

use std::sync::Arc;

use tracing::{debug, info};

use crate::channels::IncomingMessage;
use crate::config::DispatcherConfig;
use crate::dispatch::types::{ResponseKind, TurnResponse};
use crate::error::DispatchError;
use crate::kb::KnowledgeSource;
use crate::nlu::{Classification, IntentRecognizer};
use crate::store::{UserHistory, UserHistoryStore};

/// Intent: give the patient an address to remember for later recall.
pub const INTENT_REMEMBER_ADDRESS: &str = "AMTSRememberAddress";

/// Intent: recall the address given earlier.
pub const INTENT_RECALL_ADDRESS: &str = "AMTSRecallAddress";

/// Entity kind carrying the address surface text.
pub const ADDRESS_ENTITY: &str = "AMTSAddress";

const ASK_ADDRESS_TEXT: &str = "Sure Doctor, what's the address?";
const NO_ADDRESS_TEXT: &str = "I don't think you told me an address Doctor.";
const NO_MATCH_TEXT: &str = "Sorry Doctor, I'm not sure what you mean.";

/// Turn dispatcher for the history assistant.
///
/// Collaborator failures are not handled here — they propagate to the
/// host, which owns the failed-turn policy (no retries, no circuit
/// breaking).
pub struct TurnDispatcher {
    nlu: Arc<dyn IntentRecognizer>,
    kb: Arc<dyn KnowledgeSource>,
    store: Arc<dyn UserHistoryStore>,
    config: DispatcherConfig,
}

impl TurnDispatcher {
    pub fn new(
        nlu: Arc<dyn IntentRecognizer>,
        kb: Arc<dyn KnowledgeSource>,
        store: Arc<dyn UserHistoryStore>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            nlu,
            kb,
            store,
            config,
        }
    }

    /// Process one conversation turn.
    ///
    /// Returns `Ok(None)` when the turn is ignored (non-message activity),
    /// otherwise the single response to deliver on the originating channel.
    pub async fn handle_turn(
        &self,
        msg: &IncomingMessage,
    ) -> Result<Option<TurnResponse>, DispatchError> {
        if !msg.is_user_text() {
            debug!(id = %msg.id, channel = %msg.channel, "Ignoring non-message turn");
            return Ok(None);
        }

        // Per-call memory, keyed by sender. Turns for one user are
        // serialized by the host, so read-modify-write is safe here.
        let memory = self.store.get(&msg.sender).await?;

        let classification = self.nlu.classify(&msg.content).await?;
        debug!(
            id = %msg.id,
            intent = %classification.top_intent.intent,
            score = classification.top_intent.score,
            "Classified turn"
        );

        let response = if classification.top_intent.score > self.config.confidence_threshold {
            self.dispatch_intent(msg, &classification, memory).await?
        } else {
            self.knowledge_base_fallback(msg, classification.sentiment)
                .await?
        };

        info!(
            id = %msg.id,
            sender = %msg.sender,
            kind = response.kind.label(),
            "Turn dispatched"
        );
        Ok(Some(response))
    }

    /// Match the top intent to its handler.
    async fn dispatch_intent(
        &self,
        msg: &IncomingMessage,
        classification: &Classification,
        memory: UserHistory,
    ) -> Result<TurnResponse, DispatchError> {
        match classification.top_intent.intent.as_str() {
            INTENT_REMEMBER_ADDRESS => self.remember_address(msg, classification, memory).await,
            INTENT_RECALL_ADDRESS => Ok(recall_address(&memory, classification.sentiment)),
            other => {
                debug!(intent = other, "No handler for intent, using knowledge base");
                self.knowledge_base_fallback(msg, classification.sentiment)
                    .await
            }
        }
    }

    /// Store the extracted address, or prompt for one if none was found.
    ///
    /// A missing address entity is the normal "still need the address"
    /// branch, not an error; memory is untouched in that case.
    async fn remember_address(
        &self,
        msg: &IncomingMessage,
        classification: &Classification,
        mut memory: UserHistory,
    ) -> Result<TurnResponse, DispatchError> {
        match classification.first_entity(ADDRESS_ENTITY) {
            Some(address) => {
                let text = format!("Okay Doctor, {address}, I'll remember it.");
                memory.amts_address = Some(address.to_string());
                self.store.set(&msg.sender, &memory).await?;
                info!(sender = %msg.sender, "Stored address for later recall");
                Ok(TurnResponse::new(
                    ResponseKind::RememberAddress,
                    text,
                    classification.sentiment,
                ))
            }
            None => Ok(TurnResponse::new(
                ResponseKind::RememberAddress,
                ASK_ADDRESS_TEXT,
                classification.sentiment,
            )),
        }
    }

    /// Answer from the knowledge base, or emit the fixed no-match response.
    async fn knowledge_base_fallback(
        &self,
        msg: &IncomingMessage,
        sentiment: Option<f32>,
    ) -> Result<TurnResponse, DispatchError> {
        let answers = self.kb.query(&msg.content).await?;

        match answers.first() {
            Some(answer) => {
                debug!(id = %msg.id, candidates = answers.len(), "Knowledge base answered");
                Ok(
                    TurnResponse::new(ResponseKind::QnA, answer.answer.clone(), sentiment)
                        .with_metadata(&answer.metadata),
                )
            }
            None => {
                debug!(id = %msg.id, "Knowledge base had no candidates");
                Ok(TurnResponse::new(
                    ResponseKind::NoMatchFound,
                    NO_MATCH_TEXT,
                    sentiment,
                ))
            }
        }
    }
}

/// Recall the stored address, or state that none was ever given.
fn recall_address(memory: &UserHistory, sentiment: Option<f32>) -> TurnResponse {
    match memory.amts_address.as_deref() {
        Some(address) => TurnResponse::new(
            ResponseKind::RecallAddress,
            format!("I think it was {address}."),
            sentiment,
        ),
        None => TurnResponse::new(ResponseKind::RecallAddress, NO_ADDRESS_TEXT, sentiment),
    }
}
