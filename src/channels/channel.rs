//! Channel trait and message envelope types.
//!
//! Channels are pure I/O — they convert their native format into
//! `IncomingMessage` and deliver `OutgoingResponse` payloads. All routing
//! lives in the dispatcher.

use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use uuid::Uuid;

use crate::error::ChannelError;

/// What kind of turn an inbound message represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// A user-originated text message.
    Text,
    /// A non-message event (join/leave, typing, delivery receipts).
    Event,
}

/// Unified inbound message from any channel.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Unique turn id.
    pub id: Uuid,
    /// Source channel: "cli", "webchat", etc.
    pub channel: String,
    /// Sender identity — keys the per-user memory record.
    pub sender: String,
    /// Message body content.
    pub content: String,
    /// Turn kind.
    pub kind: MessageKind,
    /// When the message was received.
    pub received_at: DateTime<Utc>,
}

impl IncomingMessage {
    /// Create a user text message.
    pub fn new(
        channel: impl Into<String>,
        sender: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.into(),
            sender: sender.into(),
            content: content.into(),
            kind: MessageKind::Text,
            received_at: Utc::now(),
        }
    }

    /// Create a non-message event.
    pub fn event(
        channel: impl Into<String>,
        sender: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            kind: MessageKind::Event,
            ..Self::new(channel, sender, content)
        }
    }

    /// Whether this turn should be dispatched at all.
    pub fn is_user_text(&self) -> bool {
        self.kind == MessageKind::Text && !self.content.trim().is_empty()
    }
}

/// Outbound payload — a single serialized text body per turn.
#[derive(Debug, Clone)]
pub struct OutgoingResponse {
    pub content: String,
}

impl OutgoingResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Stream of inbound messages produced by a channel.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// Trait for channel backends.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel name (e.g. "cli").
    fn name(&self) -> &str;

    /// Start the channel and return its inbound message stream.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Deliver a response for an inbound message.
    async fn respond(
        &self,
        msg: &IncomingMessage,
        response: OutgoingResponse,
    ) -> Result<(), ChannelError>;

    async fn health_check(&self) -> Result<(), ChannelError> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}
