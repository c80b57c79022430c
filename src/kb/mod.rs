//! Knowledge-base fallback for the history assistant.
//!
//! When intent classification is not confident, the turn is answered from
//! a pre-authored Q&A corpus. The corpus lives behind an external service;
//! this module defines the seam (`KnowledgeSource`) and the REST client
//! for a QnA-Maker-style endpoint (`QnaMakerClient`).

pub mod qna;

pub use qna::{QnaConfig, QnaMakerClient};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::KbError;

/// One metadata name/value pair attached to a knowledge-base answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPair {
    pub name: String,
    pub value: String,
}

/// A candidate answer from the knowledge base. Transient.
#[derive(Debug, Clone, PartialEq)]
pub struct KbAnswer {
    /// Answer text.
    pub answer: String,
    /// Metadata pairs, in corpus order.
    pub metadata: Vec<MetadataPair>,
}

/// Trait for knowledge-base backends.
///
/// `query` returns candidates ordered by relevance; callers use the first.
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// Knowledge base name (for logging).
    fn name(&self) -> &str;

    /// Query the corpus with the full message text.
    async fn query(&self, question: &str) -> Result<Vec<KbAnswer>, KbError>;
}
