//! Conversation memory — bounded per-user turn history.
//!
//! Each user has a FIFO of at most `2 × max_history` turns. The outer map
//! is only write-locked to create a user's slot; every mutation of a
//! history (append-then-trim, clear) happens under that user's own mutex,
//! so concurrent requests for the same user never lose updates and
//! requests for different users never contend.

use rustedtutor_core::error::ValidationError;
use rustedtutor_core::message::{ConversationTurn, TurnRole};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

type History = Arc<Mutex<VecDeque<ConversationTurn>>>;

/// Exchanges kept per user when no limit is configured.
pub const DEFAULT_MAX_HISTORY: usize = 10;

/// Process-lifetime store of conversation histories keyed by user id.
///
/// Entries never expire on their own; they live until [`clear`] is called
/// or the store is dropped.
///
/// [`clear`]: ConversationMemory::clear
pub struct ConversationMemory {
    max_turns: usize,
    histories: RwLock<HashMap<String, History>>,
}

impl ConversationMemory {
    /// Keep the last `max_history` exchanges (user + assistant turn pairs).
    pub fn new(max_history: usize) -> Self {
        Self {
            max_turns: max_history.max(1) * 2,
            histories: RwLock::new(HashMap::new()),
        }
    }

    /// Maximum number of turns retained per user.
    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// Append a turn given a textual role.
    ///
    /// Only `"user"` and `"assistant"` are accepted; anything else is a
    /// validation error and leaves the history untouched.
    pub async fn add_message(
        &self,
        user_id: &str,
        role: &str,
        content: impl Into<String>,
    ) -> Result<(), ValidationError> {
        let role: TurnRole = role.parse()?;
        self.push(user_id, ConversationTurn::new(role, content)).await
    }

    /// Append a typed turn, dropping the oldest turns beyond the limit.
    pub async fn push(&self, user_id: &str, turn: ConversationTurn) -> Result<(), ValidationError> {
        if user_id.is_empty() {
            return Err(ValidationError::MissingField("user_id"));
        }
        let slot = self.slot(user_id).await;
        let mut history = slot.lock().await;
        history.push_back(turn);
        self.trim(&mut history);
        Ok(())
    }

    /// Append a question and its answer as one atomic step.
    pub async fn record_exchange(
        &self,
        user_id: &str,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<(), ValidationError> {
        if user_id.is_empty() {
            return Err(ValidationError::MissingField("user_id"));
        }
        let slot = self.slot(user_id).await;
        let mut history = slot.lock().await;
        history.push_back(ConversationTurn::user(question));
        history.push_back(ConversationTurn::assistant(answer));
        self.trim(&mut history);
        debug!(user_id, turns = history.len(), "Recorded exchange");
        Ok(())
    }

    /// Snapshot of the user's history, oldest first. Empty for unknown users.
    pub async fn history(&self, user_id: &str) -> Vec<ConversationTurn> {
        self.recent(user_id, usize::MAX).await
    }

    /// The last `n` turns of the user's history, oldest first.
    pub async fn recent(&self, user_id: &str, n: usize) -> Vec<ConversationTurn> {
        let slot = self.histories.read().await.get(user_id).cloned();
        let Some(slot) = slot else {
            return Vec::new();
        };
        let history = slot.lock().await;
        let skip = history.len().saturating_sub(n);
        history.iter().skip(skip).cloned().collect()
    }

    /// Reset the user's history. Idempotent; unknown users are a no-op.
    pub async fn clear(&self, user_id: &str) {
        let slot = self.histories.read().await.get(user_id).cloned();
        if let Some(slot) = slot {
            slot.lock().await.clear();
            debug!(user_id, "Cleared conversation history");
        }
    }

    /// Number of users with a history slot.
    pub async fn user_count(&self) -> usize {
        self.histories.read().await.len()
    }

    async fn slot(&self, user_id: &str) -> History {
        if let Some(slot) = self.histories.read().await.get(user_id) {
            return slot.clone();
        }
        self.histories
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }

    fn trim(&self, history: &mut VecDeque<ConversationTurn>) {
        while history.len() > self.max_turns {
            history.pop_front();
        }
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}
