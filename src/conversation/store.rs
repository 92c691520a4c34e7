use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;

use crate::engines::SearchResultItem;
use crate::errors::ConversationError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Per-conversation bounded history plus the cached results of the most
/// recent non-filter retrieval. Every method here is synchronous; callers
/// hold the conversation's lock (see `ConversationStore::entry`) for the
/// duration of any async work they layer on top.
pub struct MemoryManager {
    max_history: usize,
    messages: VecDeque<ConversationMessage>,
    last_results: Option<Vec<SearchResultItem>>,
}

impl MemoryManager {
    pub fn new(max_history: usize) -> Self {
        Self { max_history, messages: VecDeque::new(), last_results: None }
    }

    /// Appends a user message then an assistant message, evicting the
    /// oldest messages so the total never exceeds `max_history`.
    pub fn add_exchange(&mut self, user_text: impl Into<String>, assistant_text: impl Into<String>, now: DateTime<Utc>) {
        self.messages.push_back(ConversationMessage { role: MessageRole::User, content: user_text.into(), timestamp: now });
        self.messages.push_back(ConversationMessage { role: MessageRole::Assistant, content: assistant_text.into(), timestamp: now });
        while self.messages.len() > self.max_history {
            self.messages.pop_front();
        }
    }

    pub fn messages(&self) -> Vec<ConversationMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.last_results = None;
    }

    pub fn set_last_results(&mut self, results: Vec<SearchResultItem>) {
        self.last_results = Some(results);
    }

    pub fn get_last_results(&self) -> Option<&[SearchResultItem]> {
        self.last_results.as_deref()
    }

    pub fn has_results(&self) -> bool {
        self.last_results.as_ref().is_some_and(|r| !r.is_empty())
    }

    pub fn clear_results(&mut self) {
        self.last_results = None;
    }
}

/// The Conversation Store (component I): a process-wide, lazily-populated
/// mapping from conversation id to memory manager.
///
/// Each entry carries its own `tokio::sync::Mutex` so a long-running
/// exchange (an LLM call mid-`.await`) on one conversation never blocks
/// unrelated conversations — only concurrent requests on the *same*
/// conversation id serialize. The teacher's knowledge-graph store had no
/// such per-entry lock; its absence there was a bug this store does not
/// repeat.
pub struct ConversationStore {
    conversations: parking_lot::Mutex<HashMap<String, Arc<AsyncMutex<MemoryManager>>>>,
    default_max_history: usize,
}

impl ConversationStore {
    pub fn new(default_max_history: usize) -> Self {
        Self { conversations: parking_lot::Mutex::new(HashMap::new()), default_max_history }
    }

    /// Returns the lock-protected manager for `id`, creating an empty one
    /// if this is the first time it's been seen.
    pub fn entry(&self, id: &str) -> Arc<AsyncMutex<MemoryManager>> {
        let mut conversations = self.conversations.lock();
        conversations
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(MemoryManager::new(self.default_max_history))))
            .clone()
    }

    pub fn exists(&self, id: &str) -> bool {
        self.conversations.lock().contains_key(id)
    }

    pub fn remove(&self, id: &str) -> Result<(), ConversationError> {
        self.conversations
            .lock()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ConversationError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(0, 0).unwrap()
    }

    #[test]
    fn evicts_oldest_messages_once_capacity_is_exceeded() {
        let mut manager = MemoryManager::new(4);
        manager.add_exchange("q1", "a1", now());
        manager.add_exchange("q2", "a2", now());
        assert_eq!(manager.message_count(), 4);

        manager.add_exchange("q3", "a3", now());
        assert_eq!(manager.message_count(), 4);
        let messages = manager.messages();
        assert_eq!(messages[0].content, "q2");
        assert_eq!(messages[1].content, "a2");
        assert_eq!(messages[2].content, "q3");
        assert_eq!(messages[3].content, "a3");
    }

    #[test]
    fn clear_drops_both_history_and_cached_results() {
        let mut manager = MemoryManager::new(10);
        manager.add_exchange("q", "a", now());
        manager.set_last_results(vec![]);
        manager.clear();
        assert_eq!(manager.message_count(), 0);
        assert!(manager.get_last_results().is_none());
    }

    #[test]
    fn filter_retrieval_does_not_replace_cached_results() {
        let mut manager = MemoryManager::new(10);
        manager.set_last_results(vec![]);
        assert!(!manager.has_results());
    }
}
