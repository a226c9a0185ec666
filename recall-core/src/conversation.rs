//! Conversation history with token-budgeted context windows.
//!
//! The buffer keeps at most `max_messages` messages, dropping the oldest.
//! It is not persisted on its own; callers export a [`ConversationSnapshot`]
//! and store it wherever they like.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utils::now_timestamp;

/// Default bound on retained messages
pub const DEFAULT_MAX_MESSAGES: usize = 50;

/// Default token budget for [`ConversationMemory::get_context_window`]
pub const DEFAULT_CONTEXT_TOKENS: usize = 2000;

/// Rough characters-per-token ratio used for budgeting
pub const CHARS_PER_TOKEN: usize = 4;

/// One chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: f64,
}

impl Message {
    /// Length used for token estimation
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// Exported conversation state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationSnapshot {
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Bounded, time-ordered conversation buffer.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    max_messages: usize,
    messages: Vec<Message>,
    summary: Option<String>,
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::with_max_messages(DEFAULT_MAX_MESSAGES)
    }
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer holding at most `max_messages` messages; a bound of 0 is raised to 1.
    pub fn with_max_messages(max_messages: usize) -> Self {
        Self {
            max_messages: max_messages.max(1),
            messages: Vec::new(),
            summary: None,
        }
    }

    /// Append a message stamped with the current time, then trim to the bound.
    pub fn add_message(&mut self, role: impl Into<String>, content: impl Into<String>) {
        self.messages.push(Message {
            role: role.into(),
            content: content.into(),
            timestamp: now_timestamp(),
        });
        self.enforce_bound();
    }

    fn enforce_bound(&mut self) {
        if self.messages.len() > self.max_messages {
            let excess = self.messages.len() - self.max_messages;
            self.messages.drain(..excess);
        }
    }

    /// The whole buffer, or only its last `last_n` messages.
    ///
    /// `Some(0)` is treated like `None`.
    pub fn get_messages(&self, last_n: Option<usize>) -> &[Message] {
        match last_n {
            Some(n) if n > 0 => &self.messages[self.messages.len().saturating_sub(n)..],
            _ => &self.messages,
        }
    }

    /// The longest run of most recent messages fitting in `max_tokens`.
    ///
    /// Tokens are estimated at four characters each. The walk goes newest to
    /// oldest and stops at the first message that would overflow, so the
    /// window is always a contiguous suffix of the buffer, returned in
    /// chronological order.
    pub fn get_context_window(&self, max_tokens: usize) -> Vec<Message> {
        if max_tokens == 0 {
            return Vec::new();
        }

        let max_chars = max_tokens.saturating_mul(CHARS_PER_TOKEN);
        let mut total_chars = 0usize;
        let mut start = self.messages.len();

        for (idx, msg) in self.messages.iter().enumerate().rev() {
            let msg_chars = msg.char_count();
            if total_chars + msg_chars > max_chars {
                break;
            }
            total_chars += msg_chars;
            start = idx;
        }

        self.messages[start..].to_vec()
    }

    /// Drop all messages and the summary
    pub fn clear(&mut self) {
        self.messages.clear();
        self.summary = None;
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = Some(summary.into());
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Export messages and summary.
    pub fn to_snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: self.messages.clone(),
            summary: self.summary.clone(),
        }
    }

    /// Build a buffer from a snapshot without dropping any of its messages.
    ///
    /// The bound is the default or the snapshot length, whichever is larger.
    pub fn from_snapshot(snapshot: ConversationSnapshot) -> Self {
        let mut conversation = Self::with_max_messages(DEFAULT_MAX_MESSAGES.max(snapshot.messages.len()));
        conversation.restore(snapshot);
        conversation
    }

    /// Replace this buffer's state with `snapshot`, keeping this buffer's bound.
    ///
    /// Snapshots longer than the bound keep only their newest messages.
    pub fn restore(&mut self, snapshot: ConversationSnapshot) {
        self.messages = snapshot.messages;
        self.summary = snapshot.summary;
        self.enforce_bound();
    }

    /// Export as a plain JSON mapping `{messages, summary}`.
    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.to_snapshot())?)
    }

    /// Import from a JSON mapping; missing keys mean empty / unset.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let snapshot: ConversationSnapshot = serde_json::from_value(value)?;
        Ok(Self::from_snapshot(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conversation_with(contents: &[&str]) -> ConversationMemory {
        let mut conv = ConversationMemory::new();
        for (i, content) in contents.iter().enumerate() {
            let role = if i % 2 == 0 { "user" } else { "assistant" };
            conv.add_message(role, *content);
        }
        conv
    }

    fn contents(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.content.as_str()).collect()
    }

    #[test]
    fn test_bound_drops_oldest() {
        let mut conv = ConversationMemory::with_max_messages(3);
        for content in ["1", "2", "3", "4", "5"] {
            conv.add_message("user", content);
            assert!(conv.len() <= 3);
        }

        assert_eq!(contents(conv.get_messages(None)), vec!["3", "4", "5"]);
    }

    #[test]
    fn test_get_messages_last_n() {
        let conv = conversation_with(&["a", "b", "c", "d"]);
        assert_eq!(contents(conv.get_messages(Some(2))), vec!["c", "d"]);
        assert_eq!(contents(conv.get_messages(Some(10))), vec!["a", "b", "c", "d"]);
        assert_eq!(contents(conv.get_messages(Some(0))), vec!["a", "b", "c", "d"]);
        assert_eq!(conv.len(), 4);
    }

    #[test]
    fn test_context_window_is_contiguous_suffix() {
        // 40, 8, 12, 16 chars with a budget of 10 tokens = 40 chars
        let conv = conversation_with(&[
            "a".repeat(40).as_str(),
            "b".repeat(8).as_str(),
            "c".repeat(12).as_str(),
            "d".repeat(16).as_str(),
        ]);

        let window = conv.get_context_window(10);
        let lengths: Vec<usize> = window.iter().map(|m| m.char_count()).collect();
        assert_eq!(lengths, vec![8, 12, 16]);
    }

    #[test]
    fn test_context_window_stops_at_first_overflow() {
        // The 100-char message blocks the small one before it
        let conv = conversation_with(&["tiny", "x".repeat(100).as_str(), "last"]);
        let window = conv.get_context_window(5);
        assert_eq!(contents(&window), vec!["last"]);
    }

    #[test]
    fn test_context_window_counts_chars_not_bytes() {
        let conv = conversation_with(&["ééééé", "ok"]);
        // 5 + 2 chars fit in 2 tokens (8 chars) even though é is two bytes
        assert_eq!(conv.get_context_window(2).len(), 2);
    }

    #[test]
    fn test_context_window_empty_cases() {
        assert!(ConversationMemory::new().get_context_window(2000).is_empty());

        let conv = conversation_with(&["", "hello"]);
        assert!(conv.get_context_window(0).is_empty());

        let conv = conversation_with(&["z".repeat(9).as_str()]);
        assert!(conv.get_context_window(2).is_empty());
    }

    #[test]
    fn test_clear_resets_summary() {
        let mut conv = conversation_with(&["a"]);
        conv.set_summary("talked about a");
        conv.clear();
        assert!(conv.is_empty());
        assert!(conv.summary().is_none());
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let mut conv = conversation_with(&["hi", "hello"]);
        conv.set_summary("greetings");

        let value = conv.to_value().unwrap();
        assert_eq!(value["summary"], json!("greetings"));
        assert_eq!(value["messages"][1]["role"], json!("assistant"));

        let restored = ConversationMemory::from_value(value).unwrap();
        assert_eq!(restored.to_snapshot(), conv.to_snapshot());
    }

    #[test]
    fn test_from_value_tolerates_missing_keys() {
        let conv = ConversationMemory::from_value(json!({})).unwrap();
        assert!(conv.is_empty());
        assert!(conv.summary().is_none());

        let conv = ConversationMemory::from_value(json!({
            "messages": [{"role": "user", "content": "x", "timestamp": 1.0}]
        }))
        .unwrap();
        assert_eq!(conv.len(), 1);
        assert!(conv.summary().is_none());

        assert!(ConversationMemory::from_value(json!([1, 2])).is_err());
    }

    #[test]
    fn test_import_keeps_every_message() {
        let mut conv = ConversationMemory::with_max_messages(100);
        for i in 0..80 {
            conv.add_message("user", format!("message {i}"));
        }

        let restored = ConversationMemory::from_value(conv.to_value().unwrap()).unwrap();
        assert_eq!(restored.len(), 80);
        assert_eq!(restored.max_messages(), 80);
        assert_eq!(restored.to_snapshot(), conv.to_snapshot());

        let small = ConversationMemory::from_snapshot(conversation_with(&["a", "b"]).to_snapshot());
        assert_eq!(small.max_messages(), DEFAULT_MAX_MESSAGES);
    }

    #[test]
    fn test_zero_bound_keeps_latest_message() {
        let mut conv = ConversationMemory::with_max_messages(0);
        conv.add_message("user", "first");
        conv.add_message("user", "second");
        assert_eq!(conv.max_messages(), 1);
        assert_eq!(contents(conv.get_messages(None)), vec!["second"]);
    }

    #[test]
    fn test_restore_respects_bound() {
        let big = conversation_with(&["1", "2", "3", "4"]).to_snapshot();
        let mut small = ConversationMemory::with_max_messages(2);
        small.restore(big);
        assert_eq!(contents(small.get_messages(None)), vec!["3", "4"]);
    }
}
