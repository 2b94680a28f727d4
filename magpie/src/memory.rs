//! Conversation memory: an ordered, append-only log of prompt/response turns.
//!
//! Memory is an explicit handle passed into each pipeline step rather than a
//! global buffer, so independent pipeline runs (e.g. one per session) never
//! observe each other's history. The only mutation is [`append`]; turns are
//! never edited or removed.
//!
//! [`append`]: ConversationMemory::append

use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;

/// One recorded exchange: what was sent to the model and what came back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryTurn {
    /// The input side of the exchange (usually the user query).
    pub input: String,
    /// The raw model output.
    pub output: String,
}

/// Ordered, append-only conversation memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationMemory {
    turns: Vec<MemoryTurn>,
}

impl ConversationMemory {
    /// Create an empty memory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a turn. Turns are kept in call order forever.
    pub fn append(&mut self, input: impl Into<String>, output: impl Into<String>) {
        self.turns.push(MemoryTurn {
            input: input.into(),
            output: output.into(),
        });
    }

    /// All recorded turns, oldest first.
    #[must_use]
    pub fn turns(&self) -> &[MemoryTurn] {
        &self.turns
    }

    /// Number of recorded turns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether no turn has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Replay the history as alternating user/assistant chat messages.
    #[must_use]
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(self.turns.len() * 2);
        for turn in &self.turns {
            messages.push(ChatMessage::user(&turn.input));
            messages.push(ChatMessage::assistant(&turn.output));
        }
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageRole;

    #[test]
    fn turns_are_kept_in_call_order() {
        let mut memory = ConversationMemory::new();
        memory.append("first", "one");
        memory.append("second", "two");
        memory.append("third", "three");

        assert_eq!(memory.len(), 3);
        let inputs: Vec<_> = memory.turns().iter().map(|t| t.input.as_str()).collect();
        assert_eq!(inputs, ["first", "second", "third"]);
    }

    #[test]
    fn earlier_turns_are_unchanged_by_later_appends() {
        let mut memory = ConversationMemory::new();
        memory.append("q1", "a1");
        let before = memory.turns()[0].clone();

        memory.append("q2", "a2");
        assert_eq!(memory.turns()[0], before);
    }

    #[test]
    fn replay_alternates_user_and_assistant() {
        let mut memory = ConversationMemory::new();
        memory.append("q", "a");
        let messages = memory.to_messages();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[0].content, "q");
        assert_eq!(messages[1].role, MessageRole::Assistant);
        assert_eq!(messages[1].content, "a");
    }

    #[test]
    fn empty_memory_replays_to_nothing() {
        let memory = ConversationMemory::new();
        assert!(memory.is_empty());
        assert!(memory.to_messages().is_empty());
    }
}
