//! Conversation history data structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One role-tagged message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    /// Create a user turn
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    /// Create an assistant turn
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Ordered turns of one session.
///
/// Stored as a bare JSON array of `{role, text}` objects. Turns are only ever
/// appended as a (user, assistant) pair, so a stored history never holds a
/// prompt without its reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    turns: Vec<Turn>,
}

impl History {
    /// Create an empty history
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Append a completed exchange
    pub fn push_exchange(&mut self, prompt: impl Into<String>, reply: impl Into<String>) {
        self.turns.push(Turn::user(prompt));
        self.turns.push(Turn::assistant(reply));
    }

    /// Serialize to the cache value format
    pub fn encode(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a cache value
    pub fn decode(raw: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_exchange_appends_pair_in_order() {
        let mut history = History::new();
        history.push_exchange("Hi", "Hello!");
        history.push_exchange("How are you?", "Fine.");

        let roles: Vec<Role> = history.turns().iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
        assert_eq!(history.turns()[2].text, "How are you?");
    }

    #[test]
    fn test_encode_matches_stored_layout() {
        let mut history = History::new();
        history.push_exchange("Hi", "Hello!");

        assert_eq!(
            history.encode().unwrap(),
            r#"[{"role":"user","text":"Hi"},{"role":"assistant","text":"Hello!"}]"#
        );
    }

    #[test]
    fn test_decode_preserves_order_and_count() {
        let turns: Vec<Turn> = (0..7)
            .map(|i| {
                if i % 2 == 0 {
                    Turn::user(format!("q{}", i))
                } else {
                    Turn::assistant(format!("a{}", i))
                }
            })
            .collect();
        let history = History::from_turns(turns.clone());

        let decoded = History::decode(&history.encode().unwrap()).unwrap();
        assert_eq!(decoded.into_turns(), turns);
    }

    #[test]
    fn test_decode_rejects_unknown_role() {
        let err = History::decode(r#"[{"role":"system","text":"x"}]"#).unwrap_err();
        assert!(matches!(err, crate::Error::Serialization(_)));
    }
}
