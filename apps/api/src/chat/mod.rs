//! Résumé assistant: free-form questions answered over the uploaded résumé.

pub mod handlers;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::formatting::format;

/// Number of turns returned for display.
pub const CHAT_DISPLAY_LIMIT: usize = 10;

pub const QUICK_QUESTIONS: [&str; 5] = [
    "What are the strongest points of my resume?",
    "What skills should I highlight more?",
    "How can I improve my resume summary?",
    "What experience should I emphasize?",
    "Are there any red flags in my resume?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

/// A turn as shown in the conversation panel. Assistant answers carry display markup.
#[derive(Debug, Clone, Serialize)]
pub struct TurnView {
    pub role: Role,
    pub content: String,
    pub markup: Option<String>,
    pub at: DateTime<Utc>,
}

impl From<&ConversationTurn> for TurnView {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            role: turn.role,
            content: turn.content.clone(),
            markup: (turn.role == Role::Assistant).then(|| format(&turn.content)),
            at: turn.at,
        }
    }
}

/// The most recent `CHAT_DISPLAY_LIMIT` turns, newest first.
pub fn recent_turns(log: &[ConversationTurn]) -> Vec<TurnView> {
    log.iter()
        .rev()
        .take(CHAT_DISPLAY_LIMIT)
        .map(TurnView::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_turns_newest_first_and_capped() {
        let log: Vec<ConversationTurn> = (0..14)
            .map(|i| ConversationTurn::user(format!("question {i}")))
            .collect();

        let recent = recent_turns(&log);
        assert_eq!(recent.len(), CHAT_DISPLAY_LIMIT);
        assert_eq!(recent[0].content, "question 13");
        assert_eq!(recent[9].content, "question 4");
    }

    #[test]
    fn test_only_assistant_turns_get_markup() {
        let log = vec![
            ConversationTurn::user("How is my summary?"),
            ConversationTurn::assistant("[STRENGTH] Concise and targeted"),
        ];
        let recent = recent_turns(&log);
        assert_eq!(recent[0].role, Role::Assistant);
        assert_eq!(recent[0].markup.as_deref(), Some("Concise and targeted"));
        assert!(recent[1].markup.is_none());
    }
}
