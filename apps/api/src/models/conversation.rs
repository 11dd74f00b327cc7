use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// A single message sent to the chat model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One question/answer exchange in a session's history.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationTurn {
    pub query: String,
    pub answer: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(query: String, answer: String) -> Self {
        Self {
            query,
            answer,
            created_at: Utc::now(),
        }
    }
}

/// Flattens turns into alternating user/assistant messages, oldest first.
pub fn history_messages(turns: &[ConversationTurn]) -> Vec<ChatMessage> {
    turns
        .iter()
        .flat_map(|t| {
            [
                ChatMessage::user(t.query.clone()),
                ChatMessage::assistant(t.answer.clone()),
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_messages_alternate_roles() {
        let turns = vec![
            ConversationTurn::new("Who knows Rust?".into(), "Alice.".into()),
            ConversationTurn::new("And Go?".into(), "Bob.".into()),
        ];
        let messages = history_messages(&turns);
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
        assert_eq!(messages[2].content, "And Go?");
    }

    #[test]
    fn test_role_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
    }
}
