//! Conversation data model
//!
//! These are the types exchanged with the browser UI. A conversation is an
//! ordered sequence of [`Message`]s; order is chronological and meaningful.
//! All values are request-scoped and discarded after the response completes.

use serde::{Deserialize, Serialize};

/// Role of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions that guide the model's behavior
    System,
    /// User input message
    User,
    /// Assistant (model) response
    Assistant,
}

/// A single conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A chat request submitted by the UI.
///
/// `messages` must be present as an array; requests without it fail
/// deserialization and are rejected with a client error by the endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
}

impl ChatRequest {
    /// Content of the most recent `user` turn, if any.
    pub fn last_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// One caller-facing delta of generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamFragment {
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let message = Message::user("hello");
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(json, r#"{"role":"user","content":"hello"}"#);
    }

    #[test]
    fn test_chat_request_round_trip() {
        let raw = r#"{"messages":[{"role":"user","content":"hi"},{"role":"assistant","content":"hello"}]}"#;
        let request: ChatRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::User);
    }

    #[test]
    fn test_missing_messages_rejected() {
        let result = serde_json::from_str::<ChatRequest>("{}");
        assert!(result.is_err());
    }

    #[test]
    fn test_non_array_messages_rejected() {
        let result = serde_json::from_str::<ChatRequest>(r#"{"messages":"hello"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result =
            serde_json::from_str::<ChatRequest>(r#"{"messages":[{"role":"tool","content":"x"}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_last_user_content() {
        let request = ChatRequest {
            messages: vec![
                Message::user("first"),
                Message::assistant("answer"),
                Message::user("second"),
                Message::assistant("another"),
            ],
        };
        assert_eq!(request.last_user_content(), Some("second"));
    }

    #[test]
    fn test_last_user_content_absent() {
        let request = ChatRequest {
            messages: vec![Message::assistant("answer")],
        };
        assert_eq!(request.last_user_content(), None);
    }
}
