//! Base chat client traits and common types for Debate Arena
//!
//! This module defines the `ChatClient` and `ChatSession` traits that a
//! remote chat provider must implement, along with the conversation content
//! types a session records as history.

use crate::error::Result;
use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::sync::Arc;

/// Sequence of reply text fragments in arrival order
///
/// The stream ends after the last fragment of a successful reply. Any
/// transport or API failure is yielded as an `Err` item.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

/// Parameters a chat session is bound to at creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSpec {
    /// Model identifier, e.g. `gemini-2.5-flash`
    pub model: String,
    /// Persona instruction sent with every turn
    pub system_instruction: String,
}

impl SessionSpec {
    /// Creates a session spec
    ///
    /// # Examples
    ///
    /// ```
    /// use debate_arena::providers::SessionSpec;
    ///
    /// let spec = SessionSpec::new("gemini-2.5-flash", "You are the Moderator.");
    /// assert_eq!(spec.model, "gemini-2.5-flash");
    /// ```
    pub fn new(model: impl Into<String>, system_instruction: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            system_instruction: system_instruction.into(),
        }
    }
}

/// One text part of a content turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// Text of the part
    #[serde(default)]
    pub text: String,
}

/// One conversation turn as the remote API sees it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// `user` or `model`
    pub role: String,
    /// Text parts of the turn
    pub parts: Vec<Part>,
}

impl Content {
    /// Creates a user turn with a single text part
    ///
    /// # Examples
    ///
    /// ```
    /// use debate_arena::providers::Content;
    ///
    /// let turn = Content::user("Democracy vs Monarchy");
    /// assert_eq!(turn.role, "user");
    /// assert_eq!(turn.text(), "Democracy vs Monarchy");
    /// ```
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }

    /// Creates a model turn with a single text part
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: "model".to_string(),
            parts: vec![Part { text: text.into() }],
        }
    }

    /// Concatenated text of all parts
    pub fn text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }
}

/// Factory for remote chat sessions
///
/// Creating a session is a local operation; no request is sent until the
/// first message.
pub trait ChatClient: Send + Sync {
    /// Creates a new session bound to `spec`
    ///
    /// # Errors
    ///
    /// Returns error if the session cannot be constructed (for example an
    /// invalid endpoint URL)
    fn create_session(&self, spec: &SessionSpec) -> Result<Arc<dyn ChatSession>>;

    /// Short provider name used in logs
    fn name(&self) -> &str;
}

/// A multi-turn conversation with the remote model
#[async_trait]
pub trait ChatSession: Send + Sync {
    /// Sends `message` as the next user turn and streams the reply
    ///
    /// # Arguments
    ///
    /// * `message` - The user turn text
    ///
    /// # Returns
    ///
    /// Returns a stream of reply text fragments
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be sent or the API rejects it
    async fn send_message_stream(&self, message: &str) -> Result<FragmentStream>;

    /// Turns recorded so far (completed exchanges only)
    fn history(&self) -> Vec<Content>;

    /// Model this session is bound to
    fn model(&self) -> &str;
}
