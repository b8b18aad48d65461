//! Transcript store for a debate conversation
//!
//! The transcript is an ordered log of messages. Insertion order is display
//! order; messages are never reordered or removed individually. The only
//! in-place changes are targeted updates to a message found by id, and those
//! updates are no-ops when the id is no longer present (for example after a
//! reset while a reply was still streaming).

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier for one message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(Uuid);

impl MessageId {
    /// Creates a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the person at the keyboard
    User,
    /// Text produced by the model
    Model,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Model => write!(f, "model"),
        }
    }
}

/// One entry in the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Identifier assigned at creation
    pub id: MessageId,
    /// Author of the message
    pub role: Role,
    /// Message text; for a streaming reply, the text received so far
    pub content: String,
    /// Creation time
    pub timestamp: DateTime<Local>,
    /// True while the reply stream for this message is open
    pub is_streaming: bool,
    /// True when the reply stream failed
    pub is_error: bool,
}

impl Message {
    /// Creates a user message with the given text
    ///
    /// # Examples
    ///
    /// ```
    /// use debate_arena::arena::transcript::{Message, Role};
    ///
    /// let msg = Message::user("Democracy vs Monarchy");
    /// assert_eq!(msg.role, Role::User);
    /// assert!(!msg.is_streaming);
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: MessageId::new(),
            role: Role::User,
            content: content.into(),
            timestamp: Local::now(),
            is_streaming: false,
            is_error: false,
        }
    }

    /// Creates an empty model message that is waiting for its stream
    ///
    /// # Examples
    ///
    /// ```
    /// use debate_arena::arena::transcript::{Message, Role};
    ///
    /// let msg = Message::model_placeholder();
    /// assert_eq!(msg.role, Role::Model);
    /// assert!(msg.content.is_empty());
    /// assert!(msg.is_streaming);
    /// ```
    pub fn model_placeholder() -> Self {
        Self {
            id: MessageId::new(),
            role: Role::Model,
            content: String::new(),
            timestamp: Local::now(),
            is_streaming: true,
            is_error: false,
        }
    }
}

/// Ordered, append-only log of messages
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Creates an empty transcript
    ///
    /// # Examples
    ///
    /// ```
    /// use debate_arena::arena::Transcript;
    ///
    /// let transcript = Transcript::new();
    /// assert!(transcript.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message and returns its id
    pub fn push(&mut self, message: Message) -> MessageId {
        let id = message.id;
        self.messages.push(message);
        id
    }

    /// Looks up a message by id
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Replaces the content of a message with `content`
    ///
    /// Replacing (rather than appending) makes repeated delivery of the same
    /// snapshot harmless.
    ///
    /// # Returns
    ///
    /// Returns false if no message with `id` is present
    ///
    /// # Examples
    ///
    /// ```
    /// use debate_arena::arena::Transcript;
    /// use debate_arena::arena::transcript::Message;
    ///
    /// let mut transcript = Transcript::new();
    /// let id = transcript.push(Message::model_placeholder());
    /// assert!(transcript.set_content(id, "### Moderator"));
    /// assert!(transcript.set_content(id, "### Moderator"));
    /// assert_eq!(transcript.get(id).unwrap().content, "### Moderator");
    /// ```
    pub fn set_content(&mut self, id: MessageId, content: &str) -> bool {
        self.update(id, |m| {
            m.content.clear();
            m.content.push_str(content);
        })
    }

    /// Marks a streaming message as complete, keeping its content
    ///
    /// # Returns
    ///
    /// Returns false if no message with `id` is present
    pub fn finish_stream(&mut self, id: MessageId) -> bool {
        self.update(id, |m| m.is_streaming = false)
    }

    /// Marks a streaming message as failed and replaces its content
    ///
    /// # Returns
    ///
    /// Returns false if no message with `id` is present
    pub fn fail_stream(&mut self, id: MessageId, error_text: &str) -> bool {
        self.update(id, |m| {
            m.content = error_text.to_string();
            m.is_streaming = false;
            m.is_error = true;
        })
    }

    fn update(&mut self, id: MessageId, apply: impl FnOnce(&mut Message)) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                apply(message);
                true
            }
            None => false,
        }
    }

    /// Removes every message
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Returns the messages in display order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Number of messages in the transcript
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the transcript holds no messages
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of messages whose stream is still open
    pub fn streaming_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_streaming).count()
    }
}
