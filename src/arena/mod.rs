//! Debate conversation core
//!
//! The transcript model, the session lifecycle, the streaming adapter, and
//! the controller that ties them together for one turn at a time.

pub mod controller;
pub mod session;
pub mod streaming;
pub mod transcript;

pub use controller::{ConversationController, SendOutcome, StreamStatus, TranscriptEvent};
pub use session::SessionManager;
pub use streaming::stream_message;
pub use transcript::{Message, MessageId, Role, Transcript};
