//! Debate Arena - terminal debate moderator library
//!
//! This library provides the core of Debate Arena: a conversation
//! controller that streams a moderated debate from a remote chat model into
//! an in-memory transcript, plus the provider, configuration and rendering
//! pieces around it.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `arena`: Transcript model, session lifecycle, streaming adapter and controller
//! - `providers`: Remote chat abstraction and the Gemini implementation
//! - `prompts`: Moderator persona, default model and suggested topics
//! - `render`: Terminal rendering of messages and streaming replies
//! - `commands`: Interactive REPL and one-shot command handlers
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use debate_arena::{commands, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let controller = commands::build_controller(&config)?;
//!     controller.send("Democracy vs Monarchy").await?;
//!     for message in controller.snapshot() {
//!         println!("{}: {}", message.role, message.content);
//!     }
//!     Ok(())
//! }
//! ```

pub mod arena;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod prompts;
pub mod providers;
pub mod render;

// Re-export commonly used types
pub use arena::{
    ConversationController, Message, MessageId, Role, SendOutcome, SessionManager, StreamStatus,
    TranscriptEvent,
};
pub use config::Config;
pub use error::{DebateError, Result};

#[cfg(test)]
pub mod test_utils;
