//! Provider module for Debate Arena
//!
//! This module contains the remote chat abstraction and its Gemini
//! implementation, plus the SSE decoder the implementation streams through.

pub mod base;
pub mod gemini;
pub mod sse;

pub use base::{ChatClient, ChatSession, Content, FragmentStream, Part, SessionSpec};
pub use gemini::{GeminiClient, GeminiSession};

use crate::config::ProviderConfig;
use crate::error::{DebateError, Result};
use std::sync::Arc;

/// Create a chat client based on configuration
///
/// # Arguments
///
/// * `config` - Provider configuration
///
/// # Returns
///
/// Returns a shared chat client instance
///
/// # Errors
///
/// Returns error if provider type is invalid or initialization fails
///
/// # Examples
///
/// ```
/// use debate_arena::config::ProviderConfig;
/// use debate_arena::providers::create_client;
///
/// let client = create_client(&ProviderConfig::default()).unwrap();
/// assert_eq!(client.name(), "gemini");
/// ```
pub fn create_client(config: &ProviderConfig) -> Result<Arc<dyn ChatClient>> {
    match config.provider_type.as_str() {
        "gemini" => Ok(Arc::new(GeminiClient::new(config.gemini.clone())?)),
        other => Err(DebateError::Provider(format!("Unknown provider type: {}", other)).into()),
    }
}
