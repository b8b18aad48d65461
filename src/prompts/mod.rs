//! Prompts and model defaults for the Debate Arena
//!
//! This module holds the default model identifier, the moderator persona
//! that every session is bound to, and the suggested debate topics offered
//! by the interactive prompt.

pub mod moderator_prompt;

pub use moderator_prompt::MODERATOR_INSTRUCTION;

/// Model used when neither the config file nor the environment names one
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Fixed user-facing text shown in place of a reply whose stream failed
pub const APOLOGY_MESSAGE: &str = "I'm sorry, I encountered an error. Please try again.";

/// Topics offered by `/topics` in the interactive prompt
pub const SUGGESTED_TOPICS: &[&str] = &[
    "AI vs Human Art",
    "Universal Basic Income",
    "Space Exploration Cost",
    "Remote vs Office Work",
];

/// Looks up a suggested topic by its 1-based position
///
/// # Arguments
///
/// * `position` - 1-based index as shown by `/topics`
///
/// # Returns
///
/// The topic text, or `None` when the position is out of range
///
/// # Examples
///
/// ```
/// use debate_arena::prompts::suggested_topic;
///
/// assert_eq!(suggested_topic(2), Some("Universal Basic Income"));
/// assert_eq!(suggested_topic(0), None);
/// ```
pub fn suggested_topic(position: usize) -> Option<&'static str> {
    position
        .checked_sub(1)
        .and_then(|idx| SUGGESTED_TOPICS.get(idx))
        .copied()
}
