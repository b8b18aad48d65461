//! Special commands parser for the interactive debate REPL
//!
//! Special commands control the session rather than being sent to the
//! moderator. They let the user:
//! - Start a new debate
//! - Review the transcript
//! - Pick one of the suggested topics
//! - Display status and help
//! - Exit the session
//!
//! Commands are prefixed with `/` and are case-insensitive.

use crate::prompts::SUGGESTED_TOPICS;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during an interactive debate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Clear the transcript and start a fresh chat session
    Reset,

    /// Reprint the whole transcript
    History,

    /// Display model, session and transcript status
    ShowStatus,

    /// List the suggested topics
    Topics,

    /// Send suggested topic number `n` (1-based)
    Topic(usize),

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command
    ///
    /// The input should be sent to the moderator.
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns `CommandError::UnknownCommand` for an unrecognised `/` command,
/// `CommandError::MissingArgument` for `/topic` without a number, and
/// `CommandError::UnsupportedArgument` for a bad argument.
///
/// # Examples
///
/// ```
/// use debate_arena::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/new").unwrap(), SpecialCommand::Reset);
/// assert_eq!(parse_special_command("/topic 2").unwrap(), SpecialCommand::Topic(2));
/// assert_eq!(
///     parse_special_command("Cats vs Dogs").unwrap(),
///     SpecialCommand::None
/// );
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    // Bare exit/quit are accepted without the slash
    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/reset" | "/new" => Ok(SpecialCommand::Reset),
        "/history" => Ok(SpecialCommand::History),
        "/status" => Ok(SpecialCommand::ShowStatus),
        "/topics" => Ok(SpecialCommand::Topics),
        "/help" | "/?" => Ok(SpecialCommand::Help),

        "/topic" => Err(CommandError::MissingArgument {
            command: "/topic".to_string(),
            usage: format!("/topic <1-{}>", SUGGESTED_TOPICS.len()),
        }),
        input if input.starts_with("/topic ") => {
            let arg = input[7..].trim();
            match arg.parse::<usize>() {
                Ok(n) if (1..=SUGGESTED_TOPICS.len()).contains(&n) => {
                    Ok(SpecialCommand::Topic(n))
                }
                _ => Err(CommandError::UnsupportedArgument {
                    command: "/topic".to_string(),
                    arg: arg.to_string(),
                }),
            }
        }

        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        input => {
            let cmd = input.split_whitespace().next().unwrap_or(input);
            Err(CommandError::UnknownCommand(cmd.to_string()))
        }
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Debate Arena Commands
=====================

Type a debate topic (for example "Democracy vs Monarchy") and press Enter.
The moderator introduces the speakers and they argue it out. Type a
follow-up at any time to steer the debate. End a line with '\' to keep
typing on the next line.

DEBATE:
  /topics         - List suggested topics
  /topic <n>      - Start suggested topic number n
  /reset          - Clear the transcript and start a new debate
  /new            - Same as /reset

TRANSCRIPT:
  /history        - Reprint the whole transcript
  /status         - Show model, session and transcript status

OTHER:
  /help           - Show this help message
  /exit, /quit    - Exit the session (also 'exit' or 'quit')
"#
    );
}

/// Display the numbered list of suggested topics
pub fn print_topics() {
    println!("\nSuggested topics:");
    for (i, topic) in SUGGESTED_TOPICS.iter().enumerate() {
        println!("  {}. {}", i + 1, topic);
    }
    println!("\nType '/topic <n>' to start one.\n");
}
