/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes two top-level command modules:

- `chat` - Interactive debate arena
- `ask`  - Stage one debate on a topic and exit

Both build a `ConversationController` from the configuration and render
its transcript events to the terminal while a reply streams in.
*/

use crate::arena::{ConversationController, SendOutcome, SessionManager};
use crate::config::Config;
use crate::error::Result;
use crate::providers::{create_client, SessionSpec};
use crate::render::LiveRenderer;
use std::io::Write;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

// Special commands parser for the REPL
pub mod special_commands;

/// Build a controller wired to the configured provider
///
/// # Errors
///
/// Returns error if the provider cannot be created
pub fn build_controller(config: &Config) -> Result<ConversationController> {
    let client = create_client(&config.provider)?;
    let spec = SessionSpec::new(
        config.provider.gemini.model.clone(),
        config.debate.system_instruction.clone(),
    );
    let sessions = Arc::new(SessionManager::new(client, spec));
    Ok(ConversationController::with_event_buffer(
        sessions,
        config.chat.event_buffer,
    ))
}

/// Send `text` and print the reply as it streams in
///
/// Events are rendered while the send is in flight. Once it settles, any
/// events still queued are drained and the reply is reconciled against the
/// transcript, so output is complete even if the renderer fell behind.
///
/// # Errors
///
/// Returns error if the controller rejects the input or stdout fails
pub async fn send_and_render(
    controller: &ConversationController,
    text: &str,
    mut renderer: LiveRenderer,
) -> Result<SendOutcome> {
    let mut events = controller.subscribe();
    let mut following = true;

    let send = controller.send(text);
    tokio::pin!(send);

    let outcome = loop {
        tokio::select! {
            biased;
            outcome = &mut send => break outcome?,
            event = events.recv(), if following => match event {
                Ok(event) => write_out(&renderer.apply(&event))?,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Renderer fell behind, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => following = false,
            },
        }
    };

    while let Ok(event) = events.try_recv() {
        write_out(&renderer.apply(&event))?;
    }
    if let Some(message) = controller.message(outcome.reply_id) {
        write_out(&renderer.catch_up(&message))?;
    }

    Ok(outcome)
}

fn write_out(text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

// Chat command handler
pub mod chat {
    //! Interactive debate arena.
    //!
    //! Runs a readline loop: each line is either a special command or a
    //! topic/follow-up sent to the moderator. The next line is only read
    //! after the previous reply has settled.

    use super::special_commands::{parse_special_command, print_help, print_topics, SpecialCommand};
    use super::*;
    use crate::arena::StreamStatus;
    use crate::prompts::suggested_topic;
    use crate::render::format_message;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    const PROMPT: &str = "debate> ";
    const CONTINUATION_PROMPT: &str = "   ...> ";

    /// Start the interactive debate arena
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    ///
    /// # Errors
    ///
    /// Returns error if the provider or the line editor cannot be created
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive debate arena");

        let controller = build_controller(&config)?;
        let show_timestamps = config.chat.show_timestamps;

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&config.provider.gemini.model);

        loop {
            let input = match read_input(&mut rl) {
                Ok(input) => input,
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            };

            let trimmed = input.trim();
            if trimmed.is_empty() {
                continue;
            }
            rl.add_history_entry(trimmed)?;

            let (text, echo) = match parse_special_command(trimmed) {
                Ok(SpecialCommand::None) => (trimmed.to_string(), false),
                Ok(SpecialCommand::Topic(n)) => match suggested_topic(n) {
                    Some(topic) => (topic.to_string(), true),
                    None => continue,
                },
                Ok(SpecialCommand::Reset) => {
                    controller.reset();
                    println!("{}\n", "Started a new debate. Enter a topic.".green());
                    continue;
                }
                Ok(SpecialCommand::History) => {
                    print_history(&controller, show_timestamps);
                    continue;
                }
                Ok(SpecialCommand::ShowStatus) => {
                    print_status_display(&controller);
                    continue;
                }
                Ok(SpecialCommand::Topics) => {
                    print_topics();
                    continue;
                }
                Ok(SpecialCommand::Help) => {
                    print_help();
                    continue;
                }
                Ok(SpecialCommand::Exit) => break,
                Err(e) => {
                    eprintln!("{}", e.to_string().red());
                    continue;
                }
            };

            match send_and_render(&controller, &text, LiveRenderer::new(show_timestamps, echo))
                .await
            {
                Ok(outcome) if outcome.status == StreamStatus::Failed => {
                    tracing::debug!("Reply {} failed", outcome.reply_id);
                }
                Ok(_) => {}
                Err(e) => eprintln!("{}", format!("Error: {}", e).red()),
            }
            println!();
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Reads one logical input, joining lines that end with `\`
    fn read_input(rl: &mut DefaultEditor) -> std::result::Result<String, ReadlineError> {
        let mut buffer = String::new();
        let mut prompt = PROMPT;
        loop {
            let line = rl.readline(prompt)?;
            if !push_line(&mut buffer, &line) {
                return Ok(buffer);
            }
            prompt = CONTINUATION_PROMPT;
        }
    }

    /// Appends `line` to `buffer`, returning true if input continues
    ///
    /// A trailing backslash is removed and replaced by a newline.
    pub(crate) fn push_line(buffer: &mut String, line: &str) -> bool {
        match line.strip_suffix('\\') {
            Some(head) => {
                buffer.push_str(head);
                buffer.push('\n');
                true
            }
            None => {
                buffer.push_str(line);
                false
            }
        }
    }

    /// Display welcome banner at the start of the REPL
    fn print_welcome_banner(model: &str) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                 Debate Arena - Welcome!                      ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Model: {}", model.cyan());
        println!("Enter a debate topic, e.g. \"Democracy vs Monarchy\".");
        println!("Type '/topics' for ideas, '/help' for commands, 'exit' to quit\n");
    }

    /// Reprint every message in the transcript
    fn print_history(controller: &ConversationController, show_timestamps: bool) {
        let messages = controller.snapshot();
        if messages.is_empty() {
            println!("{}\n", "No debate yet. Enter a topic to begin.".dimmed());
            return;
        }
        println!();
        for message in &messages {
            println!("{}", format_message(message, show_timestamps));
        }
    }

    /// Display session status
    fn print_status_display(controller: &ConversationController) {
        let sessions = controller.sessions();
        let session_state = if sessions.is_active() {
            "active".green()
        } else {
            "none (created on next message)".yellow()
        };

        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Debate Arena Status                      ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Model:             {}", sessions.spec().model);
        println!("Chat Session:      {}", session_state);
        println!("Transcript Size:   {} messages", controller.len());
        println!("Streaming Replies: {}", controller.streaming_count());
        println!();
    }

}

// One-shot debate handler
pub mod ask {
    //! Stage a single debate and exit.

    use super::*;
    use crate::arena::StreamStatus;
    use crate::error::DebateError;

    /// Send `topic` once and stream the reply to stdout
    ///
    /// # Errors
    ///
    /// Returns error if the topic is blank, the provider cannot be created,
    /// or the reply stream failed
    pub async fn run_ask(config: Config, topic: String) -> Result<()> {
        tracing::info!("Starting one-shot debate");

        let controller = build_controller(&config)?;
        let renderer = LiveRenderer::new(config.chat.show_timestamps, true);

        let outcome = send_and_render(&controller, &topic, renderer).await?;
        match outcome.status {
            StreamStatus::Completed => Ok(()),
            StreamStatus::Failed => Err(DebateError::Stream(
                "The debate reply could not be completed".to_string(),
            )
            .into()),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::StreamStatus;
    use crate::providers::ChatClient;
    use crate::test_utils::{Reply, ScriptedClient};

    fn scripted_controller(client: &Arc<ScriptedClient>) -> ConversationController {
        let sessions = Arc::new(SessionManager::new(
            Arc::clone(client) as Arc<dyn ChatClient>,
            SessionSpec::new("test-model", "sys"),
        ));
        ConversationController::new(sessions)
    }

    #[test]
    fn test_build_controller_from_default_config() {
        let controller = build_controller(&Config::default()).unwrap();
        assert!(controller.is_empty());
        assert!(!controller.sessions().is_active());
        assert_eq!(controller.sessions().spec().model, "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn test_send_and_render_completed() {
        let client = Arc::new(ScriptedClient::new());
        client.script("topic", Reply::fragments(&["### Moderator\n", "Welcome"]));
        let controller = scripted_controller(&client);

        let outcome = send_and_render(&controller, "topic", LiveRenderer::new(false, false))
            .await
            .unwrap();

        assert_eq!(outcome.status, StreamStatus::Completed);
        assert_eq!(
            controller.message(outcome.reply_id).unwrap().content,
            "### Moderator\nWelcome"
        );
    }

    #[tokio::test]
    async fn test_send_and_render_failed() {
        let client = Arc::new(ScriptedClient::new());
        client.script("topic", Reply::Refused("boom".to_string()));
        let controller = scripted_controller(&client);

        let outcome = send_and_render(&controller, "topic", LiveRenderer::new(false, false))
            .await
            .unwrap();
        assert_eq!(outcome.status, StreamStatus::Failed);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn test_send_and_render_with_tiny_event_buffer() {
        let client = Arc::new(ScriptedClient::new());
        let parts: Vec<String> = (0..50).map(|i| format!("{} ", i)).collect();
        let refs: Vec<&str> = parts.iter().map(String::as_str).collect();
        client.script("topic", Reply::fragments(&refs));

        let sessions = Arc::new(SessionManager::new(
            Arc::clone(&client) as Arc<dyn ChatClient>,
            SessionSpec::new("test-model", "sys"),
        ));
        let controller = ConversationController::with_event_buffer(sessions, 1);

        let outcome = send_and_render(&controller, "topic", LiveRenderer::new(false, false))
            .await
            .unwrap();
        assert_eq!(outcome.status, StreamStatus::Completed);
        assert_eq!(
            controller.message(outcome.reply_id).unwrap().content,
            parts.concat()
        );
    }
}
