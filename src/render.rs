//! Terminal rendering for the debate transcript
//!
//! Messages are printed as simple "bubbles": a colored header naming the
//! author (with an optional `HH:MM` timestamp) followed by the text. Lines
//! of the form `### Speaker` are the moderator's speaker labels and are
//! highlighted.
//!
//! Streaming replies arrive as cumulative snapshots. `StreamPrinter` turns
//! them into the delta that still has to be written, so printing the same
//! snapshot twice, or skipping one, never duplicates or loses text.

use crate::arena::controller::TranscriptEvent;
use crate::arena::transcript::{Message, MessageId, Role};
use colored::Colorize;

/// Prefix marking a speaker label line
const SPEAKER_PREFIX: &str = "### ";

/// Returns the speaker name if `line` is a `### Speaker` label
///
/// # Examples
///
/// ```
/// use debate_arena::render::speaker_label;
///
/// assert_eq!(speaker_label("### Socrates"), Some("Socrates"));
/// assert_eq!(speaker_label("Socrates says hi"), None);
/// ```
pub fn speaker_label(line: &str) -> Option<&str> {
    line.strip_prefix(SPEAKER_PREFIX)
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

/// Styles one line of reply text
pub fn style_line(line: &str) -> String {
    match speaker_label(line) {
        Some(name) => format!("{}", format!("▌ {}", name).bold().yellow()),
        None => line.to_string(),
    }
}

/// Styles a block of reply text line by line
pub fn style_text(text: &str) -> String {
    text.split('\n').map(style_line).collect::<Vec<_>>().join("\n")
}

/// Header line for a message bubble
pub fn format_header(message: &Message, show_timestamps: bool) -> String {
    let author = match message.role {
        Role::User => "You".bold().cyan(),
        Role::Model => "Arena".bold().magenta(),
    };

    if show_timestamps {
        let time = message.timestamp.format("%H:%M").to_string();
        format!("{} {}", author, time.dimmed())
    } else {
        author.to_string()
    }
}

/// Full bubble for a settled or in-progress message
pub fn format_message(message: &Message, show_timestamps: bool) -> String {
    let header = format_header(message, show_timestamps);

    let body = if message.is_error {
        message.content.red().to_string()
    } else if message.is_streaming && message.content.is_empty() {
        "…".dimmed().to_string()
    } else {
        style_text(&message.content)
    };

    format!("{}\n{}\n", header, body)
}

/// Converts cumulative snapshots of one reply into printable deltas
///
/// Lines that start with `#` are held back until they are complete so a
/// speaker label split across fragments can still be highlighted. Other
/// text is passed through as soon as it arrives.
#[derive(Debug, Default)]
pub struct StreamPrinter {
    consumed: String,
    held: String,
    at_line_start: bool,
    ends_with_newline: bool,
}

impl StreamPrinter {
    /// Creates a printer for a new reply
    pub fn new() -> Self {
        Self {
            at_line_start: true,
            ..Self::default()
        }
    }

    /// Returns the styled text not yet printed for `snapshot`
    ///
    /// A snapshot that does not extend what was already seen (an older or
    /// repeated one) yields an empty string.
    pub fn update(&mut self, snapshot: &str) -> String {
        let Some(delta) = snapshot.strip_prefix(self.consumed.as_str()) else {
            tracing::debug!("Ignoring snapshot that does not extend printed text");
            return String::new();
        };
        self.consumed.push_str(delta);
        self.feed(delta)
    }

    /// Flushes any held partial line
    pub fn finish(&mut self) -> String {
        if self.held.is_empty() {
            return String::new();
        }
        let line = std::mem::take(&mut self.held);
        self.at_line_start = false;
        self.ends_with_newline = false;
        style_line(&line)
    }

    /// Whether everything written so far ends with a newline
    pub fn ends_with_newline(&self) -> bool {
        self.ends_with_newline
    }

    /// Whether anything has been printed or held
    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }

    fn feed(&mut self, delta: &str) -> String {
        let mut out = String::new();

        for ch in delta.chars() {
            if !self.held.is_empty() {
                if ch == '\n' {
                    out.push_str(&style_line(&self.held));
                    out.push('\n');
                    self.held.clear();
                    self.at_line_start = true;
                    self.ends_with_newline = true;
                } else {
                    self.held.push(ch);
                }
                continue;
            }

            if self.at_line_start && ch == '#' {
                self.held.push(ch);
                self.at_line_start = false;
                continue;
            }

            out.push(ch);
            self.at_line_start = ch == '\n';
            self.ends_with_newline = ch == '\n';
        }

        out
    }
}

/// Follows transcript events and produces the terminal output for them
///
/// Only the newest model reply is rendered live. User messages are echoed
/// when `echo_user` is set (the REPL leaves it off because the prompt line
/// already shows what was typed).
pub struct LiveRenderer {
    show_timestamps: bool,
    echo_user: bool,
    reply: Option<MessageId>,
    printer: StreamPrinter,
    settled: bool,
}

impl LiveRenderer {
    /// Creates a renderer with nothing in progress
    pub fn new(show_timestamps: bool, echo_user: bool) -> Self {
        Self {
            show_timestamps,
            echo_user,
            reply: None,
            printer: StreamPrinter::new(),
            settled: false,
        }
    }

    /// Returns the output for one transcript event
    pub fn apply(&mut self, event: &TranscriptEvent) -> String {
        match event {
            TranscriptEvent::Appended(message) => match message.role {
                Role::User if self.echo_user => format_message(message, self.show_timestamps),
                Role::User => String::new(),
                Role::Model => {
                    self.reply = Some(message.id);
                    self.printer = StreamPrinter::new();
                    self.settled = false;
                    format!("{}\n", format_header(message, self.show_timestamps))
                }
            },
            TranscriptEvent::ContentUpdated { id, content } if self.is_live(*id) => {
                self.printer.update(content)
            }
            TranscriptEvent::StreamCompleted { id } if self.is_live(*id) => self.complete(),
            TranscriptEvent::StreamFailed { id, content } if self.is_live(*id) => {
                self.fail(content)
            }
            TranscriptEvent::Cleared => {
                self.reply = None;
                self.settled = true;
                String::new()
            }
            _ => String::new(),
        }
    }

    /// Brings the output in line with the final state of `message`
    ///
    /// Used after a send settles, in case events were dropped because the
    /// renderer fell behind. Output already produced is not repeated.
    pub fn catch_up(&mut self, message: &Message) -> String {
        let mut out = String::new();

        if self.reply != Some(message.id) {
            if self.settled && self.reply.is_none() {
                // Cleared while streaming.
                return out;
            }
            self.reply = Some(message.id);
            self.printer = StreamPrinter::new();
            self.settled = false;
            out.push_str(&format_header(message, self.show_timestamps));
            out.push('\n');
        }

        if self.settled {
            return out;
        }

        if message.is_error {
            out.push_str(&self.fail(&message.content));
        } else {
            out.push_str(&self.printer.update(&message.content));
            if !message.is_streaming {
                out.push_str(&self.complete());
            }
        }
        out
    }

    fn is_live(&self, id: MessageId) -> bool {
        self.reply == Some(id) && !self.settled
    }

    fn complete(&mut self) -> String {
        self.settled = true;
        let mut out = self.printer.finish();
        if !self.printer.ends_with_newline() || !out.is_empty() {
            out.push('\n');
        }
        out
    }

    fn fail(&mut self, content: &str) -> String {
        self.settled = true;
        let mut out = self.printer.finish();
        if !self.printer.is_empty() && (!out.is_empty() || !self.printer.ends_with_newline()) {
            out.push('\n');
        }
        out.push_str(&content.red().to_string());
        out.push('\n');
        out
    }
}
