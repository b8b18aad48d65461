//! Conversation controller
//!
//! Orchestrates one debate turn: append the user's message, append an empty
//! streaming placeholder for the reply, drive the streaming adapter, and
//! fold each fragment into the placeholder. Every transcript mutation is
//! broadcast as a `TranscriptEvent` so a renderer can follow along.
//!
//! The placeholder's content is overwritten with the cumulative text on
//! every fragment rather than appended to. A renderer that sees the same
//! snapshot twice, or misses one, still converges on the right text.
//!
//! `reset()` does not cancel an in-flight reply. Updates for a placeholder
//! that the reset removed find no message with that id and are dropped.

use crate::arena::session::SessionManager;
use crate::arena::streaming::stream_message;
use crate::arena::transcript::{Message, MessageId, Transcript};
use crate::error::{DebateError, Result};
use crate::prompts::APOLOGY_MESSAGE;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

/// Default capacity of the event channel
const DEFAULT_EVENT_BUFFER: usize = 256;

/// Largest accepted event channel capacity
///
/// The channel preallocates one slot per unit of capacity.
pub const MAX_EVENT_BUFFER: usize = 65_536;

/// A change to the transcript
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEvent {
    /// A message was appended
    Appended(Message),
    /// A streaming message now holds `content` (the full text so far)
    ContentUpdated {
        /// Message that changed
        id: MessageId,
        /// Cumulative content
        content: String,
    },
    /// A reply stream closed normally
    StreamCompleted {
        /// Message whose stream closed
        id: MessageId,
    },
    /// A reply stream failed; the message now holds `content`
    StreamFailed {
        /// Message whose stream failed
        id: MessageId,
        /// User-facing error text now shown in the message
        content: String,
    },
    /// The transcript was emptied by a reset
    Cleared,
}

/// How a reply stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// All fragments arrived and the stream closed normally
    Completed,
    /// The stream failed; the reply shows the apology text
    Failed,
}

/// Result of one `send`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOutcome {
    /// The user message that was appended
    pub user_id: MessageId,
    /// The model reply placeholder
    pub reply_id: MessageId,
    /// How the reply stream ended
    pub status: StreamStatus,
}

/// Keeps the loading flag raised for as long as it lives
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn raise(in_flight: &'a AtomicUsize) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        Self(in_flight)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Drives debate turns and owns the transcript
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use debate_arena::arena::{ConversationController, SessionManager};
/// use debate_arena::config::ProviderConfig;
/// use debate_arena::providers::{create_client, SessionSpec};
///
/// # async fn example() -> debate_arena::error::Result<()> {
/// let client = create_client(&ProviderConfig::default())?;
/// let sessions = Arc::new(SessionManager::new(
///     client,
///     SessionSpec::new("gemini-2.5-flash", "You moderate debates."),
/// ));
/// let controller = ConversationController::new(sessions);
/// let outcome = controller.send("Democracy vs Monarchy").await?;
/// println!("{}", controller.message(outcome.reply_id).unwrap().content);
/// # Ok(())
/// # }
/// ```
pub struct ConversationController {
    transcript: Mutex<Transcript>,
    sessions: Arc<SessionManager>,
    in_flight: AtomicUsize,
    events: broadcast::Sender<TranscriptEvent>,
}

impl ConversationController {
    /// Creates a controller with an empty transcript
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self::with_event_buffer(sessions, DEFAULT_EVENT_BUFFER)
    }

    /// Creates a controller whose event channel holds `capacity` events
    ///
    /// A subscriber that falls further behind than this loses the oldest
    /// events; because content updates are cumulative it can still catch up
    /// from the next one. The capacity is clamped to `1..=MAX_EVENT_BUFFER`.
    pub fn with_event_buffer(sessions: Arc<SessionManager>, capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.clamp(1, MAX_EVENT_BUFFER));
        Self {
            transcript: Mutex::new(Transcript::new()),
            sessions,
            in_flight: AtomicUsize::new(0),
            events,
        }
    }

    /// Sends a topic or follow-up and streams the reply into the transcript
    ///
    /// The text is trimmed. A stream failure does not make this return an
    /// error: the reply is marked failed in the transcript and the outcome
    /// reports `StreamStatus::Failed`.
    ///
    /// # Arguments
    ///
    /// * `text` - What the user typed
    ///
    /// # Returns
    ///
    /// Returns the ids of the two appended messages and how the stream ended
    ///
    /// # Errors
    ///
    /// Returns `DebateError::EmptyInput` if the trimmed text is empty; in that
    /// case nothing is appended
    pub async fn send(&self, text: &str) -> Result<SendOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DebateError::EmptyInput.into());
        }

        let _loading = LoadingGuard::raise(&self.in_flight);

        let user_id = self.append(Message::user(text));
        let reply_id = self.append(Message::model_placeholder());

        let mut accumulated = String::new();
        let result = stream_message(&self.sessions, text, |fragment| {
            accumulated.push_str(fragment);
            self.apply_content(reply_id, &accumulated);
        })
        .await;

        let status = match result {
            Ok(()) => {
                if self.lock_transcript().finish_stream(reply_id) {
                    self.emit(TranscriptEvent::StreamCompleted { id: reply_id });
                } else {
                    tracing::debug!("Reply {} finished after reset; ignoring", reply_id);
                }
                StreamStatus::Completed
            }
            Err(e) => {
                tracing::error!("Chat error: {:#}", e);
                if self.lock_transcript().fail_stream(reply_id, APOLOGY_MESSAGE) {
                    self.emit(TranscriptEvent::StreamFailed {
                        id: reply_id,
                        content: APOLOGY_MESSAGE.to_string(),
                    });
                } else {
                    tracing::debug!("Reply {} failed after reset; ignoring", reply_id);
                }
                StreamStatus::Failed
            }
        };

        Ok(SendOutcome {
            user_id,
            reply_id,
            status,
        })
    }

    /// Clears the transcript and discards the chat session
    ///
    /// The next `send` starts a fresh session. A reply that is still
    /// streaming keeps running, but its updates no longer reach the
    /// transcript.
    pub fn reset(&self) {
        self.lock_transcript().clear();
        self.sessions.reset();
        self.emit(TranscriptEvent::Cleared);
        tracing::info!("Debate reset");
    }

    /// Subscribes to transcript changes made after this call
    pub fn subscribe(&self) -> broadcast::Receiver<TranscriptEvent> {
        self.events.subscribe()
    }

    /// True from the start of a `send` until its stream settles
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Copy of the transcript in display order
    pub fn snapshot(&self) -> Vec<Message> {
        self.lock_transcript().messages().to_vec()
    }

    /// Copy of one message
    pub fn message(&self, id: MessageId) -> Option<Message> {
        self.lock_transcript().get(id).cloned()
    }

    /// Number of messages in the transcript
    pub fn len(&self) -> usize {
        self.lock_transcript().len()
    }

    /// Whether the transcript is empty
    pub fn is_empty(&self) -> bool {
        self.lock_transcript().is_empty()
    }

    /// Number of replies still streaming into the transcript
    pub fn streaming_count(&self) -> usize {
        self.lock_transcript().streaming_count()
    }

    /// Session lifecycle owner this controller drives
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    fn append(&self, message: Message) -> MessageId {
        let id = self.lock_transcript().push(message.clone());
        self.emit(TranscriptEvent::Appended(message));
        id
    }

    fn apply_content(&self, id: MessageId, content: &str) {
        if self.lock_transcript().set_content(id, content) {
            self.emit(TranscriptEvent::ContentUpdated {
                id,
                content: content.to_string(),
            });
        } else {
            tracing::debug!("Dropping fragment for message {} no longer in transcript", id);
        }
    }

    fn emit(&self, event: TranscriptEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn lock_transcript(&self) -> MutexGuard<'_, Transcript> {
        // Every critical section is a single non-panicking call, so a
        // poisoned lock still guards a consistent transcript.
        self.transcript
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
