//! Test utilities for Debate Arena
//!
//! Provides `ScriptedClient`, an in-memory `ChatClient` whose replies are
//! scripted per prompt, so the session lifecycle, the streaming adapter and
//! the controller can be tested without a network.

use crate::error::{DebateError, Result};
use crate::providers::{ChatClient, ChatSession, Content, FragmentStream, SessionSpec};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Scripted outcome of one `send_message_stream` call
pub enum Reply {
    /// The request itself fails before any fragment
    Refused(String),
    /// A fixed sequence of fragments and stream errors
    Scripted(Vec<std::result::Result<String, String>>),
    /// Fragments fed by the test through a channel; the stream ends when
    /// the sender is dropped
    Channel(mpsc::UnboundedReceiver<std::result::Result<String, String>>),
}

impl Reply {
    /// A reply made only of successful fragments
    pub fn fragments(parts: &[&str]) -> Self {
        Self::Scripted(parts.iter().map(|p| Ok(p.to_string())).collect())
    }

    /// A channel-driven reply and the sender that feeds it
    pub fn channel() -> (mpsc::UnboundedSender<std::result::Result<String, String>>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::Channel(rx))
    }
}

type Scripts = Arc<Mutex<HashMap<String, VecDeque<Reply>>>>;

/// `ChatClient` returning scripted replies keyed by prompt text
#[derive(Default)]
pub struct ScriptedClient {
    scripts: Scripts,
    created: AtomicUsize,
    last_spec: Mutex<Option<SessionSpec>>,
}

impl ScriptedClient {
    /// Creates a client with no scripted replies
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `reply` for the next send of `prompt`
    pub fn script(&self, prompt: &str, reply: Reply) {
        self.scripts
            .lock()
            .unwrap()
            .entry(prompt.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Number of sessions created so far
    pub fn sessions_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Spec passed to the most recent `create_session`
    pub fn last_spec(&self) -> Option<SessionSpec> {
        self.last_spec.lock().unwrap().clone()
    }
}

impl ChatClient for ScriptedClient {
    fn create_session(&self, spec: &SessionSpec) -> Result<Arc<dyn ChatSession>> {
        self.created.fetch_add(1, Ordering::SeqCst);
        *self.last_spec.lock().unwrap() = Some(spec.clone());
        Ok(Arc::new(ScriptedSession {
            scripts: Arc::clone(&self.scripts),
            model: spec.model.clone(),
            sent: Mutex::new(Vec::new()),
        }))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

struct ScriptedSession {
    scripts: Scripts,
    model: String,
    sent: Mutex<Vec<String>>,
}

fn stream_error(message: String) -> anyhow::Error {
    DebateError::Stream(message).into()
}

#[async_trait]
impl ChatSession for ScriptedSession {
    async fn send_message_stream(&self, message: &str) -> Result<FragmentStream> {
        self.sent.lock().unwrap().push(message.to_string());

        let reply = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(message)
            .and_then(|queue| queue.pop_front());

        match reply {
            None => {
                Err(DebateError::Provider(format!("No scripted reply for: {}", message)).into())
            }
            Some(Reply::Refused(reason)) => Err(DebateError::Provider(reason).into()),
            Some(Reply::Scripted(items)) => {
                let items: Vec<Result<String>> =
                    items.into_iter().map(|i| i.map_err(stream_error)).collect();
                Ok(Box::pin(futures::stream::iter(items)))
            }
            Some(Reply::Channel(rx)) => Ok(Box::pin(futures::stream::unfold(
                rx,
                |mut rx| async move {
                    rx.recv()
                        .await
                        .map(|item| (item.map_err(stream_error), rx))
                },
            ))),
        }
    }

    fn history(&self) -> Vec<Content> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|m| Content::user(m.as_str()))
            .collect()
    }

    fn model(&self) -> &str {
        &self.model
    }
}
