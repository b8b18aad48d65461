//! Gemini chat client for Debate Arena
//!
//! This module implements `ChatClient` and `ChatSession` on top of the
//! Gemini `streamGenerateContent` endpoint. Each session keeps its own
//! history client-side and resends it with every turn, the way the hosted
//! chat SDKs do. Replies arrive as server-sent events, one JSON
//! `GenerateContentResponse` per event.

use crate::config::GeminiConfig;
use crate::error::{DebateError, Result};
use crate::providers::base::{ChatClient, ChatSession, Content, FragmentStream, Part, SessionSpec};
use crate::providers::sse::SseDecoder;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

/// Gemini API client
///
/// Holds the HTTP client and credentials shared by every session it
/// creates. No local request timeout is applied; a reply takes as long as
/// the endpoint keeps the stream open.
///
/// # Examples
///
/// ```no_run
/// use debate_arena::config::GeminiConfig;
/// use debate_arena::providers::{ChatClient, GeminiClient, SessionSpec};
///
/// # async fn example() -> debate_arena::error::Result<()> {
/// let client = GeminiClient::new(GeminiConfig::default())?;
/// let session = client.create_session(&SessionSpec::new("gemini-2.5-flash", "You moderate."))?;
/// let mut reply = session.send_message_stream("Democracy vs Monarchy").await?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiClient {
    http: Client,
    api_base: String,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Create a new Gemini client
    ///
    /// A missing API key is logged as a warning and is not an error; calls
    /// are still attempted and fail at the transport layer.
    ///
    /// # Arguments
    ///
    /// * `config` - Gemini configuration containing endpoint and credentials
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("debate-arena/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DebateError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        if config.api_key.is_none() {
            tracing::warn!(
                "{}; set GEMINI_API_KEY or API_KEY",
                DebateError::MissingCredentials("gemini".to_string())
            );
        }

        tracing::info!("Initialized Gemini client: api_base={}", config.api_base);

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }
}

impl ChatClient for GeminiClient {
    fn create_session(&self, spec: &SessionSpec) -> Result<Arc<dyn ChatSession>> {
        if spec.model.trim().is_empty() {
            return Err(DebateError::Provider("Model name cannot be empty".to_string()).into());
        }

        let endpoint = format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.api_base, spec.model
        );

        Ok(Arc::new(GeminiSession {
            http: self.http.clone(),
            endpoint,
            api_key: self.api_key.clone(),
            spec: spec.clone(),
            history: Arc::new(Mutex::new(Vec::new())),
        }))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// One Gemini conversation
pub struct GeminiSession {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
    spec: SessionSpec,
    history: Arc<Mutex<Vec<Content>>>,
}

/// Request body for `streamGenerateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: SystemInstruction,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

/// One streamed response chunk
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: String,
}

/// Error body returned with a non-2xx status
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

impl GenerateContentResponse {
    /// Text of the chunk, or the API error it carries
    ///
    /// Only the first candidate is read, and thought parts are skipped.
    pub(crate) fn into_text(self) -> Result<String> {
        if let Some(error) = self.error {
            return Err(DebateError::Provider(format!(
                "Gemini API error {}: {}",
                error.code.unwrap_or_default(),
                error.message
            ))
            .into());
        }

        if self.candidates.is_empty() {
            if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
                return Err(DebateError::Provider(format!("Prompt blocked: {}", reason)).into());
            }
        }

        let text = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter(|p| p.thought != Some(true))
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        Ok(text)
    }
}

type ByteStream = Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>;

/// State threaded through the reply stream
struct ReplyState {
    body: ByteStream,
    decoder: SseDecoder,
    pending: VecDeque<String>,
    user_turn: String,
    reply: String,
    history: Arc<Mutex<Vec<Content>>>,
    finished: bool,
}

impl ReplyState {
    /// Records the completed exchange in the session history
    fn record_turn(&mut self) -> Result<()> {
        let mut history = self.history.lock().map_err(|_| {
            DebateError::Provider("Failed to acquire lock on session history".to_string())
        })?;
        history.push(Content::user(std::mem::take(&mut self.user_turn)));
        history.push(Content::model(std::mem::take(&mut self.reply)));
        Ok(())
    }
}

/// Pulls the next reply fragment, reading from the body only when needed
async fn next_fragment(mut state: ReplyState) -> Result<Option<(String, ReplyState)>> {
    loop {
        if let Some(payload) = state.pending.pop_front() {
            let chunk: GenerateContentResponse = serde_json::from_str(&payload)
                .map_err(|e| DebateError::Stream(format!("Malformed stream payload: {}", e)))?;
            let text = chunk.into_text()?;
            state.reply.push_str(&text);
            return Ok(Some((text, state)));
        }

        if state.finished {
            // An empty model turn would be rejected when resent as history.
            if state.reply.is_empty() {
                tracing::warn!("Gemini reply closed without text; turn not kept in history");
            } else {
                state.record_turn()?;
            }
            tracing::debug!("Gemini stream closed");
            return Ok(None);
        }

        match state.body.next().await {
            Some(Ok(bytes)) => {
                let payloads = state.decoder.push(&bytes)?;
                state.pending.extend(payloads);
            }
            Some(Err(e)) => {
                return Err(DebateError::Stream(format!("Gemini stream interrupted: {}", e)).into());
            }
            None => {
                state.pending.extend(state.decoder.finish());
                state.finished = true;
            }
        }
    }
}

#[async_trait]
impl ChatSession for GeminiSession {
    async fn send_message_stream(&self, message: &str) -> Result<FragmentStream> {
        let mut contents = self.history();
        contents.push(Content::user(message));

        let request = GenerateContentRequest {
            contents,
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: self.spec.system_instruction.clone(),
                }],
            },
        };

        tracing::debug!(
            "Sending Gemini request: model={}, {} turns",
            self.spec.model,
            request.contents.len()
        );

        let mut builder = self.http.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.header("x-goog-api-key", key);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Gemini request failed: {}", e);
            DebateError::Provider(format!("Gemini request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            tracing::error!("Gemini returned error {}: {}", status, detail);
            return Err(
                DebateError::Provider(format!("Gemini returned error {}: {}", status, detail))
                    .into(),
            );
        }

        let state = ReplyState {
            body: Box::pin(response.bytes_stream()),
            decoder: SseDecoder::new(),
            pending: VecDeque::new(),
            user_turn: message.to_string(),
            reply: String::new(),
            history: Arc::clone(&self.history),
            finished: false,
        };

        Ok(Box::pin(futures::stream::try_unfold(state, next_fragment)))
    }

    fn history(&self) -> Vec<Content> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    fn model(&self) -> &str {
        &self.spec.model
    }
}
