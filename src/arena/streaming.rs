//! Streaming adapter between the session and the controller
//!
//! Turns one remote reply into a sequence of synchronous fragment callbacks.
//! Fragments are delivered strictly in arrival order, and the next fragment
//! is only pulled from the session after the callback for the previous one
//! has returned.

use crate::arena::session::SessionManager;
use crate::error::Result;
use futures::StreamExt;

/// Sends `message` on the active session and feeds each reply fragment to
/// `on_fragment`
///
/// The session is obtained through `sessions.get()`, so the first call
/// after start or after a reset creates it. Empty fragments are skipped.
/// There is no retry: the first error ends the call.
///
/// # Arguments
///
/// * `sessions` - Session lifecycle owner
/// * `message` - User turn text
/// * `on_fragment` - Called once per non-empty fragment, in order
///
/// # Returns
///
/// Returns Ok once the reply stream closes normally
///
/// # Errors
///
/// Returns error if the session cannot be created, the request fails, or
/// the stream yields an error part-way through
pub async fn stream_message<F>(
    sessions: &SessionManager,
    message: &str,
    mut on_fragment: F,
) -> Result<()>
where
    F: FnMut(&str),
{
    let session = sessions.get()?;

    let mut stream = session.send_message_stream(message).await.map_err(|e| {
        tracing::error!("Error sending message: {:#}", e);
        e
    })?;

    let mut fragments = 0usize;
    while let Some(item) = stream.next().await {
        let fragment = item.map_err(|e| {
            tracing::error!("Error reading reply stream after {} fragments: {:#}", fragments, e);
            e
        })?;

        if fragment.is_empty() {
            continue;
        }

        fragments += 1;
        on_fragment(&fragment);
    }

    tracing::debug!("Reply stream finished with {} fragments", fragments);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ChatClient, SessionSpec};
    use crate::test_utils::{Reply, ScriptedClient};
    use std::sync::Arc;

    fn setup() -> (Arc<ScriptedClient>, SessionManager) {
        let client = Arc::new(ScriptedClient::new());
        let sessions = SessionManager::new(
            Arc::clone(&client) as Arc<dyn ChatClient>,
            SessionSpec::new("test-model", "sys"),
        );
        (client, sessions)
    }

    #[tokio::test]
    async fn test_fragments_delivered_in_order() {
        let (client, sessions) = setup();
        client.script("topic", Reply::fragments(&["a", "b", "c"]));

        let mut seen = Vec::new();
        stream_message(&sessions, "topic", |f| seen.push(f.to_string()))
            .await
            .unwrap();

        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_empty_fragments_skipped() {
        let (client, sessions) = setup();
        client.script("topic", Reply::fragments(&["", "a", "", "b"]));

        let mut seen = Vec::new();
        stream_message(&sessions, "topic", |f| seen.push(f.to_string()))
            .await
            .unwrap();

        assert_eq!(seen, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_refused_request_is_error() {
        let (client, sessions) = setup();
        client.script("topic", Reply::Refused("503 unavailable".to_string()));

        let mut calls = 0;
        let result = stream_message(&sessions, "topic", |_| calls += 1).await;

        assert!(result.is_err());
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_midstream_error_after_fragments() {
        let (client, sessions) = setup();
        client.script(
            "topic",
            Reply::Scripted(vec![
                Ok("partial".to_string()),
                Err("connection reset".to_string()),
                Ok("never".to_string()),
            ]),
        );

        let mut seen = Vec::new();
        let result = stream_message(&sessions, "topic", |f| seen.push(f.to_string())).await;

        let err = result.unwrap_err();
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(seen, vec!["partial"]);
    }

    #[tokio::test]
    async fn test_creates_session_lazily() {
        let (client, sessions) = setup();
        client.script("one", Reply::fragments(&["x"]));
        client.script("two", Reply::fragments(&["y"]));

        assert_eq!(client.sessions_created(), 0);
        stream_message(&sessions, "one", |_| {}).await.unwrap();
        stream_message(&sessions, "two", |_| {}).await.unwrap();
        assert_eq!(client.sessions_created(), 1);
    }
}
