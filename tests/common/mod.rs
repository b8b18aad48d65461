use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use debate_arena::config::Config;

/// Model used by every mocked endpoint
#[allow(dead_code)]
pub const TEST_MODEL: &str = "gemini-2.5-flash";

/// API key the mocks expect in `x-goog-api-key`
#[allow(dead_code)]
pub const TEST_KEY: &str = "test-key";

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Config pointing the Gemini client at a mock server
#[allow(dead_code)]
pub fn mock_config(api_base: &str) -> Config {
    let mut config = Config::default();
    config.provider.gemini.api_base = api_base.to_string();
    config.provider.gemini.api_key = Some(TEST_KEY.to_string());
    config
}

/// Path of the streaming endpoint for `TEST_MODEL`
#[allow(dead_code)]
pub fn stream_path() -> String {
    format!("/v1beta/models/{}:streamGenerateContent", TEST_MODEL)
}

/// SSE body with one `GenerateContentResponse` event per text chunk
#[allow(dead_code)]
pub fn sse_body(chunks: &[&str]) -> String {
    chunks
        .iter()
        .map(|text| {
            let event = serde_json::json!({
                "candidates": [{
                    "content": { "role": "model", "parts": [{ "text": text }] }
                }]
            });
            format!("data: {}\r\n\r\n", event)
        })
        .collect()
}

/// Parsed JSON bodies of every request the server received
#[allow(dead_code)]
pub async fn request_bodies(server: &wiremock::MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .iter()
        .map(|r| serde_json::from_slice(&r.body).expect("request body is JSON"))
        .collect()
}
