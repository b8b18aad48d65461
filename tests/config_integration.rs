//! Configuration loading and the one-shot `ask` command
//!
//! These tests touch process environment variables, so they are
//! serialized.

mod common;

use common::{sse_body, stream_path, temp_config_file, TEST_KEY};
use serial_test::serial;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use debate_arena::cli::{Cli, Commands};
use debate_arena::commands::ask::run_ask;
use debate_arena::config::Config;

fn clear_env() {
    for var in [
        "DEBATE_ARENA_PROVIDER",
        "DEBATE_ARENA_MODEL",
        "DEBATE_ARENA_API_BASE",
        "GEMINI_API_KEY",
        "API_KEY",
    ] {
        std::env::remove_var(var);
    }
}

fn ask_cli(topic: &str, model: Option<&str>) -> Cli {
    Cli {
        config: None,
        verbose: false,
        command: Commands::Ask {
            topic: topic.to_string(),
            model: model.map(str::to_string),
        },
    }
}

fn config_yaml(api_base: &str) -> String {
    format!(
        r#"
provider:
  type: gemini
  gemini:
    model: gemini-2.5-flash
    api_base: {}
chat:
  show_timestamps: false
"#,
        api_base
    )
}

#[test]
#[serial]
fn test_load_config_file_with_env_key() {
    clear_env();
    std::env::set_var("GEMINI_API_KEY", TEST_KEY);

    let (_dir, path) = temp_config_file(&config_yaml("http://localhost:8080"));
    let config = Config::load(path.to_str().expect("utf-8 path"), &ask_cli("t", None))
        .expect("config loads");

    assert!(config.validate().is_ok());
    assert_eq!(config.provider.gemini.api_base, "http://localhost:8080");
    assert_eq!(config.provider.gemini.api_key.as_deref(), Some(TEST_KEY));
    assert!(!config.chat.show_timestamps);

    clear_env();
}

#[test]
#[serial]
fn test_ask_model_override() {
    clear_env();

    let (_dir, path) = temp_config_file(&config_yaml("http://localhost:8080"));
    let config = Config::load(
        path.to_str().expect("utf-8 path"),
        &ask_cli("t", Some("gemini-2.5-pro")),
    )
    .expect("config loads");

    assert_eq!(config.provider.gemini.model, "gemini-2.5-pro");
}

#[test]
#[serial]
fn test_malformed_config_file_is_error() {
    clear_env();

    let (_dir, path) = temp_config_file("provider: [not, a, map");
    let result = Config::load(path.to_str().expect("utf-8 path"), &ask_cli("t", None));
    assert!(result.is_err());
}

#[tokio::test]
#[serial]
async fn test_ask_streams_debate() {
    clear_env();
    std::env::set_var("API_KEY", TEST_KEY);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(stream_path()))
        .and(header("x-goog-api-key", TEST_KEY))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                sse_body(&["### Moderator\n", "Welcome to the arena."]).into_bytes(),
                "text/event-stream",
            ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (_dir, path) = temp_config_file(&config_yaml(&server.uri()));
    let cli = ask_cli("Tabs vs Spaces", None);
    let config = Config::load(path.to_str().expect("utf-8 path"), &cli).expect("config loads");

    let result = run_ask(config, "Tabs vs Spaces".to_string()).await;
    assert!(result.is_ok());

    clear_env();
}

#[tokio::test]
#[serial]
async fn test_ask_fails_when_stream_fails() {
    clear_env();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let (_dir, path) = temp_config_file(&config_yaml(&server.uri()));
    let cli = ask_cli("Tabs vs Spaces", None);
    let config = Config::load(path.to_str().expect("utf-8 path"), &cli).expect("config loads");

    let result = run_ask(config, "Tabs vs Spaces".to_string()).await;
    assert!(result.is_err());
}
