//! CLI Integration Tests for wikiresearch
//!
//! Runs the built binary against mocked Wikipedia and Ollama endpoints.

use serde_json::json;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Run wikiresearch in `dir` with a clean environment
fn run_wikiresearch(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_wikiresearch"))
        .args(args)
        .current_dir(dir)
        .env_remove("OPENAI_API_KEY")
        .env_remove("WIKIPEDIA_LANGUAGE")
        .env_remove("MAX_SEARCH_RESULTS")
        .env_remove("MAX_CONTENT_LENGTH")
        .env("RUST_LOG", "off")
        .output()
        .expect("Failed to execute wikiresearch")
}

fn write_config(dir: &Path, content: &str) {
    fs::write(dir.join("wikiresearch.toml"), content).unwrap();
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_command() {
    let dir = TempDir::new().unwrap();
    let output = run_wikiresearch(&["--help"], dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("ask"));
    assert!(stdout.contains("config"));
    assert!(stdout.contains("ask -- <QUERY>"));
}

#[test]
fn test_version_command() {
    let dir = TempDir::new().unwrap();
    let output = run_wikiresearch(&["--version"], dir.path());

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("wikiresearch"));
}

// =============================================================================
// Config Command Tests
// =============================================================================

#[test]
fn test_config_prints_defaults_without_file() {
    let dir = TempDir::new().unwrap();
    let output = run_wikiresearch(&["--no-color", "config"], dir.path());

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[research]"));
    assert!(stdout.contains("max_results = 3"));
    assert!(stdout.contains("api_key_env = \"OPENAI_API_KEY\""));
    // Missing key is reported, not fatal.
    assert!(stdout.contains("[WARN] LLM provider not usable"));
    assert!(stdout.contains("[TIP]"));
}

#[test]
fn test_global_flags_on_either_side_of_subcommand() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), "[llm.provider]\ntype = \"ollama\"\n");

    for args in [
        &["--verbose", "--no-color", "config", "--validate"][..],
        &["config", "--validate", "--no-color"][..],
    ] {
        let output = run_wikiresearch(args, dir.path());
        assert!(output.status.success(), "args {:?} failed", args);
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("[OK] Configuration is valid"), "args {:?}: {}", args, stdout);
    }
}

#[test]
fn test_config_validate_accepts_valid_file() {
    let dir = TempDir::new().unwrap();
    write_config(
        dir.path(),
        "[llm.provider]\ntype = \"ollama\"\n\n[research]\nmax_results = 5\n",
    );
    let output = run_wikiresearch(&["--no-color", "config", "--validate"], dir.path());

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Configuration is valid"));
}

#[test]
fn test_config_validate_rejects_out_of_range_values() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), "[research]\nmax_results = 50\n");
    let output = run_wikiresearch(&["--no-color", "config", "--validate"], dir.path());

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("max_results"));
}

#[test]
fn test_explicit_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_wikiresearch(&["--config", "nope.toml", "config"], dir.path());

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope.toml"));
}

// =============================================================================
// Ask Command Tests
// =============================================================================

#[test]
fn test_ask_without_api_key_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_wikiresearch(&["ask", "Who was Marie Curie?"], dir.path());

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("OPENAI_API_KEY"));
}

#[tokio::test]
async fn test_ask_end_to_end_with_export() {
    let wiki = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("list", "search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"search": [{"title": "Marie Curie"}]}
        })))
        .mount(&wiki)
        .await;
    Mock::given(method("GET"))
        .and(path("/w/api.php"))
        .and(query_param("titles", "Marie Curie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": {"pages": [{
                "title": "Marie Curie",
                "extract": "Marie Curie was a physicist and chemist.",
                "fullurl": "https://en.wikipedia.org/wiki/Marie_Curie"
            }]}
        })))
        .mount(&wiki)
        .await;

    let ollama = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": "She discovered polonium and radium."},
            "done": true
        })))
        .mount(&ollama)
        .await;

    let dir = TempDir::new().unwrap();
    write_config(
        dir.path(),
        &format!(
            "[wikipedia]\nendpoint = \"{}/w/api.php\"\n\n[llm.provider]\ntype = \"ollama\"\nbase_url = \"{}\"\n",
            wiki.uri(),
            ollama.uri()
        ),
    );
    let workdir = dir.path().to_path_buf();

    let output = tokio::task::spawn_blocking(move || {
        run_wikiresearch(
            &["ask", "--json", "--export", "report.md", "Who was Marie Curie?"],
            &workdir,
        )
    })
    .await
    .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["state"], "completed");
    assert_eq!(result["synthesized"], true);
    assert_eq!(result["answer"], "She discovered polonium and radium.");
    assert_eq!(result["sources"][0]["identifier"], "Marie Curie");

    let report = fs::read_to_string(dir.path().join("report.md")).unwrap();
    assert!(report.starts_with("# Research Query: Who was Marie Curie?"));
    assert!(report.contains("1. Marie Curie - https://en.wikipedia.org/wiki/Marie_Curie"));
}
