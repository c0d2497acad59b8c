//! Claude Code adapter
//!
//! Claude takes the system prompt through its own flag and is constrained by a
//! JSON schema to answer with `{"response": "..."}`, which it reports under
//! `structured_output`:
//!
//! ```json
//! {"type":"result","structured_output":{"response":"SELECT 1"},"session_id":"abc"}
//! ```
//!
//! Schema-constrained output is already plain text, so no fence stripping.

use async_trait::async_trait;
use serde::Deserialize;

use super::command::{run_cli, CliSettings};
use super::envelope::extract_or_raw;
use super::{GenerationError, Generator};

pub const CLAUDE_JSON_SCHEMA: &str =
    r#"{"type":"object","properties":{"response":{"type":"string"}},"required":["response"]}"#;

pub struct ClaudeClient {
    settings: CliSettings,
}

impl ClaudeClient {
    pub const NAME: &'static str = "claude";
    pub const DEFAULT_BINARY: &'static str = "claude";

    pub fn new(settings: CliSettings) -> Self {
        Self { settings }
    }

    fn build_args(system_prompt: &str, user_prompt: &str) -> Vec<String> {
        vec![
            "-p".to_string(),
            user_prompt.to_string(),
            "--append-system-prompt".to_string(),
            system_prompt.to_string(),
            "--output-format".to_string(),
            "json".to_string(),
            "--json-schema".to_string(),
            CLAUDE_JSON_SCHEMA.to_string(),
        ]
    }
}

impl Default for ClaudeClient {
    fn default() -> Self {
        Self::new(CliSettings::new(Self::DEFAULT_BINARY))
    }
}

#[async_trait]
impl Generator for ClaudeClient {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Claude Code"
    }

    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, GenerationError> {
        let stdout = run_cli(&self.settings, &Self::build_args(system_prompt, user_prompt)).await?;
        parse_claude_response(&stdout)
    }
}

#[derive(Deserialize, Default)]
struct ClaudeEnvelope {
    #[serde(default)]
    structured_output: StructuredOutput,
}

#[derive(Deserialize, Default)]
struct StructuredOutput {
    #[serde(default)]
    response: String,
}

/// Extract the answer from Claude's `structured_output.response`
pub fn parse_claude_response(data: &[u8]) -> Result<String, GenerationError> {
    extract_or_raw(data, |bytes| {
        serde_json::from_slice::<ClaudeEnvelope>(bytes)
            .ok()
            .map(|envelope| envelope.structured_output.response)
    })
}
