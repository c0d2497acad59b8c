//! OpenAI Codex CLI adapter
//!
//! `codex exec --json` prints one JSON event per line. The answer is the text
//! of the last completed agent message:
//!
//! ```json
//! {"type":"thread.started","thread_id":"0199..."}
//! {"type":"item.completed","item":{"id":"item_0","type":"reasoning","text":"..."}}
//! {"type":"item.completed","item":{"id":"item_1","type":"agent_message","text":"SELECT 1"}}
//! {"type":"turn.completed","usage":{"input_tokens":10,"output_tokens":3}}
//! ```

use async_trait::async_trait;
use serde::Deserialize;

use super::command::{run_cli, CliSettings};
use super::envelope::{extract_or_raw, json_lines};
use super::{combined_prompt, GenerationError, Generator};
use crate::normalize::strip_code_fence;

pub struct CodexClient {
    settings: CliSettings,
}

impl CodexClient {
    pub const NAME: &'static str = "codex";
    pub const DEFAULT_BINARY: &'static str = "codex";

    pub fn new(settings: CliSettings) -> Self {
        Self { settings }
    }

    fn build_args(system_prompt: &str, user_prompt: &str) -> Vec<String> {
        vec![
            "exec".to_string(),
            "--skip-git-repo-check".to_string(),
            "--json".to_string(),
            combined_prompt(system_prompt, user_prompt),
        ]
    }
}

impl Default for CodexClient {
    fn default() -> Self {
        Self::new(CliSettings::new(Self::DEFAULT_BINARY))
    }
}

#[async_trait]
impl Generator for CodexClient {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "OpenAI Codex"
    }

    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, GenerationError> {
        let stdout = run_cli(&self.settings, &Self::build_args(system_prompt, user_prompt)).await?;
        parse_codex_response(&stdout)
    }
}

#[derive(Deserialize)]
struct CodexEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    item: Option<CodexItem>,
}

#[derive(Deserialize)]
struct CodexItem {
    // Older releases called this `item_type`
    #[serde(rename = "type", alias = "item_type", default)]
    kind: String,
    #[serde(default)]
    text: String,
}

impl CodexItem {
    fn is_agent_message(&self) -> bool {
        matches!(self.kind.as_str(), "agent_message" | "assistant_message")
    }
}

pub fn parse_codex_response(data: &[u8]) -> Result<String, GenerationError> {
    extract_or_raw(data, |bytes| {
        json_lines::<CodexEvent>(bytes)
            .filter(|event| event.kind == "item.completed")
            .filter_map(|event| event.item)
            .filter(|item| item.is_agent_message() && !item.text.is_empty())
            .last()
            .map(|item| item.text)
    })
    .map(|text| strip_code_fence(&text))
}
