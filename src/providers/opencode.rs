//! OpenCode adapter
//!
//! `opencode run --format json` streams JSON events, one per line. Text parts
//! arrive as `{"type":"text","part":{"type":"text","text":"..."}}` and are
//! joined in order.

use async_trait::async_trait;
use serde::Deserialize;

use super::command::{run_cli, CliSettings};
use super::envelope::{extract_or_raw, json_lines};
use super::{combined_prompt, GenerationError, Generator};
use crate::normalize::strip_code_fence;

pub struct OpenCodeClient {
    settings: CliSettings,
}

impl OpenCodeClient {
    pub const NAME: &'static str = "opencode";
    pub const DEFAULT_BINARY: &'static str = "opencode";

    pub fn new(settings: CliSettings) -> Self {
        Self { settings }
    }

    fn build_args(system_prompt: &str, user_prompt: &str) -> Vec<String> {
        vec![
            "run".to_string(),
            "--format".to_string(),
            "json".to_string(),
            combined_prompt(system_prompt, user_prompt),
        ]
    }
}

impl Default for OpenCodeClient {
    fn default() -> Self {
        Self::new(CliSettings::new(Self::DEFAULT_BINARY))
    }
}

#[async_trait]
impl Generator for OpenCodeClient {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "OpenCode"
    }

    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, GenerationError> {
        let stdout = run_cli(&self.settings, &Self::build_args(system_prompt, user_prompt)).await?;
        parse_opencode_response(&stdout)
    }
}

#[derive(Deserialize)]
struct OpenCodeEvent {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    part: Option<OpenCodePart>,
}

#[derive(Deserialize)]
struct OpenCodePart {
    #[serde(default)]
    text: String,
}

pub fn parse_opencode_response(data: &[u8]) -> Result<String, GenerationError> {
    extract_or_raw(data, |bytes| {
        let text: String = json_lines::<OpenCodeEvent>(bytes)
            .filter(|event| event.kind == "text")
            .filter_map(|event| event.part)
            .map(|part| part.text)
            .collect();
        Some(text)
    })
    .map(|text| strip_code_fence(&text))
}
