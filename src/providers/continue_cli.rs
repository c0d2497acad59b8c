//! Continue CLI (`cn`) adapter
//!
//! In headless JSON mode `cn` wraps plain-text answers as
//! `{"response": "...", "status": "success", "note": "..."}`.

use async_trait::async_trait;
use serde::Deserialize;

use super::command::{run_cli, CliSettings};
use super::envelope::extract_or_raw;
use super::{combined_prompt, GenerationError, Generator};
use crate::normalize::strip_code_fence;

pub struct ContinueClient {
    settings: CliSettings,
}

impl ContinueClient {
    pub const NAME: &'static str = "continue";
    pub const DEFAULT_BINARY: &'static str = "cn";

    pub fn new(settings: CliSettings) -> Self {
        Self { settings }
    }

    fn build_args(system_prompt: &str, user_prompt: &str) -> Vec<String> {
        vec![
            "-p".to_string(),
            combined_prompt(system_prompt, user_prompt),
            "--format".to_string(),
            "json".to_string(),
            "--silent".to_string(),
        ]
    }
}

impl Default for ContinueClient {
    fn default() -> Self {
        Self::new(CliSettings::new(Self::DEFAULT_BINARY))
    }
}

#[async_trait]
impl Generator for ContinueClient {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Continue"
    }

    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, GenerationError> {
        let stdout = run_cli(&self.settings, &Self::build_args(system_prompt, user_prompt)).await?;
        parse_continue_response(&stdout)
    }
}

#[derive(Deserialize)]
struct ContinueEnvelope {
    #[serde(default)]
    response: String,
    #[serde(default)]
    status: String,
}

pub fn parse_continue_response(data: &[u8]) -> Result<String, GenerationError> {
    extract_or_raw(data, |bytes| {
        serde_json::from_slice::<ContinueEnvelope>(bytes).ok().map(|envelope| {
            if !envelope.status.is_empty() && envelope.status != "success" {
                tracing::debug!(status = %envelope.status, "Continue reported non-success status");
            }
            envelope.response
        })
    })
    .map(|text| strip_code_fence(&text))
}
