//! Gemini CLI adapter

use async_trait::async_trait;
use serde::Deserialize;

use super::command::{run_cli, CliSettings};
use super::envelope::extract_or_raw;
use super::{combined_prompt, GenerationError, Generator};
use crate::normalize::strip_code_fence;

pub struct GeminiClient {
    settings: CliSettings,
}

impl GeminiClient {
    pub const NAME: &'static str = "gemini";
    pub const DEFAULT_BINARY: &'static str = "gemini";

    pub fn new(settings: CliSettings) -> Self {
        Self { settings }
    }

    fn build_args(system_prompt: &str, user_prompt: &str) -> Vec<String> {
        vec![
            "-p".to_string(),
            combined_prompt(system_prompt, user_prompt),
            "--output-format".to_string(),
            "json".to_string(),
        ]
    }
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new(CliSettings::new(Self::DEFAULT_BINARY))
    }
}

#[async_trait]
impl Generator for GeminiClient {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn description(&self) -> &str {
        "Google Gemini"
    }

    async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, GenerationError> {
        let stdout = run_cli(&self.settings, &Self::build_args(system_prompt, user_prompt)).await?;
        parse_gemini_response(&stdout)
    }
}

#[derive(Deserialize)]
struct GeminiEnvelope {
    #[serde(default)]
    response: String,
}

/// Extract the answer from Gemini's `{"response": "...", "stats": {...}}`
pub fn parse_gemini_response(data: &[u8]) -> Result<String, GenerationError> {
    extract_or_raw(data, |bytes| {
        serde_json::from_slice::<GeminiEnvelope>(bytes)
            .ok()
            .map(|envelope| envelope.response)
    })
    .map(|text| strip_code_fence(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args() {
        let args = GeminiClient::build_args("be terse", "What is 2+2?");
        assert_eq!(
            args,
            vec!["-p", "be terse\n\nWhat is 2+2?", "--output-format", "json"]
        );
    }

    #[test]
    fn test_parse_response_field() {
        let input = br#"{"response":"Paris","stats":{"models":{}}}"#;
        assert_eq!(parse_gemini_response(input).unwrap(), "Paris");
    }

    #[test]
    fn test_parse_strips_fence() {
        let input = br#"{"response":"```sql\nSELECT 1\n```"}"#;
        assert_eq!(parse_gemini_response(input).unwrap(), "SELECT 1");
    }

    #[test]
    fn test_raw_fallback_strips_fence() {
        let input = b"Sure:\n```sql\nSELECT 2\n```\n";
        assert_eq!(parse_gemini_response(input).unwrap(), "SELECT 2");
    }

    #[test]
    fn test_empty_response_field_falls_back() {
        let input = br#"{"response":""}"#;
        assert_eq!(parse_gemini_response(input).unwrap(), r#"{"response":""}"#);
    }

    #[test]
    fn test_empty_output_fails() {
        assert_eq!(parse_gemini_response(b""), Err(GenerationError::ParsingFailed));
        assert_eq!(parse_gemini_response(b"\n\n  "), Err(GenerationError::ParsingFailed));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_generate_with_stand_in_binary() {
        let client = GeminiClient::new(CliSettings::new("echo"));
        let text = client.generate("sys", "hello").await.unwrap();
        assert_eq!(text, "-p sys\n\nhello --output-format json");
    }
}
