//! Request and response bodies for the proxy endpoints

use serde::{Deserialize, Serialize};

use crate::providers::ProviderDescriptor;

/// `POST /prompt` body
///
/// Unknown fields are ignored. `null` and missing values are treated like
/// empty ones.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PromptRequest {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

impl PromptRequest {
    /// The user prompt, if present and non-empty
    pub fn user_prompt(&self) -> Option<&str> {
        self.user.as_deref().filter(|u| !u.is_empty())
    }

    /// The requested provider, if present and non-empty
    pub fn requested_provider(&self) -> Option<&str> {
        self.provider.as_deref().filter(|p| !p.is_empty())
    }
}

/// Successful `POST /prompt` reply
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PromptResponse {
    pub response: String,
}

/// Error reply shared by every endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// `GET /providers` reply
#[derive(Debug, Clone, Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderDescriptor>,
}
