//! `POST /prompt` dispatcher

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::time::Instant;
use tracing::Instrument;

use super::router::ProxyState;
use crate::api::{ErrorResponse, PromptRequest, PromptResponse};
use crate::config::StatsFormat;
use crate::providers::{GenerationError, Generator};
use crate::stats::{format_metrics, format_prompt_log, GenerationMetrics};

/// Every way a prompt request can be refused.
///
/// The Display text is exactly what the client sees. Generation failures
/// all read "Failed to generate response"; the underlying cause is only
/// logged.
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid JSON")]
    InvalidJson,

    #[error("The 'user' field is required")]
    MissingUser,

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Failed to generate response")]
    Generation(#[from] GenerationError),
}

impl PromptError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InvalidJson | Self::MissingUser | Self::UnknownProvider(_) => StatusCode::BAD_REQUEST,
            Self::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PromptError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Validates a prompt request and runs it against one provider
pub struct PromptHandler {
    state: ProxyState,
}

impl PromptHandler {
    pub fn new(state: ProxyState) -> Self {
        Self { state }
    }

    /// Handle one request, returning the provider's answer
    pub async fn handle(&self, method: &Method, body: &[u8]) -> Result<String, PromptError> {
        if method != Method::POST {
            return Err(PromptError::MethodNotAllowed);
        }

        let request = parse_request(body)?;
        let user = request.user_prompt().ok_or(PromptError::MissingUser)?;

        let provider = request
            .requested_provider()
            .unwrap_or(&self.state.config.generation.default_provider);
        let generator = self
            .state
            .registry
            .get(provider)
            .ok_or_else(|| PromptError::UnknownProvider(provider.to_string()))?;

        tracing::info!("{}", format_prompt_log(provider, user));

        Ok(self.generate(provider, generator.as_ref(), user).await?)
    }

    /// Run the generator inside a request span, recording metrics.
    ///
    /// With `generation.max_concurrent` set, waits for a permit first.
    async fn generate(
        &self,
        provider: &str,
        generator: &dyn Generator,
        user: &str,
    ) -> Result<String, GenerationError> {
        let mut metrics = GenerationMetrics::new(provider, user);
        let span = tracing::info_span!(
            "generate",
            request_id = %metrics.request_id,
            provider = %provider
        );

        async {
            let _permit = match &self.state.limiter {
                Some(limiter) => Some(limiter.acquire().await.map_err(|_| {
                    GenerationError::ExecutionFailed {
                        stderr: "generation limiter closed".to_string(),
                    }
                })?),
                None => None,
            };

            let start = Instant::now();
            let result = generator.generate(&self.state.system_prompt, user).await;
            metrics.finish(&result, start.elapsed().as_secs_f64() * 1000.0);

            match &result {
                Ok(text) => tracing::debug!(output_len = text.len(), "Provider answered"),
                Err(e) => tracing::error!(error = %e, "Provider failed"),
            }

            if self.state.config.stats.enabled {
                let formatted = format_metrics(&metrics, self.state.config.stats.format);
                if self.state.config.stats.format == StatsFormat::Compact {
                    tracing::info!("{}", formatted);
                } else {
                    tracing::info!("\n{}", formatted);
                }
            }

            result
        }
        .instrument(span)
        .await
    }
}

/// Decode the body. A JSON `null` reads as an empty request; anything else
/// that is not an object of the right shape is rejected.
fn parse_request(body: &[u8]) -> Result<PromptRequest, PromptError> {
    let value: serde_json::Value = serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Request body is not JSON");
        PromptError::InvalidJson
    })?;

    if value.is_null() {
        return Ok(PromptRequest::default());
    }
    if !value.is_object() {
        tracing::debug!("Request body is not a JSON object");
        return Err(PromptError::InvalidJson);
    }

    serde_json::from_value(value).map_err(|e| {
        tracing::debug!(error = %e, "Request body has the wrong shape");
        PromptError::InvalidJson
    })
}

/// `/prompt` route
pub async fn prompt_handler(State(state): State<ProxyState>, method: Method, body: Bytes) -> Response {
    let handler = PromptHandler::new(state);
    match handler.handle(&method, &body).await {
        Ok(response) => Json(PromptResponse { response }).into_response(),
        Err(e) => e.into_response(),
    }
}
