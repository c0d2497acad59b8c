//! Shared state, routes and CORS handling

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tower_http::trace::TraceLayer;

use super::handler::prompt_handler;
use super::openapi::openapi_document;
use super::ServerError;
use crate::api::{ErrorResponse, ProvidersResponse};
use crate::config::AppConfig;
use crate::providers::ProviderRegistry;

const ALLOW_PRIVATE_NETWORK: HeaderName = HeaderName::from_static("access-control-allow-private-network");

/// Shared state for the proxy
#[derive(Clone)]
pub struct ProxyState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<ProviderRegistry>,
    pub system_prompt: Arc<str>,
    pub(super) allowed_origin: HeaderValue,
    pub(super) limiter: Option<Arc<Semaphore>>,
    openapi: Arc<serde_json::Value>,
}

impl ProxyState {
    pub fn new(config: AppConfig, registry: ProviderRegistry, system_prompt: String) -> Result<Self, ServerError> {
        let allowed_origin = HeaderValue::from_str(&config.server.allowed_origin)
            .map_err(|_| ServerError::InvalidOrigin(config.server.allowed_origin.clone()))?;
        let limiter = match config.generation.max_concurrent {
            Some(permits) if permits == 0 || permits > Semaphore::MAX_PERMITS => {
                return Err(ServerError::InvalidConcurrency(permits));
            }
            Some(permits) => Some(Arc::new(Semaphore::new(permits))),
            None => None,
        };
        let openapi = openapi_document(&config.server, &registry.descriptors());

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            system_prompt: Arc::from(system_prompt),
            allowed_origin,
            limiter,
            openapi: Arc::new(openapi),
        })
    }
}

/// Build the application router
pub fn build_router(state: ProxyState) -> Router {
    Router::new()
        .route("/prompt", any(prompt_handler))
        .route("/providers", any(providers_handler))
        .route("/health", any(health_handler))
        .route("/openapi.json", any(openapi_handler))
        .fallback(not_found_handler)
        .layer(middleware::from_fn_with_state(state.clone(), cors_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Adds the CORS headers to every response and answers preflight requests
/// directly with an empty 200.
async fn cors_middleware(State(state): State<ProxyState>, req: Request, next: Next) -> Response {
    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(req).await
    };
    apply_cors_headers(response.headers_mut(), &state.allowed_origin);
    response
}

fn apply_cors_headers(headers: &mut HeaderMap, origin: &HeaderValue) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, GET, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    headers.insert(ALLOW_PRIVATE_NETWORK, HeaderValue::from_static("true"));
}

fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse {
            error: "Method not allowed".to_string(),
        }),
    )
        .into_response()
}

/// `/providers` route
async fn providers_handler(State(state): State<ProxyState>, method: Method) -> Response {
    if method != Method::GET {
        return method_not_allowed();
    }
    Json(ProvidersResponse {
        providers: state.registry.descriptors(),
    })
    .into_response()
}

/// Liveness probe, empty body either way
async fn health_handler(method: Method) -> StatusCode {
    if method == Method::GET {
        StatusCode::OK
    } else {
        StatusCode::METHOD_NOT_ALLOWED
    }
}

async fn openapi_handler(State(state): State<ProxyState>, method: Method) -> Response {
    if method != Method::GET {
        return method_not_allowed();
    }
    Json(state.openapi.as_ref().clone()).into_response()
}

async fn not_found_handler() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Not found".to_string(),
        }),
    )
        .into_response()
}
