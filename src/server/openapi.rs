//! OpenAPI 3 document served at `/openapi.json`

use serde_json::{json, Value};

use crate::config::ServerConfig;
use crate::providers::ProviderDescriptor;

/// Build the API description for the running proxy.
///
/// The `provider` enum and the provider example come from `providers`, and
/// the server URL follows the configured scheme and port.
pub fn openapi_document(server: &ServerConfig, providers: &[ProviderDescriptor]) -> Value {
    let names: Vec<&str> = providers.iter().map(|p| p.name.as_str()).collect();
    let example_provider = names.first().copied().unwrap_or("claude");
    let second_provider = names.get(1).copied().unwrap_or(example_provider);

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Local AI Tool Proxy API",
            "description": "A local HTTP proxy that bridges web applications with AI CLI tools to generate responses using a configurable system prompt.",
            "version": env!("CARGO_PKG_VERSION"),
            "license": {
                "name": "MIT",
                "url": "https://opensource.org/licenses/MIT"
            }
        },
        "servers": [
            {
                "url": format!("{}://localhost:{}", server.scheme(), server.port),
                "description": "Local proxy"
            }
        ],
        "paths": {
            "/prompt": {
                "post": {
                    "summary": "Generate Response",
                    "description": "Generate a response from a user prompt using an AI CLI tool with the configured system prompt.",
                    "operationId": "generateResponse",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": { "$ref": "#/components/schemas/Request" },
                                "examples": {
                                    "basic": {
                                        "summary": "Basic prompt",
                                        "value": { "user": "What is the capital of France?" }
                                    },
                                    "with_provider": {
                                        "summary": "Prompt with specific provider",
                                        "value": {
                                            "user": "Explain quantum computing in simple terms",
                                            "provider": second_provider
                                        }
                                    }
                                }
                            }
                        }
                    },
                    "responses": {
                        "200": json_response(
                            "Successfully generated response",
                            "Response",
                            json!({ "response": "The capital of France is Paris." }),
                        ),
                        "400": {
                            "description": "Bad request - invalid JSON, missing fields, or unknown provider",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/ErrorResponse" },
                                    "examples": {
                                        "invalid_json": {
                                            "summary": "Invalid JSON",
                                            "value": { "error": "Invalid JSON" }
                                        },
                                        "missing_fields": {
                                            "summary": "Missing required fields",
                                            "value": { "error": "The 'user' field is required" }
                                        },
                                        "unknown_provider": {
                                            "summary": "Unknown provider",
                                            "value": { "error": "Unknown provider: invalid" }
                                        }
                                    }
                                }
                            }
                        },
                        "405": json_response(
                            "Method not allowed - only POST and OPTIONS are supported",
                            "ErrorResponse",
                            json!({ "error": "Method not allowed" }),
                        ),
                        "500": json_response(
                            "Internal server error - AI CLI execution failed",
                            "ErrorResponse",
                            json!({ "error": "Failed to generate response" }),
                        )
                    }
                },
                "options": {
                    "summary": "CORS Preflight",
                    "description": "Handle CORS preflight requests for cross-origin access.",
                    "operationId": "promptOptions",
                    "responses": {
                        "200": { "description": "CORS preflight response with appropriate headers" }
                    }
                }
            },
            "/openapi.json": {
                "get": {
                    "summary": "OpenAPI Specification",
                    "description": "Returns the OpenAPI v3 description of this API.",
                    "operationId": "getOpenAPISpec",
                    "responses": {
                        "200": {
                            "description": "OpenAPI v3 document",
                            "content": {
                                "application/json": { "schema": { "type": "object" } }
                            }
                        }
                    }
                }
            },
            "/providers": {
                "get": {
                    "summary": "List Providers",
                    "description": "Returns the list of available AI providers with their descriptions.",
                    "operationId": "listProviders",
                    "responses": {
                        "200": json_response(
                            "List of available providers",
                            "ProvidersResponse",
                            json!({ "providers": providers }),
                        )
                    }
                }
            },
            "/health": {
                "get": {
                    "summary": "Health Check",
                    "description": "Returns HTTP 200 if the proxy is running. Used by tools to check if the proxy is available.",
                    "operationId": "healthCheck",
                    "responses": {
                        "200": { "description": "Proxy is running" }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Request": {
                    "type": "object",
                    "required": ["user"],
                    "properties": {
                        "user": {
                            "type": "string",
                            "description": "The user prompt to send to the AI provider",
                            "example": "What is the capital of France?"
                        },
                        "provider": {
                            "type": "string",
                            "description": "AI provider to use for response generation. If omitted, uses the default configured provider.",
                            "enum": names,
                            "example": example_provider
                        }
                    }
                },
                "Response": {
                    "type": "object",
                    "properties": {
                        "response": {
                            "type": "string",
                            "description": "Generated response from the AI provider",
                            "example": "The capital of France is Paris."
                        }
                    }
                },
                "ErrorResponse": {
                    "type": "object",
                    "properties": {
                        "error": {
                            "type": "string",
                            "description": "Error message describing what went wrong",
                            "example": "Failed to generate response"
                        }
                    }
                },
                "ProvidersResponse": {
                    "type": "object",
                    "properties": {
                        "providers": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/ProviderInfo" },
                            "description": "List of available AI providers"
                        }
                    }
                },
                "ProviderInfo": {
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "Technical name of the provider",
                            "example": example_provider
                        },
                        "description": {
                            "type": "string",
                            "description": "Human-readable description of the provider"
                        }
                    }
                }
            }
        }
    })
}

fn json_response(description: &str, schema: &str, example: Value) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{}", schema) },
                "example": example
            }
        }
    })
}
