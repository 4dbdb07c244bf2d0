// Error types for the cachefront gateway

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Install failed: {0}")]
    Install(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

// Convert GatewayError to HTTP responses for Axum
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            GatewayError::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, "invalid_request_error", self.to_string())
            }
            GatewayError::Config(_) | GatewayError::ConfigParsing(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error", self.to_string())
            }
            GatewayError::NetworkUnreachable(_) => {
                (StatusCode::BAD_GATEWAY, "network_error", self.to_string())
            }
            GatewayError::Upstream(_) => {
                (StatusCode::BAD_GATEWAY, "upstream_error", self.to_string())
            }
            GatewayError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "cache_store_error", self.to_string())
            }
            GatewayError::Install(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "install_error", self.to_string())
            }
            _ => {
                (StatusCode::INTERNAL_SERVER_ERROR, "api_error", self.to_string())
            }
        };

        let body = json!({
            "type": "error",
            "error": {
                "type": error_type,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
