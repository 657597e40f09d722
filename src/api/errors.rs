//! API Error Handling
//!
//! Structured error responses with proper HTTP status codes and request tracking.

use crate::errors::GameError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level API error response with request tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request_id: String,
    pub error: ErrorBody,
}

/// Error body with structured information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error code (NOT_FOUND, GAME_CLOSED, DUPLICATE_GAME_ID, etc.)
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

/// API error types with request tracking
#[derive(Debug)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub request_id: String,
}

#[derive(Debug)]
pub enum ApiErrorKind {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    /// Session no longer accepts bets or closure
    Gone(String),
}

impl ApiError {
    pub fn not_found(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::NotFound(message),
            request_id,
        }
    }

    pub fn bad_request(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::BadRequest(message),
            request_id,
        }
    }

    /// Map a registry error onto its HTTP counterpart
    pub fn from_game_error(request_id: String, error: GameError) -> Self {
        let message = error.to_string();
        let kind = match error {
            GameError::DuplicateGameId(_) => ApiErrorKind::Conflict(message),
            GameError::GameDoesNotExist(_) => ApiErrorKind::NotFound(message),
            GameError::GameTimedOut(_) => ApiErrorKind::Gone(message),
            GameError::InvalidBet { .. } | GameError::InvalidGame { .. } => {
                ApiErrorKind::BadRequest(message)
            }
        };
        Self { kind, request_id }
    }

    fn parts(&self) -> (StatusCode, &'static str, &str) {
        match &self.kind {
            ApiErrorKind::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            ApiErrorKind::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiErrorKind::Conflict(msg) => (StatusCode::CONFLICT, "DUPLICATE_GAME_ID", msg),
            ApiErrorKind::Gone(msg) => (StatusCode::GONE, "GAME_CLOSED", msg),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (_, code, message) = self.parts();
        write!(f, "[{}] {}: {}", self.request_id, code, message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        let body = Json(ErrorResponse {
            request_id: self.request_id.clone(),
            error: ErrorBody {
                code: code.to_string(),
                message: message.to_string(),
            },
        });

        (status, body).into_response()
    }
}
