// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from domain errors to JSON error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gradient_core::GradientError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error on its way to becoming an HTTP response.
///
/// Server faults carry a fixed public message; details only go to the log.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    /// Maps `err`, using `public` as the body of any 5xx.
    pub fn from_domain(err: GradientError, public: &'static str) -> Self {
        match err {
            GradientError::InvalidInput(message) => Self::bad_request(message),
            err @ GradientError::NotFound { .. } => Self::not_found(err.to_string()),
            err => {
                error!(error = %err, "{public}");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: public.to_string(),
                }
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}
