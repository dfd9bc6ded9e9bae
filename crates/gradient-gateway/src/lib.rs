// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Gradient learning assistant.
//!
//! Exposes the streamed send-message endpoint plus recommendation,
//! history, chat management and health routes over axum.

pub mod error;
pub mod handlers;
pub mod server;
pub mod sse;

pub use error::{ApiError, ErrorResponse};
pub use server::{GatewayState, HealthState, router, serve, start_server};
