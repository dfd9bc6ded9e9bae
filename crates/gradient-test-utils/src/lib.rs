// SPDX-FileCopyrightText: 2026 Gradient Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Gradient integration tests.
//!
//! Provides a scripted provider and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Generation provider replaying scripted [`Reply`]s
//! - [`TestHarness`] - A full `ChatService` over memory or SQLite storage

pub mod harness;
pub mod mock_provider;

pub use harness::{Exchange, TestHarness, TestHarnessBuilder};
pub use mock_provider::{DEFAULT_REPLY, MockProvider, Reply};
