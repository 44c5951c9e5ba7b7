// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable text and
//! [`StructuredLog`] to emit it as a `tracing` event with typed fields at the
//! level the message calls for.
//!
//! * `builder` - chain build lifecycle and graph output
//! * `engine` - execution lifecycle, build steps and diagnostics

use tracing::Span;

pub mod builder;
pub mod engine;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: std::fmt::Display {
    /// Emits the message as a `tracing` event.
    fn log(&self);

    /// Creates a span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
