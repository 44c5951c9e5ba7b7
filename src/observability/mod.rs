// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All operational logging goes through message structs with a `Display`
//! implementation, so log text lives in one place instead of being scattered
//! through the builder and the scheduler as string literals.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::builder` - chain resolution and graph output events
//! * `messages::engine` - run lifecycle, per-step and diagnostic events
//!
//! # Usage
//!
//! ```rust
//! use buildchain::observability::messages::engine::StepFailed;
//! use buildchain::observability::messages::StructuredLog;
//!
//! let msg = StepFailed {
//!     step_id: "compile",
//!     error: "source file not found",
//! };
//!
//! msg.log();
//! assert_eq!(msg.to_string(), "Build step 'compile' failed: source file not found");
//! ```

pub mod messages;
