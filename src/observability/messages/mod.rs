// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Every diagnostic event emitted by the resolver is a small struct that
//! implements `Display` for the human-readable line and [`StructuredLog`] for
//! the structured fields.
//!
//! # Organization
//!
//! * `resolver` - per-callback events inside a depth-first walk
//! * `scheduler` - resolution pass lifecycle and registration events
//!
//! # Usage Pattern
//!
//! ```rust
//! use lazy_setup::observability::messages::scheduler::PassStarted;
//! use lazy_setup::observability::messages::StructuredLog;
//! use lazy_setup::traits::Phase;
//!
//! let msg = PassStarted {
//!     phase: Phase::Setup,
//!     callback_count: 5,
//! };
//!
//! msg.log();
//! ```

pub mod resolver;
pub mod scheduler;

use tracing::Span;

/// A message that knows its own log level and structured fields.
pub trait StructuredLog {
    /// Emit the message as a tracing event at its designated level.
    fn log(&self);

    /// Build a span carrying the same fields as the event.
    fn span(&self, name: &str) -> Span;
}
