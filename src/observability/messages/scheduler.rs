// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for resolution pass lifecycle and registration events.
//!
//! This module contains message types for logging events related to:
//! * Pass lifecycle (start, completion, failure, repeated invocation)
//! * Teardown failures that are discarded
//! * Registrations that arrive after the pass already ran

use crate::errors::LifecycleError;
use crate::observability::messages::StructuredLog;
use crate::traits::Phase;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A resolution pass is starting.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PassStarted {
    pub phase: Phase,
    pub callback_count: usize,
}

impl Display for PassStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting {} pass: {} callbacks registered",
            self.phase, self.callback_count
        )
    }
}

impl StructuredLog for PassStarted {
    fn log(&self) {
        tracing::info!(
            phase = %self.phase,
            callback_count = self.callback_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pass",
            span_name = name,
            phase = %self.phase,
            callback_count = self.callback_count,
        )
    }
}

/// A resolution pass finished without a propagated error.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use lazy_setup::observability::messages::scheduler::PassCompleted;
/// use lazy_setup::traits::Phase;
/// use std::time::Duration;
///
/// let msg = PassCompleted {
///     phase: Phase::Teardown,
///     executed: 3,
///     failed: 1,
///     duration: Duration::from_millis(2),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct PassCompleted {
    pub phase: Phase,
    pub executed: usize,
    pub failed: usize,
    pub duration: Duration,
}

impl Display for PassCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} pass completed: {} callbacks run ({} failed) in {:?}",
            self.phase, self.executed, self.failed, self.duration
        )
    }
}

impl StructuredLog for PassCompleted {
    fn log(&self) {
        tracing::info!(
            phase = %self.phase,
            executed = self.executed,
            failed = self.failed,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pass_completed",
            span_name = name,
            phase = %self.phase,
            executed = self.executed,
            failed = self.failed,
            duration = ?self.duration,
        )
    }
}

/// A resolution pass stopped on an error.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct PassFailed<'a> {
    pub phase: Phase,
    pub error: &'a LifecycleError,
}

impl Display for PassFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} pass aborted: {}", self.phase, self.error)
    }
}

impl StructuredLog for PassFailed<'_> {
    fn log(&self) {
        tracing::error!(
            phase = %self.phase,
            callback = self.error.callback(),
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "pass_failed",
            span_name = name,
            phase = %self.phase,
            callback = self.error.callback(),
        )
    }
}

/// The pass already ran; the call is a no-op.
///
/// # Log Level
/// `debug!` - Expected on repeated invocation
pub struct PassSkipped {
    pub phase: Phase,
}

impl Display for PassSkipped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{} pass already ran, skipping", self.phase)
    }
}

impl StructuredLog for PassSkipped {
    fn log(&self) {
        tracing::debug!(phase = %self.phase, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("pass_skipped", span_name = name, phase = %self.phase)
    }
}

/// A teardown error was recorded and dropped.
///
/// # Log Level
/// `warn!` - Cleanup continues regardless
///
/// # Example
/// ```
/// use lazy_setup::errors::LifecycleError;
/// use lazy_setup::observability::messages::scheduler::TeardownFailureDiscarded;
///
/// let error = LifecycleError::UnregisteredDependency {
///     callback: "cache".to_string(),
///     missing: "db".to_string(),
/// };
/// let msg = TeardownFailureDiscarded { error: &error };
///
/// assert!(msg.to_string().starts_with("Ignoring teardown failure"));
/// ```
pub struct TeardownFailureDiscarded<'a> {
    pub error: &'a LifecycleError,
}

impl Display for TeardownFailureDiscarded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Ignoring teardown failure: {}", self.error)
    }
}

impl StructuredLog for TeardownFailureDiscarded<'_> {
    fn log(&self) {
        tracing::warn!(
            callback = self.error.callback(),
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "teardown_failure",
            span_name = name,
            callback = self.error.callback(),
        )
    }
}

/// A callback was registered after its registry already ran.
///
/// # Log Level
/// `warn!` - The callback will never run
pub struct LateRegistration<'a> {
    pub phase: Phase,
    pub callback: &'a str,
}

impl Display for LateRegistration<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} step '{}' registered after the pass ran; it will not be executed",
            self.phase, self.callback
        )
    }
}

impl StructuredLog for LateRegistration<'_> {
    fn log(&self) {
        tracing::warn!(
            phase = %self.phase,
            callback = self.callback,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "late_registration",
            span_name = name,
            phase = %self.phase,
            callback = self.callback,
        )
    }
}
