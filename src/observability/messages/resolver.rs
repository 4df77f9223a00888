// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for events inside a single depth-first walk.
//!
//! This module contains message types for logging events related to:
//! * Callback invocation (start, completion, failure)
//! * Cyclic dependency detection
//! * Unregistered dependency detection

use crate::observability::messages::StructuredLog;
use crate::traits::Phase;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A callback's action is about to be invoked.
///
/// # Log Level
/// `debug!` - Per-callback detail
///
/// # Example
/// ```
/// use lazy_setup::observability::messages::resolver::CallbackStarted;
/// use lazy_setup::traits::Phase;
///
/// let msg = CallbackStarted {
///     phase: Phase::Setup,
///     callback: "database",
///     depth: 1,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct CallbackStarted<'a> {
    pub phase: Phase,
    pub callback: &'a str,
    /// Length of the active depth-first path, the callback included.
    pub depth: usize,
}

impl Display for CallbackStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Running {} step '{}' (depth {})",
            self.phase, self.callback, self.depth
        )
    }
}

impl StructuredLog for CallbackStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            phase = %self.phase,
            callback = self.callback,
            depth = self.depth,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "callback",
            span_name = name,
            phase = %self.phase,
            callback = self.callback,
            depth = self.depth,
        )
    }
}

/// A callback's action returned success.
///
/// # Log Level
/// `debug!` - Per-callback detail
pub struct CallbackCompleted<'a> {
    pub phase: Phase,
    pub callback: &'a str,
    pub duration: Duration,
}

impl Display for CallbackCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Completed {} step '{}' in {:?}",
            self.phase, self.callback, self.duration
        )
    }
}

impl StructuredLog for CallbackCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            phase = %self.phase,
            callback = self.callback,
            duration_us = self.duration.as_micros() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "callback_completed",
            span_name = name,
            phase = %self.phase,
            callback = self.callback,
            duration = ?self.duration,
        )
    }
}

/// A callback's action reported failure.
///
/// # Log Level
/// `error!` for setup, `warn!` for teardown (the failure is discarded there)
///
/// # Example
/// ```
/// use lazy_setup::observability::messages::resolver::CallbackFailed;
/// use lazy_setup::traits::Phase;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "connection refused");
/// let msg = CallbackFailed {
///     phase: Phase::Setup,
///     callback: "database",
///     error: &error,
/// };
///
/// assert_eq!(msg.to_string(), "setup step 'database' failed: connection refused");
/// ```
pub struct CallbackFailed<'a> {
    pub phase: Phase,
    pub callback: &'a str,
    pub error: &'a (dyn std::error::Error + 'static),
}

impl Display for CallbackFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} step '{}' failed: {}",
            self.phase, self.callback, self.error
        )
    }
}

impl StructuredLog for CallbackFailed<'_> {
    fn log(&self) {
        match self.phase {
            Phase::Setup => tracing::error!(
                phase = %self.phase,
                callback = self.callback,
                error = %self.error,
                "{}", self
            ),
            Phase::Teardown => tracing::warn!(
                phase = %self.phase,
                callback = self.callback,
                error = %self.error,
                "{}", self
            ),
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "callback_failed",
            span_name = name,
            phase = %self.phase,
            callback = self.callback,
            error = %self.error,
        )
    }
}

/// The active path revisited a callback that is still being resolved.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use lazy_setup::observability::messages::resolver::CyclicDependencyDetected;
///
/// let cycle = vec!["x".to_string(), "y".to_string(), "x".to_string()];
/// let msg = CyclicDependencyDetected {
///     dependent: "y",
///     dependency: "x",
///     cycle: &cycle,
/// };
///
/// assert_eq!(msg.to_string(), "Cyclic dependency detected: x -> y -> x");
/// ```
pub struct CyclicDependencyDetected<'a> {
    pub dependent: &'a str,
    pub dependency: &'a str,
    pub cycle: &'a [String],
}

impl Display for CyclicDependencyDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cyclic dependency detected: {}", self.cycle.join(" -> "))
    }
}

impl StructuredLog for CyclicDependencyDetected<'_> {
    fn log(&self) {
        tracing::error!(
            dependent = self.dependent,
            dependency = self.dependency,
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "cyclic_dependency",
            span_name = name,
            dependent = self.dependent,
            dependency = self.dependency,
            cycle_length = self.cycle.len(),
        )
    }
}

/// A callback names a dependency that is not in its registry.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct UnregisteredDependency<'a> {
    pub callback: &'a str,
    pub missing: &'a str,
}

impl Display for UnregisteredDependency<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Callback '{}' depends on unregistered callback '{}'",
            self.callback, self.missing
        )
    }
}

impl StructuredLog for UnregisteredDependency<'_> {
    fn log(&self) {
        tracing::error!(
            callback = self.callback,
            missing = self.missing,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "unregistered_dependency",
            span_name = name,
            callback = self.callback,
            missing = self.missing,
        )
    }
}
