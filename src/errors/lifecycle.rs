// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while resolving setup and teardown callbacks.

use crate::traits::Phase;
use thiserror::Error;

/// Errors that can occur while resolving a registry
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The active depth-first path came back to a callback that is still being resolved
    #[error("'{dependent}' has cyclic dependency '{dependency}' ({})", .cycle.join(" -> "))]
    CyclicDependency {
        /// The callback whose dependency closed the cycle
        dependent: String,
        /// The dependency already on the active path
        dependency: String,
        /// The cycle path, starting and ending with `dependency`
        cycle: Vec<String>,
    },

    /// A callback names a dependency that was never registered in the same registry
    #[error("'{callback}' depends on '{missing}' which is not registered")]
    UnregisteredDependency { callback: String, missing: String },

    /// The registered action reported failure
    #[error("{phase} step '{callback}' failed: {source:#}")]
    ActionFailed {
        phase: Phase,
        callback: String,
        #[source]
        source: anyhow::Error,
    },
}

impl LifecycleError {
    /// Name of the callback the error is attributed to.
    pub fn callback(&self) -> &str {
        match self {
            LifecycleError::CyclicDependency { dependent, .. } => dependent,
            LifecycleError::UnregisteredDependency { callback, .. } => callback,
            LifecycleError::ActionFailed { callback, .. } => callback,
        }
    }
}
