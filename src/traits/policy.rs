// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Failure policies for the two lifecycle phases.
//!
//! The resolver is written once and instantiated per phase. The policy decides
//! what an error means for the rest of the pass: setup stops at the first
//! failure, teardown records it and keeps going so every registered cleanup
//! gets its chance to run.

use crate::errors::LifecycleError;
use crate::observability::messages::scheduler::TeardownFailureDiscarded;
use crate::observability::messages::StructuredLog;
use std::fmt;

/// The lifecycle phase a registry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Setup,
    Teardown,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Setup => write!(f, "setup"),
            Phase::Teardown => write!(f, "teardown"),
        }
    }
}

/// Decides whether an error stops the current resolution pass.
///
/// `absorb` is consulted right after a failed action and again after each
/// top-level walk of the scheduler. Returning `Err` aborts the walk (and the
/// pass); returning `Ok(())` carries on as if the step had succeeded.
pub trait FailurePolicy {
    const PHASE: Phase;

    fn absorb(err: LifecycleError) -> Result<(), LifecycleError>;
}

/// Setup policy: every error is fatal to the pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct Propagate;

impl FailurePolicy for Propagate {
    const PHASE: Phase = Phase::Setup;

    fn absorb(err: LifecycleError) -> Result<(), LifecycleError> {
        Err(err)
    }
}

/// Teardown policy: errors are logged and dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl FailurePolicy for Discard {
    const PHASE: Phase = Phase::Teardown;

    fn absorb(err: LifecycleError) -> Result<(), LifecycleError> {
        TeardownFailureDiscarded { error: &err }.log();
        Ok(())
    }
}
