// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Mutex, MutexGuard, OnceLock};

use crate::engine::Registry;
use crate::errors::LifecycleError;
use crate::traits::{Discard, Propagate};

/// Setup and teardown registries for one component tree.
///
/// Setup steps are fallible and the first failure aborts [`init`](Lifecycle::init).
/// Teardown steps run on a best-effort basis: [`close`](Lifecycle::close)
/// attempts every one of them and never reports an error.
///
/// # Examples
///
/// ```
/// use lazy_setup::Lifecycle;
///
/// let mut lifecycle = Lifecycle::new();
/// lifecycle.on_init("database", || Ok(()), &["config"]);
/// lifecycle.on_init("config", || Ok(()), &[]);
/// lifecycle.on_close("database", || {}, &[]);
///
/// lifecycle.init().unwrap();
/// assert_eq!(lifecycle.setup().execution_order(), ["config", "database"]);
///
/// lifecycle.close();
/// assert!(lifecycle.teardown().has_run());
/// ```
#[derive(Debug, Default)]
pub struct Lifecycle {
    setup: Registry<Propagate>,
    teardown: Registry<Discard>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a setup step that runs after every step named in `after`.
    pub fn on_init<F>(&mut self, name: impl Into<String>, setup: F, after: &[&str])
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        self.setup.register(name, setup, after);
    }

    /// Run every setup step once. Later calls are no-ops.
    pub fn init(&mut self) -> Result<(), LifecycleError> {
        self.setup.run_all()
    }

    /// Register a cleanup step that runs after every step named in `after`.
    pub fn on_close<F>(&mut self, name: impl Into<String>, cleanup: F, after: &[&str])
    where
        F: FnOnce() + Send + 'static,
    {
        self.teardown.register(
            name,
            move || {
                cleanup();
                Ok(())
            },
            after,
        );
    }

    /// Register a cleanup step whose failure is logged and ignored.
    pub fn on_close_fallible<F>(&mut self, name: impl Into<String>, cleanup: F, after: &[&str])
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        self.teardown.register(name, cleanup, after);
    }

    /// Attempt every cleanup step once. Later calls are no-ops.
    pub fn close(&mut self) {
        // Discard absorbs every error, so there is nothing left to report.
        let _ = self.teardown.run_all();
    }

    /// Validate both registries, setup first.
    pub fn validate(&self) -> Result<(), Vec<LifecycleError>> {
        let mut errors = Vec::new();
        if let Err(setup_errors) = self.setup.validate() {
            errors.extend(setup_errors);
        }
        if let Err(teardown_errors) = self.teardown.validate() {
            errors.extend(teardown_errors);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn setup(&self) -> &Registry<Propagate> {
        &self.setup
    }

    pub fn teardown(&self) -> &Registry<Discard> {
        &self.teardown
    }
}

static SHARED: OnceLock<Mutex<Lifecycle>> = OnceLock::new();

/// The process-wide lifecycle, created empty on first use.
///
/// Prefer passing a `&mut Lifecycle` to collaborators; reserve the shared
/// instance for the outermost composition point. The lock is held while
/// actions run, so an action must not call back into the shared instance.
pub fn shared() -> &'static Mutex<Lifecycle> {
    SHARED.get_or_init(|| Mutex::new(Lifecycle::new()))
}

fn lock_shared() -> MutexGuard<'static, Lifecycle> {
    // A panicking action leaves the lifecycle in a consistent state: the
    // callback is already marked and never retried.
    shared().lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Register a setup step on the shared lifecycle.
pub fn on_init<F>(name: impl Into<String>, setup: F, after: &[&str])
where
    F: FnOnce() -> anyhow::Result<()> + Send + 'static,
{
    lock_shared().on_init(name, setup, after);
}

/// Run the shared lifecycle's setup steps. Safe to call more than once.
pub fn init() -> Result<(), LifecycleError> {
    lock_shared().init()
}

/// Register a cleanup step on the shared lifecycle.
pub fn on_close<F>(name: impl Into<String>, cleanup: F, after: &[&str])
where
    F: FnOnce() + Send + 'static,
{
    lock_shared().on_close(name, cleanup, after);
}

/// Run the shared lifecycle's cleanup steps. Safe to call more than once.
pub fn close() {
    lock_shared().close();
}
