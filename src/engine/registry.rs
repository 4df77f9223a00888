// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt;
use std::marker::PhantomData;
use std::time::Instant;

use crate::engine::callback::{Action, Callback, Resolution};
use crate::engine::validation::validate_callbacks;
use crate::errors::LifecycleError;
use crate::observability::messages::resolver::{
    CallbackCompleted, CallbackFailed, CallbackStarted, CyclicDependencyDetected,
    UnregisteredDependency,
};
use crate::observability::messages::scheduler::{
    LateRegistration, PassCompleted, PassFailed, PassSkipped, PassStarted,
};
use crate::observability::messages::StructuredLog;
use crate::traits::FailurePolicy;

/// Named callbacks for one lifecycle phase, resolved in dependency order.
///
/// A registry has two phases that must not interleave: callbacks are added
/// with [`register`](Registry::register), then [`run_all`](Registry::run_all)
/// executes every one of them exactly once, each strictly after the callbacks
/// it depends on. The failure policy `P` decides whether an error stops the
/// pass ([`Propagate`](crate::traits::Propagate)) or is logged and dropped
/// ([`Discard`](crate::traits::Discard)).
///
/// Callbacks are kept in registration order, which is also the order the
/// scheduler starts its walks in. Ties between callbacks that have no
/// dependency relationship are therefore broken by registration order.
///
/// # Examples
///
/// ```
/// use lazy_setup::engine::Registry;
/// use lazy_setup::traits::Propagate;
/// use std::sync::{Arc, Mutex};
///
/// let order = Arc::new(Mutex::new(Vec::new()));
/// let mut registry: Registry<Propagate> = Registry::new();
///
/// let log = Arc::clone(&order);
/// registry.register(
///     "server",
///     move || {
///         log.lock().unwrap().push("server");
///         Ok(())
///     },
///     &["config"],
/// );
/// let log = Arc::clone(&order);
/// registry.register(
///     "config",
///     move || {
///         log.lock().unwrap().push("config");
///         Ok(())
///     },
///     &[],
/// );
///
/// registry.run_all().unwrap();
/// assert_eq!(*order.lock().unwrap(), vec!["config", "server"]);
/// ```
pub struct Registry<P: FailurePolicy> {
    callbacks: IndexMap<String, Callback>,
    execution_order: Vec<String>,
    has_run: bool,
    _policy: PhantomData<P>,
}

/// A callback on the resolution stack and the position of the next
/// dependency to look at.
struct Frame {
    index: usize,
    next: usize,
}

/// Active depth-first path of a single top-level walk.
#[derive(Default)]
struct Walk {
    on_stack: HashSet<String>,
    path: Vec<String>,
}

impl Walk {
    fn enter(&mut self, name: &str) {
        self.on_stack.insert(name.to_string());
        self.path.push(name.to_string());
    }

    fn leave(&mut self, name: &str) {
        self.on_stack.remove(name);
        self.path.pop();
    }

    fn contains(&self, name: &str) -> bool {
        self.on_stack.contains(name)
    }

    fn depth(&self) -> usize {
        self.path.len()
    }

    /// Path segment from `name` to the current node, closed back onto `name`.
    fn cycle_to(&self, name: &str) -> Vec<String> {
        let start = self.path.iter().position(|n| n == name).unwrap_or(0);
        let mut cycle = self.path[start..].to_vec();
        cycle.push(name.to_string());
        cycle
    }
}

impl<P: FailurePolicy> Registry<P> {
    pub fn new() -> Self {
        Self {
            callbacks: IndexMap::new(),
            execution_order: Vec::new(),
            has_run: false,
            _policy: PhantomData,
        }
    }

    /// Add a callback, replacing any earlier one with the same name.
    ///
    /// A replaced callback keeps its original position in the registry.
    /// Registering after [`run_all`](Registry::run_all) has run is logged and
    /// the callback is never executed.
    pub fn register<F>(&mut self, name: impl Into<String>, action: F, depends_on: &[&str])
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        let depends_on = depends_on.iter().map(|d| d.to_string()).collect();
        self.insert(Callback::new(name, Box::new(action) as Action, depends_on));
    }

    /// Add a pre-built callback, replacing any earlier one with the same name.
    pub fn insert(&mut self, callback: Callback) {
        if self.has_run {
            LateRegistration {
                phase: P::PHASE,
                callback: callback.name(),
            }
            .log();
        }
        self.callbacks.insert(callback.name().to_string(), callback);
    }

    /// Run every registered callback once, in dependency order.
    ///
    /// The first call walks the whole registry; every later call is a no-op
    /// returning `Ok(())`, whether or not the first one succeeded.
    pub fn run_all(&mut self) -> Result<(), LifecycleError> {
        if self.has_run {
            PassSkipped { phase: P::PHASE }.log();
            return Ok(());
        }

        let start_msg = PassStarted {
            phase: P::PHASE,
            callback_count: self.callbacks.len(),
        };
        let span = start_msg.span("pass");
        let _guard = span.enter();
        start_msg.log();
        let started = Instant::now();

        let result = self.resolve_all();
        self.has_run = true;

        match &result {
            Ok(()) => PassCompleted {
                phase: P::PHASE,
                executed: self.execution_order.len(),
                failed: self.failed_count(),
                duration: started.elapsed(),
            }
            .log(),
            Err(err) => PassFailed {
                phase: P::PHASE,
                error: err,
            }
            .log(),
        }

        result
    }

    /// Check every dependency reference and look for cycles without running anything.
    ///
    /// `run_all` detects the same problems on its own; this only surfaces them
    /// up front, and reports all unregistered references at once.
    pub fn validate(&self) -> Result<(), Vec<LifecycleError>> {
        validate_callbacks(&self.callbacks)
    }

    pub fn has_run(&self) -> bool {
        self.has_run
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.callbacks.contains_key(name)
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.callbacks.keys().map(String::as_str)
    }

    /// Resolution state of a callback, `None` if it was never registered.
    pub fn outcome(&self, name: &str) -> Option<Resolution> {
        self.callbacks.get(name).map(Callback::state)
    }

    /// Names whose actions were invoked, in invocation order.
    pub fn execution_order(&self) -> &[String] {
        &self.execution_order
    }

    fn failed_count(&self) -> usize {
        self.callbacks
            .values()
            .filter(|c| c.state() == Resolution::Failed)
            .count()
    }

    fn resolve_all(&mut self) -> Result<(), LifecycleError> {
        for index in 0..self.callbacks.len() {
            let mut walk = Walk::default();
            if let Err(err) = self.resolve(&mut walk, index) {
                P::absorb(err)?;
            }
        }
        Ok(())
    }

    /// Resolve every dependency of the callback at `root`, then invoke it.
    ///
    /// Depth-first over an explicit stack of frames, so chain length is bounded
    /// by the heap rather than the thread stack. Dependencies are visited in
    /// declaration order and each callback is invoked once its frame has
    /// exhausted them.
    fn resolve(&mut self, walk: &mut Walk, root: usize) -> Result<(), LifecycleError> {
        if self.callbacks[root].state().is_settled() {
            return Ok(());
        }
        walk.enter(self.callbacks[root].name());
        let mut stack = vec![Frame { index: root, next: 0 }];

        while let Some(frame) = stack.last_mut() {
            let callback = &self.callbacks[frame.index];

            let Some(dependency) = callback.depends_on().get(frame.next) else {
                let index = frame.index;
                let name = callback.name().to_string();
                stack.pop();

                let depth = walk.depth();
                walk.leave(&name);
                self.invoke(index, name, depth)?;
                continue;
            };
            frame.next += 1;

            let Some(dependency_index) = self.callbacks.get_index_of(dependency.as_str()) else {
                return Err(unregistered(callback.name(), dependency));
            };

            if self.callbacks[dependency_index].state().is_settled() {
                continue;
            }

            if walk.contains(dependency) {
                return Err(cyclic(callback.name(), dependency, walk.cycle_to(dependency)));
            }

            walk.enter(dependency);
            stack.push(Frame {
                index: dependency_index,
                next: 0,
            });
        }

        Ok(())
    }

    fn invoke(&mut self, index: usize, name: String, depth: usize) -> Result<(), LifecycleError> {
        let Some(action) = self.callbacks[index].begin() else {
            return Ok(());
        };

        let start_msg = CallbackStarted {
            phase: P::PHASE,
            callback: &name,
            depth,
        };
        let span = start_msg.span("callback");
        let _guard = span.enter();
        start_msg.log();

        self.execution_order.push(name.clone());
        let started = Instant::now();

        match action() {
            Ok(()) => {
                self.callbacks[index].finish(true);
                CallbackCompleted {
                    phase: P::PHASE,
                    callback: &name,
                    duration: started.elapsed(),
                }
                .log();
                Ok(())
            }
            Err(source) => {
                self.callbacks[index].finish(false);
                CallbackFailed {
                    phase: P::PHASE,
                    callback: &name,
                    error: &*source,
                }
                .log();
                P::absorb(LifecycleError::ActionFailed {
                    phase: P::PHASE,
                    callback: name,
                    source,
                })
            }
        }
    }
}

fn unregistered(callback: &str, missing: &str) -> LifecycleError {
    UnregisteredDependency { callback, missing }.log();
    LifecycleError::UnregisteredDependency {
        callback: callback.to_string(),
        missing: missing.to_string(),
    }
}

fn cyclic(dependent: &str, dependency: &str, cycle: Vec<String>) -> LifecycleError {
    CyclicDependencyDetected {
        dependent,
        dependency,
        cycle: &cycle,
    }
    .log();
    LifecycleError::CyclicDependency {
        dependent: dependent.to_string(),
        dependency: dependency.to_string(),
        cycle,
    }
}

impl<P: FailurePolicy> Default for Registry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: FailurePolicy> fmt::Debug for Registry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("phase", &P::PHASE)
            .field("callbacks", &self.callbacks.values().collect::<Vec<_>>())
            .field("has_run", &self.has_run)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{Discard, Propagate};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    type Recorder = Arc<Mutex<Vec<String>>>;

    type TestAction = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;

    fn recording(recorder: &Recorder, name: &str) -> TestAction {
        let recorder = Arc::clone(recorder);
        let name = name.to_string();
        Box::new(move || {
            recorder.lock().unwrap().push(name);
            Ok(())
        })
    }

    fn failing(recorder: &Recorder, name: &str) -> TestAction {
        let recorder = Arc::clone(recorder);
        let name = name.to_string();
        Box::new(move || {
            recorder.lock().unwrap().push(name.clone());
            anyhow::bail!("{} exploded", name)
        })
    }

    #[test]
    fn test_empty_registry_runs() {
        let mut registry: Registry<Propagate> = Registry::new();

        assert!(registry.is_empty());
        assert!(registry.run_all().is_ok());
        assert!(registry.has_run());
        assert!(registry.execution_order().is_empty());
    }

    #[test]
    fn test_single_callback_success() {
        let recorder = Recorder::default();
        let mut registry: Registry<Propagate> = Registry::new();
        registry.register("only", recording(&recorder, "only"), &[]);

        registry.run_all().unwrap();

        assert_eq!(*recorder.lock().unwrap(), vec!["only"]);
        assert_eq!(registry.outcome("only"), Some(Resolution::Succeeded));
    }

    #[test]
    fn test_single_callback_error_propagates() {
        let recorder = Recorder::default();
        let mut registry: Registry<Propagate> = Registry::new();
        registry.register("broken", failing(&recorder, "broken"), &[]);

        let err = registry.run_all().unwrap_err();

        assert!(matches!(
            err,
            LifecycleError::ActionFailed { ref callback, .. } if callback == "broken"
        ));
        assert_eq!(err.to_string(), "setup step 'broken' failed: broken exploded");
        assert_eq!(registry.outcome("broken"), Some(Resolution::Failed));
        assert!(registry.has_run());
    }

    #[test]
    fn test_second_run_is_noop_after_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry: Registry<Propagate> = Registry::new();
        let counter = Arc::clone(&calls);
        registry.register(
            "count",
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
            &[],
        );

        registry.run_all().unwrap();
        registry.run_all().unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_second_run_is_noop_after_failure() {
        let recorder = Recorder::default();
        let mut registry: Registry<Propagate> = Registry::new();
        registry.register("broken", failing(&recorder, "broken"), &[]);

        assert!(registry.run_all().is_err());
        assert!(registry.run_all().is_ok());
        assert_eq!(recorder.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_reregistration_last_write_wins() {
        let recorder = Recorder::default();
        let mut registry: Registry<Propagate> = Registry::new();
        registry.register("step", recording(&recorder, "first"), &[]);
        registry.register("other", recording(&recorder, "other"), &[]);
        registry.register("step", recording(&recorder, "second"), &[]);

        registry.run_all().unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("step"));
        assert!(registry.contains("other"));
        assert!(!registry.contains("first"));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["step", "other"]);
        assert_eq!(*recorder.lock().unwrap(), vec!["second", "other"]);
    }

    #[test]
    fn test_registration_order_breaks_ties() {
        let recorder = Recorder::default();
        let mut registry: Registry<Propagate> = Registry::new();
        for name in ["c", "a", "b"] {
            registry.register(name, recording(&recorder, name), &[]);
        }

        registry.run_all().unwrap();

        assert_eq!(*recorder.lock().unwrap(), vec!["c", "a", "b"]);
        assert_eq!(registry.execution_order(), ["c", "a", "b"]);
    }

    #[test]
    fn test_first_listed_dependency_runs_first() {
        let recorder = Recorder::default();
        let mut registry: Registry<Propagate> = Registry::new();
        registry.register("app", recording(&recorder, "app"), &["logging", "config"]);
        registry.register("config", recording(&recorder, "config"), &[]);
        registry.register("logging", recording(&recorder, "logging"), &[]);

        registry.run_all().unwrap();

        assert_eq!(*recorder.lock().unwrap(), vec!["logging", "config", "app"]);
    }

    #[test]
    fn test_shared_dependency_runs_once() {
        let recorder = Recorder::default();
        let mut registry: Registry<Propagate> = Registry::new();
        registry.register("left", recording(&recorder, "left"), &["root"]);
        registry.register("right", recording(&recorder, "right"), &["root"]);
        registry.register("root", recording(&recorder, "root"), &[]);

        registry.run_all().unwrap();

        assert_eq!(*recorder.lock().unwrap(), vec!["root", "left", "right"]);
    }

    #[test]
    fn test_self_dependency_is_cycle() {
        let recorder = Recorder::default();
        let mut registry: Registry<Propagate> = Registry::new();
        registry.register("loop", recording(&recorder, "loop"), &["loop"]);

        let err = registry.run_all().unwrap_err();

        match err {
            LifecycleError::CyclicDependency {
                dependent,
                dependency,
                cycle,
            } => {
                assert_eq!(dependent, "loop");
                assert_eq!(dependency, "loop");
                assert_eq!(cycle, vec!["loop", "loop"]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
        assert!(recorder.lock().unwrap().is_empty());
        assert_eq!(registry.outcome("loop"), Some(Resolution::Pending));
    }

    #[test]
    fn test_transitive_cycle_reports_path() {
        let recorder = Recorder::default();
        let mut registry: Registry<Propagate> = Registry::new();
        registry.register("a", recording(&recorder, "a"), &["b"]);
        registry.register("b", recording(&recorder, "b"), &["c"]);
        registry.register("c", recording(&recorder, "c"), &["d"]);
        registry.register("d", recording(&recorder, "d"), &["b"]);

        let err = registry.run_all().unwrap_err();

        match err {
            LifecycleError::CyclicDependency {
                dependent,
                dependency,
                cycle,
            } => {
                assert_eq!(dependent, "d");
                assert_eq!(dependency, "b");
                assert_eq!(cycle, vec!["b", "c", "d", "b"]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
        assert!(recorder.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unregistered_dependency_is_error() {
        let recorder = Recorder::default();
        let mut registry: Registry<Propagate> = Registry::new();
        registry.register("db", recording(&recorder, "db"), &["config"]);

        let err = registry.run_all().unwrap_err();

        match err {
            LifecycleError::UnregisteredDependency { callback, missing } => {
                assert_eq!(callback, "db");
                assert_eq!(missing, "config");
            }
            other => panic!("expected unregistered dependency, got {other:?}"),
        }
        assert!(recorder.lock().unwrap().is_empty());
    }

    #[test]
    fn test_setup_failure_abandons_pending_dependents() {
        let recorder = Recorder::default();
        let mut registry: Registry<Propagate> = Registry::new();
        registry.register("app", recording(&recorder, "app"), &["db"]);
        registry.register("db", failing(&recorder, "db"), &[]);
        registry.register("metrics", recording(&recorder, "metrics"), &[]);

        assert!(registry.run_all().is_err());

        assert_eq!(*recorder.lock().unwrap(), vec!["db"]);
        assert_eq!(registry.outcome("app"), Some(Resolution::Pending));
        assert_eq!(registry.outcome("metrics"), Some(Resolution::Pending));
    }

    #[test]
    fn test_teardown_failure_does_not_block_dependents() {
        let recorder = Recorder::default();
        let mut registry: Registry<Discard> = Registry::new();
        registry.register("socket", recording(&recorder, "socket"), &["pool"]);
        registry.register("pool", failing(&recorder, "pool"), &[]);
        registry.register("files", recording(&recorder, "files"), &[]);

        assert!(registry.run_all().is_ok());

        assert_eq!(*recorder.lock().unwrap(), vec!["pool", "socket", "files"]);
        assert_eq!(registry.outcome("pool"), Some(Resolution::Failed));
        assert_eq!(registry.outcome("socket"), Some(Resolution::Succeeded));
    }

    #[test]
    fn test_teardown_continues_past_broken_branch() {
        let recorder = Recorder::default();
        let mut registry: Registry<Discard> = Registry::new();
        registry.register("x", recording(&recorder, "x"), &["y"]);
        registry.register("y", recording(&recorder, "y"), &["x"]);
        registry.register("orphan", recording(&recorder, "orphan"), &["missing"]);
        registry.register("cache", recording(&recorder, "cache"), &[]);

        assert!(registry.run_all().is_ok());

        assert_eq!(*recorder.lock().unwrap(), vec!["cache"]);
    }

    #[test]
    fn test_late_registration_is_never_run() {
        let recorder = Recorder::default();
        let mut registry: Registry<Propagate> = Registry::new();
        registry.register("early", recording(&recorder, "early"), &[]);
        registry.run_all().unwrap();

        registry.register("late", recording(&recorder, "late"), &[]);
        registry.run_all().unwrap();

        assert!(registry.contains("late"));
        assert_eq!(*recorder.lock().unwrap(), vec!["early"]);
        assert_eq!(registry.outcome("late"), Some(Resolution::Pending));
    }

    #[test]
    fn test_debug_lists_callbacks() {
        let mut registry: Registry<Discard> = Registry::new();
        registry.register("cache", || Ok(()), &[]);

        let rendered = format!("{:?}", registry);

        assert!(rendered.contains("Teardown"));
        assert!(rendered.contains("\"cache\""));
    }
}
