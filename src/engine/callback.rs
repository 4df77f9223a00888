// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// A registered unit of work. Consumed on invocation, so it runs at most once.
pub type Action = Box<dyn FnOnce() -> anyhow::Result<()> + Send>;

/// Resolution state of a callback.
///
/// Anything other than `Pending` counts as settled: the resolver never invokes
/// a settled callback again, and dependents of a `Failed` callback proceed as
/// if it had succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolution {
    #[default]
    Pending,
    /// Marked before the action is invoked.
    Running,
    Succeeded,
    Failed,
}

impl Resolution {
    pub fn is_settled(self) -> bool {
        !matches!(self, Resolution::Pending)
    }
}

/// One named action plus the names it must run after.
pub struct Callback {
    name: String,
    depends_on: Vec<String>,
    state: Resolution,
    action: Option<Action>,
}

impl Callback {
    pub fn new(name: impl Into<String>, action: Action, depends_on: Vec<String>) -> Self {
        Self {
            name: name.into(),
            depends_on,
            state: Resolution::Pending,
            action: Some(action),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the callbacks that must be resolved first, in declaration order.
    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }

    pub fn state(&self) -> Resolution {
        self.state
    }

    /// Mark the callback as running and hand out its action.
    ///
    /// Returns `None` once the callback has left `Pending`.
    pub(crate) fn begin(&mut self) -> Option<Action> {
        if self.state.is_settled() {
            return None;
        }
        self.state = Resolution::Running;
        self.action.take()
    }

    pub(crate) fn finish(&mut self, succeeded: bool) {
        self.state = if succeeded {
            Resolution::Succeeded
        } else {
            Resolution::Failed
        };
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("name", &self.name)
            .field("depends_on", &self.depends_on)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
