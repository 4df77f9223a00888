// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{Plan, StepConfig};
use crate::engine::Lifecycle;

/// Builds a [`Lifecycle`] from a [`Plan`].
///
/// Each step becomes a callback that logs its name and, if the step carries a
/// `fail` message, fails with it. Steps are registered in file order, which
/// is also the tie-break order during resolution.
///
/// # Examples
/// ```
/// use lazy_setup::config::{LifecycleBuilder, Plan, StepConfig};
///
/// let plan = Plan {
///     setup: vec![
///         StepConfig {
///             name: "server".to_string(),
///             depends_on: vec!["config".to_string()],
///             fail: None,
///         },
///         StepConfig { name: "config".to_string(), depends_on: vec![], fail: None },
///     ],
///     teardown: vec![],
/// };
///
/// let mut lifecycle = LifecycleBuilder::from_plan(&plan);
/// lifecycle.init().unwrap();
/// assert_eq!(lifecycle.setup().execution_order(), ["config", "server"]);
/// ```
pub struct LifecycleBuilder;

impl LifecycleBuilder {
    pub fn from_plan(plan: &Plan) -> Lifecycle {
        let mut lifecycle = Lifecycle::new();

        for step in &plan.setup {
            let action = step_action("setup", step);
            lifecycle.on_init(step.name.clone(), action, &dependency_names(step));
        }

        for step in &plan.teardown {
            let action = step_action("teardown", step);
            lifecycle.on_close_fallible(step.name.clone(), action, &dependency_names(step));
        }

        lifecycle
    }
}

fn dependency_names(step: &StepConfig) -> Vec<&str> {
    step.depends_on.iter().map(String::as_str).collect()
}

fn step_action(
    phase: &'static str,
    step: &StepConfig,
) -> impl FnOnce() -> anyhow::Result<()> + Send + 'static {
    let name = step.name.clone();
    let fail = step.fail.clone();
    move || {
        tracing::info!(phase, step = name.as_str(), "Executing plan step");
        match fail {
            Some(message) => Err(anyhow::anyhow!(message)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Resolution;

    fn step(name: &str, depends_on: &[&str], fail: Option<&str>) -> StepConfig {
        StepConfig {
            name: name.to_string(),
            depends_on: depends_on.iter().map(|s| s.to_string()).collect(),
            fail: fail.map(str::to_string),
        }
    }

    #[test]
    fn test_build_lifecycle_table_driven() {
        struct TestCase {
            name: &'static str,
            plan: Plan,
            expected_setup: Vec<&'static str>,
            expected_teardown: Vec<&'static str>,
            setup_fails: bool,
        }

        let test_cases = vec![
            TestCase {
                name: "empty plan",
                plan: Plan::default(),
                expected_setup: vec![],
                expected_teardown: vec![],
                setup_fails: false,
            },
            TestCase {
                name: "chain in reverse file order",
                plan: Plan {
                    setup: vec![
                        step("server", &["database"], None),
                        step("database", &["config"], None),
                        step("config", &[], None),
                    ],
                    teardown: vec![
                        step("database", &["server"], None),
                        step("server", &[], None),
                    ],
                },
                expected_setup: vec!["config", "database", "server"],
                expected_teardown: vec!["server", "database"],
                setup_fails: false,
            },
            TestCase {
                name: "failing setup step",
                plan: Plan {
                    setup: vec![
                        step("config", &[], None),
                        step("database", &["config"], Some("connection refused")),
                        step("server", &["database"], None),
                    ],
                    teardown: vec![step("config", &[], Some("file locked"))],
                },
                expected_setup: vec!["config", "database"],
                expected_teardown: vec!["config"],
                setup_fails: true,
            },
        ];

        for tc in test_cases {
            let mut lifecycle = LifecycleBuilder::from_plan(&tc.plan);

            assert_eq!(lifecycle.init().is_err(), tc.setup_fails, "case: {}", tc.name);
            lifecycle.close();

            assert_eq!(lifecycle.setup().execution_order(), tc.expected_setup, "case: {}", tc.name);
            assert_eq!(
                lifecycle.teardown().execution_order(),
                tc.expected_teardown,
                "case: {}",
                tc.name
            );
        }
    }

    #[test]
    fn test_fail_message_becomes_error() {
        let plan = Plan {
            setup: vec![step("database", &[], Some("connection refused"))],
            teardown: vec![],
        };
        let mut lifecycle = LifecycleBuilder::from_plan(&plan);

        let err = lifecycle.init().unwrap_err();

        assert_eq!(err.to_string(), "setup step 'database' failed: connection refused");
        assert_eq!(lifecycle.setup().outcome("database"), Some(Resolution::Failed));
    }
}
