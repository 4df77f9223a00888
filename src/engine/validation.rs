// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pre-flight validation of a callback registry.
//!
//! The resolver already fails on an unregistered dependency or a cycle when
//! its walk reaches one. Validation finds the same problems without running
//! any action, which lets a composition root refuse to start before the
//! first side effect happens.
//!
//! # Validation Pipeline
//!
//! 1. **Reference Validation**: every `depends_on` name must be registered.
//!    All unregistered references are reported, not only the first.
//! 2. **Cycle Detection**: DFS with an explicit recursion stack. Skipped when
//!    step 1 found problems, since the walk needs every edge to resolve.
//!
//! ## Cycle Detection Algorithm
//! Uses the "three colors" approach:
//! - **White**: not yet explored
//! - **Gray**: on the current recursion stack
//! - **Black**: fully explored
//!
//! Reaching a gray node means a cycle; the path segment from that node to the
//! current one, closed by the back edge, is reported.
//!
//! **Time Complexity**: O(V + E) where V = callbacks, E = dependencies

use indexmap::IndexMap;
use std::collections::HashSet;

use crate::engine::callback::Callback;
use crate::errors::LifecycleError;

pub(crate) fn validate_callbacks(
    callbacks: &IndexMap<String, Callback>,
) -> Result<(), Vec<LifecycleError>> {
    let mut errors = Vec::new();

    if let Err(unregistered) = validate_dependency_references(callbacks) {
        errors.extend(unregistered);
    }

    if errors.is_empty() {
        if let Err(cycle) = validate_acyclic_graph(callbacks) {
            errors.push(cycle);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_dependency_references(
    callbacks: &IndexMap<String, Callback>,
) -> Result<(), Vec<LifecycleError>> {
    let mut errors = Vec::new();

    for callback in callbacks.values() {
        for dependency in callback.depends_on() {
            if !callbacks.contains_key(dependency) {
                errors.push(LifecycleError::UnregisteredDependency {
                    callback: callback.name().to_string(),
                    missing: dependency.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_acyclic_graph(callbacks: &IndexMap<String, Callback>) -> Result<(), LifecycleError> {
    let mut visited = HashSet::new();

    for name in callbacks.keys() {
        if visited.contains(name.as_str()) {
            continue;
        }
        if let Some(cycle) = dfs_cycle_detection(name, callbacks, &mut visited) {
            let dependent = cycle[cycle.len() - 2].clone();
            let dependency = cycle[cycle.len() - 1].clone();
            return Err(LifecycleError::CyclicDependency {
                dependent,
                dependency,
                cycle,
            });
        }
    }

    Ok(())
}

/// Returns the cycle path, first and last element equal, if one is reachable from `root`.
///
/// The recursion stack is explicit: each entry is a gray node and the
/// position of its next dependency.
fn dfs_cycle_detection<'a>(
    root: &'a str,
    callbacks: &'a IndexMap<String, Callback>,
    visited: &mut HashSet<&'a str>,
) -> Option<Vec<String>> {
    let mut rec_stack: HashSet<&'a str> = HashSet::new();
    let mut path: Vec<(&'a str, usize)> = vec![(root, 0)];
    visited.insert(root);
    rec_stack.insert(root);

    while let Some((node, next)) = path.last_mut() {
        let node: &'a str = *node;
        let dependencies = callbacks.get(node).map(Callback::depends_on).unwrap_or(&[]);

        let Some(dependency) = dependencies.get(*next) else {
            rec_stack.remove(node);
            path.pop();
            continue;
        };
        *next += 1;
        let dependency = dependency.as_str();

        if !visited.contains(dependency) {
            visited.insert(dependency);
            rec_stack.insert(dependency);
            path.push((dependency, 0));
        } else if rec_stack.contains(dependency) {
            let start = path.iter().position(|(n, _)| *n == dependency).unwrap_or(0);
            let mut cycle: Vec<String> = path[start..].iter().map(|(n, _)| n.to_string()).collect();
            cycle.push(dependency.to_string());
            return Some(cycle);
        }
    }

    None
}
