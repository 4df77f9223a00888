// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::LifecycleBuilder;
use crate::errors::PlanError;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

/// Declarative description of a component tree's setup and teardown steps.
///
/// A plan is what the `lazy-setup` binary rehearses: every step becomes a
/// callback whose action logs its name and, when `fail` is set, reports that
/// message as an error.
///
/// # Example
/// ```yaml
/// setup:
///   - name: config
///   - name: database
///     depends_on: [config]
///   - name: server
///     depends_on: [database]
/// teardown:
///   - name: server
///   - name: database
///     depends_on: [server]
///     fail: "pool did not drain"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub setup: Vec<StepConfig>,
    #[serde(default)]
    pub teardown: Vec<StepConfig>,
}

/// A single step in a plan.
///
/// # Fields
/// * `name` - Unique name within its phase
/// * `depends_on` - Steps of the same phase that must run first
/// * `fail` - When set, the step's action fails with this message
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StepConfig {
    pub name: String,
    #[serde(default)]
    pub depends_on: Vec<String>, // defaults empty
    #[serde(default)]
    pub fail: Option<String>,
}

/// Serialization format of a plan file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFormat {
    Yaml,
    Json,
    Toml,
}

impl PlanFormat {
    /// `.json` and `.toml` select their formats; anything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => PlanFormat::Json,
            Some(ext) if ext.eq_ignore_ascii_case("toml") => PlanFormat::Toml,
            _ => PlanFormat::Yaml,
        }
    }

    pub fn parse(self, content: &str) -> Result<Plan, String> {
        match self {
            PlanFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            PlanFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            PlanFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        }
    }
}

impl fmt::Display for PlanFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanFormat::Yaml => write!(f, "YAML"),
            PlanFormat::Json => write!(f, "JSON"),
            PlanFormat::Toml => write!(f, "TOML"),
        }
    }
}

impl Plan {
    /// Check step names and the dependency graph of both phases.
    ///
    /// Duplicate names are reported here because a registry would silently
    /// keep only the last one.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        for (phase, steps) in [("setup", &self.setup), ("teardown", &self.teardown)] {
            let mut seen = HashSet::new();
            for step in steps {
                if !seen.insert(step.name.as_str()) {
                    problems.push(format!("Duplicate {} step: '{}'", phase, step.name));
                }
            }
        }

        if let Err(errors) = LifecycleBuilder::from_plan(self).validate() {
            problems.extend(errors.iter().map(|e| e.to_string()));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }
}

/// Load a plan from a YAML, JSON or TOML file
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<Plan, PlanError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| PlanError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let format = PlanFormat::from_path(path);
    format.parse(&content).map_err(|message| PlanError::Parse {
        path: path.to_path_buf(),
        format,
        message,
    })
}

/// Load a plan and reject it if any step could not be resolved.
pub fn load_and_validate_plan<P: AsRef<Path>>(path: P) -> Result<Plan, PlanError> {
    let plan = load_plan(path)?;
    plan.validate()
        .map_err(|problems| PlanError::Invalid { problems })?;
    Ok(plan)
}
