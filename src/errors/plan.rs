// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for loading plan files.

use crate::config::PlanFormat;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading or validating a plan file
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("failed to read plan '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {format} plan '{}': {message}", .path.display())]
    Parse {
        path: PathBuf,
        format: PlanFormat,
        message: String,
    },

    /// The plan parsed but describes a graph that cannot be resolved
    #[error("Plan validation failed:\n{}", .problems.join("\n"))]
    Invalid { problems: Vec<String> },
}
