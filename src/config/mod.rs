// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod builder;
mod loader;

pub use builder::LifecycleBuilder;
pub use loader::{load_and_validate_plan, load_plan, Plan, PlanFormat, StepConfig};
