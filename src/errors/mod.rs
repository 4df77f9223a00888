// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod lifecycle;
mod plan;

pub use lifecycle::LifecycleError;
pub use plan::PlanError;
