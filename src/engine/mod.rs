// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod callback;
pub mod lifecycle;
pub mod registry;
mod validation;


pub use callback::{Action, Callback, Resolution};
pub use lifecycle::{close, init, on_close, on_init, shared, Lifecycle};
pub use registry::Registry;
