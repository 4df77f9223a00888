// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Named setup and teardown callbacks, run once in dependency order.
//!
//! Independent parts of a program register fallible setup actions and
//! infallible (or best-effort) teardown actions under unique names, declaring
//! which other actions must run first. A single call then executes the whole
//! collection exactly once, each action strictly after its prerequisites.
//!
//! ```
//! use lazy_setup::Lifecycle;
//!
//! let mut lifecycle = Lifecycle::new();
//! lifecycle.on_init("server", || Ok(()), &["config"]);
//! lifecycle.on_init("config", || Ok(()), &[]);
//!
//! lifecycle.init().unwrap();
//! assert_eq!(lifecycle.setup().execution_order(), ["config", "server"]);
//! ```

pub mod config;     // plan files + lifecycle builder
pub mod engine;     // registry + resolver
pub mod errors;     // error handling
pub mod observability;
pub mod traits;     // phase + failure policies

pub use engine::{close, init, on_close, on_init, shared, Lifecycle, Registry};
pub use errors::LifecycleError;
