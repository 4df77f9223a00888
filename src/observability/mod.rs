// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging.
//!
//! Message types follow a struct-based pattern with a `Display`
//! implementation so that log lines are not assembled from magic strings
//! scattered through the resolver.
//!
//! # Architecture
//!
//! * `messages::resolver` - events inside one depth-first walk
//! * `messages::scheduler` - resolution pass lifecycle and registration
//!
//! # Usage
//!
//! ```rust
//! use lazy_setup::observability::messages::resolver::UnregisteredDependency;
//! use lazy_setup::observability::messages::StructuredLog;
//!
//! let msg = UnregisteredDependency {
//!     callback: "server",
//!     missing: "config",
//! };
//!
//! msg.log();
//! ```
//!
//! The library only emits events; installing a subscriber is left to the
//! binary.

pub mod messages;
