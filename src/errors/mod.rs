// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for every component of the function host.
//!
//! Each component owns one `thiserror` enum. [`ErrorKind`] folds all of them
//! onto the small set of failure classes callers are expected to react to.

mod config;
mod invocation;
mod store;
mod upload;

pub use config::{ConfigError, ValidationError};
pub use invocation::{EngineError, InvocationError, ResolveError};
pub use store::{RoutingMiss, StoreError};
pub use upload::UploadError;

use std::fmt;

/// Failure classes surfaced by the core.
///
/// None of these is process-fatal. `Conflict`, `NotFound`, `NotReady` and
/// `Timeout` go back to the immediate caller untouched; the core never retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A second upload for a name that already has one open.
    Conflict,
    /// Unknown function name.
    NotFound,
    /// The function exists but has no committed artifact.
    NotReady,
    /// The invocation did not finish before its deadline.
    Timeout,
    /// Reading or committing upload chunks failed.
    IoFailure,
    /// A bus message arrived for a topic without a binding.
    RoutingMiss,
    /// The runtime engine could not run the artifact.
    EngineFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotFound => "not_found",
            ErrorKind::NotReady => "not_ready",
            ErrorKind::Timeout => "timeout",
            ErrorKind::IoFailure => "io_failure",
            ErrorKind::RoutingMiss => "routing_miss",
            ErrorKind::EngineFailure => "engine_failure",
        };
        f.write_str(label)
    }
}
