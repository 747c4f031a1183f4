// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for gateway invocations.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Invocation accepted by the gateway.
///
/// # Log Level
/// `debug!` - One per call
pub struct InvocationStarted<'a> {
    pub name: &'a str,
    pub payload_size: usize,
}

impl Display for InvocationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Invoking function '{}': payload_size={} bytes",
            self.name, self.payload_size
        )
    }
}

impl StructuredLog for InvocationStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            function = self.name,
            payload_size = self.payload_size,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "invocation",
            span_name = name,
            function = self.name,
            payload_size = self.payload_size,
        )
    }
}

/// Engine returned a reply within the deadline.
///
/// # Log Level
/// `debug!` - One per call
///
/// # Example
/// ```
/// use fnhost::observability::messages::invocation::InvocationCompleted;
/// use std::time::Duration;
///
/// let msg = InvocationCompleted {
///     name: "echo",
///     code: 200,
///     output_size: 16,
///     duration: Duration::from_millis(2),
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct InvocationCompleted<'a> {
    pub name: &'a str,
    pub code: i32,
    pub output_size: usize,
    pub duration: Duration,
}

impl Display for InvocationCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Function '{}' returned code {} with {} bytes in {:?}",
            self.name, self.code, self.output_size, self.duration
        )
    }
}

impl StructuredLog for InvocationCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            function = self.name,
            code = self.code,
            output_size = self.output_size,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "invocation_completed",
            span_name = name,
            function = self.name,
            code = self.code,
        )
    }
}

/// Invocation failed before or inside the engine.
///
/// # Log Level
/// `warn!` - Typed failure returned to the caller
pub struct InvocationFailed<'a> {
    pub name: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for InvocationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Invocation of '{}' failed: {}", self.name, self.error)
    }
}

/// Invocation exceeded its deadline and was cancelled.
///
/// # Log Level
/// `warn!` - Typed failure returned to the caller
pub struct InvocationTimedOut<'a> {
    pub name: &'a str,
    pub deadline: Duration,
}

impl Display for InvocationTimedOut<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Invocation of '{}' cancelled after deadline of {:?}",
            self.name, self.deadline
        )
    }
}
