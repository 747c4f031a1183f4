// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line. Messages
//! that carry useful numeric fields also implement [`StructuredLog`], which
//! emits the same line with the fields attached.
//!
//! # Usage Pattern
//!
//! ```rust
//! use fnhost::observability::messages::invocation::InvocationStarted;
//!
//! let msg = InvocationStarted {
//!     name: "echo",
//!     payload_size: 16,
//! };
//!
//! tracing::debug!("{}", msg);
//! ```

use tracing::Span;

pub mod invocation;
pub mod mediator;
pub mod server;
pub mod upload;
pub mod wasm;

/// A message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message at its level with structured fields attached.
    fn log(&self);

    /// A span carrying the same fields, for scoping work under the message.
    fn span(&self, name: &str) -> Span;
}
