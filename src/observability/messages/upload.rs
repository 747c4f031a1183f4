// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for chunked upload sessions and undeploys.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Upload session opened for a function.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use fnhost::observability::messages::upload::UploadStarted;
///
/// let msg = UploadStarted { name: "echo" };
/// tracing::info!("{}", msg);
/// ```
pub struct UploadStarted<'a> {
    pub name: &'a str,
}

impl Display for UploadStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Upload session opened for function '{}'", self.name)
    }
}

/// A second upload for a name was refused because one is already open.
///
/// # Log Level
/// `warn!` - Caller error, no state change
pub struct UploadConflict<'a> {
    pub name: &'a str,
}

impl Display for UploadConflict<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rejected upload for function '{}': another upload is in progress",
            self.name
        )
    }
}

/// Upload assembled and committed to the store.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use fnhost::observability::messages::upload::UploadCommitted;
/// use std::time::Duration;
///
/// let msg = UploadCommitted {
///     name: "echo",
///     size_bytes: 4,
///     chunk_count: 2,
///     digest: "e12e115a",
///     elapsed: Duration::from_millis(3),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct UploadCommitted<'a> {
    pub name: &'a str,
    pub size_bytes: usize,
    pub chunk_count: usize,
    pub digest: &'a str,
    pub elapsed: Duration,
}

impl Display for UploadCommitted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Committed function '{}': {} bytes in {} chunks, sha256={} ({:?})",
            self.name, self.size_bytes, self.chunk_count, self.digest, self.elapsed
        )
    }
}

impl StructuredLog for UploadCommitted<'_> {
    fn log(&self) {
        tracing::info!(
            function = self.name,
            size_bytes = self.size_bytes,
            chunk_count = self.chunk_count,
            digest = self.digest,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "upload_committed",
            span_name = name,
            function = self.name,
            size_bytes = self.size_bytes,
        )
    }
}

/// Upload aborted; nothing was committed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use fnhost::observability::messages::upload::UploadAborted;
///
/// let error = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stream reset");
/// let msg = UploadAborted {
///     name: "echo",
///     received_bytes: 1024,
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct UploadAborted<'a> {
    pub name: &'a str,
    pub received_bytes: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for UploadAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Aborted upload for function '{}' after {} bytes: {}",
            self.name, self.received_bytes, self.error
        )
    }
}

impl StructuredLog for UploadAborted<'_> {
    fn log(&self) {
        tracing::error!(
            function = self.name,
            received_bytes = self.received_bytes,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "upload_aborted",
            span_name = name,
            function = self.name,
            received_bytes = self.received_bytes,
        )
    }
}

/// Upload future dropped before it finished.
///
/// # Log Level
/// `warn!` - Client went away mid-stream
pub struct UploadAbandoned<'a> {
    pub name: &'a str,
    pub received_bytes: usize,
}

impl Display for UploadAbandoned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Upload for function '{}' abandoned after {} bytes",
            self.name, self.received_bytes
        )
    }
}

/// Function removed from the store.
///
/// # Log Level
/// `info!` - Important operational event
pub struct FunctionUnloaded<'a> {
    pub name: &'a str,
    pub status: &'a str,
}

impl Display for FunctionUnloaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Unloaded function '{}' (was {})", self.name, self.status)
    }
}
