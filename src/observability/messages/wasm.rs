// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the WASM runtime engine.
//!
//! This module contains message types for logging events related to:
//! * WASM binary detection and upload validation
//! * Module compilation and the compiled-module cache
//! * Guest execution lifecycle and fuel exhaustion

use std::fmt::{Display, Formatter};
use std::time::Duration;

/// WASM engine created.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use fnhost::observability::messages::wasm::EngineCreated;
///
/// let msg = EngineCreated {
///     fuel_level: 100_000_000,
///     max_input_bytes: 16 * 1024 * 1024,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct EngineCreated {
    pub fuel_level: u64,
    pub max_input_bytes: usize,
}

impl Display for EngineCreated {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Created WASM runtime engine with fuel_level={}, max_input={} bytes",
            self.fuel_level, self.max_input_bytes
        )
    }
}

/// WASM component type detected for an artifact.
///
/// # Log Level
/// `debug!` - Detail of upload validation
pub struct ComponentTypeDetected<'a> {
    pub component_type: &'a str,
    pub size_bytes: usize,
}

impl Display for ComponentTypeDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Detected {} binary ({} bytes)",
            self.component_type, self.size_bytes
        )
    }
}

/// Module compiled and added to the cache.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use fnhost::observability::messages::wasm::ModuleCompiled;
/// use std::time::Duration;
///
/// let msg = ModuleCompiled {
///     digest: "e12e115acf45",
///     size_bytes: 4096,
///     duration: Duration::from_millis(12),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ModuleCompiled<'a> {
    pub digest: &'a str,
    pub size_bytes: usize,
    pub duration: Duration,
}

impl Display for ModuleCompiled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Compiled WASM module sha256={} ({} bytes) in {:?}",
            self.digest, self.size_bytes, self.duration
        )
    }
}

/// Module compilation failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ModuleCompileFailed<'a> {
    pub digest: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ModuleCompileFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to compile WASM module sha256={}: {}",
            self.digest, self.error
        )
    }
}

/// Guest execution started.
///
/// # Log Level
/// `debug!` - One per call
pub struct ExecutionStarted<'a> {
    pub digest: &'a str,
    pub input_size: usize,
    pub fuel_level: u64,
}

impl Display for ExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Executing WASM module sha256={}: input_size={} bytes, fuel_level={}",
            self.digest, self.input_size, self.fuel_level
        )
    }
}

/// Guest execution completed successfully.
///
/// # Log Level
/// `debug!` - One per call
pub struct ExecutionCompleted<'a> {
    pub digest: &'a str,
    pub input_size: usize,
    pub output_size: usize,
    pub fuel_consumed: u64,
}

impl Display for ExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "WASM execution successful for sha256={}: input={} bytes, output={} bytes, fuel_consumed={}",
            self.digest, self.input_size, self.output_size, self.fuel_consumed
        )
    }
}

/// Guest execution failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use fnhost::observability::messages::wasm::ExecutionFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "trap occurred");
/// let msg = ExecutionFailed {
///     digest: "e12e115acf45",
///     code: 500,
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ExecutionFailed<'a> {
    pub digest: &'a str,
    pub code: i32,
    pub error: &'a dyn std::error::Error,
}

impl Display for ExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "WASM execution failed for sha256={} (code {}): {}",
            self.digest, self.code, self.error
        )
    }
}
