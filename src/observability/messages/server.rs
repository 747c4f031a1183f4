// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for daemon startup.

use std::fmt::{Display, Formatter};

/// Configuration file loaded.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ConfigLoaded<'a> {
    pub path: &'a str,
    pub binding_count: usize,
}

impl Display for ConfigLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded configuration from '{}' with {} topic bindings",
            self.path, self.binding_count
        )
    }
}

/// No configuration file given; built-in defaults apply.
///
/// # Log Level
/// `info!` - Important operational event
pub struct UsingDefaultConfig;

impl Display for UsingDefaultConfig {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "No configuration file given, using defaults")
    }
}

/// gRPC server about to listen.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use fnhost::observability::messages::server::ServerStarting;
///
/// let msg = ServerStarting {
///     address: "127.0.0.1:50051",
///     engine: "wasm",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ServerStarting<'a> {
    pub address: &'a str,
    pub engine: &'a str,
}

impl Display for ServerStarting<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "fnhost listening on {} (runtime engine: {})",
            self.address, self.engine
        )
    }
}
