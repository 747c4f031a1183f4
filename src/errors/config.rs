// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use thiserror::Error;

/// Problems found while validating a loaded configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Two bindings claim the same topic.
    DuplicateTopic { topic: String },
    /// A binding with an empty topic or function name.
    EmptyBinding { index: usize },
    /// A numeric setting that must be positive is zero.
    ZeroSetting { setting: &'static str },
    /// The server address does not parse as a socket address.
    InvalidAddress { address: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateTopic { topic } => {
                write!(f, "Topic '{}' is bound more than once", topic)
            }
            ValidationError::EmptyBinding { index } => {
                write!(f, "Binding #{} has an empty topic or function name", index)
            }
            ValidationError::ZeroSetting { setting } => {
                write!(f, "Setting '{}' must be greater than zero", setting)
            }
            ValidationError::InvalidAddress { address } => {
                write!(f, "Server address '{}' is not a valid socket address", address)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors from loading configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration validation failed:\n{}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n"))]
    Invalid(Vec<ValidationError>),
}
