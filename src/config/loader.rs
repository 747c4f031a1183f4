// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_FUEL_LEVEL, DEFAULT_INVOCATION_TIMEOUT_SECONDS, DEFAULT_MAX_CHUNK_BYTES,
    DEFAULT_MAX_INPUT_BYTES, DEFAULT_MAX_IN_FLIGHT, DEFAULT_REORDER_WINDOW,
    DEFAULT_SERVER_ADDRESS, MAX_FUEL_LEVEL, MIN_FUEL_LEVEL,
};
use crate::errors::ConfigError;
use crate::mediator::TopicBinding;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for the function host.
///
/// Every section is optional; missing values fall back to the constants in
/// [`crate::config::consts`].
///
/// # Example
/// ```yaml
/// server:
///   address: "0.0.0.0:50051"
/// upload:
///   max_chunk_bytes: 1048576
/// invocation:
///   timeout_seconds: 120
/// wasm:
///   fuel:
///     default: 100000000
/// mediator:
///   reorder_window: 64
///   max_in_flight: 256
///   bindings:
///     - topic: orders
///       function: enrich
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub invocation: InvocationConfig,
    #[serde(default)]
    pub wasm: WasmConfig,
    #[serde(default)]
    pub mediator: MediatorConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerConfig {
    pub address: Option<String>,
}

impl ServerConfig {
    pub fn get_address(&self) -> &str {
        self.address.as_deref().unwrap_or(DEFAULT_SERVER_ADDRESS)
    }
}

/// Upload protocol limits.
///
/// # Fields
/// * `max_chunk_bytes` - Largest accepted chunk body (defaults to 1 MiB)
/// * `require_wasm` - Reject artifacts that are not core WASM modules (defaults to true)
#[derive(Debug, Default, Deserialize)]
pub struct UploadConfig {
    pub max_chunk_bytes: Option<usize>,
    pub require_wasm: Option<bool>,
}

impl UploadConfig {
    pub fn get_max_chunk_bytes(&self) -> usize {
        self.max_chunk_bytes.unwrap_or(DEFAULT_MAX_CHUNK_BYTES)
    }

    pub fn get_require_wasm(&self) -> bool {
        self.require_wasm.unwrap_or(true)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct InvocationConfig {
    pub timeout_seconds: Option<u64>,
}

impl InvocationConfig {
    /// Deadline applied when a caller supplies none.
    pub fn get_timeout(&self) -> Duration {
        Duration::from_secs(
            self.timeout_seconds
                .unwrap_or(DEFAULT_INVOCATION_TIMEOUT_SECONDS),
        )
    }
}

/// WASM-specific configuration options.
///
/// # Fields
/// * `fuel` - Fuel consumption configuration for execution limits
/// * `max_input_bytes` - Largest payload handed to a guest (defaults to 16 MiB)
#[derive(Debug, Default, Deserialize)]
pub struct WasmConfig {
    #[serde(default)]
    pub fuel: FuelConfig,
    pub max_input_bytes: Option<usize>,
}

impl WasmConfig {
    pub fn get_max_input_bytes(&self) -> usize {
        self.max_input_bytes.unwrap_or(DEFAULT_MAX_INPUT_BYTES)
    }
}

/// Fuel consumption configuration for WASM execution.
///
/// Fuel limits prevent infinite loops and resource exhaustion by limiting the number
/// of instructions a WASM module can execute. All values are optional.
///
/// # Fields
/// * `default` - Fuel given to each invocation (defaults to 100M)
/// * `minimum` - Minimum allowed fuel level (defaults to 1M)
/// * `maximum` - Maximum allowed fuel level (defaults to 500M) - security limit
///
/// # Example
/// ```yaml
/// fuel:
///   default: 100000000   # 100 million instructions
///   minimum: 1000000     # 1 million instructions
///   maximum: 500000000   # 500 million instructions (hard limit)
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct FuelConfig {
    pub default: Option<u64>,
    pub minimum: Option<u64>,
    pub maximum: Option<u64>,
}

impl FuelConfig {
    /// Get the default fuel level, using built-in default if not configured.
    pub fn get_default(&self) -> u64 {
        self.default.unwrap_or(DEFAULT_FUEL_LEVEL)
    }

    /// Get the minimum fuel level, using built-in default if not configured.
    pub fn get_minimum(&self) -> u64 {
        self.minimum.unwrap_or(MIN_FUEL_LEVEL)
    }

    /// Get the maximum fuel level, using built-in default if not configured.
    pub fn get_maximum(&self) -> u64 {
        self.maximum.unwrap_or(MAX_FUEL_LEVEL)
    }

    /// Clamp a requested fuel level to the configured bounds.
    ///
    /// # Example
    /// ```
    /// use fnhost::config::FuelConfig;
    ///
    /// let config = FuelConfig::default();
    /// let fuel = config.validate_and_clamp(1_000_000_000); // Too high
    /// assert_eq!(fuel, 500_000_000); // Clamped to maximum
    /// ```
    pub fn validate_and_clamp(&self, requested: u64) -> u64 {
        let min = self.get_minimum();
        let max = self.get_maximum().max(min);
        requested.clamp(min, max)
    }

    /// The fuel each invocation actually receives.
    pub fn effective(&self) -> u64 {
        self.validate_and_clamp(self.get_default())
    }
}

/// Mediator bridge settings and the static topic bindings.
#[derive(Debug, Default, Deserialize)]
pub struct MediatorConfig {
    pub reorder_window: Option<usize>,
    pub max_in_flight: Option<usize>,
    #[serde(default)]
    pub bindings: Vec<TopicBinding>,
}

impl MediatorConfig {
    pub fn get_reorder_window(&self) -> usize {
        self.reorder_window.unwrap_or(DEFAULT_REORDER_WINDOW)
    }

    pub fn get_max_in_flight(&self) -> usize {
        self.max_in_flight.unwrap_or(DEFAULT_MAX_IN_FLIGHT)
    }
}

/// Load a config from a YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load a config and run [`validate_config`](crate::config::validate_config) on it.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_config(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(yaml: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let cfg: Config = serde_yaml::from_str("{}").unwrap();

        assert_eq!(cfg.server.get_address(), "127.0.0.1:50051");
        assert_eq!(cfg.upload.get_max_chunk_bytes(), 1_048_576);
        assert!(cfg.upload.get_require_wasm());
        assert_eq!(cfg.invocation.get_timeout(), Duration::from_secs(120));
        assert_eq!(cfg.wasm.fuel.get_default(), 100_000_000);
        assert_eq!(cfg.wasm.fuel.get_minimum(), 1_000_000);
        assert_eq!(cfg.wasm.fuel.get_maximum(), 500_000_000);
        assert_eq!(cfg.mediator.get_reorder_window(), 64);
        assert_eq!(cfg.mediator.get_max_in_flight(), 256);
        assert!(cfg.mediator.bindings.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
server:
  address: "0.0.0.0:6000"
upload:
  max_chunk_bytes: 4096
  require_wasm: false
invocation:
  timeout_seconds: 5
wasm:
  fuel:
    default: 150000000
  max_input_bytes: 1024
mediator:
  reorder_window: 8
  bindings:
    - topic: orders
      function: enrich
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(cfg.server.get_address(), "0.0.0.0:6000");
        assert_eq!(cfg.upload.get_max_chunk_bytes(), 4096);
        assert!(!cfg.upload.get_require_wasm());
        assert_eq!(cfg.invocation.get_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.wasm.fuel.get_default(), 150_000_000);
        assert_eq!(cfg.wasm.get_max_input_bytes(), 1024);
        assert_eq!(cfg.mediator.get_reorder_window(), 8);
        assert_eq!(cfg.mediator.get_max_in_flight(), 256);
        assert_eq!(cfg.mediator.bindings, vec![TopicBinding::new("orders", "enrich")]);
    }

    #[test]
    fn test_fuel_config_validate_and_clamp() {
        let config = FuelConfig {
            default: Some(100_000_000),
            minimum: Some(10_000_000),
            maximum: Some(200_000_000),
        };

        assert_eq!(config.validate_and_clamp(50_000_000), 50_000_000);
        assert_eq!(config.validate_and_clamp(1_000_000), 10_000_000);
        assert_eq!(config.validate_and_clamp(1_000_000_000), 200_000_000);
        assert_eq!(config.effective(), 100_000_000);
    }

    #[test]
    fn test_effective_fuel_is_clamped() {
        let config = FuelConfig {
            default: Some(900_000_000),
            minimum: None,
            maximum: None,
        };
        assert_eq!(config.effective(), 500_000_000);
    }

    #[test]
    fn test_load_config_from_file() {
        let file = write_temp("invocation:\n  timeout_seconds: 7\n");
        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.invocation.get_timeout(), Duration::from_secs(7));
    }

    #[test]
    fn test_load_config_errors() {
        assert!(matches!(
            load_config("/nonexistent/fnhost.yaml"),
            Err(ConfigError::Io(_))
        ));

        let file = write_temp("mediator: [not, a, map]\n");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_and_validate_rejects_duplicate_topics() {
        let file = write_temp(
            r#"
mediator:
  bindings:
    - topic: orders
      function: a
    - topic: orders
      function: b
"#,
        );
        let error = load_and_validate_config(file.path()).unwrap_err();
        assert!(error.to_string().contains("Topic 'orders' is bound more than once"));
    }
}
