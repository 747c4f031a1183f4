// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation.
//!
//! All checks run and every problem is reported, so a bad file can be fixed
//! in one pass:
//!
//! 1. The server address parses as a socket address
//! 2. Sizes, limits and timeouts that must be positive are not zero
//! 3. Topic bindings have non-empty names and no topic is bound twice

use crate::config::Config;
use crate::errors::ValidationError;
use crate::mediator::BindingTable;
use std::net::SocketAddr;

pub fn validate_config(cfg: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let address = cfg.server.get_address();
    if address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            address: address.to_string(),
        });
    }

    let positive = [
        ("upload.max_chunk_bytes", cfg.upload.get_max_chunk_bytes() as u64),
        ("invocation.timeout_seconds", cfg.invocation.get_timeout().as_secs()),
        ("wasm.max_input_bytes", cfg.wasm.get_max_input_bytes() as u64),
        ("mediator.reorder_window", cfg.mediator.get_reorder_window() as u64),
        ("mediator.max_in_flight", cfg.mediator.get_max_in_flight() as u64),
    ];
    for (setting, value) in positive {
        if value == 0 {
            errors.push(ValidationError::ZeroSetting { setting });
        }
    }

    if let Err(binding_errors) = BindingTable::new(&cfg.mediator.bindings) {
        errors.extend(binding_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Config {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_collects_every_problem() {
        let cfg = parse(
            r#"
server:
  address: "not an address"
upload:
  max_chunk_bytes: 0
mediator:
  reorder_window: 0
  bindings:
    - topic: orders
      function: ""
"#,
        );
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidAddress {
                    address: "not an address".to_string()
                },
                ValidationError::ZeroSetting {
                    setting: "upload.max_chunk_bytes"
                },
                ValidationError::ZeroSetting {
                    setting: "mediator.reorder_window"
                },
                ValidationError::EmptyBinding { index: 0 },
            ]
        );
    }
}
