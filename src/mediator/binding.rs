// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{RoutingMiss, ValidationError};
use serde::Deserialize;
use std::collections::HashMap;

/// Static mapping of one bus topic to one function.
///
/// # Example
/// ```yaml
/// bindings:
///   - topic: orders
///     function: enrich
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicBinding {
    pub topic: String,
    pub function: String,
}

impl TopicBinding {
    pub fn new(topic: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            function: function.into(),
        }
    }
}

/// Read-only topic routing table, built once before a bridge starts.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    routes: HashMap<String, String>,
}

impl BindingTable {
    /// Build the table, collecting every problem rather than stopping at the first.
    pub fn new(bindings: &[TopicBinding]) -> Result<Self, Vec<ValidationError>> {
        let mut routes = HashMap::with_capacity(bindings.len());
        let mut errors = Vec::new();

        for (index, binding) in bindings.iter().enumerate() {
            if binding.topic.trim().is_empty() || binding.function.trim().is_empty() {
                errors.push(ValidationError::EmptyBinding { index });
                continue;
            }
            if routes
                .insert(binding.topic.clone(), binding.function.clone())
                .is_some()
            {
                errors.push(ValidationError::DuplicateTopic {
                    topic: binding.topic.clone(),
                });
            }
        }

        if errors.is_empty() {
            Ok(Self { routes })
        } else {
            Err(errors)
        }
    }

    /// Function bound to `topic`.
    pub fn route(&self, topic: &str) -> Result<&str, RoutingMiss> {
        self.routes
            .get(topic)
            .map(String::as_str)
            .ok_or_else(|| RoutingMiss {
                topic: topic.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
