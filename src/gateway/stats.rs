// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// How one invocation ended, for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The engine replied with a 2xx code.
    Success,
    /// The engine failed or replied with a non-2xx code.
    Failure,
    /// The deadline passed first.
    Timeout,
}

impl Outcome {
    pub fn from_code(code: i32) -> Self {
        if (200..300).contains(&code) {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvocationCounts {
    pub successes: u64,
    pub failures: u64,
    pub timeouts: u64,
    pub total: u64,
}

#[derive(Default)]
struct Counters {
    successes: AtomicU64,
    failures: AtomicU64,
    timeouts: AtomicU64,
    total: AtomicU64,
}

impl Counters {
    fn load(&self) -> InvocationCounts {
        InvocationCounts {
            successes: self.successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            total: self.total.load(Ordering::Relaxed),
        }
    }
}

/// Per-function invocation counters.
///
/// Only invocations that reached the engine are counted; `NotFound` and
/// `NotReady` fail before a function is known to exist.
#[derive(Clone, Default)]
pub struct InvocationStats {
    counters: Arc<RwLock<HashMap<String, Arc<Counters>>>>,
}

impl InvocationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, name: &str, outcome: Outcome) {
        let counters = self.counters_for(name).await;
        counters.total.fetch_add(1, Ordering::Relaxed);
        let bucket = match outcome {
            Outcome::Success => &counters.successes,
            Outcome::Failure => &counters.failures,
            Outcome::Timeout => &counters.timeouts,
        };
        bucket.fetch_add(1, Ordering::Relaxed);
    }

    pub async fn get(&self, name: &str) -> InvocationCounts {
        self.counters
            .read()
            .await
            .get(name)
            .map(|c| c.load())
            .unwrap_or_default()
    }

    pub async fn snapshot(&self) -> HashMap<String, InvocationCounts> {
        self.counters
            .read()
            .await
            .iter()
            .map(|(name, c)| (name.clone(), c.load()))
            .collect()
    }

    /// Drop the counters for an unloaded function.
    pub async fn forget(&self, name: &str) {
        self.counters.write().await.remove(name);
    }

    async fn counters_for(&self, name: &str) -> Arc<Counters> {
        if let Some(counters) = self.counters.read().await.get(name) {
            return counters.clone();
        }
        self.counters
            .write()
            .await
            .entry(name.to_string())
            .or_default()
            .clone()
    }
}
