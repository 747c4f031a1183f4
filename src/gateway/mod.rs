// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Invocation gateway: name + payload in, code + body out, within a deadline.
//!
//! Resolution goes through the [`FunctionRegistry`], so a name that is
//! unknown or not yet `Ready` fails fast without touching the engine. The read
//! path takes no locks beyond the store's per-name read, so any number of
//! invocations of one artifact run side by side.

mod stats;

pub use stats::{InvocationCounts, InvocationStats, Outcome};

use crate::errors::InvocationError;
use crate::observability::messages::invocation::{
    InvocationCompleted, InvocationFailed, InvocationStarted, InvocationTimedOut,
};
use crate::observability::messages::StructuredLog;
use crate::registry::{FunctionRegistry, FunctionSummary};
use crate::traits::RuntimeEngine;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    pub name: String,
    pub payload: Vec<u8>,
}

impl InvocationRequest {
    pub fn new(name: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationReply {
    pub code: i32,
    pub body: Vec<u8>,
}

impl InvocationReply {
    pub fn new(code: i32, body: Vec<u8>) -> Self {
        Self { code, body }
    }

    pub fn ok(body: Vec<u8>) -> Self {
        Self::new(200, body)
    }
}

/// A listed function together with its invocation counters.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionReport {
    pub summary: FunctionSummary,
    pub counts: InvocationCounts,
}

#[derive(Clone)]
pub struct InvocationGateway {
    registry: FunctionRegistry,
    engine: Arc<dyn RuntimeEngine>,
    default_deadline: Duration,
    stats: InvocationStats,
}

impl InvocationGateway {
    pub fn new(
        registry: FunctionRegistry,
        engine: Arc<dyn RuntimeEngine>,
        default_deadline: Duration,
    ) -> Self {
        Self {
            registry,
            engine,
            default_deadline,
            stats: InvocationStats::new(),
        }
    }

    pub fn default_deadline(&self) -> Duration {
        self.default_deadline
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    pub fn stats(&self) -> &InvocationStats {
        &self.stats
    }

    /// Run `request` against its function's committed artifact.
    ///
    /// `deadline` falls back to the configured default when `None`. When the
    /// deadline passes the engine future is dropped, which cancels the call.
    ///
    /// # Errors
    /// * `InvocationError::NotFound` / `NotReady` - resolution failed, engine not called
    /// * `InvocationError::Timeout` - the deadline passed first
    /// * `InvocationError::Engine` - the engine itself failed
    pub async fn invoke(
        &self,
        request: InvocationRequest,
        deadline: Option<Duration>,
    ) -> Result<InvocationReply, InvocationError> {
        let InvocationRequest { name, payload } = request;
        let deadline = deadline.unwrap_or(self.default_deadline);

        let started = InvocationStarted {
            name: &name,
            payload_size: payload.len(),
        };
        let span = started.span("invoke");
        started.log();

        let artifact = match self.registry.resolve(&name).await {
            Ok(artifact) => artifact,
            Err(error) => {
                let error = InvocationError::from(error);
                tracing::warn!("{}", InvocationFailed { name: &name, error: &error });
                return Err(error);
            }
        };

        let start = Instant::now();
        let execution = self.engine.execute(&artifact, payload).instrument(span);
        match tokio::time::timeout(deadline, execution).await {
            Ok(Ok(reply)) => {
                self.stats.record(&name, Outcome::from_code(reply.code)).await;
                InvocationCompleted {
                    name: &name,
                    code: reply.code,
                    output_size: reply.body.len(),
                    duration: start.elapsed(),
                }
                .log();
                Ok(reply)
            }
            Ok(Err(source)) => {
                self.stats.record(&name, Outcome::Failure).await;
                let error = InvocationError::Engine { name, source };
                tracing::warn!("{}", InvocationFailed { name: error_name(&error), error: &error });
                Err(error)
            }
            Err(_elapsed) => {
                self.stats.record(&name, Outcome::Timeout).await;
                tracing::warn!("{}", InvocationTimedOut { name: &name, deadline });
                Err(InvocationError::Timeout { name, deadline })
            }
        }
    }

    /// Every function in insertion order with its counters.
    pub async fn list_functions(&self) -> Vec<FunctionReport> {
        let counts = self.stats.snapshot().await;
        self.registry
            .list()
            .await
            .into_iter()
            .map(|summary| FunctionReport {
                counts: counts.get(&summary.name).copied().unwrap_or_default(),
                summary,
            })
            .collect()
    }
}

fn error_name(error: &InvocationError) -> &str {
    match error {
        InvocationError::NotFound(name)
        | InvocationError::NotReady { name, .. }
        | InvocationError::Timeout { name, .. }
        | InvocationError::Engine { name, .. } => name,
    }
}

impl std::fmt::Debug for InvocationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvocationGateway")
            .field("engine", &self.engine.name())
            .field("default_deadline", &self.default_deadline)
            .finish()
    }
}
