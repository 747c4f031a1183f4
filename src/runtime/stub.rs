// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Runtime engines for tests.

use crate::errors::EngineError;
use crate::gateway::InvocationReply;
use crate::store::Artifact;
use crate::traits::RuntimeEngine;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn echo(artifact: &Artifact, payload: &[u8]) -> InvocationReply {
    let mut body = artifact.bytes().to_vec();
    body.extend_from_slice(payload);
    InvocationReply::ok(body)
}

/// Replies 200 with the artifact bytes followed by the payload.
pub struct EchoEngine;

#[async_trait]
impl RuntimeEngine for EchoEngine {
    async fn execute(
        &self,
        artifact: &Artifact,
        payload: Vec<u8>,
    ) -> Result<InvocationReply, EngineError> {
        Ok(echo(artifact, &payload))
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

/// Replies with a fixed code and body.
pub struct FixedEngine {
    pub code: i32,
    pub body: Vec<u8>,
}

#[async_trait]
impl RuntimeEngine for FixedEngine {
    async fn execute(
        &self,
        _artifact: &Artifact,
        _payload: Vec<u8>,
    ) -> Result<InvocationReply, EngineError> {
        Ok(InvocationReply::new(self.code, self.body.clone()))
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

/// Sleeps before echoing.
///
/// With no fixed delay the payload is read as a decimal millisecond count,
/// so each message can choose how long it takes.
pub struct SlowEngine {
    pub delay: Option<Duration>,
}

impl SlowEngine {
    pub fn fixed(delay: Duration) -> Self {
        Self { delay: Some(delay) }
    }

    pub fn from_payload() -> Self {
        Self { delay: None }
    }
}

#[async_trait]
impl RuntimeEngine for SlowEngine {
    async fn execute(
        &self,
        artifact: &Artifact,
        payload: Vec<u8>,
    ) -> Result<InvocationReply, EngineError> {
        let delay = self.delay.unwrap_or_else(|| {
            let millis = std::str::from_utf8(&payload)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            Duration::from_millis(millis)
        });
        tokio::time::sleep(delay).await;
        Ok(echo(artifact, &payload))
    }

    fn name(&self) -> &'static str {
        "slow"
    }
}

/// Always fails.
pub struct FailingEngine;

#[async_trait]
impl RuntimeEngine for FailingEngine {
    async fn execute(
        &self,
        _artifact: &Artifact,
        _payload: Vec<u8>,
    ) -> Result<InvocationReply, EngineError> {
        Err(EngineError::new("Simulated engine failure"))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Panics when the payload is `panic`, echoes otherwise.
pub struct PanickingEngine;

#[async_trait]
impl RuntimeEngine for PanickingEngine {
    async fn execute(
        &self,
        artifact: &Artifact,
        payload: Vec<u8>,
    ) -> Result<InvocationReply, EngineError> {
        if payload == b"panic" {
            panic!("Simulated engine panic");
        }
        Ok(echo(artifact, &payload))
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// Echoes and counts calls.
#[derive(Default)]
pub struct CountingEngine {
    pub calls: Arc<AtomicUsize>,
}

impl CountingEngine {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RuntimeEngine for CountingEngine {
    async fn execute(
        &self,
        artifact: &Artifact,
        payload: Vec<u8>,
    ) -> Result<InvocationReply, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(echo(artifact, &payload))
    }

    fn name(&self) -> &'static str {
        "counting"
    }
}
