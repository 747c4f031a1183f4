// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::EngineError;
use crate::gateway::InvocationReply;
use crate::store::Artifact;

/// Executes a committed artifact against a payload.
///
/// Implementations must tolerate unlimited concurrent calls for the same
/// artifact. Cancellation is by dropping the returned future; an engine that
/// hands work to another thread must bound that work on its own.
///
/// A guest that runs but reports a non-success code is still `Ok`; `Err` is
/// reserved for failures of the engine itself.
#[async_trait]
pub trait RuntimeEngine: Send + Sync {
    async fn execute(
        &self,
        artifact: &Artifact,
        payload: Vec<u8>,
    ) -> Result<InvocationReply, EngineError>;

    fn name(&self) -> &'static str;
}
