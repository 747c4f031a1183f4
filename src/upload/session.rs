// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::coordinator::{ArtifactValidator, UploadReceipt};
use super::locks::UploadGuard;
use crate::errors::UploadError;
use crate::observability::messages::upload::{UploadAbandoned, UploadAborted, UploadCommitted};
use crate::observability::messages::StructuredLog;
use crate::store::{Artifact, ArtifactStore};
use std::sync::Arc;
use std::time::Instant;

/// One chunk of an upload stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadChunk {
    pub name: String,
    pub body: Vec<u8>,
    /// Total artifact size declared by the client, if it knows it.
    pub total_size: Option<u64>,
}

impl UploadChunk {
    pub fn new(name: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            total_size: None,
        }
    }

    pub fn with_total_size(mut self, total_size: u64) -> Self {
        self.total_size = Some(total_size);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Collecting,
    Committing,
    Done,
    Aborted,
}

/// What the caller should do after an accepted chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Keep reading.
    More,
    /// The declared total has been consumed; stop reading and commit.
    Complete,
}

/// Buffer and state for one upload RPC.
///
/// Holds the per-name lock for its whole life. A session dropped while still
/// collecting or committing marks its record `Failed` from a spawned task
/// that keeps the lock until the record is written.
pub struct UploadSession {
    name: String,
    buffer: Vec<u8>,
    state: SessionState,
    chunk_count: usize,
    declared_total: Option<u64>,
    end_seen: bool,
    started_collecting: bool,
    /// A `Ready` record existed before this upload and must survive an abort.
    replaces_ready: bool,
    max_chunk_bytes: usize,
    started: Instant,
    store: Arc<ArtifactStore>,
    guard: Option<UploadGuard>,
}

impl UploadSession {
    pub(super) fn new(
        store: Arc<ArtifactStore>,
        guard: UploadGuard,
        replaces_ready: bool,
        max_chunk_bytes: usize,
    ) -> Self {
        Self {
            name: guard.name().to_string(),
            buffer: Vec::new(),
            state: SessionState::Collecting,
            chunk_count: 0,
            declared_total: None,
            end_seen: false,
            started_collecting: false,
            replaces_ready,
            max_chunk_bytes,
            started: Instant::now(),
            store,
            guard: Some(guard),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn received_bytes(&self) -> usize {
        self.buffer.len()
    }

    /// Validate `chunk` against the session and append its body.
    ///
    /// A zero-length chunk marks the end of the stream; only further empty
    /// chunks may follow it.
    pub async fn append(&mut self, chunk: UploadChunk) -> Result<Progress, UploadError> {
        if chunk.name != self.name {
            return Err(UploadError::NameMismatch {
                expected: self.name.clone(),
                found: chunk.name,
            });
        }
        if chunk.body.len() > self.max_chunk_bytes {
            return Err(UploadError::ChunkTooLarge {
                name: self.name.clone(),
                size: chunk.body.len(),
                max: self.max_chunk_bytes,
            });
        }
        if !self.started_collecting {
            self.store.mark_uploading(&self.name).await?;
            self.started_collecting = true;
        }
        if chunk.body.is_empty() {
            self.end_seen = true;
            return Ok(Progress::More);
        }
        if self.end_seen {
            return Err(UploadError::DataAfterEnd(self.name.clone()));
        }

        if self.declared_total.is_none() {
            self.declared_total = chunk.total_size.filter(|total| *total > 0);
        }
        let received = (self.buffer.len() + chunk.body.len()) as u64;
        if let Some(declared) = self.declared_total {
            if received > declared {
                return Err(UploadError::SizeExceeded {
                    name: self.name.clone(),
                    declared,
                    received,
                });
            }
        }

        self.buffer.extend_from_slice(&chunk.body);
        self.chunk_count += 1;

        match self.declared_total {
            Some(declared) if declared == received => Ok(Progress::Complete),
            _ => Ok(Progress::More),
        }
    }

    /// Publish the assembled artifact. Any failure aborts the session first.
    pub async fn commit(
        mut self,
        validator: Option<&dyn ArtifactValidator>,
    ) -> Result<UploadReceipt, UploadError> {
        self.state = SessionState::Committing;
        if let Err(error) = self.check_complete(validator) {
            self.abort(&error).await;
            return Err(error);
        }

        let artifact = Artifact::new(std::mem::take(&mut self.buffer));
        let receipt = UploadReceipt {
            name: self.name.clone(),
            digest: artifact.digest().to_string(),
            size: artifact.len(),
            chunk_count: self.chunk_count,
            elapsed: self.started.elapsed(),
        };
        self.store.put(&self.name, artifact).await;
        self.state = SessionState::Done;
        self.guard.take();

        UploadCommitted {
            name: &receipt.name,
            size_bytes: receipt.size,
            chunk_count: receipt.chunk_count,
            digest: &receipt.digest,
            elapsed: receipt.elapsed,
        }
        .log();
        Ok(receipt)
    }

    /// Discard the buffer and release the name.
    ///
    /// The record is marked `Failed` unless it was `Ready` before this upload.
    pub async fn abort(mut self, error: &UploadError) {
        self.state = SessionState::Aborted;
        UploadAborted {
            name: &self.name,
            received_bytes: self.buffer.len(),
            error,
        }
        .log();
        self.buffer = Vec::new();

        if !self.replaces_ready {
            // The lock is still held, so the record cannot have been removed.
            let _ = self.store.mark_failed(&self.name, &error.to_string()).await;
        }
        self.guard.take();
    }

    fn check_complete(&self, validator: Option<&dyn ArtifactValidator>) -> Result<(), UploadError> {
        if self.buffer.is_empty() {
            return Err(UploadError::EmptyArtifact(self.name.clone()));
        }
        let received = self.buffer.len() as u64;
        if let Some(declared) = self.declared_total {
            if received < declared {
                return Err(UploadError::Truncated {
                    name: self.name.clone(),
                    declared,
                    received,
                });
            }
        }
        if let Some(validator) = validator {
            validator
                .validate(&self.buffer)
                .map_err(|reason| UploadError::Rejected {
                    name: self.name.clone(),
                    reason,
                })?;
        }
        Ok(())
    }
}

impl Drop for UploadSession {
    fn drop(&mut self) {
        if !matches!(self.state, SessionState::Collecting | SessionState::Committing) {
            return;
        }
        tracing::warn!(
            "{}",
            UploadAbandoned {
                name: &self.name,
                received_bytes: self.buffer.len(),
            }
        );

        let guard = self.guard.take();
        if self.replaces_ready {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let store = self.store.clone();
        let name = self.name.clone();
        handle.spawn(async move {
            let _ = store
                .mark_failed(&name, "upload abandoned before completion")
                .await;
            drop(guard);
        });
    }
}

impl std::fmt::Debug for UploadSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadSession")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("received_bytes", &self.buffer.len())
            .field("chunk_count", &self.chunk_count)
            .finish()
    }
}
