// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::locks::UploadLocks;
use super::session::{Progress, UploadChunk, UploadSession};
use crate::errors::{StoreError, UploadError};
use crate::observability::messages::upload::{FunctionUnloaded, UploadConflict, UploadStarted};
use crate::store::{ArtifactStore, FunctionRecord};
use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

/// Checks assembled bytes before they are committed.
pub trait ArtifactValidator: Send + Sync {
    /// `Err` carries the human-readable rejection reason.
    fn validate(&self, bytes: &[u8]) -> Result<(), String>;
}

/// Result of a committed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub name: String,
    pub digest: String,
    pub size: usize,
    pub chunk_count: usize,
    pub elapsed: Duration,
}

/// Drives upload streams into the artifact store, one session per name.
#[derive(Clone)]
pub struct UploadCoordinator {
    store: Arc<ArtifactStore>,
    locks: UploadLocks,
    max_chunk_bytes: usize,
    validator: Option<Arc<dyn ArtifactValidator>>,
}

impl UploadCoordinator {
    pub fn new(store: Arc<ArtifactStore>, max_chunk_bytes: usize) -> Self {
        Self {
            store,
            locks: UploadLocks::new(),
            max_chunk_bytes,
            validator: None,
        }
    }

    pub fn with_validator(mut self, validator: Arc<dyn ArtifactValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn max_chunk_bytes(&self) -> usize {
        self.max_chunk_bytes
    }

    pub fn is_uploading(&self, name: &str) -> bool {
        self.locks.is_held(name)
    }

    /// Open a session for `name`.
    ///
    /// # Errors
    /// `UploadError::Conflict` if another session for `name` is open.
    pub async fn open(&self, name: &str) -> Result<UploadSession, UploadError> {
        let guard = self.locks.try_acquire(name).ok_or_else(|| {
            tracing::warn!("{}", UploadConflict { name });
            UploadError::Conflict(name.to_string())
        })?;
        let record = self.store.begin(name).await;
        tracing::info!("{}", UploadStarted { name });
        Ok(UploadSession::new(
            self.store.clone(),
            guard,
            record.status().is_ready(),
            self.max_chunk_bytes,
        ))
    }

    /// Consume `chunks` as one upload and commit it.
    ///
    /// The function name comes from the first chunk. The stream is read until
    /// it ends or the declared total size has been consumed.
    pub async fn upload<S, E>(&self, mut chunks: S) -> Result<UploadReceipt, UploadError>
    where
        S: Stream<Item = Result<UploadChunk, E>> + Unpin + Send,
        E: Display,
    {
        let first = match chunks.next().await {
            None => return Err(UploadError::NoChunks),
            Some(Err(e)) => return Err(UploadError::Stream(e.to_string())),
            Some(Ok(chunk)) => chunk,
        };

        let mut session = self.open(&first.name).await?;
        match collect(&mut session, first, &mut chunks).await {
            Ok(()) => session.commit(self.validator.as_deref()).await,
            Err(error) => {
                session.abort(&error).await;
                Err(error)
            }
        }
    }

    /// Remove a function from the store.
    ///
    /// # Errors
    /// * `StoreError::UploadInProgress` - a session for `name` is open
    /// * `StoreError::NotFound` - no record for `name`
    pub async fn unload(&self, name: &str) -> Result<FunctionRecord, StoreError> {
        let _guard = self
            .locks
            .try_acquire(name)
            .ok_or_else(|| StoreError::UploadInProgress(name.to_string()))?;
        let record = self.store.remove(name).await?;
        tracing::info!(
            "{}",
            FunctionUnloaded {
                name,
                status: record.status().as_str(),
            }
        );
        Ok(record)
    }
}

async fn collect<S, E>(
    session: &mut UploadSession,
    first: UploadChunk,
    chunks: &mut S,
) -> Result<(), UploadError>
where
    S: Stream<Item = Result<UploadChunk, E>> + Unpin + Send,
    E: Display,
{
    if session.append(first).await? == Progress::Complete {
        return Ok(());
    }
    while let Some(item) = chunks.next().await {
        let chunk = item.map_err(|e| UploadError::Stream(e.to_string()))?;
        if session.append(chunk).await? == Progress::Complete {
            break;
        }
    }
    Ok(())
}

impl std::fmt::Debug for UploadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadCoordinator")
            .field("max_chunk_bytes", &self.max_chunk_bytes)
            .field("has_validator", &self.validator.is_some())
            .finish()
    }
}
