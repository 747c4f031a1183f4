// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Function registry: the read path over the artifact store.
//!
//! The registry only sees the store through [`ArtifactSource`], so it can
//! report and resolve but never mutate. [`FunctionRegistry::resolve`] is the
//! single path the invocation gateway uses to reach artifact bytes.

use crate::errors::ResolveError;
use crate::store::{Artifact, ArtifactSource, FunctionRecord, FunctionStatus};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Status line for one function. Never carries artifact bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSummary {
    pub name: String,
    pub status: FunctionStatus,
    pub digest: Option<String>,
    pub size: usize,
    pub error_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<&FunctionRecord> for FunctionSummary {
    fn from(record: &FunctionRecord) -> Self {
        Self {
            name: record.name().to_string(),
            status: record.status(),
            digest: record.artifact().map(|a| a.digest().to_string()),
            size: record.artifact().map(Artifact::len).unwrap_or(0),
            error_message: record.error_message().map(str::to_string),
            updated_at: record.updated_at(),
        }
    }
}

#[derive(Clone)]
pub struct FunctionRegistry {
    source: Arc<dyn ArtifactSource>,
}

impl FunctionRegistry {
    pub fn new(source: Arc<dyn ArtifactSource>) -> Self {
        Self { source }
    }

    /// All known functions in insertion order.
    pub async fn list(&self) -> Vec<FunctionSummary> {
        self.source
            .list()
            .await
            .iter()
            .map(FunctionSummary::from)
            .collect()
    }

    /// Resolve `name` to its committed artifact.
    ///
    /// # Errors
    /// * `ResolveError::NotFound` - no record for the name
    /// * `ResolveError::NotReady` - the record is `Pending`, `Uploading` or `Failed`
    pub async fn resolve(&self, name: &str) -> Result<Artifact, ResolveError> {
        let record = self.source.get(name).await?;
        match record.artifact() {
            Some(artifact) if record.status().is_ready() => Ok(artifact.clone()),
            _ => Err(ResolveError::NotReady {
                name: name.to_string(),
                status: record.status(),
            }),
        }
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ArtifactStore;

    fn registry_over(store: &Arc<ArtifactStore>) -> FunctionRegistry {
        FunctionRegistry::new(store.clone())
    }

    #[tokio::test]
    async fn test_resolve_ready_function() {
        let store = Arc::new(ArtifactStore::new());
        store.put("echo", Artifact::new(b"ABCD".to_vec())).await;

        let artifact = registry_over(&store).resolve("echo").await.unwrap();
        assert_eq!(artifact.bytes(), b"ABCD");
    }

    #[tokio::test]
    async fn test_resolve_unknown_function() {
        let store = Arc::new(ArtifactStore::new());
        let result = registry_over(&store).resolve("missing").await;
        assert_eq!(result, Err(ResolveError::NotFound("missing".to_string())));
    }

    #[tokio::test]
    async fn test_resolve_never_returns_bytes_before_ready() {
        let store = Arc::new(ArtifactStore::new());
        let registry = registry_over(&store);

        store.begin("f").await;
        assert!(matches!(
            registry.resolve("f").await,
            Err(ResolveError::NotReady { status: FunctionStatus::Pending, .. })
        ));

        store.mark_uploading("f").await.unwrap();
        assert!(matches!(
            registry.resolve("f").await,
            Err(ResolveError::NotReady { status: FunctionStatus::Uploading, .. })
        ));

        store.mark_failed("f", "aborted").await.unwrap();
        assert!(matches!(
            registry.resolve("f").await,
            Err(ResolveError::NotReady { status: FunctionStatus::Failed, .. })
        ));
    }

    #[tokio::test]
    async fn test_list_exposes_status_without_bytes() {
        let store = Arc::new(ArtifactStore::new());
        store.put("ready", Artifact::new(vec![0u8; 10])).await;
        store.begin("pending").await;

        let summaries = registry_over(&store).list().await;
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "ready");
        assert_eq!(summaries[0].status, FunctionStatus::Ready);
        assert_eq!(summaries[0].size, 10);
        assert!(summaries[0].digest.is_some());
        assert_eq!(summaries[1].status, FunctionStatus::Pending);
        assert_eq!(summaries[1].digest, None);
    }
}
