// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::record::{Artifact, FunctionRecord, FunctionStatus};
use crate::errors::StoreError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Read-only view of the store handed to the registry.
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    async fn get(&self, name: &str) -> Result<FunctionRecord, StoreError>;

    /// Point-in-time snapshot in insertion order.
    async fn list(&self) -> Vec<FunctionRecord>;
}

/// One name's record behind its own lock.
///
/// `retired` is set when the slot is removed from the map; a writer that
/// raced with the removal sees it and retries against the fresh slot.
struct Slot {
    seq: u64,
    retired: AtomicBool,
    record: RwLock<Option<FunctionRecord>>,
}

/// In-memory map of function name to record.
///
/// The outer map lock is held only to look up or insert a slot. All record
/// mutation happens under the slot's own lock, so writers for different names
/// never wait on each other and readers never wait on unrelated writers.
pub struct ArtifactStore {
    slots: RwLock<HashMap<String, Arc<Slot>>>,
    next_seq: AtomicU64,
}

impl Default for ArtifactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Commit `artifact` as the `Ready` record for `name`, replacing whatever was there.
    pub async fn put(&self, name: &str, artifact: Artifact) -> FunctionRecord {
        self.mutate_or_insert(name, |_| FunctionRecord::ready(name, artifact.clone()))
            .await
    }

    /// Open a record for an upload.
    ///
    /// A `Ready` record is left as it is so the previous artifact stays
    /// invocable until the new upload commits. Anything else becomes `Pending`.
    pub async fn begin(&self, name: &str) -> FunctionRecord {
        self.mutate_or_insert(name, |current| match current {
            Some(record) if record.status().is_ready() => record.clone(),
            _ => FunctionRecord::pending(name),
        })
        .await
    }

    /// Move a `Pending` record to `Uploading`. Other states are left untouched.
    pub async fn mark_uploading(&self, name: &str) -> Result<FunctionRecord, StoreError> {
        self.mutate_existing(name, |record| {
            if record.status() == FunctionStatus::Pending {
                FunctionRecord::uploading(name)
            } else {
                record.clone()
            }
        })
        .await
    }

    /// Replace the record with a `Failed` one carrying `reason`.
    pub async fn mark_failed(&self, name: &str, reason: &str) -> Result<FunctionRecord, StoreError> {
        self.mutate_existing(name, |_| FunctionRecord::failed(name, reason))
            .await
    }

    pub async fn get(&self, name: &str) -> Result<FunctionRecord, StoreError> {
        let slot = self
            .existing_slot(name)
            .await
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let guard = slot.record.read().await;
        guard
            .clone()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    pub async fn list(&self) -> Vec<FunctionRecord> {
        let mut slots: Vec<Arc<Slot>> = {
            let map = self.slots.read().await;
            map.values().cloned().collect()
        };
        slots.sort_by_key(|slot| slot.seq);

        let mut records = Vec::with_capacity(slots.len());
        for slot in slots {
            if let Some(record) = slot.record.read().await.clone() {
                records.push(record);
            }
        }
        records
    }

    /// Delete the record for `name`, returning the last value it held.
    pub async fn remove(&self, name: &str) -> Result<FunctionRecord, StoreError> {
        let mut map = self.slots.write().await;
        let slot = map
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let mut guard = slot.record.write().await;
        let record = guard
            .take()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        slot.retired.store(true, Ordering::Release);
        map.remove(name);
        Ok(record)
    }

    async fn existing_slot(&self, name: &str) -> Option<Arc<Slot>> {
        self.slots.read().await.get(name).cloned()
    }

    async fn slot_or_insert(&self, name: &str) -> Arc<Slot> {
        if let Some(slot) = self.existing_slot(name).await {
            return slot;
        }
        let mut map = self.slots.write().await;
        map.entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(Slot {
                    seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
                    retired: AtomicBool::new(false),
                    record: RwLock::new(None),
                })
            })
            .clone()
    }

    async fn mutate_or_insert<F>(&self, name: &str, mut next: F) -> FunctionRecord
    where
        F: FnMut(Option<&FunctionRecord>) -> FunctionRecord,
    {
        loop {
            let slot = self.slot_or_insert(name).await;
            let mut guard = slot.record.write().await;
            if slot.retired.load(Ordering::Acquire) {
                continue;
            }
            let record = next(guard.as_ref());
            *guard = Some(record.clone());
            return record;
        }
    }

    async fn mutate_existing<F>(&self, name: &str, next: F) -> Result<FunctionRecord, StoreError>
    where
        F: FnOnce(&FunctionRecord) -> FunctionRecord,
    {
        let not_found = || StoreError::NotFound(name.to_string());
        let slot = self.existing_slot(name).await.ok_or_else(not_found)?;
        let mut guard = slot.record.write().await;
        if slot.retired.load(Ordering::Acquire) {
            return Err(not_found());
        }
        let current = guard.as_ref().ok_or_else(not_found)?;
        let record = next(current);
        *guard = Some(record.clone());
        Ok(record)
    }
}

impl std::fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("next_seq", &self.next_seq.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ArtifactSource for ArtifactStore {
    async fn get(&self, name: &str) -> Result<FunctionRecord, StoreError> {
        ArtifactStore::get(self, name).await
    }

    async fn list(&self) -> Vec<FunctionRecord> {
        ArtifactStore::list(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_then_get_returns_ready_record() {
        let store = ArtifactStore::new();
        let record = store.put("echo", Artifact::new(b"ABCD".to_vec())).await;
        assert_eq!(record.status(), FunctionStatus::Ready);

        let fetched = store.get("echo").await.unwrap();
        assert_eq!(fetched.artifact().unwrap().bytes(), b"ABCD");
    }

    #[tokio::test]
    async fn test_get_unknown_name() {
        let store = ArtifactStore::new();
        assert_eq!(
            store.get("missing").await,
            Err(StoreError::NotFound("missing".to_string()))
        );
    }

    #[tokio::test]
    async fn test_put_swaps_without_touching_held_artifact() {
        let store = ArtifactStore::new();
        store.put("f", Artifact::new(b"v1".to_vec())).await;
        let held = store.get("f").await.unwrap();

        store.put("f", Artifact::new(b"v2".to_vec())).await;

        assert_eq!(held.artifact().unwrap().bytes(), b"v1");
        assert_eq!(store.get("f").await.unwrap().artifact().unwrap().bytes(), b"v2");
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = ArtifactStore::new();
        for name in ["c", "a", "b"] {
            store.put(name, Artifact::new(name.as_bytes().to_vec())).await;
        }
        // Re-putting an existing name does not move it.
        store.put("c", Artifact::new(b"again".to_vec())).await;

        let names: Vec<String> = store
            .list()
            .await
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_begin_keeps_ready_record() {
        let store = ArtifactStore::new();
        store.put("f", Artifact::new(b"v1".to_vec())).await;

        let record = store.begin("f").await;
        assert_eq!(record.status(), FunctionStatus::Ready);

        store.mark_uploading("f").await.unwrap();
        assert_eq!(store.get("f").await.unwrap().status(), FunctionStatus::Ready);
    }

    #[tokio::test]
    async fn test_begin_then_uploading_then_failed() {
        let store = ArtifactStore::new();
        assert_eq!(store.begin("f").await.status(), FunctionStatus::Pending);
        assert_eq!(
            store.mark_uploading("f").await.unwrap().status(),
            FunctionStatus::Uploading
        );

        let failed = store.mark_failed("f", "stream reset").await.unwrap();
        assert_eq!(failed.status(), FunctionStatus::Failed);
        assert_eq!(failed.error_message(), Some("stream reset"));
    }

    #[tokio::test]
    async fn test_mark_failed_requires_existing_record() {
        let store = ArtifactStore::new();
        assert!(store.mark_failed("ghost", "nope").await.is_err());
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn test_remove_then_reinsert_goes_to_end() {
        let store = ArtifactStore::new();
        store.put("a", Artifact::new(b"a".to_vec())).await;
        store.put("b", Artifact::new(b"b".to_vec())).await;

        let removed = store.remove("a").await.unwrap();
        assert_eq!(removed.name(), "a");
        assert!(store.get("a").await.is_err());
        assert!(store.remove("a").await.is_err());

        store.put("a", Artifact::new(b"a2".to_vec())).await;
        let names: Vec<String> = store
            .list()
            .await
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_concurrent_puts_to_different_names() {
        let store = Arc::new(ArtifactStore::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let name = format!("fn-{}", i);
                store.put(&name, Artifact::new(vec![i as u8; 8])).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.list().await.len(), 32);
    }
}
