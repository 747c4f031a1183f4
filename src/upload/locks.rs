// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Per-name exclusion table for open uploads.
///
/// Acquiring never waits: a name that is already held is refused so the
/// caller can report `Conflict` instead of queueing behind the other upload.
#[derive(Clone, Default)]
pub struct UploadLocks {
    open: Arc<Mutex<HashSet<String>>>,
}

impl UploadLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the lock for `name`, or `None` if it is already held.
    pub fn try_acquire(&self, name: &str) -> Option<UploadGuard> {
        if !self.table().insert(name.to_string()) {
            return None;
        }
        Some(UploadGuard {
            locks: self.clone(),
            name: name.to_string(),
        })
    }

    pub fn is_held(&self, name: &str) -> bool {
        self.table().contains(name)
    }

    fn table(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a holder panicked mid-insert.
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases its name when dropped.
pub struct UploadGuard {
    locks: UploadLocks,
    name: String,
}

impl UploadGuard {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for UploadGuard {
    fn drop(&mut self) {
        self.locks.table().remove(&self.name);
    }
}

impl std::fmt::Debug for UploadGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadGuard").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_refused_until_release() {
        let locks = UploadLocks::new();
        let guard = locks.try_acquire("echo").unwrap();
        assert!(locks.try_acquire("echo").is_none());
        assert!(locks.is_held("echo"));

        drop(guard);
        assert!(!locks.is_held("echo"));
        assert!(locks.try_acquire("echo").is_some());
    }

    #[test]
    fn test_names_are_independent() {
        let locks = UploadLocks::new();
        let _a = locks.try_acquire("a").unwrap();
        let _b = locks.try_acquire("b").unwrap();
        assert!(locks.is_held("a") && locks.is_held("b"));
    }
}
