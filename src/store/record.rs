// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::fmt;
use std::sync::Arc;

/// Deployment status of a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionStatus {
    /// An upload session is open but no chunk has arrived yet.
    Pending,
    /// Chunks are being collected.
    Uploading,
    /// An artifact is committed and invocable.
    Ready,
    /// The last upload failed; no artifact is available.
    Failed,
}

impl FunctionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionStatus::Pending => "pending",
            FunctionStatus::Uploading => "uploading",
            FunctionStatus::Ready => "ready",
            FunctionStatus::Failed => "failed",
        }
    }

    #[inline]
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for FunctionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Committed module bytes plus their SHA-256 digest.
///
/// Cloning is cheap: the bytes are shared and never mutated after creation.
#[derive(Clone, PartialEq, Eq)]
pub struct Artifact {
    bytes: Arc<[u8]>,
    digest: String,
}

impl Artifact {
    pub fn new(bytes: Vec<u8>) -> Self {
        let digest = format!("{:x}", Sha256::digest(&bytes));
        Self {
            bytes: bytes.into(),
            digest,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hex SHA-256 of the bytes.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Artifact")
            .field("size", &self.bytes.len())
            .field("digest", &self.digest)
            .finish()
    }
}

/// Registry entry for one function name.
///
/// The constructors are the only way to build a record, which keeps the
/// artifact present exactly when the status is `Ready`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionRecord {
    name: String,
    status: FunctionStatus,
    artifact: Option<Artifact>,
    error_message: Option<String>,
    updated_at: DateTime<Utc>,
}

impl FunctionRecord {
    pub fn pending(name: impl Into<String>) -> Self {
        Self::without_artifact(name.into(), FunctionStatus::Pending, None)
    }

    pub fn uploading(name: impl Into<String>) -> Self {
        Self::without_artifact(name.into(), FunctionStatus::Uploading, None)
    }

    pub fn failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::without_artifact(name.into(), FunctionStatus::Failed, Some(reason.into()))
    }

    pub fn ready(name: impl Into<String>, artifact: Artifact) -> Self {
        Self {
            name: name.into(),
            status: FunctionStatus::Ready,
            artifact: Some(artifact),
            error_message: None,
            updated_at: Utc::now(),
        }
    }

    fn without_artifact(name: String, status: FunctionStatus, error_message: Option<String>) -> Self {
        Self {
            name,
            status,
            artifact: None,
            error_message,
            updated_at: Utc::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> FunctionStatus {
        self.status
    }

    /// The committed artifact; `Some` only for `Ready` records.
    pub fn artifact(&self) -> Option<&Artifact> {
        self.artifact.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
