// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{ErrorKind, StoreError};
use thiserror::Error;

/// Errors that end an upload session.
///
/// Everything except [`UploadError::Conflict`] aborts a session that was
/// already open; `Conflict` is raised before any session exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    /// Another upload for the same name is still open.
    #[error("An upload for function '{0}' is already in progress")]
    Conflict(String),

    /// The stream finished without delivering a single byte.
    #[error("Upload for function '{0}' contained no data")]
    EmptyArtifact(String),

    /// The client closed the stream before sending any chunk.
    #[error("Upload stream closed before the first chunk")]
    NoChunks,

    /// A chunk exceeded the configured per-chunk limit.
    #[error("Chunk of {size} bytes for function '{name}' exceeds the {max} byte limit")]
    ChunkTooLarge { name: String, size: usize, max: usize },

    /// A chunk named a different function than the one being uploaded.
    #[error("Chunk for function '{found}' received while uploading '{expected}'")]
    NameMismatch { expected: String, found: String },

    /// More bytes arrived than the client declared up front.
    #[error("Upload for function '{name}' declared {declared} bytes but sent at least {received}")]
    SizeExceeded {
        name: String,
        declared: u64,
        received: u64,
    },

    /// The stream ended before the declared total was consumed.
    #[error("Upload for function '{name}' declared {declared} bytes but only sent {received}")]
    Truncated {
        name: String,
        declared: u64,
        received: u64,
    },

    /// Data followed the zero-length end-of-stream chunk.
    #[error("Upload for function '{0}' sent data after its end-of-stream chunk")]
    DataAfterEnd(String),

    /// The transport failed or the client aborted the stream.
    #[error("Upload stream failed: {0}")]
    Stream(String),

    /// The assembled artifact was refused by the artifact validator.
    #[error("Artifact for function '{name}' rejected: {reason}")]
    Rejected { name: String, reason: String },

    /// The store refused the commit.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl UploadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UploadError::Conflict(_) => ErrorKind::Conflict,
            UploadError::Store(e) => e.kind(),
            _ => ErrorKind::IoFailure,
        }
    }
}

impl From<UploadError> for tonic::Status {
    fn from(error: UploadError) -> Self {
        let message = error.to_string();
        match error {
            UploadError::Conflict(_) => tonic::Status::already_exists(message),
            UploadError::Store(e) => e.into(),
            UploadError::Stream(_) => tonic::Status::aborted(message),
            UploadError::Truncated { .. } => tonic::Status::data_loss(message),
            _ => tonic::Status::invalid_argument(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_is_its_own_kind() {
        let conflict = UploadError::Conflict("echo".to_string());
        assert_eq!(conflict.kind(), ErrorKind::Conflict);
        let status: tonic::Status = conflict.into();
        assert_eq!(status.code(), tonic::Code::AlreadyExists);
    }

    #[test]
    fn test_session_failures_are_io() {
        let truncated = UploadError::Truncated {
            name: "echo".to_string(),
            declared: 8,
            received: 4,
        };
        assert_eq!(truncated.kind(), ErrorKind::IoFailure);
        let status: tonic::Status = truncated.into();
        assert_eq!(status.code(), tonic::Code::DataLoss);

        assert_eq!(UploadError::NoChunks.kind(), ErrorKind::IoFailure);
    }
}
