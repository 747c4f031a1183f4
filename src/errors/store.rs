// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::ErrorKind;
use thiserror::Error;

/// Errors raised by the artifact store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record exists for the name.
    #[error("Function '{0}' not found")]
    NotFound(String),

    /// The name has an upload open, so the record cannot be removed.
    #[error("Function '{0}' has an upload in progress")]
    UploadInProgress(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::UploadInProgress(_) => ErrorKind::Conflict,
        }
    }
}

impl From<StoreError> for tonic::Status {
    fn from(error: StoreError) -> Self {
        let message = error.to_string();
        match error {
            StoreError::NotFound(_) => tonic::Status::not_found(message),
            StoreError::UploadInProgress(_) => tonic::Status::aborted(message),
        }
    }
}

/// A bus message whose topic has no binding. Counted and dropped, never replied to.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No function bound to topic '{topic}'")]
pub struct RoutingMiss {
    pub topic: String,
}

impl RoutingMiss {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::RoutingMiss
    }
}
