// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{ErrorKind, StoreError};
use crate::store::FunctionStatus;
use std::time::Duration;
use thiserror::Error;

/// Errors from resolving a function name to an invocable artifact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Function '{0}' not found")]
    NotFound(String),

    #[error("Function '{name}' is not ready (status: {status})")]
    NotReady { name: String, status: FunctionStatus },
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::NotFound(_) => ErrorKind::NotFound,
            ResolveError::NotReady { .. } => ErrorKind::NotReady,
        }
    }
}

impl From<StoreError> for ResolveError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound(name) | StoreError::UploadInProgress(name) => {
                ResolveError::NotFound(name)
            }
        }
    }
}

/// Failure reported by a runtime engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct EngineError(pub String);

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Errors returned by the invocation gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error("Function '{0}' not found")]
    NotFound(String),

    #[error("Function '{name}' is not ready (status: {status})")]
    NotReady { name: String, status: FunctionStatus },

    #[error("Invocation of '{name}' timed out after {deadline:?}")]
    Timeout { name: String, deadline: Duration },

    #[error("Runtime engine failed for '{name}': {source}")]
    Engine { name: String, source: EngineError },
}

impl InvocationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InvocationError::NotFound(_) => ErrorKind::NotFound,
            InvocationError::NotReady { .. } => ErrorKind::NotReady,
            InvocationError::Timeout { .. } => ErrorKind::Timeout,
            InvocationError::Engine { .. } => ErrorKind::EngineFailure,
        }
    }

    /// Status code used when the failure has to travel as a result body,
    /// e.g. on the mediator's outbound stream.
    pub fn result_code(&self) -> i32 {
        match self {
            InvocationError::NotFound(_) => 404,
            InvocationError::NotReady { .. } => 409,
            InvocationError::Timeout { .. } => 504,
            InvocationError::Engine { .. } => 500,
        }
    }
}

impl From<ResolveError> for InvocationError {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::NotFound(name) => InvocationError::NotFound(name),
            ResolveError::NotReady { name, status } => InvocationError::NotReady { name, status },
        }
    }
}

impl From<InvocationError> for tonic::Status {
    fn from(error: InvocationError) -> Self {
        let message = error.to_string();
        match error {
            InvocationError::NotFound(_) => tonic::Status::not_found(message),
            InvocationError::NotReady { .. } => tonic::Status::failed_precondition(message),
            InvocationError::Timeout { .. } => tonic::Status::deadline_exceeded(message),
            InvocationError::Engine { .. } => tonic::Status::internal(message),
        }
    }
}
