// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Chunked upload protocol.
//!
//! A client streams chunks for one function name. The [`UploadCoordinator`]
//! takes the per-name lock, opens an [`UploadSession`], appends chunks in
//! arrival order and either commits the exact concatenation to the store or
//! aborts without committing anything.

mod coordinator;
mod locks;
mod session;

pub use coordinator::{ArtifactValidator, UploadCoordinator, UploadReceipt};
pub use locks::{UploadGuard, UploadLocks};
pub use session::{Progress, SessionState, UploadChunk, UploadSession};
