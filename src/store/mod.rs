// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Artifact store: the single owner of function records.
//!
//! Records are immutable values. Every transition swaps in a new record, so a
//! caller holding a `Ready` record (and its [`Artifact`]) keeps a consistent
//! view no matter what later uploads do.

mod artifact_store;
mod record;

pub use artifact_store::{ArtifactSource, ArtifactStore};
pub use record::{Artifact, FunctionRecord, FunctionStatus};
