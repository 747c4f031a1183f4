// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! WebAssembly runtime engine built on wasmtime.

pub mod detector;
pub mod engine;
pub mod error;
pub mod executor;

pub use detector::{detect_binary_kind, BinaryKind, WasmArtifactValidator};
pub use engine::WasmRuntimeEngine;
pub use error::{WasmError, WasmResult};
pub use executor::{CStyleExecutor, GuestOutput};
