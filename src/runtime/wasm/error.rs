// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for the WASM runtime engine.
//!
//! Errors fall into two groups. Guest outcomes (traps, fuel exhaustion, ABI
//! violations, oversize input) are the function's own failure and travel back
//! to the caller as a reply code. Everything else is a failure of the engine
//! itself.

use thiserror::Error;

/// Rejection reason for WebAssembly component binaries.
pub const WASM_COMPONENT_UNSUPPORTED: &str = "WebAssembly components are not supported; \
upload a core module exporting memory, allocate, deallocate and process";

/// Rejection reason for legacy Preview 1 component binaries.
pub const WASM_UNSUPPORTED_ENCODING: &str = "Unsupported WASM binary: Legacy Preview 1 Component Model detected. \
Please upload a classic core WASM module.";

#[derive(Error, Debug)]
pub enum WasmError {
    /// Invalid or malformed WASM binary format.
    #[error("Invalid WASM binary: {0}")]
    InvalidWasmBinary(String),

    /// Unsupported WASM encoding (components, legacy Preview 1).
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// WASM binary parsing error from wasmparser.
    #[error("WASM parser error: {0}")]
    ParserError(#[from] wasmparser::BinaryReaderError),

    /// Wasmtime engine creation or configuration error.
    #[error("Engine creation error: {0}")]
    EngineError(String),

    /// Module compilation error.
    #[error("WASM module error: {0}")]
    ModuleError(String),

    /// The module does not satisfy the allocate/deallocate/process ABI.
    #[error("WASM module must export {0}")]
    MissingExport(&'static str),

    /// Memory allocation or access error in WASM linear memory.
    #[error("Memory error: {0}")]
    MemoryError(String),

    /// Input larger than the configured limit; the guest was not called.
    #[error("Input of {size} bytes exceeds the {max} byte limit")]
    InputTooLarge { size: usize, max: usize },

    /// The guest used up its fuel.
    #[error("Execution ran out of fuel after {fuel} units")]
    OutOfFuel { fuel: u64 },

    /// The guest trapped.
    #[error("WASM execution trapped: {0}")]
    Trap(String),
}

impl WasmError {
    /// Reply code for guest outcomes, `None` for engine failures.
    pub fn result_code(&self) -> Option<i32> {
        match self {
            WasmError::InputTooLarge { .. } => Some(413),
            WasmError::OutOfFuel { .. } => Some(503),
            WasmError::MissingExport(_) | WasmError::MemoryError(_) | WasmError::Trap(_) => {
                Some(500)
            }
            _ => None,
        }
    }

    /// Sort a wasmtime call failure into fuel exhaustion or a plain trap.
    pub(crate) fn from_call(error: wasmtime::Error, fuel: u64) -> Self {
        match error.downcast_ref::<wasmtime::Trap>() {
            Some(wasmtime::Trap::OutOfFuel) => WasmError::OutOfFuel { fuel },
            _ => WasmError::Trap(error.to_string()),
        }
    }
}

/// Result type alias for WASM operations.
pub type WasmResult<T> = Result<T, WasmError>;
