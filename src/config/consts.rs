// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default gRPC listen address
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:50051";

/// Default maximum upload chunk size (1 MiB)
pub const DEFAULT_MAX_CHUNK_BYTES: usize = 1024 * 1024;

/// Default invocation deadline in seconds (2 minutes)
pub const DEFAULT_INVOCATION_TIMEOUT_SECONDS: u64 = 120;

/// Default fuel level for WASM execution (100 million instructions)
pub const DEFAULT_FUEL_LEVEL: u64 = 100_000_000;
/// Minimum allowed fuel level (1 million instructions)
pub const MIN_FUEL_LEVEL: u64 = 1_000_000;
/// Maximum allowed fuel level (500 million instructions) - security limit
pub const MAX_FUEL_LEVEL: u64 = 500_000_000;

/// Default maximum payload handed to a WASM guest (16 MiB)
pub const DEFAULT_MAX_INPUT_BYTES: usize = 16 * 1024 * 1024;

/// Default per-topic reorder window
pub const DEFAULT_REORDER_WINDOW: usize = 64;
/// Default cap on concurrent mediator invocations
pub const DEFAULT_MAX_IN_FLIGHT: usize = 256;
