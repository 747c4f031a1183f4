// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Runtime engine implementations.

#[cfg(test)]
pub mod stub;
pub mod wasm;
