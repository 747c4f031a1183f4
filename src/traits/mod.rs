// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod runtime_engine;

pub use runtime_engine::RuntimeEngine;
