// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // config loading + host wiring
pub mod errors;     // error handling
pub mod gateway;    // invocation gateway + stats
pub mod mediator;   // topic to function bridge
pub mod observability;
pub mod registry;   // ready-only view of the store
pub mod runtime;    // runtime engines
pub mod store;      // artifact store
pub mod traits;     // unified abstractions
pub mod upload;     // chunked upload protocol

#[cfg(feature = "grpc")]
pub mod proto;      // generated protobufs live here
#[cfg(feature = "grpc")]
pub mod service;    // gRPC handlers
