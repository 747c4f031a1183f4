// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! gRPC services over the core components.
//!
//! The handlers only translate between protobuf messages and core types;
//! every decision is made by the [`Host`](crate::config::Host) components.

mod functions;
mod modules;
mod subscriber;

pub use functions::FunctionsService;
pub use modules::ModulesService;
pub use subscriber::SubscriberService;

use std::time::Duration;
use tonic::metadata::MetadataMap;

/// Client deadline from the `grpc-timeout` header, if present and well formed.
pub(crate) fn grpc_timeout(metadata: &MetadataMap) -> Option<Duration> {
    let value = metadata.get("grpc-timeout")?.to_str().ok()?;
    if value.len() < 2 {
        return None;
    }
    let (amount, unit) = value.split_at(value.len() - 1);
    let amount: u64 = amount.parse().ok()?;
    let duration = match unit {
        "H" => Duration::from_secs(amount.saturating_mul(3600)),
        "M" => Duration::from_secs(amount.saturating_mul(60)),
        "S" => Duration::from_secs(amount),
        "m" => Duration::from_millis(amount),
        "u" => Duration::from_micros(amount),
        "n" => Duration::from_nanos(amount),
        _ => return None,
    };
    Some(duration)
}

/// The shorter of the client's deadline and the configured default.
pub(crate) fn effective_deadline(metadata: &MetadataMap, default: Duration) -> Duration {
    grpc_timeout(metadata)
        .map(|client| client.min(default))
        .unwrap_or(default)
}
