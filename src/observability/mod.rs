// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Log text lives in [`messages`] as small structs implementing `Display`, so
//! call sites never inline format strings. Messages are organized by
//! subsystem:
//! * `messages::upload` - chunked upload sessions and undeploys
//! * `messages::invocation` - gateway invocations
//! * `messages::mediator` - topic subscriptions and routing
//! * `messages::wasm` - module compilation and guest execution
//! * `messages::server` - daemon startup and configuration
//!
//! # Usage
//!
//! ```rust
//! use fnhost::observability::messages::upload::UploadStarted;
//!
//! let msg = UploadStarted { name: "echo" };
//! tracing::info!("{}", msg);
//! ```

pub mod messages;

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static TRACING_INIT: OnceLock<()> = OnceLock::new();

/// Install the global `fmt` subscriber once. Filter comes from `RUST_LOG`,
/// falling back to `info`. Later calls are no-ops.
pub fn init_tracing() {
    TRACING_INIT.get_or_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let result = tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init();

        if let Err(err) = result {
            eprintln!("tracing init skipped: {err}");
        }
    });
}
