// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Mediator bridge between a message bus and bound functions.
//!
//! Each inbound `(topic, message)` is routed through the [`BindingTable`] to
//! its function and invoked through the gateway. Topics run concurrently and
//! so do messages within a topic; a per-topic [`ReorderBuffer`] re-sequences
//! results so each topic's output follows its arrival order.
//!
//! # Lifecycle
//! `Idle → Subscribed → Draining → Closed`. Draining starts when the inbound
//! stream ends; in-flight invocations finish or hit their deadline, their
//! results are emitted, and then the outbound stream closes.

mod binding;
mod bridge;
mod reorder;

#[cfg(test)]
mod integration_tests;

pub use binding::{BindingTable, TopicBinding};
pub use bridge::{
    BridgeCounters, BridgeCountersSnapshot, BridgeState, InboundMessage, MediatorBridge,
    MediatorSettings, Subscription, TopicResult,
};
pub use reorder::ReorderBuffer;
