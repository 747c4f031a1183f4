// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for mediator subscriptions, routing and reordering.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Subscription started consuming inbound messages.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use fnhost::observability::messages::mediator::SubscriptionOpened;
///
/// let msg = SubscriptionOpened {
///     binding_count: 3,
///     reorder_window: 64,
///     max_in_flight: 256,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct SubscriptionOpened {
    pub binding_count: usize,
    pub reorder_window: usize,
    pub max_in_flight: usize,
}

impl Display for SubscriptionOpened {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Mediator subscription opened: {} bindings, reorder_window={}, max_in_flight={}",
            self.binding_count, self.reorder_window, self.max_in_flight
        )
    }
}

impl StructuredLog for SubscriptionOpened {
    fn log(&self) {
        tracing::info!(
            binding_count = self.binding_count,
            reorder_window = self.reorder_window,
            max_in_flight = self.max_in_flight,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "subscription",
            span_name = name,
            binding_count = self.binding_count,
        )
    }
}

/// Inbound message had no binding and was dropped.
///
/// # Log Level
/// `warn!` - Counted, never emitted
pub struct RoutingMissed<'a> {
    pub topic: &'a str,
    pub message_id: &'a str,
}

impl Display for RoutingMissed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dropped message '{}': no function bound to topic '{}'",
            self.message_id, self.topic
        )
    }
}

/// Topic window is full; inbound reads pause until its head is emitted.
///
/// # Log Level
/// `debug!` - Backpressure engaged
pub struct TopicWindowFull<'a> {
    pub topic: &'a str,
    pub window: usize,
}

impl Display for TopicWindowFull<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Reorder window for topic '{}' is full ({} messages); pausing inbound",
            self.topic, self.window
        )
    }
}

/// Inbound stream returned an error; treated as closure.
///
/// # Log Level
/// `warn!` - Subscription will drain
pub struct InboundFailed<'a> {
    pub error: &'a str,
}

impl Display for InboundFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Inbound stream failed, draining: {}", self.error)
    }
}

/// An invocation task panicked or was cancelled before producing a result.
///
/// # Log Level
/// `error!` - A 500 result is emitted in its place
pub struct InvocationTaskLost<'a> {
    pub topic: &'a str,
    pub message_id: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for InvocationTaskLost<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Invocation task for message '{}' on topic '{}' ended without a result: {}",
            self.message_id, self.topic, self.error
        )
    }
}

/// Inbound closed; waiting for in-flight invocations.
///
/// # Log Level
/// `info!` - Lifecycle transition
pub struct SubscriptionDraining {
    pub in_flight: usize,
}

impl Display for SubscriptionDraining {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Mediator subscription draining: {} invocations in flight",
            self.in_flight
        )
    }
}

/// Subscription finished and the outbound stream is closed.
///
/// # Log Level
/// `info!` - Lifecycle transition
///
/// # Example
/// ```
/// use fnhost::observability::messages::mediator::SubscriptionClosed;
///
/// let msg = SubscriptionClosed {
///     received: 10,
///     emitted: 9,
///     routing_misses: 1,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct SubscriptionClosed {
    pub received: u64,
    pub emitted: u64,
    pub routing_misses: u64,
}

impl Display for SubscriptionClosed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Mediator subscription closed: received={}, emitted={}, routing_misses={}",
            self.received, self.emitted, self.routing_misses
        )
    }
}

impl StructuredLog for SubscriptionClosed {
    fn log(&self) {
        tracing::info!(
            received = self.received,
            emitted = self.emitted,
            routing_misses = self.routing_misses,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "subscription_closed",
            span_name = name,
            received = self.received,
            emitted = self.emitted,
        )
    }
}

/// Outbound receiver went away; results can no longer be delivered.
///
/// # Log Level
/// `warn!` - Subscription will drain
pub struct OutboundClosed;

impl Display for OutboundClosed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Outbound result stream closed by receiver")
    }
}
