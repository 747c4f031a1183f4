// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::binding::BindingTable;
use super::reorder::ReorderBuffer;
use crate::gateway::{InvocationGateway, InvocationRequest};
use crate::observability::messages::mediator::{
    InboundFailed, InvocationTaskLost, OutboundClosed, RoutingMissed, SubscriptionClosed,
    SubscriptionDraining, SubscriptionOpened, TopicWindowFull,
};
use crate::observability::messages::StructuredLog;
use futures::{Stream, StreamExt};
use std::collections::{HashMap, VecDeque};
use std::fmt::{self, Display};
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{self, JoinError, JoinSet};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub message_id: String,
    pub body: Vec<u8>,
}

impl InboundMessage {
    pub fn new(
        topic: impl Into<String>,
        message_id: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            topic: topic.into(),
            message_id: message_id.into(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicResult {
    pub topic: String,
    pub message_id: String,
    pub result_code: i32,
    pub result_body: Vec<u8>,
}

/// Lifecycle of one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Idle,
    Subscribed,
    /// Inbound closed; in-flight invocations are finishing.
    Draining,
    Closed,
}

impl Display for BridgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BridgeState::Idle => "idle",
            BridgeState::Subscribed => "subscribed",
            BridgeState::Draining => "draining",
            BridgeState::Closed => "closed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediatorSettings {
    /// Per-topic limit on messages in flight or waiting to be emitted.
    pub reorder_window: usize,
    /// Limit on concurrent invocations across all topics, and on messages
    /// parked behind full topic windows.
    pub max_in_flight: usize,
    /// Per-invocation deadline; `None` uses the gateway default.
    pub invocation_timeout: Option<Duration>,
}

impl Default for MediatorSettings {
    fn default() -> Self {
        Self {
            reorder_window: crate::config::consts::DEFAULT_REORDER_WINDOW,
            max_in_flight: crate::config::consts::DEFAULT_MAX_IN_FLIGHT,
            invocation_timeout: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct BridgeCounters {
    received: AtomicU64,
    routed: AtomicU64,
    routing_misses: AtomicU64,
    emitted: AtomicU64,
    failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeCountersSnapshot {
    pub received: u64,
    pub routed: u64,
    pub routing_misses: u64,
    pub emitted: u64,
    /// Results emitted for invocations that failed in the gateway.
    pub failed: u64,
}

impl BridgeCounters {
    pub fn snapshot(&self) -> BridgeCountersSnapshot {
        BridgeCountersSnapshot {
            received: self.received.load(Ordering::Relaxed),
            routed: self.routed.load(Ordering::Relaxed),
            routing_misses: self.routing_misses.load(Ordering::Relaxed),
            emitted: self.emitted.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Handle on a running subscription. Yields results in per-topic arrival order
/// and ends once the bridge has drained.
pub struct Subscription {
    results: ReceiverStream<TopicResult>,
    state: watch::Receiver<BridgeState>,
    counters: Arc<BridgeCounters>,
}

impl Subscription {
    pub fn state(&self) -> BridgeState {
        *self.state.borrow()
    }

    pub fn counters(&self) -> BridgeCountersSnapshot {
        self.counters.snapshot()
    }

    /// Wait until the bridge task has finished.
    pub async fn closed(&mut self) {
        let _ = self
            .state
            .wait_for(|state| *state == BridgeState::Closed)
            .await;
    }
}

impl Stream for Subscription {
    type Item = TopicResult;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.results).poll_next(cx)
    }
}

/// Bridges bus messages to bound functions through the gateway.
#[derive(Clone)]
pub struct MediatorBridge {
    gateway: InvocationGateway,
    bindings: Arc<BindingTable>,
    settings: MediatorSettings,
    shutdown: CancellationToken,
}

impl MediatorBridge {
    pub fn new(
        gateway: InvocationGateway,
        bindings: BindingTable,
        settings: MediatorSettings,
    ) -> Self {
        Self {
            gateway,
            bindings: Arc::new(bindings),
            settings,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn settings(&self) -> MediatorSettings {
        self.settings
    }

    /// Stop reading on every subscription of this bridge and its clones.
    ///
    /// Open subscriptions drain their in-flight invocations and close.
    /// Subscriptions opened afterwards drain immediately.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Start consuming `inbound` on a new task.
    ///
    /// An inbound error is treated like closure: the bridge drains and closes.
    pub fn subscribe<S, E>(&self, inbound: S) -> Subscription
    where
        S: Stream<Item = Result<InboundMessage, E>> + Unpin + Send + 'static,
        E: Display + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(self.settings.max_in_flight.max(1));
        let (state_tx, state_rx) = watch::channel(BridgeState::Idle);
        let counters = Arc::new(BridgeCounters::default());

        let pump = Pump {
            bridge: self.clone(),
            outbound: tx,
            outbound_open: true,
            state: state_tx,
            counters: counters.clone(),
            topics: HashMap::new(),
            parked: HashMap::new(),
            parked_count: 0,
            in_flight: JoinSet::new(),
            dispatched: HashMap::new(),
        };
        tokio::spawn(pump.run(inbound));

        Subscription {
            results: ReceiverStream::new(rx),
            state: state_rx,
            counters,
        }
    }
}

impl fmt::Debug for MediatorBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediatorBridge")
            .field("bindings", &self.bindings.len())
            .field("settings", &self.settings)
            .finish()
    }
}

/// A routed message waiting for room in its topic window or under the
/// in-flight cap, with the function it is bound to.
type Parked = (String, InboundMessage);

/// The consume, dispatch, reorder, emit loop for one subscription.
struct Pump {
    bridge: MediatorBridge,
    outbound: mpsc::Sender<TopicResult>,
    outbound_open: bool,
    state: watch::Sender<BridgeState>,
    counters: Arc<BridgeCounters>,
    topics: HashMap<String, ReorderBuffer<TopicResult>>,
    /// Per-topic FIFO of messages that could not be dispatched yet.
    parked: HashMap<String, VecDeque<Parked>>,
    parked_count: usize,
    in_flight: JoinSet<TopicResult>,
    /// Topic, sequence number and message id of every spawned invocation.
    dispatched: HashMap<task::Id, (String, u64, String)>,
}

impl Pump {
    async fn run<S, E>(mut self, mut inbound: S)
    where
        S: Stream<Item = Result<InboundMessage, E>> + Unpin + Send,
        E: Display,
    {
        let settings = self.bridge.settings;
        self.state.send_replace(BridgeState::Subscribed);
        SubscriptionOpened {
            binding_count: self.bridge.bindings.len(),
            reorder_window: settings.reorder_window,
            max_in_flight: settings.max_in_flight,
        }
        .log();

        let shutdown = self.bridge.shutdown.clone();
        let limit = self.limit();
        let mut inbound_open = true;

        loop {
            // A full topic window parks only that topic; reading stops only
            // at the global caps.
            let can_read =
                inbound_open && self.in_flight.len() < limit && self.parked_count < limit;

            tokio::select! {
                item = inbound.next(), if can_read => match item {
                    Some(Ok(message)) => {
                        BridgeCounters::bump(&self.counters.received);
                        self.route(message);
                    }
                    Some(Err(error)) => {
                        tracing::warn!("{}", InboundFailed { error: &error.to_string() });
                        inbound_open = false;
                        self.begin_draining();
                    }
                    None => {
                        inbound_open = false;
                        self.begin_draining();
                    }
                },
                _ = shutdown.cancelled(), if inbound_open => {
                    inbound_open = false;
                    self.begin_draining();
                }
                Some(joined) = self.in_flight.join_next_with_id(), if !self.in_flight.is_empty() => {
                    self.settle(joined).await;
                    self.release_parked();
                    if !self.outbound_open && inbound_open {
                        inbound_open = false;
                        self.begin_draining();
                    }
                }
                else => break,
            }
        }

        // Dropping the sender ends the outbound stream.
        drop(self.outbound);
        let counters = self.counters.snapshot();
        SubscriptionClosed {
            received: counters.received,
            emitted: counters.emitted,
            routing_misses: counters.routing_misses,
        }
        .log();
        self.state.send_replace(BridgeState::Closed);
    }

    fn limit(&self) -> usize {
        self.bridge.settings.max_in_flight.max(1)
    }

    fn route(&mut self, message: InboundMessage) {
        match self.bridge.bindings.route(&message.topic) {
            Ok(function) => {
                let function = function.to_string();
                self.dispatch_or_park(function, message);
            }
            Err(_miss) => {
                BridgeCounters::bump(&self.counters.routing_misses);
                tracing::warn!(
                    "{}",
                    RoutingMissed {
                        topic: &message.topic,
                        message_id: &message.message_id,
                    }
                );
            }
        }
    }

    fn dispatch_or_park(&mut self, function: String, message: InboundMessage) {
        // Earlier parked messages of the same topic go first.
        if let Some(queue) = self.parked.get_mut(&message.topic) {
            queue.push_back((function, message));
            self.parked_count += 1;
            return;
        }
        if let Err((function, message)) = self.try_dispatch(function, message) {
            self.parked
                .entry(message.topic.clone())
                .or_default()
                .push_back((function, message));
            self.parked_count += 1;
        }
    }

    /// Dispatch parked messages, oldest first per topic, while there is room.
    fn release_parked(&mut self) {
        if self.parked.is_empty() {
            return;
        }
        let topics: Vec<String> = self.parked.keys().cloned().collect();
        for topic in topics {
            let Some(mut queue) = self.parked.remove(&topic) else {
                continue;
            };
            while let Some((function, message)) = queue.pop_front() {
                match self.try_dispatch(function, message) {
                    Ok(()) => self.parked_count -= 1,
                    Err(parked) => {
                        queue.push_front(parked);
                        break;
                    }
                }
            }
            if !queue.is_empty() {
                self.parked.insert(topic, queue);
            }
        }
    }

    /// Spawn the invocation, or hand the message back if there is no room.
    fn try_dispatch(&mut self, function: String, message: InboundMessage) -> Result<(), Parked> {
        if self.in_flight.len() >= self.limit() {
            return Err((function, message));
        }
        let window = self.bridge.settings.reorder_window;
        let buffer = self
            .topics
            .entry(message.topic.clone())
            .or_insert_with(|| ReorderBuffer::new(window));
        let Some(seq) = buffer.admit() else {
            tracing::debug!(
                "{}",
                TopicWindowFull {
                    topic: &message.topic,
                    window,
                }
            );
            return Err((function, message));
        };

        BridgeCounters::bump(&self.counters.routed);
        let gateway = self.bridge.gateway.clone();
        let deadline = self.bridge.settings.invocation_timeout;
        let counters = self.counters.clone();
        let InboundMessage {
            topic,
            message_id,
            body,
        } = message;
        let result_topic = topic.clone();
        let result_id = message_id.clone();
        let handle = self.in_flight.spawn(async move {
            let (result_code, result_body) = match gateway
                .invoke(InvocationRequest::new(function, body), deadline)
                .await
            {
                Ok(reply) => (reply.code, reply.body),
                Err(error) => {
                    BridgeCounters::bump(&counters.failed);
                    (error.result_code(), error.to_string().into_bytes())
                }
            };
            TopicResult {
                topic: result_topic,
                message_id: result_id,
                result_code,
                result_body,
            }
        });
        self.dispatched.insert(handle.id(), (topic, seq, message_id));
        Ok(())
    }

    /// Turn a finished task into the result for its sequence number. A task
    /// that panicked still fills its slot with a 500.
    async fn settle(&mut self, joined: Result<(task::Id, TopicResult), JoinError>) {
        let (id, outcome) = match joined {
            Ok((id, result)) => (id, Ok(result)),
            Err(error) => (error.id(), Err(error)),
        };
        let Some((topic, seq, message_id)) = self.dispatched.remove(&id) else {
            return;
        };
        let result = match outcome {
            Ok(result) => result,
            Err(error) => {
                BridgeCounters::bump(&self.counters.failed);
                tracing::error!(
                    "{}",
                    InvocationTaskLost {
                        topic: &topic,
                        message_id: &message_id,
                        error: &error,
                    }
                );
                TopicResult {
                    topic: topic.clone(),
                    message_id,
                    result_code: 500,
                    result_body: error.to_string().into_bytes(),
                }
            }
        };
        self.complete(topic, seq, result).await;
    }

    async fn complete(&mut self, topic: String, seq: u64, result: TopicResult) {
        let Some(buffer) = self.topics.get_mut(&topic) else {
            return;
        };
        buffer.complete(seq, result);
        let ready = buffer.drain_ready();
        if buffer.is_idle() {
            self.topics.remove(&topic);
        }

        for result in ready {
            if !self.outbound_open {
                continue;
            }
            if self.outbound.send(result).await.is_err() {
                tracing::warn!("{}", OutboundClosed);
                self.outbound_open = false;
                continue;
            }
            BridgeCounters::bump(&self.counters.emitted);
        }
    }

    fn begin_draining(&self) {
        self.state.send_replace(BridgeState::Draining);
        tracing::info!(
            "{}",
            SubscriptionDraining {
                in_flight: self.in_flight.len(),
            }
        );
    }
}
