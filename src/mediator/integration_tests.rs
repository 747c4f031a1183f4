// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::*;
use crate::gateway::InvocationGateway;
use crate::registry::FunctionRegistry;
use crate::runtime::stub::{EchoEngine, PanickingEngine, SlowEngine};
use crate::store::{Artifact, ArtifactStore};
use crate::traits::RuntimeEngine;
use futures::StreamExt;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

type Inbound = mpsc::Sender<Result<InboundMessage, Infallible>>;

async fn bridge_with(
    engine: Arc<dyn RuntimeEngine>,
    bindings: &[TopicBinding],
    settings: MediatorSettings,
) -> MediatorBridge {
    let store = Arc::new(ArtifactStore::new());
    store.put("enrich", Artifact::new(b"".to_vec())).await;
    let gateway = InvocationGateway::new(
        FunctionRegistry::new(store),
        engine,
        Duration::from_secs(5),
    );
    MediatorBridge::new(gateway, BindingTable::new(bindings).unwrap(), settings)
}

fn open(bridge: &MediatorBridge) -> (Inbound, Subscription) {
    let (tx, rx) = mpsc::channel(16);
    (tx, bridge.subscribe(ReceiverStream::new(rx)))
}

async fn send(tx: &Inbound, topic: &str, id: &str, body: &str) {
    tx.send(Ok(InboundMessage::new(topic, id, body)))
        .await
        .unwrap();
}

fn ids(results: &[TopicResult]) -> Vec<&str> {
    results.iter().map(|r| r.message_id.as_str()).collect()
}

#[tokio::test]
async fn test_topic_results_follow_arrival_order() {
    let bridge = bridge_with(
        Arc::new(SlowEngine::from_payload()),
        &[TopicBinding::new("orders", "enrich")],
        MediatorSettings::default(),
    )
    .await;
    let (tx, subscription) = open(&bridge);

    // M2 finishes well before M1.
    send(&tx, "orders", "1", "150").await;
    send(&tx, "orders", "2", "5").await;
    drop(tx);

    let results: Vec<TopicResult> = subscription.collect().await;
    assert_eq!(ids(&results), vec!["1", "2"]);
    assert_eq!(results[0].result_body, b"150");
    assert!(results.iter().all(|r| r.result_code == 200));
}

#[tokio::test]
async fn test_topics_do_not_wait_on_each_other() {
    let bridge = bridge_with(
        Arc::new(SlowEngine::from_payload()),
        &[
            TopicBinding::new("slow", "enrich"),
            TopicBinding::new("fast", "enrich"),
        ],
        MediatorSettings::default(),
    )
    .await;
    let (tx, mut subscription) = open(&bridge);

    send(&tx, "slow", "s1", "300").await;
    send(&tx, "fast", "f1", "1").await;

    let first = subscription.next().await.unwrap();
    assert_eq!(first.topic, "fast");

    drop(tx);
    let rest: Vec<TopicResult> = subscription.collect().await;
    assert_eq!(ids(&rest), vec!["s1"]);
}

#[tokio::test]
async fn test_routing_miss_is_counted_not_emitted() {
    let bridge = bridge_with(
        Arc::new(EchoEngine),
        &[TopicBinding::new("orders", "enrich")],
        MediatorSettings::default(),
    )
    .await;
    let (tx, mut subscription) = open(&bridge);

    send(&tx, "unbound", "x", "a").await;
    send(&tx, "orders", "1", "b").await;
    drop(tx);

    let mut results = Vec::new();
    while let Some(result) = subscription.next().await {
        results.push(result);
    }
    subscription.closed().await;

    assert_eq!(ids(&results), vec!["1"]);
    let counters = subscription.counters();
    assert_eq!(counters.received, 2);
    assert_eq!(counters.routed, 1);
    assert_eq!(counters.routing_misses, 1);
    assert_eq!(counters.emitted, 1);
}

#[tokio::test]
async fn test_failed_invocation_still_produces_result() {
    let bridge = bridge_with(
        Arc::new(EchoEngine),
        &[TopicBinding::new("orders", "missing")],
        MediatorSettings::default(),
    )
    .await;
    let (tx, subscription) = open(&bridge);

    send(&tx, "orders", "1", "a").await;
    drop(tx);

    let results: Vec<TopicResult> = subscription.collect().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].result_code, 404);
}

#[tokio::test]
async fn test_timeout_yields_504() {
    let bridge = bridge_with(
        Arc::new(SlowEngine::from_payload()),
        &[TopicBinding::new("orders", "enrich")],
        MediatorSettings {
            invocation_timeout: Some(Duration::from_millis(20)),
            ..MediatorSettings::default()
        },
    )
    .await;
    let (tx, subscription) = open(&bridge);

    send(&tx, "orders", "1", "5000").await;
    send(&tx, "orders", "2", "1").await;
    drop(tx);

    let results: Vec<TopicResult> = subscription.collect().await;
    assert_eq!(ids(&results), vec!["1", "2"]);
    assert_eq!(results[0].result_code, 504);
    assert_eq!(results[1].result_code, 200);
}

#[tokio::test]
async fn test_full_window_applies_backpressure_without_losing_order() {
    let bridge = bridge_with(
        Arc::new(SlowEngine::from_payload()),
        &[TopicBinding::new("orders", "enrich")],
        MediatorSettings {
            reorder_window: 1,
            max_in_flight: 4,
            invocation_timeout: None,
        },
    )
    .await;
    let (tx, subscription) = open(&bridge);

    for (id, delay) in [("1", "30"), ("2", "1"), ("3", "10")] {
        send(&tx, "orders", id, delay).await;
    }
    drop(tx);

    let results: Vec<TopicResult> = subscription.collect().await;
    assert_eq!(ids(&results), vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_draining_finishes_in_flight_then_closes() {
    let bridge = bridge_with(
        Arc::new(SlowEngine::from_payload()),
        &[TopicBinding::new("orders", "enrich")],
        MediatorSettings::default(),
    )
    .await;
    let (tx, mut subscription) = open(&bridge);
    assert!(matches!(
        subscription.state(),
        BridgeState::Idle | BridgeState::Subscribed
    ));

    send(&tx, "orders", "1", "50").await;
    drop(tx);

    let result = subscription.next().await.unwrap();
    assert_eq!(result.message_id, "1");
    assert!(subscription.next().await.is_none());

    subscription.closed().await;
    assert_eq!(subscription.state(), BridgeState::Closed);
}

#[tokio::test]
async fn test_inbound_error_drains() {
    let bridge = bridge_with(
        Arc::new(EchoEngine),
        &[TopicBinding::new("orders", "enrich")],
        MediatorSettings::default(),
    )
    .await;
    let inbound = futures::stream::iter(vec![
        Ok(InboundMessage::new("orders", "1", "a")),
        Err("bus disconnected".to_string()),
        Ok(InboundMessage::new("orders", "2", "b")),
    ]);

    let results: Vec<TopicResult> = bridge.subscribe(inbound).collect().await;
    assert_eq!(ids(&results), vec!["1"]);
}

#[tokio::test]
async fn test_shutdown_drains_open_subscriptions() {
    let bridge = bridge_with(
        Arc::new(SlowEngine::from_payload()),
        &[TopicBinding::new("orders", "enrich")],
        MediatorSettings::default(),
    )
    .await;
    let (tx, subscription) = open(&bridge);

    send(&tx, "orders", "1", "50").await;
    tokio::time::sleep(Duration::from_millis(10)).await;
    bridge.clone().shutdown();

    // The inbound side stays open; shutdown alone ends the subscription.
    let results: Vec<TopicResult> = subscription.collect().await;
    assert_eq!(ids(&results), vec!["1"]);
    drop(tx);
}

#[tokio::test]
async fn test_full_topic_window_does_not_hold_back_other_topics() {
    let bridge = bridge_with(
        Arc::new(SlowEngine::from_payload()),
        &[
            TopicBinding::new("slow", "enrich"),
            TopicBinding::new("fast", "enrich"),
        ],
        MediatorSettings {
            reorder_window: 1,
            max_in_flight: 8,
            invocation_timeout: None,
        },
    )
    .await;
    let (tx, mut subscription) = open(&bridge);

    // s2 waits behind s1 in the one-slot window; f1 must not.
    send(&tx, "slow", "s1", "400").await;
    send(&tx, "slow", "s2", "1").await;
    send(&tx, "fast", "f1", "1").await;

    let first = subscription.next().await.unwrap();
    assert_eq!(first.topic, "fast");
    assert_eq!(first.message_id, "f1");

    drop(tx);
    let rest: Vec<TopicResult> = subscription.collect().await;
    assert_eq!(ids(&rest), vec!["s1", "s2"]);
}

#[tokio::test]
async fn test_panicking_invocation_still_fills_its_slot() {
    let bridge = bridge_with(
        Arc::new(PanickingEngine),
        &[TopicBinding::new("orders", "enrich")],
        MediatorSettings::default(),
    )
    .await;
    let (tx, mut subscription) = open(&bridge);

    send(&tx, "orders", "1", "panic").await;
    send(&tx, "orders", "2", "ok").await;
    drop(tx);

    let first = subscription.next().await.unwrap();
    let second = subscription.next().await.unwrap();
    assert_eq!((first.message_id.as_str(), first.result_code), ("1", 500));
    assert_eq!((second.message_id.as_str(), second.result_code), ("2", 200));
    assert!(subscription.next().await.is_none());
    assert_eq!(subscription.counters().failed, 1);
}
