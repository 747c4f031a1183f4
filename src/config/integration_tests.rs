// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::*;
use crate::errors::{InvocationError, StoreError, UploadError};
use crate::gateway::InvocationRequest;
use crate::mediator::{InboundMessage, TopicResult};
use crate::runtime::stub::EchoEngine;
use crate::store::FunctionStatus;
use crate::upload::UploadChunk;
use futures::{stream, StreamExt};
use std::convert::Infallible;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const ECHO_WAT: &str = r#"
    (module
      (memory (export "memory") 1)
      (global $heap (mut i32) (i32.const 1024))
      (func $allocate (export "allocate") (param $size i32) (result i32)
        (local $ptr i32)
        (local.set $ptr (global.get $heap))
        (global.set $heap (i32.add (global.get $heap) (local.get $size)))
        (local.get $ptr))
      (func (export "deallocate") (param i32 i32))
      (func (export "process") (param $in i32) (param $len i32) (param $out_len i32) (result i32)
        (local $out i32)
        (local.set $out (call $allocate (local.get $len)))
        (memory.copy (local.get $out) (local.get $in) (local.get $len))
        (i32.store (local.get $out_len) (local.get $len))
        (local.get $out)))
"#;

fn config_file(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

fn as_chunks(
    name: &str,
    bytes: &[u8],
    chunk_size: usize,
) -> impl futures::Stream<Item = Result<UploadChunk, Infallible>> + Unpin + Send {
    let parts: Vec<Result<UploadChunk, Infallible>> = bytes
        .chunks(chunk_size)
        .map(|part| Ok(UploadChunk::new(name, part.to_vec())))
        .collect();
    stream::iter(parts)
}

#[tokio::test]
async fn test_host_from_yaml_serves_upload_invoke_and_mediator() {
    let file = config_file(
        r#"
upload:
  require_wasm: false
mediator:
  bindings:
    - topic: orders
      function: echo
"#,
    );
    let cfg = load_and_validate_config(file.path()).unwrap();
    let host = HostBuilder::from_config(&cfg, Arc::new(EchoEngine)).unwrap();

    host.coordinator
        .upload(stream::iter(vec![
            Ok::<_, Infallible>(UploadChunk::new("echo", "AB")),
            Ok(UploadChunk::new("echo", "CD")),
        ]))
        .await
        .unwrap();

    let reply = host
        .gateway
        .invoke(InvocationRequest::new("echo", "X"), None)
        .await
        .unwrap();
    assert_eq!(reply.body, b"ABCDX");

    let inbound = stream::iter(vec![Ok::<_, Infallible>(InboundMessage::new(
        "orders", "m-1", "Y",
    ))]);
    let results: Vec<TopicResult> = host.bridge.subscribe(inbound).collect().await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].result_body, b"ABCDY");

    let reports = host.gateway.list_functions().await;
    assert_eq!(reports[0].summary.status, FunctionStatus::Ready);
    assert_eq!(reports[0].counts.total, 2);

    host.unload("echo").await.unwrap();
    assert_eq!(host.gateway.stats().get("echo").await.total, 0);
    assert!(matches!(
        host.gateway
            .invoke(InvocationRequest::new("echo", "X"), None)
            .await,
        Err(InvocationError::NotFound(_))
    ));
    assert_eq!(
        host.unload("echo").await,
        Err(StoreError::NotFound("echo".to_string()))
    );
}

#[tokio::test]
async fn test_wasm_host_rejects_non_modules_and_runs_modules() {
    let cfg: Config = serde_yaml::from_str("upload:\n  max_chunk_bytes: 64\n").unwrap();
    let engine = HostBuilder::wasm_engine(&cfg).unwrap();
    let host = HostBuilder::from_config(&cfg, Arc::new(engine)).unwrap();

    let rejected = host.coordinator.upload(as_chunks("bad", b"ABCD", 64)).await;
    assert!(matches!(rejected, Err(UploadError::Rejected { .. })));
    assert_eq!(
        host.store.get("bad").await.unwrap().status(),
        FunctionStatus::Failed
    );

    let module = wat::parse_str(ECHO_WAT).unwrap();
    let receipt = host
        .coordinator
        .upload(as_chunks("echo", &module, 64))
        .await
        .unwrap();
    assert_eq!(receipt.size, module.len());

    let reply = host
        .gateway
        .invoke(InvocationRequest::new("echo", "hello wasm"), None)
        .await
        .unwrap();
    assert_eq!(reply.code, 200);
    assert_eq!(reply.body, b"hello wasm");
}

#[test]
fn test_invalid_bindings_fail_the_build() {
    let cfg: Config = serde_yaml::from_str(
        r#"
mediator:
  bindings:
    - topic: orders
      function: a
    - topic: orders
      function: b
"#,
    )
    .unwrap();
    let result = HostBuilder::from_config(&cfg, Arc::new(EchoEngine));
    assert!(matches!(result, Err(crate::errors::ConfigError::Invalid(_))));
}
