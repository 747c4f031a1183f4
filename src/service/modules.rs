// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::Host;
use crate::errors::UploadError;
use crate::gateway::FunctionReport;
use crate::proto::modules_server::Modules;
use crate::proto::{
    ListReply, ListReplyItem, ListRequest, LoadPartRequest, LoadReply, UnloadReply, UnloadRequest,
};
use crate::upload::UploadChunk;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use std::time::Instant;
use tonic::{Request, Response, Status, Streaming};

pub struct ModulesService {
    host: Host,
}

impl ModulesService {
    pub fn new(host: Host) -> Self {
        Self { host }
    }

    /// Conflict is a call error; every other upload failure is a reply with
    /// `success: false` so the client always learns the elapsed time.
    async fn upload_reply<S, E>(&self, chunks: S) -> Result<LoadReply, Status>
    where
        S: Stream<Item = Result<UploadChunk, E>> + Unpin + Send,
        E: Display,
    {
        let start = Instant::now();
        match self.host.coordinator.upload(chunks).await {
            Ok(receipt) => Ok(LoadReply {
                success: true,
                error_message: None,
                elapsed_ms: receipt.elapsed.as_millis() as u64,
                digest: Some(receipt.digest),
            }),
            Err(error @ UploadError::Conflict(_)) => Err(error.into()),
            Err(error) => Ok(LoadReply {
                success: false,
                error_message: Some(error.to_string()),
                elapsed_ms: start.elapsed().as_millis() as u64,
                digest: None,
            }),
        }
    }
}

impl From<LoadPartRequest> for UploadChunk {
    fn from(part: LoadPartRequest) -> Self {
        UploadChunk {
            name: part.name,
            body: part.body,
            total_size: (part.total_size > 0).then_some(part.total_size),
        }
    }
}

impl From<FunctionReport> for ListReplyItem {
    fn from(report: FunctionReport) -> Self {
        let FunctionReport { summary, counts } = report;
        ListReplyItem {
            name: summary.name,
            status: summary.status.as_str().to_string(),
            digest: summary.digest,
            size: summary.size as u64,
            error_message: summary.error_message,
            successes: counts.successes,
            failures: counts.failures,
            timeouts: counts.timeouts,
            total_invocations: counts.total,
            updated_at_ms: summary.updated_at.timestamp_millis(),
        }
    }
}

#[tonic::async_trait]
impl Modules for ModulesService {
    async fn load(
        &self,
        request: Request<Streaming<LoadPartRequest>>,
    ) -> Result<Response<LoadReply>, Status> {
        let chunks = request.into_inner().map(|part| part.map(UploadChunk::from));
        self.upload_reply(chunks).await.map(Response::new)
    }

    async fn list(&self, _request: Request<ListRequest>) -> Result<Response<ListReply>, Status> {
        let items: Vec<ListReplyItem> = self
            .host
            .gateway
            .list_functions()
            .await
            .into_iter()
            .map(ListReplyItem::from)
            .collect();
        Ok(Response::new(ListReply {
            item_no: items.len() as u32,
            items,
        }))
    }

    async fn unload(
        &self,
        request: Request<UnloadRequest>,
    ) -> Result<Response<UnloadReply>, Status> {
        let UnloadRequest { name } = request.into_inner();
        self.host.unload(&name).await?;
        Ok(Response::new(UnloadReply {
            success: true,
            error_message: None,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, HostBuilder};
    use crate::runtime::stub::EchoEngine;
    use crate::store::FunctionStatus;
    use std::sync::Arc;

    fn service() -> ModulesService {
        let cfg: Config = serde_yaml::from_str("upload: { require_wasm: false }").unwrap();
        ModulesService::new(HostBuilder::from_config(&cfg, Arc::new(EchoEngine)).unwrap())
    }

    fn chunks(
        items: Vec<Result<UploadChunk, Status>>,
    ) -> impl Stream<Item = Result<UploadChunk, Status>> + Unpin + Send {
        futures::stream::iter(items)
    }

    #[tokio::test]
    async fn test_load_success_carries_digest() {
        let reply = service()
            .upload_reply(chunks(vec![
                Ok(UploadChunk::new("echo", "AB")),
                Ok(UploadChunk::new("echo", "CD")),
            ]))
            .await
            .unwrap();
        assert!(reply.success);
        assert!(reply.error_message.is_none());
        assert_eq!(reply.digest.map(|d| d.len()), Some(64));
    }

    #[tokio::test]
    async fn test_load_stream_failure_is_unsuccessful_reply() {
        let service = service();
        let reply = service
            .upload_reply(chunks(vec![
                Ok(UploadChunk::new("echo", "AB")),
                Err(Status::aborted("client went away")),
            ]))
            .await
            .unwrap();

        assert!(!reply.success);
        assert!(reply.digest.is_none());
        assert!(reply.error_message.unwrap().contains("client went away"));
        assert_eq!(
            service.host.store.get("echo").await.unwrap().status(),
            FunctionStatus::Failed
        );
    }

    #[tokio::test]
    async fn test_load_conflict_is_status_error() {
        let service = service();
        let _open = service.host.coordinator.open("echo").await.unwrap();

        let status = service
            .upload_reply(chunks(vec![Ok(UploadChunk::new("echo", "AB"))]))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::AlreadyExists);
    }

    #[test]
    fn test_zero_total_size_means_undeclared() {
        let chunk = UploadChunk::from(LoadPartRequest {
            name: "echo".to_string(),
            body: b"AB".to_vec(),
            total_size: 0,
        });
        assert_eq!(chunk.total_size, None);

        let chunk = UploadChunk::from(LoadPartRequest {
            name: "echo".to_string(),
            body: b"AB".to_vec(),
            total_size: 4,
        });
        assert_eq!(chunk.total_size, Some(4));
    }
}
