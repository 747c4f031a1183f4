// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::effective_deadline;
use crate::config::Host;
use crate::gateway::InvocationRequest;
use crate::proto::functions_server::Functions;
use crate::proto::{ExecuteReply, ExecuteRequest};
use tonic::{Request, Response, Status};

pub struct FunctionsService {
    host: Host,
}

impl FunctionsService {
    pub fn new(host: Host) -> Self {
        Self { host }
    }
}

#[tonic::async_trait]
impl Functions for FunctionsService {
    async fn execute(
        &self,
        request: Request<ExecuteRequest>,
    ) -> Result<Response<ExecuteReply>, Status> {
        let deadline =
            effective_deadline(request.metadata(), self.host.gateway.default_deadline());
        let ExecuteRequest { name, body } = request.into_inner();

        let reply = self
            .host
            .gateway
            .invoke(InvocationRequest::new(name, body), Some(deadline))
            .await?;

        Ok(Response::new(ExecuteReply {
            code: reply.code,
            body: reply.body,
        }))
    }
}
