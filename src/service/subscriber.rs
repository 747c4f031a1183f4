// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::Host;
use crate::mediator::{InboundMessage, TopicResult};
use crate::proto;
use crate::proto::subscriber_server::Subscriber;
use futures::{Stream, StreamExt};
use std::pin::Pin;
use tonic::{Request, Response, Status, Streaming};

pub struct SubscriberService {
    host: Host,
}

impl SubscriberService {
    pub fn new(host: Host) -> Self {
        Self { host }
    }
}

impl From<proto::TopicMessage> for InboundMessage {
    fn from(message: proto::TopicMessage) -> Self {
        InboundMessage {
            topic: message.topic,
            message_id: message.message_id,
            body: message.body,
        }
    }
}

impl From<TopicResult> for proto::TopicResult {
    fn from(result: TopicResult) -> Self {
        proto::TopicResult {
            topic: result.topic,
            message_id: result.message_id,
            result_code: result.result_code,
            result_body: result.result_body,
        }
    }
}

#[tonic::async_trait]
impl Subscriber for SubscriberService {
    type SubscribeStream = Pin<Box<dyn Stream<Item = Result<proto::TopicResult, Status>> + Send>>;

    async fn subscribe(
        &self,
        request: Request<Streaming<proto::TopicMessage>>,
    ) -> Result<Response<Self::SubscribeStream>, Status> {
        let inbound = request
            .into_inner()
            .map(|message| message.map(InboundMessage::from));
        let results = self
            .host
            .bridge
            .subscribe(inbound)
            .map(|result| Ok(proto::TopicResult::from(result)));
        Ok(Response::new(Box::pin(results)))
    }
}
