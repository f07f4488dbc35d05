//! In-memory transport for unit tests

#![allow(clippy::expect_used)]

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tarkov_protocol::envelope::{self, ResponseEnvelope};
use tarkov_protocol::{
    ClientConfig, ErrorCode, ProtocolError, StatusCode, Transport, TransportRequest,
    TransportResponse,
};

use crate::client::SessionClient;
use crate::credentials::generate_hwid;
use crate::session::Session;

/// Replays canned responses in order and records every request
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<TransportResponse>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = TransportResponse>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().expect("Operation should succeed").clone()
    }

    /// Parsed JSON body of the `index`th request
    pub fn body(&self, index: usize) -> Value {
        let requests = self.requests();
        serde_json::from_str(&requests[index].body).expect("Operation should succeed")
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, request: TransportRequest) -> tarkov_protocol::Result<TransportResponse> {
        self.requests
            .lock()
            .expect("Operation should succeed")
            .push(request);
        self.responses
            .lock()
            .expect("Operation should succeed")
            .pop_front()
            .ok_or_else(|| ProtocolError::Transport("no scripted response left".to_string()))
    }
}

/// 200 response carrying an encoded `{data, err, errmsg}` envelope
pub(crate) fn envelope_response(err: i64, data: Value) -> TransportResponse {
    let envelope = ResponseEnvelope {
        data,
        err: ErrorCode(err),
        errmsg: String::new(),
    };
    TransportResponse {
        status: StatusCode::OK,
        body: Bytes::from(envelope::encode(&envelope).expect("Operation should succeed")),
    }
}

/// Session client with default endpoints over `transport`
pub(crate) fn session_client(transport: &Arc<ScriptedTransport>) -> SessionClient {
    let session = Session::new("sess", generate_hwid()).expect("Operation should succeed");
    SessionClient::new(transport.clone(), ClientConfig::default(), session)
}
