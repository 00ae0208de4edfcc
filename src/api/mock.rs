//! Scripted transport for tests and offline walkthroughs

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::error::TransportError;
use super::response::RemoteResponse;
use super::transport::{Request, Transport};

/// Mock implementation for testing.
///
/// Responses are queued in order and handed out one per `send`. Every
/// request is recorded so tests can assert on what the engine issued.
/// Clones share the same script and log.
#[derive(Clone, Default)]
pub struct MockTransport {
    script: Arc<Mutex<VecDeque<Result<RemoteResponse, TransportError>>>>,
    /// Requests received, in order
    pub request_log: Arc<Mutex<Vec<Request>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response
    pub fn respond(&self, response: RemoteResponse) -> &Self {
        self.script.lock().unwrap().push_back(Ok(response));
        self
    }

    /// Queue a response that only carries a message
    pub fn respond_message(&self, message: &str) -> &Self {
        self.respond(RemoteResponse::from_message(message))
    }

    /// Queue a network failure
    pub fn fail(&self, cause: &str) -> &Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(TransportError::network(cause)));
        self
    }

    /// All requests received so far
    pub fn requests(&self) -> Vec<Request> {
        self.request_log.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.request_log.lock().unwrap().len()
    }

    /// Number of scripted responses not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<RemoteResponse, TransportError> {
        self.request_log.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::network(format!("no scripted response for {request}"))))
    }
}
