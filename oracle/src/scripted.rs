//! Scripted oracle for tests: replies are produced by a closure over the request.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::{Oracle, OracleError, OracleReply, OracleRequest};

type Responder = Box<dyn Fn(&OracleRequest) -> Result<OracleReply, OracleError> + Send + Sync>;

#[derive(Clone)]
pub struct ScriptedOracle {
    responder: Arc<Responder>,
    queued: Arc<Mutex<VecDeque<Result<OracleReply, OracleError>>>>,
    requests: Arc<Mutex<Vec<OracleRequest>>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedOracle {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&OracleRequest) -> Result<OracleReply, OracleError> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(Box::new(responder)),
            queued: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            gate: None,
        }
    }

    /// Always answer with the same text.
    pub fn replying(text: &str) -> Self {
        let text = text.to_string();
        Self::new(move |_| Ok(OracleReply::PlainText(text.clone())))
    }

    /// Answer with each queued reply in turn before falling back to the responder.
    pub fn with_queued(self, replies: impl IntoIterator<Item = Result<OracleReply, OracleError>>) -> Self {
        self.queued.lock().unwrap().extend(replies);
        self
    }

    /// Hold each reply until `gate` is notified. The request is logged before
    /// waiting, so [`requests`](Self::requests) shows calls in flight.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<OracleRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn complete(&self, request: OracleRequest) -> Result<OracleReply, OracleError> {
        let queued = self.queued.lock().unwrap().pop_front();
        let reply = match queued {
            Some(reply) => reply,
            None => (self.responder)(&request),
        };
        self.requests.lock().unwrap().push(request);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        reply
    }
}
