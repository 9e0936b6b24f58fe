//! In-memory transport for adapter tests: replays queued responses in order
//! and records every request it was asked to send.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::http_transport::{HttpRequest, HttpResponse, HttpTransport};

enum Reply {
    Response(HttpResponse),
    Failure(String),
}

#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, status: u16, body: impl Into<String>) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Response(HttpResponse {
                status,
                body: body.into(),
            }));
        self
    }

    pub fn reply_json(self, status: u16, body: serde_json::Value) -> Self {
        self.reply(status, body.to_string())
    }

    pub fn fail(self, message: &str) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Failure(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, req: HttpRequest) -> anyhow::Result<HttpResponse> {
        let label = format!("{} {}", req.method, req.url);
        self.calls.lock().unwrap().push(req);
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Response(resp)) => Ok(resp),
            Some(Reply::Failure(msg)) => Err(anyhow::anyhow!(msg)),
            None => Err(anyhow::anyhow!("no scripted reply for {label}")),
        }
    }
}
