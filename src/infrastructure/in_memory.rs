use crate::domain::ports::{HttpClient, HttpReply, NonceSource};
use crate::error::{GatewayError, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A request captured by [`ScriptedHttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub body: String,
}

/// An `HttpClient` that answers from a queue of canned replies.
///
/// Clones share the queue and the request log, so a test can keep one handle
/// while the client owns another. Useful for exercising the gateway without
/// a network.
#[derive(Default, Clone)]
pub struct ScriptedHttpClient {
    replies: Arc<Mutex<VecDeque<HttpReply>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply for the next unanswered request.
    pub async fn push_reply(&self, status: u16, body: impl Into<String>) {
        let mut replies = self.replies.lock().await;
        replies.push_back(HttpReply {
            status,
            body: body.into(),
        });
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl HttpClient for ScriptedHttpClient {
    async fn post(&self, url: &str, body: String) -> Result<HttpReply> {
        self.requests.lock().await.push(RecordedRequest {
            url: url.to_string(),
            body,
        });

        let mut replies = self.replies.lock().await;
        replies.pop_front().ok_or_else(|| {
            GatewayError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "no scripted reply left",
            ))
        })
    }
}

/// A `NonceSource` that always yields the same value, truncated or padded to
/// the requested length.
#[derive(Debug, Clone)]
pub struct FixedNonce(String);

impl FixedNonce {
    pub fn new(nonce: impl Into<String>) -> Self {
        Self(nonce.into())
    }
}

impl NonceSource for FixedNonce {
    fn nonce(&self, len: usize) -> String {
        self.0.chars().chain(std::iter::repeat('0')).take(len).collect()
    }
}
