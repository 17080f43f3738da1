//! Backend gateway
//!
//! Boundary to the detection backend: three snapshot fetches and the push
//! channel for new alerts. `HttpGateway` is the production implementation.

pub mod http;
pub mod socket;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::alerts::Alert;
use crate::metrics::{ModelHealth, Stats};

pub use http::HttpGateway;

/// Errors talking to the backend
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid backend URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("push channel error: {0}")]
    Socket(#[from] tungstenite::Error),

    #[error("push channel handshake failed: {0}")]
    Handshake(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Live push subscription. Dropping it without `close` leaves the reader running.
#[derive(Debug)]
pub struct Subscription {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(cancel: CancellationToken, task: Option<JoinHandle<()>>) -> Self {
        Self { cancel, task }
    }

    /// Subscription with no background reader (test and offline gateways)
    pub fn detached(cancel: CancellationToken) -> Self {
        Self::new(cancel, None)
    }

    /// True once the subscription was closed or its reader has exited
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.task.as_ref().is_some_and(|t| t.is_finished())
    }

    /// Stop the reader and wait for it to exit
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                debug!("Push reader ended abnormally: {}", e);
            }
        }
    }
}

/// Snapshot fetches and push subscription
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// `GET /api/alerts`, already in display order
    async fn fetch_alerts(&self) -> Result<Vec<Alert>>;

    /// `GET /api/stats`
    async fn fetch_stats(&self) -> Result<Stats>;

    /// `GET /api/model_health`
    async fn fetch_model_health(&self) -> Result<ModelHealth>;

    /// Connect the push channel; each `new_alert` event is sent on `events`.
    ///
    /// Cancelling `cancel` aborts a pending handshake and later stops the
    /// reader; the returned `Subscription` shares the same token.
    async fn subscribe(&self, events: mpsc::UnboundedSender<Alert>, cancel: CancellationToken) -> Result<Subscription>;
}
