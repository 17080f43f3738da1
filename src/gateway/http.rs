//! HTTP snapshot fetches + Socket.IO push channel

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};
use url::Url;

use super::{socket, BackendGateway, GatewayError, Result, Subscription};
use crate::alerts::Alert;
use crate::metrics::{ModelHealth, Stats};

pub const ALERTS_PATH: &str = "api/alerts";
pub const STATS_PATH: &str = "api/stats";
pub const MODEL_HEALTH_PATH: &str = "api/model_health";

/// Gateway to a running detection backend
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base: Url,
}

impl HttpGateway {
    /// Create a gateway for `base_url` (e.g. `http://127.0.0.1:5001`)
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("alert-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path)?;
        trace!("Gateway: GET {}", url);

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Status {
                endpoint: url.path().to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        trace!("Gateway: {} -> {} bytes", url.path(), body.len());
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl BackendGateway for HttpGateway {
    async fn fetch_alerts(&self) -> Result<Vec<Alert>> {
        self.get_json(ALERTS_PATH).await
    }

    async fn fetch_stats(&self) -> Result<Stats> {
        self.get_json(STATS_PATH).await
    }

    async fn fetch_model_health(&self) -> Result<ModelHealth> {
        self.get_json(MODEL_HEALTH_PATH).await
    }

    async fn subscribe(&self, events: mpsc::UnboundedSender<Alert>, cancel: CancellationToken) -> Result<Subscription> {
        let url = socket::socket_url(&self.base)?;
        info!("Gateway: connecting push channel {}", url);

        let token = cancel.clone();
        let ws = tokio::task::spawn_blocking(move || socket::connect(&url, &token))
            .await
            .map_err(|e| GatewayError::Handshake(format!("connect task failed: {}", e)))??;
        debug!("Gateway: push channel connected");

        let token = cancel.clone();
        let task = tokio::task::spawn_blocking(move || socket::read_loop(ws, events, token));
        Ok(Subscription::new(cancel, Some(task)))
    }
}
