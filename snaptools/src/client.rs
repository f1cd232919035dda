use anyhow::{anyhow, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use snap_payment_engine::{db_types::OrderId, status_objects::StatusSnapshot, traits::ReconciliationReport};
use snap_payment_server::data_objects::{ReconcileResponse, StatusResponse};
use url::Url;

use crate::poller::StatusSource;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8360";

/// A thin REST client for the payment server, driven by the `API_URL` and `CRON_API_KEY` environment variables.
pub struct PaymentServerClient {
    client: Client,
    server: Url,
    api_key: Option<String>,
}

impl PaymentServerClient {
    pub fn new(server: Url, api_key: Option<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .user_agent("Snap Payment Server Client")
            .default_headers(headers)
            .build()
            .expect("Failed to create reqwest client");
        PaymentServerClient { client, server, api_key }
    }

    pub fn from_env_or_default() -> Result<Self> {
        let server = std::env::var("API_URL").ok().unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let server = Url::parse(&server).map_err(|e| anyhow!("API_URL is not a valid URL: {e}"))?;
        let api_key = std::env::var("CRON_API_KEY").ok();
        Ok(Self::new(server, api_key))
    }

    pub fn server(&self) -> &str {
        self.server.as_str()
    }

    pub fn url(&self, path: &str) -> Result<Url> {
        self.server.join(path).map_err(|e| anyhow!("Failed to join URL: {e}"))
    }

    pub async fn health(&self) -> Result<String> {
        let url = self.url("/health")?;
        let res = self.client.get(url).send().await?;
        Ok(res.text().await?)
    }

    pub async fn transaction_status(&self, order_id: &OrderId) -> Result<StatusSnapshot> {
        let url = self.url(&format!("/transactions/status/{}", order_id.as_str()))?;
        let res = self.client.get(url).send().await?;
        if !res.status().is_success() {
            let reason = res.text().await?;
            return Err(anyhow!("Status query failed. {reason}"));
        }
        let response = res.json::<StatusResponse>().await?;
        Ok(response.data)
    }

    /// Triggers a reconciliation pass on the server. Requires `CRON_API_KEY` to be set.
    pub async fn reconcile(&self, hours: Option<i64>) -> Result<ReconciliationReport> {
        let key = self.api_key.as_deref().ok_or_else(|| anyhow!("CRON_API_KEY is not set"))?;
        let mut url = self.url("/admin/update-all-pending-transactions")?;
        if let Some(h) = hours {
            url.query_pairs_mut().append_pair("hours", &h.to_string());
        }
        let res = self.client.get(url).header("x-api-key", key).send().await?;
        let status = res.status();
        if !status.is_success() {
            let reason = res.text().await?;
            return Err(anyhow!("Reconciliation trigger failed ({status}). {reason}"));
        }
        Ok(res.json::<ReconcileResponse>().await?.data)
    }
}

impl StatusSource for PaymentServerClient {
    async fn fetch_status(&self, order_id: &OrderId) -> Result<StatusSnapshot> {
        self.transaction_status(order_id).await
    }
}
