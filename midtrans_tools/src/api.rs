use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{config::MidtransConfig, data_objects::TransactionStatusResponse, MidtransApiError};

#[derive(Clone)]
pub struct MidtransApi {
    config: MidtransConfig,
    client: Arc<Client>,
}

impl MidtransApi {
    pub fn new(config: MidtransConfig) -> Result<Self, MidtransApiError> {
        let mut headers = HeaderMap::with_capacity(3);
        // Midtrans authenticates server-to-server calls with HTTP Basic auth, username = server key, empty password.
        let token = base64::encode(format!("{}:", config.server_key.reveal()));
        let val = HeaderValue::from_str(&format!("Basic {token}"))
            .map_err(|e| MidtransApiError::Initialization(e.to_string()))?;
        headers.insert("Authorization", val);
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| MidtransApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, MidtransApiError> {
        let url = self.url(path);
        trace!("Sending REST query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| MidtransApiError::RestResponseError(e.to_string()))?;
        if response.status().is_success() {
            trace!("REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| MidtransApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| MidtransApiError::RestResponseError(e.to_string()))?;
            Err(MidtransApiError::QueryError { status, message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url())
    }

    /// Queries the gateway's authoritative status record for the given order.
    pub async fn transaction_status(&self, order_id: &str) -> Result<TransactionStatusResponse, MidtransApiError> {
        let path = format!("/v2/{order_id}/status");
        debug!("Fetching gateway status for order {order_id}");
        let result = self.rest_query::<TransactionStatusResponse, ()>(Method::GET, &path, None).await?;
        debug!("Gateway reports order {order_id} as {:?}", result.transaction_status);
        Ok(result)
    }
}
