//! Adapts the Midtrans REST client to the engine's gateway seam.

use log::debug;
use midtrans_tools::MidtransApi;
use snap_payment_engine::{
    db_types::{GatewayStatus, OrderId},
    traits::{GatewayLookupError, GatewayStatusProvider, GatewayStatusRecord},
};

#[derive(Clone)]
pub struct MidtransGateway {
    api: MidtransApi,
}

impl MidtransGateway {
    pub fn new(api: MidtransApi) -> Self {
        Self { api }
    }
}

impl GatewayStatusProvider for MidtransGateway {
    async fn status_for_order(&self, order_id: &OrderId) -> Result<GatewayStatusRecord, GatewayLookupError> {
        let response =
            self.api.transaction_status(order_id.as_str()).await.map_err(|e| GatewayLookupError(e.to_string()))?;
        // Midtrans reports "order not found" as a 200 with status_code 404 in the body and no transaction fields
        let Some(status) = response.transaction_status else {
            let message = response.status_message.unwrap_or_else(|| "no status in response".to_string());
            return Err(GatewayLookupError(format!(
                "Gateway has no status for order {order_id} (status_code {}): {message}",
                response.status_code
            )));
        };
        debug!("🌐️ Gateway reports [{order_id}] as {status}");
        Ok(GatewayStatusRecord {
            status: GatewayStatus::from(status),
            payment_type: response.payment_type,
            gateway_transaction_id: response.transaction_id,
        })
    }
}
