use thiserror::Error;

use crate::db_types::{GatewayStatus, OrderId};

/// What the reconciler needs from a payment gateway client: the authoritative status record for one order.
/// `midtrans_tools::MidtransApi` is adapted to this trait in the server crate; tests substitute a scripted stub.
#[allow(async_fn_in_trait)]
pub trait GatewayStatusProvider {
    async fn status_for_order(&self, order_id: &OrderId) -> Result<GatewayStatusRecord, GatewayLookupError>;
}

/// The gateway's view of a transaction, reduced to the fields the engine acts on.
#[derive(Debug, Clone)]
pub struct GatewayStatusRecord {
    pub status: GatewayStatus,
    pub payment_type: Option<String>,
    pub gateway_transaction_id: Option<String>,
}

#[derive(Debug, Clone, Error)]
#[error("Gateway status lookup failed: {0}")]
pub struct GatewayLookupError(pub String);
