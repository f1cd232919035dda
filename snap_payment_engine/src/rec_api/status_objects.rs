use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sps_common::Rupiah;

use crate::db_types::{GatewayStatus, OrderId, PaymentStatus, Transaction};

/// What a status read returns. Built from the transaction row when it exists, or as a pending-shaped placeholder
/// when it does not (yet), so a poller racing the checkout write never sees a hard error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub order_id: OrderId,
    pub payment_status: PaymentStatus,
    pub transaction_status: Option<GatewayStatus>,
    pub payment_method: Option<String>,
    pub amount: Option<Rupiah>,
    pub invoice_url: Option<String>,
    pub transaction_time: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl StatusSnapshot {
    /// The soft-pending shape returned while the checkout write is still in flight.
    pub fn placeholder(order_id: OrderId) -> Self {
        Self {
            order_id,
            payment_status: PaymentStatus::Pending,
            transaction_status: None,
            payment_method: None,
            amount: None,
            invoice_url: None,
            transaction_time: None,
            updated_at: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.transaction_status.is_none()
    }

    /// True once the gateway has reported a status after which no further change is expected.
    pub fn is_terminal(&self) -> bool {
        self.payment_status.is_terminal()
    }
}

impl From<Transaction> for StatusSnapshot {
    fn from(t: Transaction) -> Self {
        Self {
            order_id: t.order_id,
            payment_status: t.payment_status,
            transaction_status: Some(t.gateway_status),
            payment_method: t.payment_method,
            amount: Some(t.total_amount),
            invoice_url: t.invoice_url,
            transaction_time: Some(t.created_at),
            updated_at: Some(t.updated_at),
        }
    }
}
