use std::fmt::Display;

use serde::{Deserialize, Serialize};
use snap_payment_engine::{
    db_types::{OrderId, PaymentStatus},
    status_objects::StatusSnapshot,
    traits::ReconciliationReport,
};
use sps_common::Rupiah;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// Envelope for the status read. `success` is always true; a missing row is reported as a pending placeholder in
/// `data` rather than as a failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
    pub data: StatusSnapshot,
}

impl From<StatusSnapshot> for StatusResponse {
    fn from(data: StatusSnapshot) -> Self {
        Self { success: true, data }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Client-supplied order code for retries. When absent, the server generates a fresh one.
    #[serde(default)]
    pub order_id: Option<OrderId>,
    /// Total price in whole rupiah.
    pub amount: i64,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub success: bool,
    pub order_id: OrderId,
    pub payment_status: PaymentStatus,
    pub amount: Rupiah,
}

/// Envelope for the reconciliation trigger: the pass report under a `data` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileResponse {
    pub data: ReconciliationReport,
}

impl From<ReconciliationReport> for ReconcileResponse {
    fn from(data: ReconciliationReport) -> Self {
        Self { data }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReconcileParams {
    /// Lookback window override in hours. Defaults to `MAX_TRANSACTION_HOURS`.
    #[serde(default)]
    pub hours: Option<i64>,
}
