use serde::{Deserialize, Serialize};

use crate::db_types::{GatewayStatus, OrderId, PaymentStatus, Transaction};

//--------------------------------------     StatusUpdate      -------------------------------------------------------
/// A gateway-reported status change, normalised from whichever path observed it (webhook, reconciler, admin).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub order_id: OrderId,
    pub gateway_status: GatewayStatus,
    pub payment_type: Option<String>,
    pub gateway_transaction_id: Option<String>,
}

impl StatusUpdate {
    pub fn new(order_id: OrderId, gateway_status: GatewayStatus) -> Self {
        Self { order_id, gateway_status, payment_type: None, gateway_transaction_id: None }
    }

    pub fn with_payment_type<S: Into<String>>(mut self, payment_type: S) -> Self {
        self.payment_type = Some(payment_type.into());
        self
    }

    pub fn with_gateway_transaction_id<S: Into<String>>(mut self, id: S) -> Self {
        self.gateway_transaction_id = Some(id.into());
        self
    }
}

//--------------------------------------   StatusTransition    -------------------------------------------------------
/// The result of applying a [`StatusUpdate`] to the database.
#[derive(Debug, Clone)]
pub struct StatusTransition {
    /// The payment status before the update was applied
    pub old_status: PaymentStatus,
    /// The row after the update
    pub transaction: Transaction,
}

impl StatusTransition {
    /// True when the `payment_status` actually moved. Side effects (events, notifications, invoices) fire only on a
    /// real transition, which is the idempotency guarantee for re-delivered webhooks.
    pub fn is_transition(&self) -> bool {
        self.old_status != self.transaction.payment_status
    }
}

//-------------------------------------- ReconciliationReport  -------------------------------------------------------
/// Per-run report of a reconciliation pass, for operator visibility.
/// Invariant: `updated + unchanged + failed == total`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub total: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub updated_transactions: Vec<ReconciledTransaction>,
    pub failed_transactions: Vec<FailedReconciliation>,
}

impl ReconciliationReport {
    pub fn is_consistent(&self) -> bool {
        self.updated + self.unchanged + self.failed == self.total
            && self.updated_transactions.len() == self.updated
            && self.failed_transactions.len() == self.failed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciledTransaction {
    pub order_id: OrderId,
    pub old_status: PaymentStatus,
    pub new_status: PaymentStatus,
    pub gateway_status: GatewayStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedReconciliation {
    pub order_id: OrderId,
    pub error: String,
}
