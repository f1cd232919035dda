use chrono::Duration;
use thiserror::Error;

use crate::{
    db_types::{NewTransaction, NewWebhookLog, OrderId, Transaction},
    traits::{StatusTransition, StatusUpdate},
};

/// This trait defines the storage behaviour required by the reconciliation engine.
///
/// The contract encodes the two invariants the whole subsystem leans on:
/// * status transitions are **monotonic**: a terminal `payment_status` is never overwritten, no matter how stale or
///   out-of-order the incoming update is;
/// * every mutation is keyed by the canonical `order_id` alone.
#[allow(async_fn_in_trait)]
pub trait ReconcilerDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a new pending transaction. This call is idempotent: re-submitting the same `order_id` returns the
    /// existing row with `false` in the second parameter.
    async fn insert_transaction(&self, transaction: NewTransaction) -> Result<(Transaction, bool), ReconcilerError>;

    /// Fetches the transaction for the given order id, if it exists.
    async fn fetch_transaction(&self, order_id: &OrderId) -> Result<Option<Transaction>, ReconcilerError>;

    /// Applies a gateway status update to the transaction row.
    ///
    /// The write is conditional: the `payment_status` column only changes while the stored value is still `pending`.
    /// Updates against a terminal row are reported as unchanged rather than applied, which is what makes webhook
    /// re-delivery harmless. A `pending -> pending` update still refreshes `gateway_status`, `payment_method` and
    /// `gateway_transaction_id` as they become available.
    ///
    /// Returns the old and new state of the row so callers can decide whether side effects are due.
    async fn apply_status_update(&self, update: StatusUpdate) -> Result<StatusTransition, ReconcilerError>;

    /// Fetches all transactions that are still `pending` and were created within the lookback window.
    async fn fetch_pending_transactions(&self, window: Duration) -> Result<Vec<Transaction>, ReconcilerError>;

    /// Appends a raw notification to the audit log. Called unconditionally, including for notifications that failed
    /// the signature check.
    async fn record_webhook(&self, log: NewWebhookLog) -> Result<i64, ReconcilerError>;

    /// Records the invoice URL produced by the paid-event hook.
    async fn set_invoice_url(&self, order_id: &OrderId, url: &str) -> Result<(), ReconcilerError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), ReconcilerError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum ReconcilerError {
    #[error("We have an internal database engine error (configuration/uptime etc.): {0}")]
    DatabaseError(String),
    #[error("The requested transaction {0} does not exist")]
    TransactionNotFound(OrderId),
    #[error("Cannot insert transaction, since it already exists with order id {0}")]
    TransactionAlreadyExists(OrderId),
}

impl From<sqlx::Error> for ReconcilerError {
    fn from(e: sqlx::Error) -> Self {
        ReconcilerError::DatabaseError(e.to_string())
    }
}
