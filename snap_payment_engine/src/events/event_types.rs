use crate::db_types::Transaction;

/// Emitted exactly once, when a transaction transitions into `paid`. Re-delivered webhooks reporting the same
/// settlement do not re-emit it.
#[derive(Debug, Clone)]
pub struct TransactionPaidEvent {
    pub transaction: Transaction,
}

impl TransactionPaidEvent {
    pub fn new(transaction: Transaction) -> Self {
        Self { transaction }
    }
}

/// Emitted when a transaction transitions into `failed` (deny, cancel or expire upstream).
#[derive(Debug, Clone)]
pub struct TransactionFailedEvent {
    pub transaction: Transaction,
}

impl TransactionFailedEvent {
    pub fn new(transaction: Transaction) -> Self {
        Self { transaction }
    }
}
