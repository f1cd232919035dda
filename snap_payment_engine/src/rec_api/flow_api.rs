use std::fmt::Debug;

use chrono::Duration;
use log::*;

use crate::{
    db_types::{NewTransaction, NewWebhookLog, OrderId, PaymentStatus, Transaction},
    events::{EventProducers, TransactionFailedEvent, TransactionPaidEvent},
    rec_api::status_objects::StatusSnapshot,
    traits::{
        FailedReconciliation,
        GatewayStatusProvider,
        ReconciledTransaction,
        ReconcilerDatabase,
        ReconcilerError,
        ReconciliationReport,
        StatusTransition,
        StatusUpdate,
    },
};

/// `TransactionFlowApi` is the primary API for applying payment status changes, whichever of the three observers
/// (webhook, reconciler, admin trigger) saw them first. All coordination happens through the transaction row; the
/// API itself holds no state besides the event producers.
pub struct TransactionFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for TransactionFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TransactionFlowApi")
    }
}

impl<B> TransactionFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> TransactionFlowApi<B>
where B: ReconcilerDatabase
{
    /// Stores a new pending transaction at checkout time. Idempotent: the second element of the result is `false`
    /// if the order code was already known.
    pub async fn process_checkout(&self, transaction: NewTransaction) -> Result<(Transaction, bool), ReconcilerError> {
        let (transaction, inserted) = self.db.insert_transaction(transaction).await?;
        if inserted {
            debug!("🔄️🛒️ Transaction [{}] created, awaiting payment", transaction.order_id);
        } else {
            info!("🔄️🛒️ Transaction [{}] already exists. Returning existing record.", transaction.order_id);
        }
        Ok((transaction, inserted))
    }

    /// Appends a raw notification to the audit log. Must be called for every delivery, valid signature or not.
    pub async fn record_webhook(&self, log: NewWebhookLog) -> Result<i64, ReconcilerError> {
        self.db.record_webhook(log).await
    }

    /// Applies a gateway-observed status change and fires the terminal-status hooks when (and only when) the row
    /// actually transitioned. This is the single write path shared by the webhook handler, the reconciler and any
    /// manual admin trigger, so the idempotency and monotonicity rules hold everywhere at once.
    pub async fn process_status_update(&self, update: StatusUpdate) -> Result<StatusTransition, ReconcilerError> {
        let order_id = update.order_id.clone();
        let transition = self.db.apply_status_update(update).await?;
        if transition.is_transition() {
            info!(
                "🔄️💳️ Transaction [{order_id}] moved {} -> {}",
                transition.old_status, transition.transaction.payment_status
            );
            match transition.transaction.payment_status {
                PaymentStatus::Paid => self.call_transaction_paid_hook(&transition.transaction).await,
                PaymentStatus::Failed => self.call_transaction_failed_hook(&transition.transaction).await,
                PaymentStatus::Pending => {},
            }
        } else {
            debug!(
                "🔄️💳️ Transaction [{order_id}] unchanged at {} (update was a no-op or re-delivery)",
                transition.transaction.payment_status
            );
        }
        Ok(transition)
    }

    /// Returns the current status for the given order, read straight from the database (no live gateway call).
    /// An unknown order id yields a pending-shaped placeholder rather than an error; see
    /// [`StatusSnapshot::placeholder`].
    pub async fn status_snapshot(&self, order_id: &OrderId) -> Result<StatusSnapshot, ReconcilerError> {
        let snapshot = match self.db.fetch_transaction(order_id).await? {
            Some(transaction) => StatusSnapshot::from(transaction),
            None => {
                debug!("🔄️🔍️ No transaction for [{order_id}] yet. Returning placeholder.");
                StatusSnapshot::placeholder(order_id.clone())
            },
        };
        Ok(snapshot)
    }

    /// Records the invoice URL produced by the paid-event side effect.
    pub async fn set_invoice_url(&self, order_id: &OrderId, url: &str) -> Result<(), ReconcilerError> {
        self.db.set_invoice_url(order_id, url).await
    }

    /// Re-queries the gateway for every transaction still `pending` within the lookback window and applies whatever
    /// it reports. The fallback path for missed webhooks.
    ///
    /// The pass is deliberately sequential: `throttle` is slept between gateway calls so a large backlog cannot
    /// hammer the upstream API. A single transaction's failure is recorded and the pass moves on; there is no
    /// abort-on-first-error and no cancellation once started.
    pub async fn reconcile_pending<G: GatewayStatusProvider>(
        &self,
        gateway: &G,
        window: Duration,
        throttle: std::time::Duration,
    ) -> Result<ReconciliationReport, ReconcilerError> {
        let pending = self.db.fetch_pending_transactions(window).await?;
        let mut report = ReconciliationReport { total: pending.len(), ..Default::default() };
        info!("🔄️🕰️ Reconciling {} pending transactions (window: {} h)", report.total, window.num_hours());
        for (i, txn) in pending.into_iter().enumerate() {
            if i > 0 && !throttle.is_zero() {
                tokio::time::sleep(throttle).await;
            }
            match self.reconcile_one(gateway, &txn).await {
                Ok(Some(reconciled)) => {
                    report.updated += 1;
                    report.updated_transactions.push(reconciled);
                },
                Ok(None) => {
                    report.unchanged += 1;
                },
                Err(e) => {
                    warn!("🔄️🕰️ Could not reconcile [{}]: {e}", txn.order_id);
                    report.failed += 1;
                    report.failed_transactions.push(FailedReconciliation {
                        order_id: txn.order_id.clone(),
                        error: e.to_string(),
                    });
                },
            }
        }
        info!(
            "🔄️🕰️ Reconciliation complete. total: {}, updated: {}, unchanged: {}, failed: {}",
            report.total, report.updated, report.unchanged, report.failed
        );
        Ok(report)
    }

    async fn reconcile_one<G: GatewayStatusProvider>(
        &self,
        gateway: &G,
        txn: &Transaction,
    ) -> Result<Option<ReconciledTransaction>, String> {
        let record = gateway.status_for_order(&txn.order_id).await.map_err(|e| e.to_string())?;
        let mut update = StatusUpdate::new(txn.order_id.clone(), record.status.clone());
        update.payment_type = record.payment_type;
        update.gateway_transaction_id = record.gateway_transaction_id;
        let transition = self.process_status_update(update).await.map_err(|e| e.to_string())?;
        let result = transition.is_transition().then(|| ReconciledTransaction {
            order_id: txn.order_id.clone(),
            old_status: transition.old_status,
            new_status: transition.transaction.payment_status,
            gateway_status: record.status,
        });
        Ok(result)
    }

    async fn call_transaction_paid_hook(&self, transaction: &Transaction) {
        for emitter in &self.producers.transaction_paid_producer {
            debug!("🔄️💳️ Notifying transaction-paid hook subscribers");
            let event = TransactionPaidEvent::new(transaction.clone());
            emitter.publish_event(event).await;
        }
    }

    async fn call_transaction_failed_hook(&self, transaction: &Transaction) {
        for emitter in &self.producers.transaction_failed_producer {
            debug!("🔄️💳️ Notifying transaction-failed hook subscribers");
            let event = TransactionFailedEvent::new(transaction.clone());
            emitter.publish_event(event).await;
        }
    }
}
