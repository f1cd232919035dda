use chrono::Duration;
use log::*;
use snap_payment_engine::{events::EventProducers, SqliteDatabase, TransactionFlowApi};
use tokio::task::JoinHandle;

use crate::integrations::midtrans::MidtransGateway;

/// Starts the background reconciliation worker. Do not await the returned JoinHandle, as it will run indefinitely.
///
/// The worker runs the same pass as the `/admin/update-all-pending-transactions` trigger: every `interval`,
/// re-query the gateway for
/// pending transactions inside the lookback window and apply whatever it reports.
pub fn start_reconcile_worker(
    db: SqliteDatabase,
    producers: EventProducers,
    gateway: MidtransGateway,
    window: Duration,
    interval: std::time::Duration,
    throttle: std::time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let api = TransactionFlowApi::new(db, producers);
        info!("🕰️ Reconciliation worker started (every {} s)", interval.as_secs());
        loop {
            timer.tick().await;
            info!("🕰️ Running reconciliation job");
            match api.reconcile_pending(&gateway, window, throttle).await {
                Ok(report) => {
                    info!(
                        "🕰️ Reconciliation job done. {} pending, {} updated, {} unchanged, {} failed",
                        report.total, report.updated, report.unchanged, report.failed
                    );
                    for t in &report.updated_transactions {
                        debug!("🕰️ [{}] {} -> {}", t.order_id, t.old_status, t.new_status);
                    }
                    for f in &report.failed_transactions {
                        debug!("🕰️ [{}] could not be reconciled: {}", f.order_id, f.error);
                    }
                },
                Err(e) => {
                    error!("🕰️ Error running reconciliation job: {e}");
                },
            }
        }
    })
}
