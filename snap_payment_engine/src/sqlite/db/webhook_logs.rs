use log::trace;
use sqlx::SqliteConnection;

use crate::{db_types::NewWebhookLog, traits::ReconcilerError};

/// Appends a raw notification to the audit log. Insert-only; there is deliberately no update or delete.
pub async fn insert_webhook_log(log: NewWebhookLog, conn: &mut SqliteConnection) -> Result<i64, ReconcilerError> {
    let result = sqlx::query(
        r#"
            INSERT INTO webhook_logs (
                order_id,
                gateway_transaction_id,
                transaction_status,
                status_code,
                gross_amount,
                payment_type,
                fraud_status,
                signature_valid,
                payload
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(log.order_id)
    .bind(log.gateway_transaction_id)
    .bind(log.transaction_status)
    .bind(log.status_code)
    .bind(log.gross_amount)
    .bind(log.payment_type)
    .bind(log.fraud_status)
    .bind(log.signature_valid)
    .bind(log.payload)
    .execute(conn)
    .await?;
    let id = result.last_insert_rowid();
    trace!("📝️ Webhook log entry {id} recorded");
    Ok(id)
}
