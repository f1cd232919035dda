use chrono::{Duration, Utc};
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewTransaction, OrderId, Transaction},
    traits::{ReconcilerError, StatusTransition, StatusUpdate},
};

/// Inserts the transaction into the database, returning `false` in the second parameter if it already exists.
pub async fn idempotent_insert(
    transaction: NewTransaction,
    conn: &mut SqliteConnection,
) -> Result<(Transaction, bool), ReconcilerError> {
    let inserted = match fetch_transaction_by_order_id(&transaction.order_id, conn).await? {
        Some(transaction) => (transaction, false),
        None => {
            let transaction = insert_transaction(transaction, conn).await?;
            debug!("📝️ Transaction [{}] inserted with id {}", transaction.order_id, transaction.id);
            (transaction, true)
        },
    };
    Ok(inserted)
}

async fn insert_transaction(
    transaction: NewTransaction,
    conn: &mut SqliteConnection,
) -> Result<Transaction, ReconcilerError> {
    let transaction = sqlx::query_as(
        r#"
            INSERT INTO transactions (
                order_id,
                total_amount,
                customer_name,
                customer_phone
            ) VALUES ($1, $2, $3, $4)
            RETURNING *;
        "#,
    )
    .bind(transaction.order_id)
    .bind(transaction.total_amount.value())
    .bind(transaction.customer_name)
    .bind(transaction.customer_phone)
    .fetch_one(conn)
    .await?;
    Ok(transaction)
}

/// Returns the transaction for the corresponding `order_id`, the canonical key.
pub async fn fetch_transaction_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    let transaction = sqlx::query_as("SELECT * FROM transactions WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_optional(conn)
        .await?;
    Ok(transaction)
}

/// Applies a gateway status update to the row matching `order_id`.
///
/// The `payment_status` write is guarded by `WHERE payment_status = 'pending'`, so a terminal row is never touched
/// and only one of several concurrent writers can perform the pending -> terminal transition. The losers (and any
/// re-delivered webhooks) observe an unchanged row.
pub async fn apply_status_update(
    update: StatusUpdate,
    conn: &mut SqliteConnection,
) -> Result<StatusTransition, ReconcilerError> {
    let current = fetch_transaction_by_order_id(&update.order_id, conn)
        .await?
        .ok_or_else(|| ReconcilerError::TransactionNotFound(update.order_id.clone()))?;
    let new_status = update.gateway_status.payment_status();
    let updated: Option<Transaction> = sqlx::query_as(
        r#"
            UPDATE transactions SET
                payment_status = $2,
                gateway_status = $3,
                payment_method = COALESCE($4, payment_method),
                gateway_transaction_id = COALESCE($5, gateway_transaction_id),
                updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $1 AND payment_status = 'pending'
            RETURNING *;
        "#,
    )
    .bind(update.order_id.as_str())
    .bind(new_status)
    .bind(&update.gateway_status)
    .bind(&update.payment_type)
    .bind(&update.gateway_transaction_id)
    .fetch_optional(&mut *conn)
    .await?;
    let transition = match updated {
        Some(transaction) => StatusTransition { old_status: current.payment_status, transaction },
        // The row was already terminal (or a concurrent writer got there first). Report the latest state with
        // old == new so the caller fires no side effects.
        None => {
            let transaction = fetch_transaction_by_order_id(&update.order_id, conn)
                .await?
                .ok_or_else(|| ReconcilerError::TransactionNotFound(update.order_id.clone()))?;
            StatusTransition { old_status: transaction.payment_status, transaction }
        },
    };
    Ok(transition)
}

/// Fetches all transactions still `pending` that were created within the lookback window, oldest first.
pub async fn fetch_pending_within(
    window: Duration,
    conn: &mut SqliteConnection,
) -> Result<Vec<Transaction>, sqlx::Error> {
    let cutoff = Utc::now() - window;
    let transactions = sqlx::query_as(
        r#"
            SELECT * FROM transactions
            WHERE payment_status = 'pending' AND datetime(created_at) >= datetime($1)
            ORDER BY created_at ASC
        "#,
    )
    .bind(cutoff)
    .fetch_all(conn)
    .await?;
    Ok(transactions)
}

pub async fn set_invoice_url(
    order_id: &OrderId,
    url: &str,
    conn: &mut SqliteConnection,
) -> Result<(), ReconcilerError> {
    let result = sqlx::query("UPDATE transactions SET invoice_url = $2, updated_at = CURRENT_TIMESTAMP WHERE order_id = $1")
        .bind(order_id.as_str())
        .bind(url)
        .execute(conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ReconcilerError::TransactionNotFound(order_id.clone()));
    }
    Ok(())
}
