//! Shared fixtures for the engine integration tests.
use snap_payment_engine::SqliteDatabase;

/// A fresh in-memory database with migrations applied. The pool is capped at one connection so the
/// `:memory:` database is not silently duplicated per connection.
pub async fn memory_db() -> SqliteDatabase {
    let _ = env_logger::try_init();
    SqliteDatabase::new_with_url("sqlite::memory:", 1).await.expect("Could not create in-memory database")
}

/// Rewrites `created_at` so a transaction looks `hours` old. Used to test the reconciliation window.
#[allow(dead_code)]
pub async fn backdate_transaction(db: &SqliteDatabase, order_id: &str, hours: i64) {
    let modifier = format!("-{hours} hours");
    sqlx::query("UPDATE transactions SET created_at = datetime('now', $2) WHERE order_id = $1")
        .bind(order_id)
        .bind(modifier)
        .execute(db.pool())
        .await
        .expect("Could not backdate transaction");
}
