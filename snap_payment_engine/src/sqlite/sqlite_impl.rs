//! `SqliteDatabase` is a concrete implementation of a payment reconciler backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements the [`ReconcilerDatabase`] trait. Migrations are
//! embedded and run when the database is opened.
use std::fmt::Debug;

use chrono::Duration;
use sqlx::SqlitePool;

use super::db::{db_url, new_pool, transactions, webhook_logs};
use crate::{
    db_types::{NewTransaction, NewWebhookLog, OrderId, Transaction},
    traits::{ReconcilerDatabase, ReconcilerError, StatusTransition, StatusUpdate},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database instance, using the `SPS_DATABASE_URL` environment variable for the URL.
    pub async fn new(max_connections: u32) -> Result<Self, ReconcilerError> {
        let url = db_url();
        Self::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, ReconcilerError> {
        let pool = new_pool(url, max_connections).await?;
        sqlx::migrate!("./src/sqlite/migrations")
            .run(&pool)
            .await
            .map_err(|e| ReconcilerError::DatabaseError(e.to_string()))?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl ReconcilerDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_transaction(&self, transaction: NewTransaction) -> Result<(Transaction, bool), ReconcilerError> {
        let mut conn = self.pool.acquire().await?;
        transactions::idempotent_insert(transaction, &mut *conn).await
    }

    async fn fetch_transaction(&self, order_id: &OrderId) -> Result<Option<Transaction>, ReconcilerError> {
        let mut conn = self.pool.acquire().await?;
        let transaction = transactions::fetch_transaction_by_order_id(order_id, &mut *conn).await?;
        Ok(transaction)
    }

    async fn apply_status_update(&self, update: StatusUpdate) -> Result<StatusTransition, ReconcilerError> {
        let mut tx = self.pool.begin().await?;
        let transition = transactions::apply_status_update(update, &mut *tx).await?;
        tx.commit().await?;
        Ok(transition)
    }

    async fn fetch_pending_transactions(&self, window: Duration) -> Result<Vec<Transaction>, ReconcilerError> {
        let mut conn = self.pool.acquire().await?;
        let pending = transactions::fetch_pending_within(window, &mut *conn).await?;
        Ok(pending)
    }

    async fn record_webhook(&self, log: NewWebhookLog) -> Result<i64, ReconcilerError> {
        let mut conn = self.pool.acquire().await?;
        webhook_logs::insert_webhook_log(log, &mut *conn).await
    }

    async fn set_invoice_url(&self, order_id: &OrderId, url: &str) -> Result<(), ReconcilerError> {
        let mut conn = self.pool.acquire().await?;
        transactions::set_invoice_url(order_id, url, &mut *conn).await
    }

    async fn close(&mut self) -> Result<(), ReconcilerError> {
        self.pool.close().await;
        Ok(())
    }
}
