use chrono::{Duration, TimeZone, Utc};
use mockall::mock;
use snap_payment_engine::{
    db_types::{GatewayStatus, NewTransaction, NewWebhookLog, OrderId, PaymentStatus, Transaction},
    traits::{
        GatewayLookupError,
        GatewayStatusProvider,
        GatewayStatusRecord,
        ReconcilerDatabase,
        ReconcilerError,
        StatusTransition,
        StatusUpdate,
    },
};
use sps_common::Rupiah;

mock! {
    pub ReconcilerDb {}
    impl ReconcilerDatabase for ReconcilerDb {
        fn url(&self) -> &str;
        async fn insert_transaction(&self, transaction: NewTransaction) -> Result<(Transaction, bool), ReconcilerError>;
        async fn fetch_transaction(&self, order_id: &OrderId) -> Result<Option<Transaction>, ReconcilerError>;
        async fn apply_status_update(&self, update: StatusUpdate) -> Result<StatusTransition, ReconcilerError>;
        async fn fetch_pending_transactions(&self, window: Duration) -> Result<Vec<Transaction>, ReconcilerError>;
        async fn record_webhook(&self, log: NewWebhookLog) -> Result<i64, ReconcilerError>;
        async fn set_invoice_url(&self, order_id: &OrderId, url: &str) -> Result<(), ReconcilerError>;
    }
    impl Clone for ReconcilerDb {
        fn clone(&self) -> Self;
    }
}

mock! {
    pub Gateway {}
    impl GatewayStatusProvider for Gateway {
        async fn status_for_order(&self, order_id: &OrderId) -> Result<GatewayStatusRecord, GatewayLookupError>;
    }
}

pub const TEST_ORDER: &str = "ORDER-1700000000000-abc12345";

pub fn sample_transaction(payment_status: PaymentStatus, gateway_status: GatewayStatus) -> Transaction {
    Transaction {
        id: 1,
        order_id: OrderId(TEST_ORDER.to_string()),
        gateway_transaction_id: Some("9aed5972-5b6a-401e-894b-a32c91ed1a3a".to_string()),
        payment_status,
        gateway_status,
        payment_method: Some("bank_transfer".to_string()),
        total_amount: Rupiah::from(150_000),
        customer_name: "Budi".to_string(),
        customer_phone: "+6281234567890".to_string(),
        invoice_url: None,
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
    }
}
