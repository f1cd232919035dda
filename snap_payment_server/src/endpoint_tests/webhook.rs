use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use midtrans_tools::{helpers::calculate_signature, MidtransConfig, PaymentNotification};
use snap_payment_engine::{
    db_types::{GatewayStatus, PaymentStatus},
    events::EventProducers,
    traits::{ReconcilerError, StatusTransition, StatusUpdate},
    TransactionFlowApi,
};
use sps_common::Secret;

use super::{
    helpers::send_request,
    mocks::{sample_transaction, MockReconcilerDb, TEST_ORDER},
};
use crate::{data_objects::JsonResponse, midtrans_routes::PaymentWebhookRoute};

const SERVER_KEY: &str = "SB-Mid-server-test-key";

fn test_midtrans_config() -> MidtransConfig {
    MidtransConfig { server_key: Secret::new(SERVER_KEY.to_string()), ..Default::default() }
}

fn notification(transaction_status: &str, signed: bool) -> PaymentNotification {
    notification_with_amount(transaction_status, "150000.00", signed)
}

fn notification_with_amount(transaction_status: &str, gross_amount: &str, signed: bool) -> PaymentNotification {
    let status_code = "200".to_string();
    let gross_amount = gross_amount.to_string();
    let signature_key = if signed {
        calculate_signature(TEST_ORDER, &status_code, &gross_amount, SERVER_KEY)
    } else {
        "0badc0de".repeat(16)
    };
    PaymentNotification {
        order_id: TEST_ORDER.to_string(),
        status_code,
        gross_amount,
        signature_key,
        transaction_status: transaction_status.to_string(),
        payment_type: Some("bank_transfer".to_string()),
        transaction_id: Some("9aed5972-5b6a-401e-894b-a32c91ed1a3a".to_string()),
        merchant_id: Some("G12345".to_string()),
        fraud_status: Some("accept".to_string()),
        currency: Some("IDR".to_string()),
        transaction_time: Some("2024-02-29 13:30:00".to_string()),
    }
}

async fn post_webhook(note: PaymentNotification, configure: fn(&mut ServiceConfig)) -> (StatusCode, JsonResponse) {
    let req = TestRequest::post().uri("/payment-notification").set_json(&note);
    let (status, body) = send_request(req, configure).await;
    let response = serde_json::from_str::<JsonResponse>(&body).expect("Response was not a JsonResponse");
    (status, response)
}

#[actix_web::test]
async fn valid_settlement_notification_is_applied() {
    let (status, response) = post_webhook(notification("settlement", true), configure_settlement).await;
    assert_eq!(status, StatusCode::OK);
    assert!(response.success);
}

#[actix_web::test]
async fn duplicate_notification_is_acknowledged_without_side_effects() {
    let (status, response) = post_webhook(notification("settlement", true), configure_duplicate).await;
    assert_eq!(status, StatusCode::OK);
    // Still a 2xx acknowledgement, otherwise the gateway would keep retrying
    assert!(response.success);
}

#[actix_web::test]
async fn invalid_signature_is_acknowledged_but_not_applied() {
    let (status, response) = post_webhook(notification("settlement", false), configure_bad_signature).await;
    assert_eq!(status, StatusCode::OK);
    // The caller cannot tell a rejected delivery from a processed one; only the log and audit row differ
    assert!(response.success);
}

#[actix_web::test]
async fn mismatched_gross_amount_is_acknowledged_but_not_applied() {
    let note = notification_with_amount("settlement", "142000.00", true);
    let (status, response) = post_webhook(note, configure_amount_mismatch).await;
    assert_eq!(status, StatusCode::OK);
    assert!(response.success);
}

#[actix_web::test]
async fn unknown_order_is_reported_without_an_error_status() {
    let (status, response) = post_webhook(notification("settlement", true), configure_unknown_order).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!response.success);
}

fn register(cfg: &mut ServiceConfig, db: MockReconcilerDb) {
    let api = TransactionFlowApi::new(db, EventProducers::default());
    cfg.service(PaymentWebhookRoute::<MockReconcilerDb>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(test_midtrans_config()));
}

fn configure_settlement(cfg: &mut ServiceConfig) {
    let mut db = MockReconcilerDb::new();
    db.expect_record_webhook().times(1).withf(|log| log.signature_valid).returning(|_| Ok(1));
    db.expect_fetch_transaction()
        .times(1)
        .returning(|_| Ok(Some(sample_transaction(PaymentStatus::Pending, GatewayStatus::Pending))));
    db.expect_apply_status_update()
        .times(1)
        .withf(|update: &StatusUpdate| update.gateway_status == GatewayStatus::Settlement)
        .returning(|_| {
            Ok(StatusTransition {
                old_status: PaymentStatus::Pending,
                transaction: sample_transaction(PaymentStatus::Paid, GatewayStatus::Settlement),
            })
        });
    register(cfg, db);
}

fn configure_duplicate(cfg: &mut ServiceConfig) {
    let mut db = MockReconcilerDb::new();
    db.expect_record_webhook().times(1).returning(|_| Ok(2));
    db.expect_fetch_transaction()
        .times(1)
        .returning(|_| Ok(Some(sample_transaction(PaymentStatus::Paid, GatewayStatus::Settlement))));
    // The row is already terminal, so the update comes back as a no-op
    db.expect_apply_status_update().times(1).returning(|_| {
        Ok(StatusTransition {
            old_status: PaymentStatus::Paid,
            transaction: sample_transaction(PaymentStatus::Paid, GatewayStatus::Settlement),
        })
    });
    register(cfg, db);
}

fn configure_bad_signature(cfg: &mut ServiceConfig) {
    let mut db = MockReconcilerDb::new();
    // The audit row is still written, flagged invalid. No read or status update may follow.
    db.expect_record_webhook().times(1).withf(|log| !log.signature_valid).returning(|_| Ok(3));
    db.expect_fetch_transaction().times(0);
    db.expect_apply_status_update().times(0);
    register(cfg, db);
}

fn configure_unknown_order(cfg: &mut ServiceConfig) {
    let mut db = MockReconcilerDb::new();
    db.expect_record_webhook().times(1).returning(|_| Ok(4));
    db.expect_fetch_transaction().times(1).returning(|_| Ok(None));
    db.expect_apply_status_update()
        .times(1)
        .returning(|update: StatusUpdate| Err(ReconcilerError::TransactionNotFound(update.order_id)));
    register(cfg, db);
}

fn configure_amount_mismatch(cfg: &mut ServiceConfig) {
    let mut db = MockReconcilerDb::new();
    // The audit row records the delivery, but the 142000 notification cannot move the 150000 row
    db.expect_record_webhook().times(1).withf(|log| log.signature_valid).returning(|_| Ok(5));
    db.expect_fetch_transaction()
        .times(1)
        .returning(|_| Ok(Some(sample_transaction(PaymentStatus::Pending, GatewayStatus::Pending))));
    db.expect_apply_status_update().times(0);
    register(cfg, db);
}
