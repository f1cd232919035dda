use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use serde_json::json;
use snap_payment_engine::{
    db_types::{GatewayStatus, PaymentStatus},
    events::EventProducers,
    TransactionFlowApi,
};

use super::{
    helpers::send_request,
    mocks::{sample_transaction, MockReconcilerDb, TEST_ORDER},
};
use crate::routes::CheckoutRoute;

#[actix_web::test]
async fn checkout_creates_a_pending_transaction() {
    let req = TestRequest::post()
        .uri("/checkout")
        .set_json(json!({"amount": 150000, "customer_name": "Budi", "customer_phone": "+6281234567890"}));
    let (status, body) = send_request(req, configure_new).await;
    assert_eq!(status, StatusCode::CREATED);
    let json = serde_json::from_str::<serde_json::Value>(&body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["payment_status"], "pending");
    assert_eq!(json["amount"], 150_000);
}

#[actix_web::test]
async fn checkout_retry_returns_the_existing_transaction() {
    let req = TestRequest::post().uri("/checkout").set_json(json!({"order_id": TEST_ORDER, "amount": 150000}));
    let (status, body) = send_request(req, configure_existing).await;
    assert_eq!(status, StatusCode::OK);
    let json = serde_json::from_str::<serde_json::Value>(&body).unwrap();
    assert_eq!(json["order_id"], TEST_ORDER);
}

#[actix_web::test]
async fn checkout_rejects_a_non_positive_amount() {
    let req = TestRequest::post().uri("/checkout").set_json(json!({"amount": 0}));
    let (status, _) = send_request(req, configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn register(cfg: &mut ServiceConfig, db: MockReconcilerDb) {
    let api = TransactionFlowApi::new(db, EventProducers::default());
    cfg.service(CheckoutRoute::<MockReconcilerDb>::new()).app_data(web::Data::new(api));
}

fn configure_new(cfg: &mut ServiceConfig) {
    let mut db = MockReconcilerDb::new();
    db.expect_insert_transaction()
        .times(1)
        .returning(|_| Ok((sample_transaction(PaymentStatus::Pending, GatewayStatus::Pending), true)));
    register(cfg, db);
}

fn configure_existing(cfg: &mut ServiceConfig) {
    let mut db = MockReconcilerDb::new();
    db.expect_insert_transaction()
        .times(1)
        .returning(|_| Ok((sample_transaction(PaymentStatus::Pending, GatewayStatus::Pending), false)));
    register(cfg, db);
}

fn configure_untouched(cfg: &mut ServiceConfig) {
    let mut db = MockReconcilerDb::new();
    db.expect_insert_transaction().times(0);
    register(cfg, db);
}
