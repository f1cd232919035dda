use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use snap_payment_engine::{
    db_types::{GatewayStatus, PaymentStatus},
    events::EventProducers,
    TransactionFlowApi,
};

use super::{
    helpers::send_request,
    mocks::{sample_transaction, MockReconcilerDb, TEST_ORDER},
};
use crate::routes::TransactionStatusRoute;

#[actix_web::test]
async fn status_of_a_paid_transaction() {
    let req = TestRequest::get().uri(&format!("/transactions/status/{TEST_ORDER}"));
    let (status, body) = send_request(req, configure_paid).await;
    assert_eq!(status, StatusCode::OK);
    let json = serde_json::from_str::<serde_json::Value>(&body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["order_id"], TEST_ORDER);
    assert_eq!(json["data"]["payment_status"], "paid");
    assert_eq!(json["data"]["transaction_status"], "settlement");
    assert_eq!(json["data"]["amount"], 150_000);
}

#[actix_web::test]
async fn status_of_an_unknown_order_is_a_pending_placeholder() {
    let req = TestRequest::get().uri("/transactions/status/ORDER-0000000000000-zzzzzzzz");
    let (status, body) = send_request(req, configure_unknown).await;
    assert_eq!(status, StatusCode::OK);
    let json = serde_json::from_str::<serde_json::Value>(&body).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["payment_status"], "pending");
    assert_eq!(json["data"]["transaction_status"], serde_json::Value::Null);
    assert_eq!(json["data"]["amount"], serde_json::Value::Null);
}

fn register(cfg: &mut ServiceConfig, db: MockReconcilerDb) {
    let api = TransactionFlowApi::new(db, EventProducers::default());
    cfg.service(TransactionStatusRoute::<MockReconcilerDb>::new()).app_data(web::Data::new(api));
}

fn configure_paid(cfg: &mut ServiceConfig) {
    let mut db = MockReconcilerDb::new();
    db.expect_fetch_transaction()
        .returning(|_| Ok(Some(sample_transaction(PaymentStatus::Paid, GatewayStatus::Settlement))));
    register(cfg, db);
}

fn configure_unknown(cfg: &mut ServiceConfig) {
    let mut db = MockReconcilerDb::new();
    db.expect_fetch_transaction().returning(|_| Ok(None));
    register(cfg, db);
}
