use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::Duration;
use snap_payment_engine::{
    db_types::{GatewayStatus, PaymentStatus},
    events::EventProducers,
    traits::{GatewayStatusRecord, StatusTransition},
    TransactionFlowApi,
};
use sps_common::Secret;

use super::{
    helpers::send_request,
    mocks::{sample_transaction, MockGateway, MockReconcilerDb, TEST_ORDER},
};
use crate::{
    config::ReconcileOptions,
    data_objects::ReconcileResponse,
    middleware::ApiKeyMiddlewareFactory,
    midtrans_routes::ReconcileRoute,
};

const CRON_KEY: &str = "cron-test-key";

#[actix_web::test]
async fn reconcile_without_a_key_is_forbidden() {
    let req = TestRequest::get().uri("/admin/update-all-pending-transactions");
    let (status, _) = send_request(req, configure_idle).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn reconcile_with_the_wrong_key_is_forbidden() {
    let req =
        TestRequest::get().uri("/admin/update-all-pending-transactions").insert_header(("x-api-key", "not-the-key"));
    let (status, _) = send_request(req, configure_idle).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn reconcile_runs_a_pass_and_returns_the_report() {
    let req = TestRequest::get().uri("/admin/update-all-pending-transactions").insert_header(("x-api-key", CRON_KEY));
    let (status, body) = send_request(req, configure_one_settlement).await;
    assert_eq!(status, StatusCode::OK);
    let report = serde_json::from_str::<ReconcileResponse>(&body).unwrap().data;
    assert_eq!(report.total, 1);
    assert_eq!(report.updated, 1);
    assert!(report.is_consistent());
    assert_eq!(report.updated_transactions[0].order_id.as_str(), TEST_ORDER);
}

#[actix_web::test]
async fn reconcile_rejects_a_non_positive_window() {
    let req = TestRequest::get()
        .uri("/admin/update-all-pending-transactions?hours=-4")
        .insert_header(("x-api-key", CRON_KEY));
    let (status, _) = send_request(req, configure_idle).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn register(cfg: &mut ServiceConfig, db: MockReconcilerDb, gateway: MockGateway) {
    let api = TransactionFlowApi::new(db, EventProducers::default());
    let options = ReconcileOptions { default_window: Duration::hours(72), throttle: std::time::Duration::ZERO };
    cfg.service(
        web::scope("/admin")
            .wrap(ApiKeyMiddlewareFactory::new(Secret::new(CRON_KEY.to_string())))
            .service(ReconcileRoute::<MockReconcilerDb, MockGateway>::new()),
    )
    .app_data(web::Data::new(api))
    .app_data(web::Data::new(gateway))
    .app_data(web::Data::new(options));
}

fn configure_idle(cfg: &mut ServiceConfig) {
    register(cfg, MockReconcilerDb::new(), MockGateway::new());
}

fn configure_one_settlement(cfg: &mut ServiceConfig) {
    let mut db = MockReconcilerDb::new();
    db.expect_fetch_pending_transactions()
        .times(1)
        .returning(|_| Ok(vec![sample_transaction(PaymentStatus::Pending, GatewayStatus::Pending)]));
    db.expect_apply_status_update().times(1).returning(|_| {
        Ok(StatusTransition {
            old_status: PaymentStatus::Pending,
            transaction: sample_transaction(PaymentStatus::Paid, GatewayStatus::Settlement),
        })
    });
    let mut gateway = MockGateway::new();
    gateway.expect_status_for_order().times(1).returning(|_| {
        Ok(GatewayStatusRecord {
            status: GatewayStatus::Settlement,
            payment_type: Some("bank_transfer".to_string()),
            gateway_transaction_id: None,
        })
    });
    register(cfg, db, gateway);
}
