use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use midtrans_tools::MidtransApi;
use snap_payment_engine::{
    events::{EventHandlers, EventHooks, EventProducers},
    traits::ReconcilerDatabase,
    SqliteDatabase,
    TransactionFlowApi,
};

use crate::{
    config::{ReconcileOptions, ServerConfig},
    errors::ServerError,
    integrations::midtrans::MidtransGateway,
    middleware::ApiKeyMiddlewareFactory,
    midtrans_routes::{PaymentWebhookRoute, ReconcileRoute},
    reconciler::start_reconcile_worker,
    routes::{health, CheckoutRoute, TransactionStatusRoute},
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let handlers = EventHandlers::new(10, default_hooks(db.clone()));
    let producers = handlers.producers();
    handlers.start_handlers().await;
    let gateway = MidtransGateway::new(
        MidtransApi::new(config.midtrans.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?,
    );
    if config.reconcile_interval_secs > 0 {
        start_reconcile_worker(
            db.clone(),
            producers.clone(),
            gateway.clone(),
            config.max_transaction_hours,
            Duration::from_secs(config.reconcile_interval_secs),
            config.reconcile_throttle,
        );
    } else {
        info!("🕰️ Reconciliation worker is disabled. Trigger passes via /admin/update-all-pending-transactions instead.");
    }
    let srv = create_server_instance(config, db, producers, gateway)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    producers: EventProducers,
    gateway: MidtransGateway,
) -> Result<Server, ServerError> {
    let bind_addr = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let flow_api = TransactionFlowApi::new(db.clone(), producers.clone());
        let reconcile_options = ReconcileOptions::from_config(&config);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("sps::access_log"))
            .app_data(web::Data::new(flow_api))
            .app_data(web::Data::new(config.midtrans.clone()))
            .app_data(web::Data::new(gateway.clone()))
            .app_data(web::Data::new(reconcile_options));
        let admin_scope = web::scope("/admin")
            .wrap(ApiKeyMiddlewareFactory::new(config.cron_api_key.clone()))
            .service(ReconcileRoute::<SqliteDatabase, MidtransGateway>::new());
        app.service(health)
            .service(PaymentWebhookRoute::<SqliteDatabase>::new())
            .service(TransactionStatusRoute::<SqliteDatabase>::new())
            .service(CheckoutRoute::<SqliteDatabase>::new())
            .service(admin_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind(bind_addr)?
    .run();
    Ok(srv)
}

/// The production side effects for terminal transitions. Both run fire-and-forget in the event handler task; a
/// failure here is logged and never reaches the webhook response.
fn default_hooks(db: SqliteDatabase) -> EventHooks {
    let mut hooks = EventHooks::default();
    let invoice_db = db;
    hooks.on_transaction_paid(move |ev| {
        let db = invoice_db.clone();
        Box::pin(async move {
            let order_id = ev.transaction.order_id.clone();
            info!(
                "📬️ Payment confirmed for [{order_id}]. Notifying {} and generating the invoice.",
                ev.transaction.customer_name
            );
            let url = format!("/invoices/{}.pdf", order_id.as_str());
            match db.set_invoice_url(&order_id, &url).await {
                Ok(()) => debug!("📬️ Invoice for [{order_id}] recorded at {url}"),
                Err(e) => warn!("📬️ Could not record the invoice for [{order_id}]. {e}"),
            }
        })
    });
    hooks.on_transaction_failed(move |ev| {
        Box::pin(async move {
            info!(
                "📬️ Payment for [{}] ended as {}. Notifying {}.",
                ev.transaction.order_id, ev.transaction.gateway_status, ev.transaction.customer_name
            );
        })
    });
    hooks
}
