//----------------------------------------------   Webhook  ----------------------------------------------------

use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, info, trace, warn};
use midtrans_tools::{
    helpers::{calculate_signature, parse_gross_amount},
    MidtransConfig,
    PaymentNotification,
};
use snap_payment_engine::{
    db_types::{GatewayStatus, NewWebhookLog, OrderId},
    traits::{GatewayStatusProvider, ReconcilerDatabase, ReconcilerError, StatusUpdate},
    TransactionFlowApi,
};
use sps_common::Rupiah;

use crate::{
    config::ReconcileOptions,
    data_objects::{JsonResponse, ReconcileParams, ReconcileResponse},
    errors::ServerError,
    route,
};

route!(payment_webhook => Post "/payment-notification" impl ReconcilerDatabase);
/// Route handler for the gateway's payment notification webhook.
///
/// The response is always a 200, whatever happens while processing, because any non-2xx makes the gateway re-deliver
/// the notification. A signature or amount mismatch is acknowledged exactly like a processed delivery; the log and
/// the audit trail carry the difference, not the response body.
pub async fn payment_webhook<B>(
    req: HttpRequest,
    body: web::Json<PaymentNotification>,
    api: web::Data<TransactionFlowApi<B>>,
    config: web::Data<MidtransConfig>,
) -> HttpResponse
where
    B: ReconcilerDatabase,
{
    trace!("📬️ Received webhook request: {}", req.uri());
    let note = body.into_inner();
    let expected = calculate_signature(&note.order_id, &note.status_code, &note.gross_amount, config.server_key.reveal());
    let signature_valid = expected.eq_ignore_ascii_case(&note.signature_key);
    let order_id = OrderId::from(note.order_id.clone());
    // The audit row is written before anything can bail out, bad signature included
    let log = NewWebhookLog {
        order_id: order_id.clone(),
        gateway_transaction_id: note.transaction_id.clone(),
        transaction_status: note.transaction_status.clone(),
        status_code: note.status_code.clone(),
        gross_amount: note.gross_amount.clone(),
        payment_type: note.payment_type.clone(),
        fraud_status: note.fraud_status.clone(),
        signature_valid,
        payload: serde_json::to_string(&note).unwrap_or_default(),
    };
    if let Err(e) = api.record_webhook(log).await {
        warn!("📬️ Could not write webhook audit log for [{order_id}]. {e}");
    }
    let result = if signature_valid {
        apply_notification(note, order_id, &api).await
    } else {
        // Logged and audited, but acknowledged like any other delivery so the caller learns nothing
        warn!("📬️ Webhook signature mismatch for [{order_id}]. Notification ignored.");
        JsonResponse::success("Notification received.")
    };
    HttpResponse::Ok().json(result)
}

async fn apply_notification<B: ReconcilerDatabase>(
    note: PaymentNotification,
    order_id: OrderId,
    api: &TransactionFlowApi<B>,
) -> JsonResponse {
    // The amount on the notification must agree with the stored row before any status change is applied
    match parse_gross_amount(&note.gross_amount) {
        Ok(amount) => {
            if let Ok(snapshot) = api.status_snapshot(&order_id).await {
                if snapshot.amount.is_some_and(|expected| expected != Rupiah::from(amount)) {
                    warn!(
                        "📬️ Gross amount mismatch for [{order_id}]: notification says {amount}, the row says {}. \
                         Status change ignored.",
                        snapshot.amount.unwrap_or_default()
                    );
                    return JsonResponse::success("Notification received.");
                }
            }
        },
        Err(e) => warn!("📬️ Unreadable gross_amount on the notification for [{order_id}]. {e}"),
    }
    let gateway_status = GatewayStatus::from(note.transaction_status);
    let mut update = StatusUpdate::new(order_id.clone(), gateway_status);
    update.payment_type = note.payment_type;
    update.gateway_transaction_id = note.transaction_id;
    match api.process_status_update(update).await {
        Ok(transition) if transition.is_transition() => {
            info!(
                "📬️ Webhook moved [{order_id}] from {} to {}.",
                transition.old_status, transition.transaction.payment_status
            );
            JsonResponse::success("Notification processed.")
        },
        Ok(transition) => {
            info!(
                "📬️ Webhook for [{order_id}] was a no-op. Status remains {}.",
                transition.transaction.payment_status
            );
            JsonResponse::success("Notification already processed.")
        },
        Err(ReconcilerError::TransactionNotFound(_)) => {
            // The gateway can beat the checkout write; its retry will land once the row exists
            info!("📬️ Webhook for unknown transaction [{order_id}]. Awaiting checkout write.");
            JsonResponse::failure("Unknown order.")
        },
        Err(e) => {
            warn!("📬️ Could not process webhook for [{order_id}]. {e}");
            JsonResponse::failure("Unexpected error handling notification.")
        },
    }
}

//----------------------------------------------   Reconcile  ----------------------------------------------------
route!(reconcile => Get "/update-all-pending-transactions" impl ReconcilerDatabase, GatewayStatusProvider);
/// Route handler for the manual/cron reconciliation trigger.
///
/// Mounted under the `/admin` scope, behind the API-key middleware. Runs one reconciliation pass over pending
/// transactions inside the lookback window (the `hours` query parameter overrides the configured default) and
/// returns the pass report.
pub async fn reconcile<BDb, BGw>(
    query: web::Query<ReconcileParams>,
    api: web::Data<TransactionFlowApi<BDb>>,
    gateway: web::Data<BGw>,
    options: web::Data<ReconcileOptions>,
) -> Result<HttpResponse, ServerError>
where
    BDb: ReconcilerDatabase,
    BGw: GatewayStatusProvider,
{
    let window = match query.hours {
        Some(h) if h > 0 => chrono::Duration::hours(h),
        Some(h) => {
            return Err(ServerError::InvalidRequestPath(format!("Invalid lookback window: {h} hours")));
        },
        None => options.default_window,
    };
    debug!("💻️ GET reconcile over the last {} h", window.num_hours());
    let report = api
        .reconcile_pending(gateway.get_ref(), window, options.throttle)
        .await
        .map_err(|e| ServerError::BackendError(e.to_string()))?;
    Ok(HttpResponse::Ok().json(ReconcileResponse::from(report)))
}
