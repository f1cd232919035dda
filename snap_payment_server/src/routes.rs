//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. For this reason, any long, non-cpu-bound operation (e.g. I/O,
//! database operations, etc.) should be expressed as futures or asynchronous functions, which get executed
//! concurrently by worker threads and thus don't block execution.

use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use snap_payment_engine::{
    db_types::{NewTransaction, OrderId},
    traits::{ReconcilerDatabase, ReconcilerError},
    TransactionFlowApi,
};
use sps_common::{helpers::new_order_code, Rupiah};

use crate::{
    data_objects::{CheckoutRequest, CheckoutResponse, StatusResponse},
    errors::ServerError,
};

pub const ORDER_CODE_PREFIX: &str = "ORDER";

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Status  ----------------------------------------------------
route!(transaction_status => Get "/transactions/status/{order_id}" impl ReconcilerDatabase);
/// Route handler for the storefront status poller.
///
/// Reads the stored status for the given order code. This never calls the gateway; the webhook and the reconciler
/// keep the row current. An order the server has not seen yet yields a pending-shaped placeholder with a 200, so a
/// poller that races the checkout write sees "still pending" instead of an error.
pub async fn transaction_status<B: ReconcilerDatabase>(
    path: web::Path<OrderId>,
    api: web::Data<TransactionFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET status for transaction [{order_id}]");
    let snapshot = api.status_snapshot(&order_id).await?;
    Ok(HttpResponse::Ok().json(StatusResponse::from(snapshot)))
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl ReconcilerDatabase);
/// Route handler for checkout.
///
/// Creates the pending transaction row that the webhook and reconciler will later resolve. Clients may pass their
/// own order code to make retries idempotent; otherwise a fresh one is generated.
pub async fn checkout<B: ReconcilerDatabase>(
    body: web::Json<CheckoutRequest>,
    api: web::Data<TransactionFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    if request.amount <= 0 {
        return Err(ServerError::InvalidRequestBody(format!("Invalid amount: {}", request.amount)));
    }
    let order_id = request.order_id.unwrap_or_else(|| OrderId(new_order_code(ORDER_CODE_PREFIX)));
    debug!("💻️ POST checkout for transaction [{order_id}]");
    let transaction = NewTransaction::new(order_id, Rupiah::from(request.amount))
        .with_customer(request.customer_name, request.customer_phone);
    let (transaction, inserted) = match api.process_checkout(transaction).await {
        Ok(result) => result,
        Err(ReconcilerError::DatabaseError(e)) => {
            warn!("💻️ Could not store new transaction. {e}");
            return Err(ServerError::BackendError(e));
        },
        Err(e) => return Err(e.into()),
    };
    let response = CheckoutResponse {
        success: true,
        order_id: transaction.order_id,
        payment_status: transaction.payment_status,
        amount: transaction.total_amount,
    };
    let mut builder = if inserted { HttpResponse::Created() } else { HttpResponse::Ok() };
    Ok(builder.json(response))
}
