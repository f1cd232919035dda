//! API-key middleware for Actix Web.
//!
//! The reconciliation trigger is meant to be called by a cron job or an operator, not by the public. Callers must
//! present the configured key in the `x-api-key` header. Wrap the `/admin` scope with this middleware to enforce it.
//!
//! If no key has been configured, every request is rejected. There is deliberately no "disabled" mode that lets
//! unauthenticated calls through.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorForbidden,
    Error,
};
use futures::future::LocalBoxFuture;
use log::{trace, warn};
use sps_common::Secret;

pub const API_KEY_HEADER: &str = "x-api-key";

pub struct ApiKeyMiddlewareFactory {
    key: Secret<String>,
}

impl ApiKeyMiddlewareFactory {
    pub fn new(key: Secret<String>) -> Self {
        ApiKeyMiddlewareFactory { key }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = ApiKeyMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ApiKeyMiddlewareService { key: self.key.clone(), service: Rc::new(service) }))
    }
}

pub struct ApiKeyMiddlewareService<S> {
    key: Secret<String>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ApiKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let key = self.key.reveal().clone();
        Box::pin(async move {
            trace!("🔐️ Checking API key for request");
            if key.is_empty() {
                warn!("🔐️ No API key is configured. Denying access.");
                return Err(ErrorForbidden("Access denied."));
            }
            let presented = req.headers().get(API_KEY_HEADER).and_then(|v| v.to_str().ok()).ok_or_else(|| {
                warn!("🔐️ No API key found in request. Denying access.");
                ErrorForbidden("No API key found.")
            })?;
            if presented == key {
                trace!("🔐️ API key check for request ✅️");
                service.call(req).await
            } else {
                warn!("🔐️ Invalid API key found in request. Denying access.");
                Err(ErrorForbidden("Invalid API key."))
            }
        })
    }
}
