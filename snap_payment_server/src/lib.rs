//! # Snap payment server
//! This module hosts the HTTP-facing half of the reconciliation subsystem. It is responsible for:
//! Listening for incoming payment notification webhooks from the Midtrans gateway.
//! Serving payment status reads to the storefront's poller.
//! Running the background reconciliation worker and the admin trigger for it.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/payment-notification`: The webhook route for receiving payment notifications from the gateway.
//! * `/transactions/status/{order_id}`: The status read for the storefront poller.
//! * `/checkout`: Creates the pending transaction row at checkout time.
//! * `/admin/update-all-pending-transactions`: Triggers a reconciliation pass. Requires the `x-api-key` header.

pub mod config;
pub mod data_objects;
pub mod errors;
pub mod integrations;
pub mod middleware;
pub mod midtrans_routes;
pub mod reconciler;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
