//! The trait seams of the payment engine.
//!
//! [`ReconcilerDatabase`] is what a storage backend must provide; [`GatewayStatusProvider`] is what a payment gateway
//! client must provide. The engine's [`crate::TransactionFlowApi`] is generic over both, which is also what makes the
//! server's endpoint tests cheap to mock.

mod data_objects;
mod gateway;
mod reconciler_database;

pub use data_objects::{FailedReconciliation, ReconciledTransaction, ReconciliationReport, StatusTransition, StatusUpdate};
pub use gateway::{GatewayLookupError, GatewayStatusProvider, GatewayStatusRecord};
pub use reconciler_database::{ReconcilerDatabase, ReconcilerError};
