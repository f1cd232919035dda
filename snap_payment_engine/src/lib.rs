//! Snap Payment Engine
//!
//! Core logic for reconciling locally stored payment statuses with the Midtrans gateway's authoritative records.
//! The engine is transport-agnostic: it does not know about HTTP or about Midtrans' REST shapes. Those live in the
//! server crate and in `midtrans_tools` respectively.
//!
//! The library is divided into three main sections:
//! 1. Database management ([`mod@sqlite`]). SQLite is the only supported backend at present. Callers should never
//!    touch the database directly; the data types in [`mod@db_types`] are public, the queries are not.
//! 2. The reconciliation API ([`mod@rec_api`]). This is where gateway status updates are applied to transactions,
//!    where status reads are served, and where the out-of-band reconciliation pass lives. Backends implement the
//!    traits in [`mod@traits`] to plug in.
//! 3. Event hooks ([`mod@events`]). When a transaction reaches a terminal status, an event is emitted. Side effects
//!    such as invoice generation and customer notification subscribe to these events and run fire-and-forget, so
//!    they can never delay or fail a webhook response.

pub mod db_types;
pub mod events;
mod rec_api;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use rec_api::{status_objects, TransactionFlowApi};
