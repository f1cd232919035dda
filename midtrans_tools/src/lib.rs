mod api;
mod config;
mod error;

mod data_objects;

pub mod helpers;

pub use api::MidtransApi;
pub use config::{MidtransConfig, MidtransEnvironment};
pub use data_objects::{PaymentNotification, TransactionStatusResponse};
pub use error::MidtransApiError;
