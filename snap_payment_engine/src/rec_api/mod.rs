mod flow_api;
pub mod status_objects;

pub use flow_api::TransactionFlowApi;
