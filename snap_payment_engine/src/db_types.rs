use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use sps_common::Rupiah;
use thiserror::Error;

//--------------------------------------        OrderId        -------------------------------------------------------
/// The externally visible transaction code, generated at checkout time as `{PREFIX}-{millis}-{random}`. This is the
/// canonical key for a transaction; the gateway's own transaction id is stored for audit but never used for lookups.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------     PaymentStatus     -------------------------------------------------------
/// The internal payment status taxonomy. `Paid` and `Failed` are terminal: once a transaction reaches either, no
/// write may move it back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PaymentStatus::Paid | PaymentStatus::Failed)
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Paid => write!(f, "paid"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid payment status: {0}")]
pub struct ConversionError(String);

impl FromStr for PaymentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

impl From<String> for PaymentStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid payment status: {value}. But this conversion cannot fail. Defaulting to pending");
            PaymentStatus::Pending
        })
    }
}

//--------------------------------------     GatewayStatus     -------------------------------------------------------
/// The gateway's richer status vocabulary. Unrecognised values are preserved verbatim in `Other` rather than being
/// rejected, so that a new upstream status can never make a notification undeliverable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayStatus {
    Pending,
    Settlement,
    Capture,
    Deny,
    Cancel,
    Expire,
    #[serde(untagged)]
    Other(String),
}

impl GatewayStatus {
    /// The fixed, total mapping from the gateway vocabulary to the internal taxonomy. Shared by the webhook path and
    /// the reconciler so the two can never disagree.
    pub fn payment_status(&self) -> PaymentStatus {
        match self {
            GatewayStatus::Settlement | GatewayStatus::Capture => PaymentStatus::Paid,
            GatewayStatus::Deny | GatewayStatus::Cancel | GatewayStatus::Expire => PaymentStatus::Failed,
            GatewayStatus::Pending | GatewayStatus::Other(_) => PaymentStatus::Pending,
        }
    }

    /// True for statuses after which the gateway will report no further changes.
    pub fn is_terminal(&self) -> bool {
        self.payment_status().is_terminal()
    }
}

impl Display for GatewayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayStatus::Pending => write!(f, "pending"),
            GatewayStatus::Settlement => write!(f, "settlement"),
            GatewayStatus::Capture => write!(f, "capture"),
            GatewayStatus::Deny => write!(f, "deny"),
            GatewayStatus::Cancel => write!(f, "cancel"),
            GatewayStatus::Expire => write!(f, "expire"),
            GatewayStatus::Other(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for GatewayStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = match s.to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "settlement" => Self::Settlement,
            "capture" => Self::Capture,
            "deny" => Self::Deny,
            "cancel" => Self::Cancel,
            "expire" => Self::Expire,
            _ => Self::Other(s.to_string()),
        };
        Ok(status)
    }
}

impl From<String> for GatewayStatus {
    fn from(value: String) -> Self {
        value.parse().expect("GatewayStatus conversion is infallible")
    }
}

#[cfg(feature = "sqlite")]
impl sqlx::Type<sqlx::Sqlite> for GatewayStatus {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <String as sqlx::Type<sqlx::Sqlite>>::type_info()
    }
}

#[cfg(feature = "sqlite")]
impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for GatewayStatus {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> sqlx::encode::IsNull {
        <String as sqlx::Encode<'q, sqlx::Sqlite>>::encode(self.to_string(), buf)
    }
}

#[cfg(feature = "sqlite")]
impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for GatewayStatus {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <&str as sqlx::Decode<'r, sqlx::Sqlite>>::decode(value)?;
        Ok(s.parse().expect("GatewayStatus conversion is infallible"))
    }
}

//--------------------------------------      Transaction      -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub order_id: OrderId,
    /// The gateway's own transaction id, echoed back by notifications. Audit only.
    pub gateway_transaction_id: Option<String>,
    pub payment_status: PaymentStatus,
    pub gateway_status: GatewayStatus,
    /// The payment instrument reported by the gateway (bank transfer, e-wallet, ...). Unknown until the first
    /// notification arrives.
    pub payment_method: Option<String>,
    pub total_amount: Rupiah,
    pub customer_name: String,
    pub customer_phone: String,
    pub invoice_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------    NewTransaction     -------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    /// The transaction code assigned at checkout
    pub order_id: OrderId,
    /// The total price of the order. Immutable after creation.
    pub total_amount: Rupiah,
    pub customer_name: String,
    pub customer_phone: String,
}

impl NewTransaction {
    pub fn new(order_id: OrderId, total_amount: Rupiah) -> Self {
        Self { order_id, total_amount, customer_name: String::default(), customer_phone: String::default() }
    }

    pub fn with_customer<S: Into<String>>(mut self, name: S, phone: S) -> Self {
        self.customer_name = name.into();
        self.customer_phone = phone.into();
        self
    }
}

//--------------------------------------     WebhookLogEntry   -------------------------------------------------------
/// One row per raw notification received, including ones that failed the signature check. Forensics only; nothing in
/// the control flow reads this table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WebhookLogEntry {
    pub id: i64,
    pub order_id: OrderId,
    pub gateway_transaction_id: Option<String>,
    pub transaction_status: String,
    pub status_code: String,
    pub gross_amount: String,
    pub payment_type: Option<String>,
    pub fraud_status: Option<String>,
    pub signature_valid: bool,
    pub payload: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWebhookLog {
    pub order_id: OrderId,
    pub gateway_transaction_id: Option<String>,
    pub transaction_status: String,
    pub status_code: String,
    pub gross_amount: String,
    pub payment_type: Option<String>,
    pub fraud_status: Option<String>,
    pub signature_valid: bool,
    pub payload: String,
}
