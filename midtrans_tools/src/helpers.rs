use sha2::{Digest, Sha512};

use crate::MidtransApiError;

/// Calculates the Midtrans notification signature: `sha512(order_id + status_code + gross_amount + server_key)`,
/// hex-encoded. The gateway computes the digest over the raw payload strings, so the caller must pass `gross_amount`
/// exactly as it appears on the wire (e.g. "150000.00").
pub fn calculate_signature(order_id: &str, status_code: &str, gross_amount: &str, server_key: &str) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Midtrans quotes amounts as floating point numbers expressed as strings ("150000.00"). The marketplace only deals
/// in whole rupiah, so the fractional part is dropped.
pub fn parse_gross_amount(amount: &str) -> Result<i64, MidtransApiError> {
    let mut parts = amount.split('.');
    let whole_units = parts
        .next()
        .ok_or_else(|| MidtransApiError::InvalidCurrencyAmount(amount.to_string()))?
        .parse::<i64>()
        .map_err(|e| MidtransApiError::InvalidCurrencyAmount(format!("Invalid amount value: {amount}. {e}.")))?;
    if let Some(frac) = parts.next() {
        frac.parse::<i64>()
            .map_err(|e| MidtransApiError::InvalidCurrencyAmount(format!("Invalid amount value: {amount}. {e}.")))?;
    }
    Ok(whole_units)
}
