use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};

/// Generate a new order code of the form `{PREFIX}-{millis}-{random8}`, e.g. `ORDER-1700000000000-abc12345`.
/// The code is assigned at checkout time and is the canonical key for the transaction from then on.
pub fn new_order_code(prefix: &str) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect::<String>();
    format!("{prefix}-{millis}-{suffix}")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn order_code_shape() {
        let code = new_order_code("ORDER");
        let parts = code.split('-').collect::<Vec<_>>();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORDER");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 8);
    }
}
