use log::*;
use sps_common::Secret;

const SANDBOX_API_URL: &str = "https://api.sandbox.midtrans.com";
const PRODUCTION_API_URL: &str = "https://api.midtrans.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MidtransEnvironment {
    #[default]
    Sandbox,
    Production,
}

#[derive(Debug, Clone, Default)]
pub struct MidtransConfig {
    pub environment: MidtransEnvironment,
    pub server_key: Secret<String>,
}

impl MidtransConfig {
    pub fn new_from_env_or_default() -> Self {
        let environment = match std::env::var("MIDTRANS_ENVIRONMENT").map(|s| s.to_lowercase()) {
            Ok(s) if s == "production" => MidtransEnvironment::Production,
            Ok(s) if s == "sandbox" => MidtransEnvironment::Sandbox,
            _ => {
                warn!("MIDTRANS_ENVIRONMENT not set, using 'sandbox' as default");
                MidtransEnvironment::Sandbox
            },
        };
        // The environment-specific key wins over the generic one, so that both can live in the same .env file.
        let specific_key = match environment {
            MidtransEnvironment::Sandbox => std::env::var("MIDTRANS_SERVER_KEY_SANDBOX"),
            MidtransEnvironment::Production => std::env::var("MIDTRANS_SERVER_KEY_PRODUCTION"),
        };
        let server_key = Secret::new(specific_key.or_else(|_| std::env::var("MIDTRANS_SERVER_KEY")).unwrap_or_else(
            |_| {
                warn!("MIDTRANS_SERVER_KEY not set, using (probably useless) default");
                "SB-Mid-server-00000000000000".to_string()
            },
        ));
        Self { environment, server_key }
    }

    pub fn base_url(&self) -> &'static str {
        match self.environment {
            MidtransEnvironment::Sandbox => SANDBOX_API_URL,
            MidtransEnvironment::Production => PRODUCTION_API_URL,
        }
    }
}
