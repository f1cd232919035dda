use std::env;

use chrono::Duration;
use log::*;
use midtrans_tools::MidtransConfig;
use sps_common::Secret;

const DEFAULT_SPS_HOST: &str = "127.0.0.1";
const DEFAULT_SPS_PORT: u16 = 8360;
const DEFAULT_MAX_TRANSACTION_HOURS: Duration = Duration::hours(72);
const DEFAULT_RECONCILE_INTERVAL_SECS: u64 = 900;
const DEFAULT_RECONCILE_THROTTLE_MS: u64 = 500;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Gateway environment and server key, shared with the reconciliation worker and the webhook signature check.
    pub midtrans: MidtransConfig,
    /// The key that cron jobs and operators must present in the `x-api-key` header on `/admin` calls.
    pub cron_api_key: Secret<String>,
    /// The lookback window for reconciliation. Pending transactions older than this are left alone.
    pub max_transaction_hours: Duration,
    /// How often the background reconciliation worker runs. Zero disables the worker, in which case an external
    /// cron job should hit `/admin/update-all-pending-transactions` instead.
    pub reconcile_interval_secs: u64,
    /// Delay between consecutive gateway status calls during a reconciliation pass.
    pub reconcile_throttle: std::time::Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SPS_HOST.to_string(),
            port: DEFAULT_SPS_PORT,
            database_url: String::default(),
            midtrans: MidtransConfig::default(),
            cron_api_key: Secret::new(String::default()),
            max_transaction_hours: DEFAULT_MAX_TRANSACTION_HOURS,
            reconcile_interval_secs: DEFAULT_RECONCILE_INTERVAL_SECS,
            reconcile_throttle: std::time::Duration::from_millis(DEFAULT_RECONCILE_THROTTLE_MS),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SPS_HOST").ok().unwrap_or_else(|| DEFAULT_SPS_HOST.into());
        let port = env::var("SPS_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SPS_PORT. {e} Using the default, {DEFAULT_SPS_PORT}, instead."
                    );
                    DEFAULT_SPS_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SPS_PORT);
        let database_url = env::var("SPS_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SPS_DATABASE_URL is not set. Please set it to the URL for the payment database.");
            String::default()
        });
        let midtrans = MidtransConfig::new_from_env_or_default();
        let cron_api_key = Secret::new(env::var("CRON_API_KEY").ok().unwrap_or_else(|| {
            warn!("🪛️ CRON_API_KEY is not set. All /admin calls will be rejected until it is configured.");
            String::default()
        }));
        let max_transaction_hours = env::var("MAX_TRANSACTION_HOURS")
            .map_err(|_| {
                info!(
                    "🪛️ MAX_TRANSACTION_HOURS is not set. Using the default value of {} hrs.",
                    DEFAULT_MAX_TRANSACTION_HOURS.num_hours()
                )
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .map(Duration::hours)
                    .map_err(|e| warn!("🪛️ Invalid configuration value for MAX_TRANSACTION_HOURS. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_MAX_TRANSACTION_HOURS);
        let reconcile_interval_secs = env::var("SPS_RECONCILE_INTERVAL_SECS")
            .map_err(|_| {
                info!(
                    "🪛️ SPS_RECONCILE_INTERVAL_SECS is not set. Using the default value of {} s.",
                    DEFAULT_RECONCILE_INTERVAL_SECS
                )
            })
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for SPS_RECONCILE_INTERVAL_SECS. {e}"))
            })
            .ok()
            .unwrap_or(DEFAULT_RECONCILE_INTERVAL_SECS);
        let reconcile_throttle = env::var("SPS_RECONCILE_THROTTLE_MS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid configuration value for SPS_RECONCILE_THROTTLE_MS. {e}"))
                    .ok()
            })
            .map(std::time::Duration::from_millis)
            .unwrap_or(std::time::Duration::from_millis(DEFAULT_RECONCILE_THROTTLE_MS));
        Self {
            host,
            port,
            database_url,
            midtrans,
            cron_api_key,
            max_transaction_hours,
            reconcile_interval_secs,
            reconcile_throttle,
        }
    }
}

//-------------------------------------------  ReconcileOptions  ------------------------------------------------------
/// The subset of the server configuration the reconciliation trigger needs at request time. Kept small and free of
/// secrets so it can be cloned into application data.
#[derive(Clone, Copy, Debug)]
pub struct ReconcileOptions {
    pub default_window: Duration,
    pub throttle: std::time::Duration,
}

impl ReconcileOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { default_window: config.max_transaction_hours, throttle: config.reconcile_throttle }
    }
}
