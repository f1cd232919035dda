use std::time::Duration;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use indicatif::{ProgressBar, ProgressStyle};
use midtrans_tools::{helpers::calculate_signature, MidtransConfig};
use snap_payment_engine::db_types::{OrderId, PaymentStatus};

mod client;
mod formatting;
mod poller;

use client::PaymentServerClient;
use formatting::{format_reconciliation_report, format_status_snapshot};
use poller::{PollState, StatusPoller, DEFAULT_POLL_INTERVAL_SECS};

#[derive(Parser, Debug)]
#[command(version = "1.0.0", about = "Operator tools for the Snap payment server")]
pub struct Arguments {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll the server until a payment resolves
    #[clap(name = "watch")]
    Watch(WatchParams),
    /// Fetch the current status of a transaction once
    #[clap(name = "status")]
    Status {
        /// The order code to query
        order_id: OrderId,
    },
    /// Trigger a reconciliation pass on the server (requires CRON_API_KEY)
    #[clap(name = "reconcile")]
    Reconcile {
        /// Lookback window in hours. Uses the server default when omitted.
        #[arg(short = 'w', long = "hours")]
        hours: Option<i64>,
    },
    /// Compute the webhook signature for a notification, e.g. to craft test deliveries
    #[clap(name = "sign")]
    Sign(SignParams),
    /// Check that the server is up
    #[clap(name = "health")]
    Health,
}

#[derive(Debug, Args)]
pub struct WatchParams {
    /// The order code to watch
    order_id: OrderId,
    /// Seconds between polls. Falls back to SPS_POLL_INTERVAL_SECS, then to the default of 5.
    #[arg(short = 'i', long = "interval")]
    interval: Option<u64>,
}

#[derive(Debug, Args)]
pub struct SignParams {
    /// The order code of the notification
    #[arg(short = 'o', long = "order")]
    order_id: String,
    /// The gateway status code ("200" for settlements)
    #[arg(short = 'c', long = "code", default_value = "200")]
    status_code: String,
    /// The gross amount exactly as it appears on the wire, e.g. "150000.00"
    #[arg(short = 'a', long = "amount")]
    gross_amount: String,
    /// The server key. Falls back to the MIDTRANS_SERVER_KEY environment variables.
    #[arg(short = 'k', long = "key")]
    server_key: Option<String>,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    let cli = Arguments::parse();
    let result = match cli.command {
        Command::Watch(params) => watch(params).await,
        Command::Status { order_id } => status(order_id).await,
        Command::Reconcile { hours } => reconcile(hours).await,
        Command::Sign(params) => sign(params),
        Command::Health => health().await,
    };
    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

async fn watch(params: WatchParams) -> Result<()> {
    let client = PaymentServerClient::from_env_or_default()?;
    let interval = params
        .interval
        .or_else(|| std::env::var("SPS_POLL_INTERVAL_SECS").ok().and_then(|s| s.parse().ok()))
        .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
    println!("Watching {} on {} (every {interval} s). Ctrl-C to stop.", params.order_id, client.server());
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner.set_message("Waiting for the first status...");
    let mut poller = StatusPoller::new(client, Duration::from_secs(interval));
    let state = poller
        .run(&params.order_id, |snapshot| {
            let method = snapshot.payment_method.as_deref().unwrap_or("method not known yet");
            spinner.set_message(format!("{} ({method})", snapshot.payment_status));
        })
        .await;
    spinner.finish_and_clear();
    match state {
        PollState::Resolved(PaymentStatus::Paid) => println!("✅️ Payment for {} confirmed.", params.order_id),
        PollState::Resolved(status) => println!("❌️ Payment for {} ended as {status}.", params.order_id),
        PollState::Abandoned => println!("❓️ Status unknown, refresh to check."),
        PollState::Idle | PollState::Polling => {},
    }
    Ok(())
}

async fn status(order_id: OrderId) -> Result<()> {
    let client = PaymentServerClient::from_env_or_default()?;
    let snapshot = client.transaction_status(&order_id).await?;
    println!("{}", format_status_snapshot(&snapshot)?);
    Ok(())
}

async fn reconcile(hours: Option<i64>) -> Result<()> {
    let client = PaymentServerClient::from_env_or_default()?;
    println!("Triggering a reconciliation pass on {}...", client.server());
    let report = client.reconcile(hours).await?;
    println!("{}", format_reconciliation_report(&report)?);
    Ok(())
}

fn sign(params: SignParams) -> Result<()> {
    let key = params.server_key.unwrap_or_else(|| {
        let config = MidtransConfig::new_from_env_or_default();
        config.server_key.reveal().clone()
    });
    let signature = calculate_signature(&params.order_id, &params.status_code, &params.gross_amount, &key);
    println!("{signature}");
    Ok(())
}

async fn health() -> Result<()> {
    let client = PaymentServerClient::from_env_or_default()?;
    let response = client.health().await?;
    println!("Server at {} says: {response}", client.server());
    Ok(())
}
