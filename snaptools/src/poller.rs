//! The payment status poller behind `snaptools watch`.
//!
//! The poller asks the server (never the gateway directly) for the transaction's status on a fixed interval until
//! the payment resolves. Requests are awaited sequentially, so at most one request is ever in flight; a tick that
//! fires while a slow request is still running is skipped, not queued.

use anyhow::Result;
use log::{debug, warn};
use snap_payment_engine::{
    db_types::{OrderId, PaymentStatus},
    status_objects::StatusSnapshot,
};

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
/// Consecutive request failures tolerated before the poller gives up.
pub const DEFAULT_FAILURE_BUDGET: u32 = 5;

/// Where the poller gets its snapshots from. Production uses [`crate::client::PaymentServerClient`].
#[allow(async_fn_in_trait)]
pub trait StatusSource {
    async fn fetch_status(&self, order_id: &OrderId) -> Result<StatusSnapshot>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollState {
    /// Not started yet.
    Idle,
    /// Actively polling; the payment is still pending.
    Polling,
    /// The payment reached a terminal status.
    Resolved(PaymentStatus),
    /// Too many consecutive request failures. The payment's fate is unknown; a fresh query will tell.
    Abandoned,
}

pub struct StatusPoller<S> {
    source: S,
    interval: std::time::Duration,
    failure_budget: u32,
    state: PollState,
}

impl<S: StatusSource> StatusPoller<S> {
    pub fn new(source: S, interval: std::time::Duration) -> Self {
        Self { source, interval, failure_budget: DEFAULT_FAILURE_BUDGET, state: PollState::Idle }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Polls until the payment resolves or the failure budget runs out, invoking `on_update` with every snapshot
    /// received along the way (so the UI can show the payment method once the gateway reports it). Dropping the
    /// returned future simply stops the polling; there is no state to clean up.
    pub async fn run<F: FnMut(&StatusSnapshot)>(&mut self, order_id: &OrderId, mut on_update: F) -> PollState {
        self.state = PollState::Polling;
        let mut failures = 0u32;
        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            timer.tick().await;
            match self.source.fetch_status(order_id).await {
                Ok(snapshot) => {
                    failures = 0;
                    debug!("🔎️ [{order_id}] is {}", snapshot.payment_status);
                    on_update(&snapshot);
                    if snapshot.is_terminal() {
                        self.state = PollState::Resolved(snapshot.payment_status);
                        break;
                    }
                },
                Err(e) => {
                    failures += 1;
                    warn!("🔎️ Status request {failures}/{} for [{order_id}] failed. {e}", self.failure_budget);
                    if failures >= self.failure_budget {
                        self.state = PollState::Abandoned;
                        break;
                    }
                },
            }
        }
        self.state.clone()
    }
}

#[cfg(test)]
mod test {
    use std::{
        collections::VecDeque,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Mutex,
        },
    };

    use anyhow::anyhow;
    use snap_payment_engine::db_types::GatewayStatus;
    use sps_common::Rupiah;

    use super::*;

    /// Plays back a canned sequence of responses and counts how many requests were actually made.
    struct ScriptedSource {
        script: Mutex<VecDeque<Result<StatusSnapshot>>>,
        requests: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<StatusSnapshot>>) -> Self {
            Self { script: Mutex::new(script.into_iter().collect()), requests: AtomicUsize::new(0) }
        }

        fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    impl StatusSource for &ScriptedSource {
        async fn fetch_status(&self, _order_id: &OrderId) -> Result<StatusSnapshot> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            self.script.lock().unwrap().pop_front().expect("Poller requested more statuses than were scripted")
        }
    }

    fn order_id() -> OrderId {
        "ORDER-1700000000000-abc12345".parse().unwrap()
    }

    fn snapshot(gateway_status: GatewayStatus, method: Option<&str>) -> Result<StatusSnapshot> {
        let mut snap = StatusSnapshot::placeholder(order_id());
        snap.payment_status = gateway_status.payment_status();
        snap.transaction_status = Some(gateway_status);
        snap.payment_method = method.map(String::from);
        snap.amount = Some(Rupiah::from(150_000));
        Ok(snap)
    }

    fn failure() -> Result<StatusSnapshot> {
        Err(anyhow!("connection refused"))
    }

    fn poller(source: &ScriptedSource) -> StatusPoller<&ScriptedSource> {
        StatusPoller::new(source, std::time::Duration::from_millis(1))
    }

    #[tokio::test]
    async fn resolves_on_settlement() {
        let source = ScriptedSource::new(vec![
            snapshot(GatewayStatus::Pending, None),
            snapshot(GatewayStatus::Pending, Some("bank_transfer")),
            snapshot(GatewayStatus::Settlement, Some("bank_transfer")),
        ]);
        let mut seen_methods = Vec::new();
        let state = poller(&source)
            .run(&order_id(), |snap| seen_methods.push(snap.payment_method.clone()))
            .await;
        assert_eq!(state, PollState::Resolved(PaymentStatus::Paid));
        assert_eq!(source.requests(), 3);
        // The displayed payment method fills in as the gateway learns it
        assert_eq!(seen_methods, vec![None, Some("bank_transfer".to_string()), Some("bank_transfer".to_string())]);
    }

    #[tokio::test]
    async fn expiry_resolves_as_failed() {
        let source = ScriptedSource::new(vec![
            snapshot(GatewayStatus::Pending, None),
            snapshot(GatewayStatus::Expire, None),
        ]);
        let state = poller(&source).run(&order_id(), |_| {}).await;
        assert_eq!(state, PollState::Resolved(PaymentStatus::Failed));
    }

    #[tokio::test]
    async fn five_consecutive_failures_abandon_the_poll() {
        // A sixth (scripted) response exists; reaching it would panic the script, proving no request follows the fifth
        // failure.
        let source = ScriptedSource::new(vec![
            failure(),
            failure(),
            failure(),
            failure(),
            failure(),
            snapshot(GatewayStatus::Settlement, None),
        ]);
        let state = poller(&source).run(&order_id(), |_| {}).await;
        assert_eq!(state, PollState::Abandoned);
        assert_eq!(source.requests(), 5);
    }

    #[tokio::test]
    async fn a_success_resets_the_failure_budget() {
        let mut script = vec![failure(), failure(), failure(), failure()];
        script.push(snapshot(GatewayStatus::Pending, None));
        script.extend([failure(), failure(), failure(), failure()]);
        script.push(snapshot(GatewayStatus::Settlement, Some("qris")));
        let source = ScriptedSource::new(script);
        let state = poller(&source).run(&order_id(), |_| {}).await;
        assert_eq!(state, PollState::Resolved(PaymentStatus::Paid));
        assert_eq!(source.requests(), 10);
    }

    #[tokio::test]
    async fn poller_starts_idle() {
        let source = ScriptedSource::new(vec![]);
        let p = poller(&source);
        assert_eq!(*p.state(), PollState::Idle);
    }
}
