//! Continuous execution sessions
//!
//! A session polls gas estimation for a frozen call until the node accepts
//! it, then submits the transaction exactly once. Estimation failure is the
//! viability probe: a method that would revert fails to estimate, so the
//! session keeps waiting; the first successful estimate triggers submission.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use wirecall_primitives::H256;

use crate::gas;
use crate::transport::Transport;
use crate::types::CallRequest;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created but not yet polling
    Idle,
    /// Waiting for a successful gas estimate
    Polling,
    /// Estimate accepted, submitting the transaction
    Executing,
    /// Transaction submitted
    Succeeded,
    /// Stopped by request before submission
    Stopped,
    /// Submission was attempted and failed; the session does not retry
    Failed,
}

impl SessionState {
    /// Whether the session has finished in this state
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionState::Succeeded | SessionState::Stopped | SessionState::Failed
        )
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<SessionState>,
    last_error: Mutex<Option<String>>,
    tx_hash: Mutex<Option<H256>>,
    stop_requested: AtomicBool,
    stop: Notify,
}

impl Shared {
    fn set_state(&self, state: SessionState) {
        *lock(&self.state) = state;
    }

    fn set_error(&self, message: String) {
        *lock(&self.last_error) = Some(message);
    }
}

// A poisoned lock still holds a usable value; the writers store plain data
// and cannot leave it half-updated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Clears the owning engine's single-session flag when the session task ends
pub(crate) struct ActiveGuard(Arc<AtomicBool>);

impl ActiveGuard {
    pub(crate) fn new(flag: Arc<AtomicBool>) -> Self {
        Self(flag)
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Handle to a running continuous execution session
#[derive(Debug)]
pub struct SessionHandle {
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Current session state
    pub fn state(&self) -> SessionState {
        *lock(&self.shared.state)
    }

    /// Most recent estimation or submission error message, if any
    pub fn last_error(&self) -> Option<String> {
        lock(&self.shared.last_error).clone()
    }

    /// Hash of the submitted transaction, once the session has succeeded
    pub fn tx_hash(&self) -> Option<H256> {
        *lock(&self.shared.tx_hash)
    }

    /// Request a cooperative stop.
    ///
    /// Takes effect between ticks; a submission already in flight is not
    /// interrupted and the session finishes as Succeeded or Failed.
    pub fn stop(&self) {
        self.shared.stop_requested.store(true, Ordering::SeqCst);
        self.shared.stop.notify_one();
    }

    /// Wait for the session to finish and return its final state
    pub async fn wait(self) -> SessionState {
        let SessionHandle { shared, task } = self;
        if task.await.is_err() {
            shared.set_state(SessionState::Failed);
        }
        let state = *lock(&shared.state);
        state
    }
}

pub(crate) fn spawn(
    transport: Arc<dyn Transport>,
    method_name: String,
    request: CallRequest,
    interval: Duration,
    guard: ActiveGuard,
) -> SessionHandle {
    let shared = Arc::new(Shared {
        state: Mutex::new(SessionState::Idle),
        last_error: Mutex::new(None),
        tx_hash: Mutex::new(None),
        stop_requested: AtomicBool::new(false),
        stop: Notify::new(),
    });

    let task_shared = Arc::clone(&shared);
    let task = tokio::spawn(async move {
        let _guard = guard;
        run(transport, method_name, request, interval, task_shared).await;
    });

    SessionHandle { shared, task }
}

async fn run(
    transport: Arc<dyn Transport>,
    method_name: String,
    request: CallRequest,
    interval: Duration,
    shared: Arc<Shared>,
) {
    shared.set_state(SessionState::Polling);
    info!(method = %method_name, interval_ms = interval.as_millis() as u64, "continuous execution started");

    let mut attempt: u64 = 0;
    loop {
        if shared.stop_requested.load(Ordering::SeqCst) {
            shared.set_state(SessionState::Stopped);
            info!(method = %method_name, attempt, "session stopped");
            return;
        }

        attempt += 1;
        match transport.estimate_gas(&request).await {
            Ok(raw) => {
                // A stop that raced the estimate still wins over submission
                if shared.stop_requested.load(Ordering::SeqCst) {
                    shared.set_state(SessionState::Stopped);
                    info!(method = %method_name, attempt, "session stopped");
                    return;
                }
                shared.set_state(SessionState::Executing);
                submit(&*transport, &method_name, &request, raw, &shared).await;
                return;
            }
            Err(e) => {
                debug!(method = %method_name, attempt, error = %e, "not yet viable");
                shared.set_error(e.to_string());
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = shared.stop.notified() => {
                        shared.set_state(SessionState::Stopped);
                        info!(method = %method_name, attempt, "session stopped");
                        return;
                    }
                }
            }
        }
    }
}

async fn submit(
    transport: &dyn Transport,
    method_name: &str,
    request: &CallRequest,
    raw_estimate: u64,
    shared: &Shared,
) {
    let gas_limit = gas::with_margin(raw_estimate);
    let gas_price_wei = match transport.gas_price().await {
        Ok(price) => price,
        Err(e) => {
            shared.set_error(e.to_string());
            shared.set_state(SessionState::Failed);
            warn!(method = %method_name, error = %e, "gas price fetch failed");
            return;
        }
    };

    let mut submission = request.clone();
    submission.gas = Some(gas_limit);
    submission.gas_price = Some(gas_price_wei);

    match transport.send_transaction(&submission).await {
        Ok(hash) => {
            *lock(&shared.tx_hash) = Some(hash);
            shared.set_state(SessionState::Succeeded);
            info!(method = %method_name, tx_hash = %hash, gas_limit, "transaction submitted");
        }
        Err(e) => {
            shared.set_error(e.to_string());
            shared.set_state(SessionState::Failed);
            warn!(method = %method_name, error = %e, "submission failed");
        }
    }
}
