//! Capped exponential backoff for remote reconnection.
//!
//! A remote disconnect must not disturb local door operation, so
//! reconnection runs on its own supervisor thread driven by a policy
//! object: a delay schedule plus a should-continue flag. Sleeps are
//! sliced so a cleared flag stops the loop promptly rather than after a
//! full backoff interval.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{info, warn};

/// Slice length for interruptible sleeping.
const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Reconnect delay schedule.
///
/// Attempts use the schedule in order; once exhausted, the last value
/// repeats indefinitely.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use facegate_remote::ReconnectPolicy;
///
/// let policy = ReconnectPolicy::default();
/// assert_eq!(policy.delay_for(0), Duration::from_secs(1));
/// assert_eq!(policy.delay_for(5), Duration::from_secs(60));
/// assert_eq!(policy.delay_for(100), Duration::from_secs(60)); // capped
/// ```
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    delays: Vec<Duration>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delays: [1, 2, 5, 10, 30, 60]
                .into_iter()
                .map(Duration::from_secs)
                .collect(),
        }
    }
}

impl ReconnectPolicy {
    /// Policy with a custom schedule. An empty schedule falls back to the
    /// default.
    pub fn new(delays: Vec<Duration>) -> Self {
        if delays.is_empty() {
            Self::default()
        } else {
            Self { delays }
        }
    }

    /// Delay before the given (zero-based) retry attempt.
    #[must_use]
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let index = attempt.min(self.delays.len() - 1);
        self.delays[index]
    }
}

/// Supervisor thread that retries a connect operation until it succeeds
/// or shutdown is requested.
pub struct ReconnectSupervisor {
    should_run: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ReconnectSupervisor {
    /// Spawn the reconnect loop.
    ///
    /// `connect` is invoked after each backoff delay; returning `true`
    /// means the connection is established and the loop ends. The loop
    /// also ends promptly once [`stop`](Self::stop) clears the run flag,
    /// even mid-delay.
    pub fn spawn<F>(policy: ReconnectPolicy, connect: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let should_run = Arc::new(AtomicBool::new(true));
        let flag = should_run.clone();

        let thread = thread::spawn(move || reconnect_loop(policy, flag, connect));

        Self {
            should_run,
            thread: Some(thread),
        }
    }

    /// Whether the supervisor is still retrying.
    pub fn is_running(&self) -> bool {
        self.thread
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Clear the run flag and join the thread.
    pub fn stop(&mut self) {
        self.should_run.store(false, Ordering::Release);
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ReconnectSupervisor {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.stop();
        }
    }
}

fn reconnect_loop<F>(policy: ReconnectPolicy, should_run: Arc<AtomicBool>, mut connect: F)
where
    F: FnMut() -> bool,
{
    let mut attempt = 0usize;

    while should_run.load(Ordering::Acquire) {
        let delay = policy.delay_for(attempt);
        info!(attempt = attempt + 1, ?delay, "reconnecting after delay");

        if !sleep_interruptibly(delay, &should_run) {
            break;
        }

        attempt += 1;
        if connect() {
            info!("reconnected");
            return;
        }
        warn!(attempt, "reconnect attempt failed");
    }

    info!("reconnect loop stopped");
}

/// Sleep in slices, returning `false` as soon as the flag clears.
fn sleep_interruptibly(total: Duration, should_run: &AtomicBool) -> bool {
    let deadline = std::time::Instant::now() + total;
    while std::time::Instant::now() < deadline {
        if !should_run.load(Ordering::Acquire) {
            return false;
        }
        let remaining = deadline - std::time::Instant::now();
        thread::sleep(remaining.min(SLEEP_SLICE));
    }
    should_run.load(Ordering::Acquire)
}
