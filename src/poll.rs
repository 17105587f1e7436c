//! Background feed polling.
//!
//! A [`PollController`] runs at most one interval loop on the tokio runtime.
//! The loop is strictly periodic: the first tick fires one full interval
//! after [`start`](PollController::start), never immediately.
//!
//! ## Lifecycle
//!
//! ```text
//!            start(d)                 stop()
//!   Idle ───────────────► Polling ───────────────► Idle
//!                          │   ▲
//!                          └───┘ start(d') cancels the old loop
//! ```
//!
//! Stopping cancels future ticks only.  A tick whose work is already running
//! finishes normally and its result is still applied.

use std::future::Future;
use std::ops::ControlFlow;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::lock;

/// Shortest interval accepted by [`PollController::start`].
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

struct ActiveLoop {
    interval: Duration,
    cancel: CancellationToken,
}

/// On/off switch for a single periodic loop.
#[derive(Default)]
pub struct PollController {
    active: Mutex<Option<ActiveLoop>>,
}

impl PollController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start polling, replacing any loop that is already running.
    ///
    /// `tick` is awaited once per interval.  Returning
    /// [`ControlFlow::Break`] ends the loop from the inside (used when the
    /// owner has gone away).  Ticks missed while `tick` was still running are
    /// skipped, not queued.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<F, Fut>(&self, interval: Duration, tick: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let interval = if interval < MIN_POLL_INTERVAL {
            warn!(?interval, min = ?MIN_POLL_INTERVAL, "poll interval too short, clamping");
            MIN_POLL_INTERVAL
        } else {
            interval
        };

        let mut active = lock(&self.active);
        if let Some(previous) = active.take() {
            previous.cancel.cancel();
            info!(old = ?previous.interval, new = ?interval, "restarting poll loop");
        } else {
            info!(?interval, "poll loop started");
        }

        let cancel = CancellationToken::new();
        tokio::spawn(run_loop(interval, cancel.clone(), tick));
        *active = Some(ActiveLoop { interval, cancel });
    }

    /// Stop polling.  Returns whether a loop was running.
    pub fn stop(&self) -> bool {
        match lock(&self.active).take() {
            Some(previous) => {
                previous.cancel.cancel();
                info!("poll loop stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_polling(&self) -> bool {
        lock(&self.active)
            .as_ref()
            .is_some_and(|a| !a.cancel.is_cancelled())
    }

    /// Interval of the running loop, if any.
    pub fn interval(&self) -> Option<Duration> {
        lock(&self.active)
            .as_ref()
            .filter(|a| !a.cancel.is_cancelled())
            .map(|a| a.interval)
    }
}

impl Drop for PollController {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_loop<F, Fut>(interval: Duration, cancel: CancellationToken, mut tick: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ControlFlow<()>>,
{
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut idle_since = Instant::now();

    loop {
        let deadline = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            deadline = ticker.tick() => deadline,
        };
        // `Skip` still hands back one overdue tick after a slow run; drop it
        // and wait for the next aligned deadline.
        if deadline < idle_since {
            debug!(overdue = ?idle_since - deadline, "dropping tick missed during previous run");
            continue;
        }
        // Not raced against `cancel`: work that has started runs to completion.
        if tick().await.is_break() {
            cancel.cancel();
            break;
        }
        idle_since = Instant::now();
    }
    debug!("poll loop exited");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
