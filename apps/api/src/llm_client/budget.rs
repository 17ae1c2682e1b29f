//! Call budget: the rolling per-minute quota and minimum spacing enforced before every
//! provider call.
//!
//! One tracker is shared (via `Arc`) by every caller in the process, retries included.
//! Acquirers queue on a turn lock, so grants are handed out in arrival order. The
//! bookkeeping lock is only held to inspect or record grants, never across a sleep, so
//! status and reset calls stay responsive while the head of the queue cools down.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Mutex, Notify};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info};

/// Length of the rolling quota window.
pub const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct BudgetConfig {
    /// Maximum grants inside any trailing `WINDOW`.
    pub calls_per_minute: u32,
    /// Minimum spacing between two consecutive grants.
    pub min_delay: Duration,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            calls_per_minute: 20,
            min_delay: Duration::from_secs(4),
        }
    }
}

/// Point-in-time view of the tracker, reported by the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetSnapshot {
    pub calls_in_window: u32,
    pub calls_per_minute: u32,
    pub min_delay_secs: f64,
    /// Seconds since the oldest grant still counted in the window.
    pub window_age_secs: Option<f64>,
}

#[derive(Debug, Default)]
struct BudgetState {
    /// Grant instants inside the current window, oldest first.
    grants: VecDeque<Instant>,
    last_call: Option<Instant>,
}

impl BudgetState {
    fn evict_expired(&mut self, now: Instant) {
        while let Some(&oldest) = self.grants.front() {
            if now.duration_since(oldest) >= WINDOW {
                self.grants.pop_front();
            } else {
                break;
            }
        }
    }
}

pub struct CallBudgetTracker {
    config: BudgetConfig,
    /// Held by the acquirer at the head of the queue, including while it sleeps.
    turn: Mutex<()>,
    state: Mutex<BudgetState>,
    /// Wakes a sleeping acquirer early when the bookkeeping is cleared.
    cleared: Notify,
}

impl CallBudgetTracker {
    pub fn new(config: BudgetConfig) -> Self {
        Self {
            config: BudgetConfig {
                calls_per_minute: config.calls_per_minute.max(1),
                ..config
            },
            turn: Mutex::new(()),
            state: Mutex::new(BudgetState::default()),
            cleared: Notify::new(),
        }
    }

    /// Waits until a call may be issued, then records it.
    ///
    /// Never fails. Returns once both the quota and the spacing constraint are satisfied.
    pub async fn acquire(&self) {
        let _turn = self.turn.lock().await;
        let limit = self.config.calls_per_minute as usize;

        loop {
            let mut state = self.state.lock().await;
            let now = Instant::now();
            state.evict_expired(now);

            let resume_at = match (state.grants.front(), state.last_call) {
                (Some(&oldest), _) if state.grants.len() >= limit => {
                    let resume_at = oldest + WINDOW;
                    info!(
                        limit = self.config.calls_per_minute,
                        wait_secs = resume_at.duration_since(now).as_secs_f64(),
                        "Per-minute call limit reached, cooling down"
                    );
                    Some(resume_at)
                }
                (_, Some(last)) if last + self.config.min_delay > now => {
                    let ready_at = last + self.config.min_delay;
                    debug!(
                        wait_secs = ready_at.duration_since(now).as_secs_f64(),
                        "Spacing provider calls"
                    );
                    Some(ready_at)
                }
                _ => None,
            };

            let Some(resume_at) = resume_at else {
                state.grants.push_back(now);
                state.last_call = Some(now);

                let calls = state.grants.len();
                if calls % 5 == 0 {
                    info!(calls, limit, "Provider calls in current window");
                }
                return;
            };

            // Registered before the bookkeeping lock is released so a reset in between
            // is not missed.
            let cleared = self.cleared.notified();
            drop(state);

            tokio::select! {
                _ = sleep_until(resume_at) => {}
                _ = cleared => debug!("Call budget cleared while waiting, re-checking"),
            }
        }
    }

    /// Forgets every grant in the current window.
    ///
    /// Used after the provider itself signalled a cool-down and we already waited it out.
    /// The last-call instant is kept so spacing still applies to the next grant.
    pub async fn reset_window(&self) {
        let mut state = self.state.lock().await;
        state.grants.clear();
        self.cleared.notify_waiters();
        debug!("Call budget window reset");
    }

    /// Clears all bookkeeping, spacing included.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        *state = BudgetState::default();
        self.cleared.notify_waiters();
        info!("Call budget manually reset");
    }

    pub async fn snapshot(&self) -> BudgetSnapshot {
        let mut state = self.state.lock().await;
        let now = Instant::now();
        state.evict_expired(now);
        BudgetSnapshot {
            calls_in_window: state.grants.len() as u32,
            calls_per_minute: self.config.calls_per_minute,
            min_delay_secs: self.config.min_delay.as_secs_f64(),
            window_age_secs: state
                .grants
                .front()
                .map(|oldest| now.duration_since(*oldest).as_secs_f64()),
        }
    }
}
