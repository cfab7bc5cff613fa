//! Delete confirmation countdown
//!
//! A destructive operation waits out a confirmation window before it runs.
//! The window ticks once per second and can be cut short by cancelling a
//! [`CancellationToken`], which moves the machine to [`CountdownState::Aborted`].
//!
//! ```text
//! Idle -> Confirming { remaining } -> Proceeding
//!                                  \-> Aborted
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tracing::debug;

/// Cancellation signal shared between the countdown and an interrupt handler
#[derive(Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancellationToken {
    /// Creates a new cancellation token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels all operations using this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Checks if the token has been cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Completes once the token is cancelled
    pub async fn cancelled(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a concurrent cancel is not missed
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// State of a [`DeleteCountdown`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountdownState {
    /// Not started
    #[default]
    Idle,
    /// Waiting; `remaining` whole ticks are left
    Confirming {
        /// Ticks left before the operation proceeds
        remaining: u64,
    },
    /// The window expired; the operation runs
    Proceeding,
    /// The window was cancelled; nothing is done
    Aborted,
}

impl CountdownState {
    /// Returns true for `Proceeding` and `Aborted`
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Proceeding | Self::Aborted)
    }
}

/// Cancellable confirmation window before a delete
#[derive(Debug, Clone)]
pub struct DeleteCountdown {
    seconds: u64,
    tick: Duration,
    state: CountdownState,
}

impl DeleteCountdown {
    /// Creates a countdown lasting `seconds` one-second ticks
    #[must_use]
    pub const fn new(seconds: u64) -> Self {
        Self {
            seconds,
            tick: Duration::from_secs(1),
            state: CountdownState::Idle,
        }
    }

    /// Overrides the tick length
    #[must_use]
    pub const fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Number of ticks in the window
    #[must_use]
    pub const fn seconds(&self) -> u64 {
        self.seconds
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> CountdownState {
        self.state
    }

    /// Runs the window to completion
    ///
    /// `on_state` sees every transition: `Confirming { remaining }` at the
    /// start of each tick (`seconds` down to `1`), then exactly one terminal
    /// state. A zero-length window proceeds immediately. A token cancelled
    /// before or during the window aborts it.
    pub async fn run<F>(&mut self, cancel: &CancellationToken, mut on_state: F) -> CountdownState
    where
        F: FnMut(CountdownState),
    {
        let mut remaining = self.seconds;
        let outcome = loop {
            if cancel.is_cancelled() {
                break CountdownState::Aborted;
            }
            if remaining == 0 {
                break CountdownState::Proceeding;
            }

            self.enter(CountdownState::Confirming { remaining }, &mut on_state);
            tokio::select! {
                () = tokio::time::sleep(self.tick) => remaining -= 1,
                () = cancel.cancelled() => {
                    debug!(remaining, "Delete countdown cancelled");
                    break CountdownState::Aborted;
                }
            }
        };

        self.enter(outcome, &mut on_state);
        outcome
    }

    fn enter<F: FnMut(CountdownState)>(&mut self, state: CountdownState, on_state: &mut F) {
        self.state = state;
        on_state(state);
    }
}
