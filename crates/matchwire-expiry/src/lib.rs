//! One-shot deadlines for session expiry.
//!
//! Every live session carries exactly one pending deadline: forming
//! sessions expire if the invitation is abandoned, playing sessions
//! expire if the game is. State transitions replace the deadline rather
//! than letting old ones linger, and that replacement has to be safe
//! against two races:
//!
//! 1. **The timer hasn't fired yet** — dropping or cancelling the
//!    [`ExpiryHandle`] aborts the sleeping task, so the fire never
//!    happens.
//! 2. **The timer fired but its message is still queued** — the fire
//!    carries the [`epoch`](ExpiryHandle::epoch) it was scheduled with;
//!    the receiver compares it against the session's current epoch and
//!    ignores stale fires. Every transition bumps the epoch, so a stale
//!    fire is a no-op by construction, not by a state check that might
//!    race.
//!
//! # Integration
//!
//! ```ignore
//! let epoch = session.bump_epoch();
//! let tx = self.command_tx.clone();
//! let id = session_id.clone();
//! session.arm(ExpiryHandle::schedule(epoch, timeout, move || {
//!     let _ = tx.send(Command::ExpiryFired { session_id: id, epoch });
//! }));
//! ```

use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::trace;

/// A scheduled one-shot deadline.
///
/// Holds the spawned timer task's abort handle; dropping the
/// `ExpiryHandle` cancels the deadline. A session therefore never has
/// more than one live timer — arming a new handle in its slot drops
/// (and aborts) the previous one.
#[derive(Debug)]
pub struct ExpiryHandle {
    epoch: u64,
    abort: AbortHandle,
}

impl ExpiryHandle {
    /// Schedules `on_fire` to run once, `after` from now.
    ///
    /// The callback runs on the timer task, so it should do nothing
    /// but hand the fire off (typically: push a command onto an
    /// unbounded channel back to the owner).
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule<F>(epoch: u64, after: Duration, on_fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            trace!(epoch, "expiry fired");
            on_fire();
        });
        trace!(epoch, ?after, "expiry scheduled");
        Self {
            epoch,
            abort: task.abort_handle(),
        }
    }

    /// The epoch this deadline was scheduled with.
    ///
    /// A fire is live only if this still equals the owning session's
    /// current epoch when the fire message is processed.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Cancels the deadline. Idempotent; a deadline that already fired
    /// is unaffected (its fire message, if any, is neutralized by the
    /// epoch comparison instead).
    pub fn cancel(&self) {
        self.abort.abort();
    }
}

impl Drop for ExpiryHandle {
    fn drop(&mut self) {
        self.abort.abort();
    }
}
