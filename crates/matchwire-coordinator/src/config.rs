//! Coordinator configuration: the reaper's timeouts.

use std::time::Duration;

/// Timeouts governing when abandoned sessions are evicted.
///
/// Every session carries one pending deadline, re-armed on each state
/// transition; which duration applies is a function of the state it
/// just entered.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// How long a session may sit in `Forming` or `Ready` before the
    /// invitation is considered abandoned.
    ///
    /// Default: 10 minutes.
    pub forming_timeout: Duration,

    /// How long a `Playing` session may run before it is considered
    /// abandoned (e.g. everyone disconnected without an explicit end).
    ///
    /// Default: 1 hour.
    pub playing_timeout: Duration,

    /// How long an `Ended` session lingers so that clients which
    /// dropped right before the end can still pull missed moves.
    ///
    /// Default: 30 seconds.
    pub ended_linger: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            forming_timeout: Duration::from_secs(10 * 60),
            playing_timeout: Duration::from_secs(60 * 60),
            ended_linger: Duration::from_secs(30),
        }
    }
}
