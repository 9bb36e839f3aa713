//! Search control: stop flag, clock and node limits.

use std::cell::Cell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::search::Termination;

/// Nodes between two reads of the clock.
const CLOCK_CHECK_INTERVAL: u64 = 2048;

/// Decides when a running search must give up.
///
/// The external stop flag and the node limit are checked at every node; the
/// wall clock only every [`CLOCK_CHECK_INTERVAL`] nodes. Once any limit fires
/// the reason is latched and every later check answers `true` immediately.
pub struct SearchControl {
    stopped: Arc<AtomicBool>,
    start: Instant,
    soft_limit: Option<Duration>,
    hard_limit: Option<Duration>,
    node_limit: Option<u64>,
    reason: Cell<Option<Termination>>,
}

impl SearchControl {
    /// No time pressure; only the stop flag (and a node limit, if set) ends the search.
    pub fn new_infinite(stopped: Arc<AtomicBool>) -> Self {
        Self {
            stopped,
            start: Instant::now(),
            soft_limit: None,
            hard_limit: None,
            node_limit: None,
            reason: Cell::new(None),
        }
    }

    /// Clock starts now. `soft` gates new iterations, `hard` aborts mid-iteration.
    pub fn new_timed(stopped: Arc<AtomicBool>, soft: Duration, hard: Duration) -> Self {
        Self {
            soft_limit: Some(soft),
            hard_limit: Some(hard),
            ..Self::new_infinite(stopped)
        }
    }

    /// Abort once `nodes` nodes have been visited.
    pub fn with_node_limit(mut self, nodes: Option<u64>) -> Self {
        self.node_limit = nodes;
        self
    }

    /// Hard limit, if the search is timed.
    pub fn hard_limit(&self) -> Option<Duration> {
        self.hard_limit
    }

    /// Soft limit, if the search is timed.
    pub fn soft_limit(&self) -> Option<Duration> {
        self.soft_limit
    }

    /// Check whether the search should abort right now.
    pub fn should_stop(&self, nodes: u64) -> bool {
        if self.reason.get().is_some() {
            return true;
        }

        if self.stopped.load(Ordering::Relaxed) {
            return self.latch(Termination::Stopped);
        }

        if let Some(limit) = self.node_limit
            && nodes >= limit
        {
            return self.latch(Termination::NodeLimit);
        }

        if nodes % CLOCK_CHECK_INTERVAL != 0 {
            return false;
        }

        if let Some(hard) = self.hard_limit
            && self.elapsed() >= hard
        {
            return self.latch(Termination::TimeExpired);
        }

        false
    }

    /// Check, between iterations, whether another depth should be started.
    pub fn should_stop_iterating(&self) -> bool {
        if self.reason.get().is_some() {
            return true;
        }

        if self.stopped.load(Ordering::Relaxed) {
            return self.latch(Termination::Stopped);
        }

        if let Some(soft) = self.soft_limit
            && self.elapsed() >= soft
        {
            return self.latch(Termination::TimeExpired);
        }

        false
    }

    /// Whether some limit has already fired.
    #[inline]
    pub fn aborted(&self) -> bool {
        self.reason.get().is_some()
    }

    /// The limit that fired, if any.
    pub fn reason(&self) -> Option<Termination> {
        self.reason.get()
    }

    /// Time since the control was created.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    fn latch(&self, reason: Termination) -> bool {
        self.reason.set(Some(reason));
        true
    }
}

impl std::fmt::Debug for SearchControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchControl")
            .field("soft_limit", &self.soft_limit)
            .field("hard_limit", &self.hard_limit)
            .field("node_limit", &self.node_limit)
            .field("reason", &self.reason.get())
            .finish()
    }
}
