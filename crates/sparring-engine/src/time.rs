//! Time management: turn a move request's constraints into search limits.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use cozy_chess::Color;

use crate::options::EngineOptions;
use crate::search::control::SearchControl;

/// Reserved for protocol and process latency on every move.
pub const MOVE_OVERHEAD: Duration = Duration::from_millis(30);

/// Never think for less than this.
const MIN_BUDGET: Duration = Duration::from_millis(1);

/// One side's clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClockTime {
    /// Time left on the clock.
    pub remaining: Duration,
    /// Added after every move.
    pub increment: Duration,
}

/// Limits attached to one search request.
///
/// Fields may be combined; [`control_for`] and [`depth_limit`] resolve them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchConstraints {
    /// Search exactly to this depth, ignoring the clock.
    pub depth: Option<u8>,
    /// White's clock.
    pub white: Option<ClockTime>,
    /// Black's clock.
    pub black: Option<ClockTime>,
    /// Fixed thinking time for this move.
    pub movetime: Option<Duration>,
    /// Stop after this many nodes.
    pub nodes: Option<u64>,
    /// Search until told to stop.
    pub infinite: bool,
}

impl SearchConstraints {
    /// Fixed-depth request.
    pub fn depth(depth: u8) -> Self {
        Self {
            depth: Some(depth),
            ..Self::default()
        }
    }

    /// Fixed thinking time.
    pub fn movetime(movetime: Duration) -> Self {
        Self {
            movetime: Some(movetime),
            ..Self::default()
        }
    }

    /// Both sides on the same clock.
    pub fn clock(remaining: Duration, increment: Duration) -> Self {
        let clock = ClockTime {
            remaining,
            increment,
        };
        Self {
            white: Some(clock),
            black: Some(clock),
            ..Self::default()
        }
    }

    /// Run until stopped.
    pub fn infinite() -> Self {
        Self {
            infinite: true,
            ..Self::default()
        }
    }

    /// Cap the node count.
    pub fn with_nodes(mut self, nodes: u64) -> Self {
        self.nodes = Some(nodes);
        self
    }

    /// The clock of `side`, if one was given.
    pub fn clock_for(&self, side: Color) -> Option<ClockTime> {
        match side {
            Color::White => self.white,
            Color::Black => self.black,
        }
    }
}

/// Per-move budget from the regime table.
///
/// | Remaining   | Base   | Cap  |
/// |-------------|--------|------|
/// | > 30 min    | t / 40 | 30 s |
/// | > 10 min    | t / 30 | 20 s |
/// | > 1 min     | t / 20 | 10 s |
/// | otherwise   | t / 10 |  5 s |
///
/// Each bracket adds 80% of the increment before capping. The result never
/// exceeds the remaining time less [`MOVE_OVERHEAD`], and is at least 1 ms.
pub fn move_budget(clock: ClockTime) -> Duration {
    let t = clock.remaining;
    let (divisor, cap_secs) = if t > Duration::from_secs(30 * 60) {
        (40, 30)
    } else if t > Duration::from_secs(10 * 60) {
        (30, 20)
    } else if t > Duration::from_secs(60) {
        (20, 10)
    } else {
        (10, 5)
    };

    let budget = (t / divisor + clock.increment.mul_f64(0.8)).min(Duration::from_secs(cap_secs));
    budget
        .min(t.saturating_sub(MOVE_OVERHEAD))
        .max(MIN_BUDGET)
}

/// Build a [`SearchControl`] for `constraints` with `side` to move.
///
/// Priority order:
/// 1. `depth` set -> no clock at all
/// 2. `movetime` -> soft = hard = movetime
/// 3. the side's clock -> hard = [`move_budget`], soft = half of it
/// 4. otherwise (`infinite` or bare) -> unlimited
///
/// A node cap applies in every case.
pub fn control_for(
    constraints: &SearchConstraints,
    side: Color,
    stopped: Arc<AtomicBool>,
) -> SearchControl {
    let control = if constraints.depth.is_some() || constraints.infinite {
        SearchControl::new_infinite(stopped)
    } else if let Some(movetime) = constraints.movetime {
        SearchControl::new_timed(stopped, movetime, movetime)
    } else if let Some(clock) = constraints.clock_for(side) {
        let hard = move_budget(clock);
        SearchControl::new_timed(stopped, hard / 2, hard)
    } else {
        SearchControl::new_infinite(stopped)
    };
    control.with_node_limit(constraints.nodes)
}

/// Deepest iteration to run.
///
/// An explicit depth wins. An infinite search without one runs to the depth
/// ceiling so that only `stop` ends it; anything else uses `max_depth`.
pub fn depth_limit(constraints: &SearchConstraints, max_depth: u8) -> u8 {
    let (lo, hi) = (
        *EngineOptions::MAX_DEPTH_RANGE.start() as u8,
        *EngineOptions::MAX_DEPTH_RANGE.end() as u8,
    );
    let requested = match constraints.depth {
        Some(depth) => depth,
        None if constraints.infinite => hi,
        None => max_depth,
    };
    requested.clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(secs: u64, inc_ms: u64) -> ClockTime {
        ClockTime {
            remaining: Duration::from_secs(secs),
            increment: Duration::from_millis(inc_ms),
        }
    }

    fn stopped() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn long_game_uses_one_fortieth() {
        // 60 min: 3600 / 40 = 90 s, capped at 30 s.
        assert_eq!(move_budget(clock(3600, 0)), Duration::from_secs(30));
        // 40 min: 2400 / 40 = 60 s, still capped.
        assert_eq!(move_budget(clock(2400, 0)), Duration::from_secs(30));
    }

    #[test]
    fn rapid_uses_one_thirtieth() {
        // 15 min: 900 / 30 = 30 s, capped at 20 s.
        assert_eq!(move_budget(clock(900, 0)), Duration::from_secs(20));
        // 10 min exactly falls into the next bracket: 600 / 20 = 30 s, capped at 10 s.
        assert_eq!(move_budget(clock(600, 0)), Duration::from_secs(10));
    }

    #[test]
    fn blitz_uses_one_twentieth_plus_increment() {
        // 3 min + 2 s: 180 / 20 = 9 s, + 1.6 s = 10.6 s, capped at 10 s.
        assert_eq!(move_budget(clock(180, 2000)), Duration::from_secs(10));
        // 2 min: 120 / 20 = 6 s, + 0.8 s.
        assert_eq!(move_budget(clock(120, 1000)), Duration::from_millis(6800));
    }

    #[test]
    fn bullet_uses_one_tenth() {
        assert_eq!(move_budget(clock(30, 0)), Duration::from_secs(3));
        assert_eq!(move_budget(clock(60, 0)), Duration::from_secs(5));
    }

    #[test]
    fn budget_leaves_move_overhead() {
        let tight = ClockTime {
            remaining: Duration::from_millis(40),
            increment: Duration::from_secs(1),
        };
        assert_eq!(move_budget(tight), Duration::from_millis(10));
    }

    #[test]
    fn budget_is_at_least_one_millisecond() {
        assert_eq!(move_budget(ClockTime::default()), MIN_BUDGET);
        let flagging = ClockTime {
            remaining: Duration::from_millis(5),
            increment: Duration::ZERO,
        };
        assert_eq!(move_budget(flagging), MIN_BUDGET);
    }

    #[test]
    fn depth_disables_the_clock() {
        let mut c = SearchConstraints::clock(Duration::from_millis(50), Duration::ZERO);
        c.depth = Some(4);
        let control = control_for(&c, Color::White, stopped());
        assert_eq!(control.hard_limit(), None);
    }

    #[test]
    fn movetime_sets_both_limits() {
        let c = SearchConstraints::movetime(Duration::from_millis(750));
        let control = control_for(&c, Color::Black, stopped());
        assert_eq!(control.soft_limit(), Some(Duration::from_millis(750)));
        assert_eq!(control.hard_limit(), Some(Duration::from_millis(750)));
    }

    #[test]
    fn clock_uses_side_to_move() {
        let c = SearchConstraints {
            white: Some(clock(30, 0)),
            black: Some(clock(3600, 0)),
            ..SearchConstraints::default()
        };
        let white = control_for(&c, Color::White, stopped());
        assert_eq!(white.hard_limit(), Some(Duration::from_secs(3)));
        assert_eq!(white.soft_limit(), Some(Duration::from_millis(1500)));

        let black = control_for(&c, Color::Black, stopped());
        assert_eq!(black.hard_limit(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn missing_clock_means_unlimited() {
        let c = SearchConstraints {
            white: Some(clock(30, 0)),
            ..SearchConstraints::default()
        };
        let control = control_for(&c, Color::Black, stopped());
        assert_eq!(control.hard_limit(), None);
        assert!(!control.should_stop(1_000_000));
    }

    #[test]
    fn node_cap_applies_to_every_mode() {
        let c = SearchConstraints::infinite().with_nodes(100);
        let control = control_for(&c, Color::White, stopped());
        assert!(!control.should_stop(99));
        assert!(control.should_stop(100));
    }

    #[test]
    fn depth_limit_clamps_requests() {
        assert_eq!(depth_limit(&SearchConstraints::depth(0), 6), 1);
        assert_eq!(depth_limit(&SearchConstraints::depth(40), 6), 20);
        assert_eq!(depth_limit(&SearchConstraints::depth(9), 6), 9);
        assert_eq!(depth_limit(&SearchConstraints::default(), 12), 12);
    }

    #[test]
    fn infinite_runs_to_the_depth_ceiling() {
        assert_eq!(depth_limit(&SearchConstraints::infinite(), 6), 20);
        let mut c = SearchConstraints::infinite();
        c.depth = Some(4);
        assert_eq!(depth_limit(&c, 6), 4);
    }
}
