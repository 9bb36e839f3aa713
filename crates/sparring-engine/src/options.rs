//! Engine configuration.
//!
//! Out-of-range values are clamped, never rejected.

use std::ops::RangeInclusive;

/// User-tunable engine settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Deepest iteration for searches without an explicit depth.
    pub max_depth: u8,
    /// Transposition table size in MiB.
    pub hash_mb: usize,
    /// Null-move depth reduction R.
    pub null_move_reduction: u8,
    /// Largest exchange loss, in points, the capture strategy still accepts.
    pub see_max_loss: i32,
    /// Seed for the random baseline; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl EngineOptions {
    /// Iterative-deepening depth used when `go` names none.
    pub const DEFAULT_MAX_DEPTH: u8 = 6;
    /// Accepted `MaxDepth` values; also bounds `go depth`.
    pub const MAX_DEPTH_RANGE: RangeInclusive<i64> = 1..=20;

    /// Transposition table size in MiB.
    pub const DEFAULT_HASH_MB: usize = 16;
    /// Accepted `TTSize` values in MiB.
    pub const HASH_MB_RANGE: RangeInclusive<i64> = 16..=1024;

    /// Null-move depth reduction R.
    pub const DEFAULT_NULL_MOVE_REDUCTION: u8 = 3;
    /// Accepted values of R.
    pub const NULL_MOVE_REDUCTION_RANGE: RangeInclusive<i64> = 1..=4;

    /// Exchange loss, in points, a capture may risk and still count.
    pub const DEFAULT_SEE_MAX_LOSS: i32 = 1;
    /// Accepted `SeeMaxLoss` values in points.
    pub const SEE_MAX_LOSS_RANGE: RangeInclusive<i64> = 0..=9;

    /// Set the default depth, clamped to 1..=20.
    pub fn with_max_depth(mut self, depth: i64) -> Self {
        self.max_depth = clamp_to(depth, &Self::MAX_DEPTH_RANGE, Self::DEFAULT_MAX_DEPTH);
        self
    }

    /// Set the table size, clamped to 16..=1024 MiB.
    pub fn with_hash_mb(mut self, mb: i64) -> Self {
        self.hash_mb = clamp_to(mb, &Self::HASH_MB_RANGE, Self::DEFAULT_HASH_MB);
        self
    }

    /// Set the null-move reduction, clamped to 1..=4.
    pub fn with_null_move_reduction(mut self, r: i64) -> Self {
        self.null_move_reduction = clamp_to(
            r,
            &Self::NULL_MOVE_REDUCTION_RANGE,
            Self::DEFAULT_NULL_MOVE_REDUCTION,
        );
        self
    }

    /// Set the acceptable exchange loss, clamped to 0..=9 points.
    pub fn with_see_max_loss(mut self, points: i64) -> Self {
        self.see_max_loss =
            clamp_to(points, &Self::SEE_MAX_LOSS_RANGE, Self::DEFAULT_SEE_MAX_LOSS);
        self
    }

    /// Every field clamped into its range.
    pub fn clamped(self) -> Self {
        self.with_max_depth(i64::from(self.max_depth))
            .with_hash_mb(i64::try_from(self.hash_mb).unwrap_or(i64::MAX))
            .with_null_move_reduction(i64::from(self.null_move_reduction))
            .with_see_max_loss(i64::from(self.see_max_loss))
    }

    /// Seed the random baseline.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            hash_mb: Self::DEFAULT_HASH_MB,
            null_move_reduction: Self::DEFAULT_NULL_MOVE_REDUCTION,
            see_max_loss: Self::DEFAULT_SEE_MAX_LOSS,
            seed: None,
        }
    }
}

/// Clamp `value` into `range` and narrow it to the field type.
fn clamp_to<T: TryFrom<i64>>(value: i64, range: &RangeInclusive<i64>, fallback: T) -> T {
    T::try_from(value.clamp(*range.start(), *range.end())).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let o = EngineOptions::default();
        assert_eq!(o.max_depth, 6);
        assert_eq!(o.hash_mb, 16);
        assert_eq!(o.null_move_reduction, 3);
        assert_eq!(o.see_max_loss, 1);
        assert_eq!(o.seed, None);
    }

    #[test]
    fn depth_is_clamped() {
        assert_eq!(EngineOptions::default().with_max_depth(0).max_depth, 1);
        assert_eq!(EngineOptions::default().with_max_depth(-5).max_depth, 1);
        assert_eq!(EngineOptions::default().with_max_depth(99).max_depth, 20);
        assert_eq!(EngineOptions::default().with_max_depth(12).max_depth, 12);
    }

    #[test]
    fn hash_is_clamped() {
        assert_eq!(EngineOptions::default().with_hash_mb(1).hash_mb, 16);
        assert_eq!(EngineOptions::default().with_hash_mb(4096).hash_mb, 1024);
        assert_eq!(EngineOptions::default().with_hash_mb(64).hash_mb, 64);
    }

    #[test]
    fn tuning_values_are_clamped() {
        let o = EngineOptions::default()
            .with_null_move_reduction(0)
            .with_see_max_loss(50);
        assert_eq!(o.null_move_reduction, 1);
        assert_eq!(o.see_max_loss, 9);

        let o = o.with_null_move_reduction(7).with_see_max_loss(-3);
        assert_eq!(o.null_move_reduction, 4);
        assert_eq!(o.see_max_loss, 0);
    }

    #[test]
    fn clamped_fixes_hand_built_options() {
        let o = EngineOptions {
            max_depth: 200,
            hash_mb: 0,
            null_move_reduction: 3,
            see_max_loss: -1,
            seed: Some(5),
        }
        .clamped();
        assert_eq!(o.max_depth, 20);
        assert_eq!(o.hash_mb, 16);
        assert_eq!(o.see_max_loss, 0);
        assert_eq!(o.seed, Some(5));
    }
}
