//! Tunable search parameters.

use crate::eval::{Evaluator, ExchangePolicy};
use crate::options::EngineOptions;

/// Minimum remaining depth at which null-move pruning is tried.
pub const NULL_MOVE_MIN_DEPTH: u8 = 3;

/// Pruning and ordering knobs for one searcher.
///
/// Derived from the engine options plus what the active evaluator asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    /// Depth reduction R applied to the null-move search.
    pub null_move_reduction: u8,
    /// Null-move pruning is skipped below this remaining depth.
    pub null_move_min_depth: u8,
    /// Quiescence delta-pruning margin, or `None` to search every capture.
    pub delta_margin: Option<i32>,
    /// SEE-aware capture ordering, when the evaluator wants it.
    pub exchange: Option<ExchangePolicy>,
}

impl SearchParams {
    /// Build parameters for `evaluator` under `options`.
    pub fn new(options: &EngineOptions, evaluator: &dyn Evaluator) -> Self {
        Self {
            null_move_reduction: options.null_move_reduction,
            null_move_min_depth: NULL_MOVE_MIN_DEPTH,
            delta_margin: evaluator.delta_margin(),
            exchange: evaluator.exchange_policy(),
        }
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            null_move_reduction: EngineOptions::DEFAULT_NULL_MOVE_REDUCTION,
            null_move_min_depth: NULL_MOVE_MIN_DEPTH,
            delta_margin: None,
            exchange: None,
        }
    }
}
