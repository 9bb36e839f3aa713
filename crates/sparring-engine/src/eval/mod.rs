//! Pluggable evaluation strategies.
//!
//! Every strategy is a pure function of the position that scores it for the
//! side to move. The search only ever sees the [`Evaluator`] trait; which
//! implementation sits behind it is fixed when the engine is built.

pub mod bishop_pair;
pub mod capture;
pub mod coverage;
pub mod material;
pub mod phase;
pub mod positional;
pub mod pst;

use std::fmt;
use std::str::FromStr;

use cozy_chess::{Board, Color};

use crate::options::EngineOptions;
use crate::search::see::ValueTable;

/// Quiescence delta-pruning margin for centipawn-scaled strategies.
pub const DEFAULT_DELTA_MARGIN: i32 = 200;

/// Exchange awareness requested by a strategy.
///
/// When present, the search orders captures with SEE under `values` and
/// demotes those losing more than `max_loss`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangePolicy {
    /// SEE piece values, indexed by `Piece as usize`.
    pub values: ValueTable,
    /// Largest acceptable net loss, in the units of `values`.
    pub max_loss: i32,
}

impl ExchangePolicy {
    /// Whether an exchange netting `see` is acceptable.
    #[inline]
    pub fn accepts(&self, see: i32) -> bool {
        see >= -self.max_loss
    }
}

/// Static evaluation strategy.
pub trait Evaluator: Send {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Score `board` for the side to move. Higher is better for that side.
    fn evaluate(&self, board: &Board) -> i32;

    /// Margin for quiescence delta pruning, or `None` when scores are not centipawns.
    fn delta_margin(&self) -> Option<i32> {
        Some(DEFAULT_DELTA_MARGIN)
    }

    /// Exchange policy for capture ordering, if this strategy needs one.
    fn exchange_policy(&self) -> Option<ExchangePolicy> {
        None
    }
}

/// Turn a White-minus-Black score into a side-to-move score.
#[inline]
pub fn relative_to_mover(board: &Board, white_score: i32) -> i32 {
    match board.side_to_move() {
        Color::White => white_score,
        Color::Black => -white_score,
    }
}

/// Which decision procedure an engine instance runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    /// Fixed piece values.
    Material,
    /// Material with bishop values depending on the bishop pair.
    BishopPair,
    /// Material plus piece-square tables.
    Positional,
    /// Rewards trading material off the board.
    Capture,
    /// Counts attacked squares.
    Coverage,
    /// No search at all: a uniformly random legal move.
    Random,
}

impl StrategyKind {
    /// Every strategy, in display order.
    pub const ALL: [StrategyKind; 6] = [
        StrategyKind::Material,
        StrategyKind::BishopPair,
        StrategyKind::Positional,
        StrategyKind::Capture,
        StrategyKind::Coverage,
        StrategyKind::Random,
    ];

    /// Name accepted on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::Material => "material",
            StrategyKind::BishopPair => "bishop-pair",
            StrategyKind::Positional => "positional",
            StrategyKind::Capture => "capture",
            StrategyKind::Coverage => "coverage",
            StrategyKind::Random => "random",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unrecognised strategy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy `{name}` (expected material, bishop-pair, positional, capture, coverage or random)")]
pub struct StrategyParseError {
    /// The rejected name.
    pub name: String,
}

impl FromStr for StrategyKind {
    type Err = StrategyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        StrategyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or(StrategyParseError { name: s.to_string() })
    }
}

/// Build the evaluator for `kind`, or `None` for the random baseline.
pub fn evaluator_for(kind: StrategyKind, options: &EngineOptions) -> Option<Box<dyn Evaluator>> {
    let evaluator: Box<dyn Evaluator> = match kind {
        StrategyKind::Material => Box::new(material::MaterialEval),
        StrategyKind::BishopPair => Box::new(bishop_pair::BishopPairEval),
        StrategyKind::Positional => Box::new(positional::PositionalEval::default()),
        StrategyKind::Capture => Box::new(capture::CaptureEval::new(options.see_max_loss)),
        StrategyKind::Coverage => Box::new(coverage::CoverageEval),
        StrategyKind::Random => return None,
    };
    Some(evaluator)
}
