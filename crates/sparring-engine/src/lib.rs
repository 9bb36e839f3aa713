//! Search and evaluation for the sparring engines.

pub mod engine;
pub mod eval;
pub mod options;
pub mod random;
pub mod rules;
pub mod search;
pub mod time;

pub use engine::Engine;
pub use eval::{Evaluator, StrategyKind, StrategyParseError};
pub use options::EngineOptions;
pub use search::control::SearchControl;
pub use search::{SearchInfo, SearchResult, Searcher, Termination, mate_in_moves};
pub use time::{ClockTime, SearchConstraints};
