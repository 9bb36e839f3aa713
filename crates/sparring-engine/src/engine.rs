//! The engine facade the protocol front-end drives.
//!
//! One [`Engine`] is one player: a fixed strategy, its options, the current
//! game position and (for searching strategies) a [`Searcher`] whose
//! transposition table lives as long as the engine.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use cozy_chess::Board;
use tracing::{debug, info};

use crate::eval::{StrategyKind, evaluator_for};
use crate::options::EngineOptions;
use crate::random::RandomMover;
use crate::search::params::SearchParams;
use crate::search::{SearchInfo, SearchResult, Searcher};
use crate::time::{SearchConstraints, control_for, depth_limit};

/// How moves get chosen.
enum Player {
    Search(Searcher),
    Random(RandomMover),
}

impl Player {
    fn build(strategy: StrategyKind, options: &EngineOptions) -> Self {
        match evaluator_for(strategy, options) {
            Some(evaluator) => {
                let params = SearchParams::new(options, evaluator.as_ref());
                Player::Search(Searcher::new(evaluator, params, options.hash_mb))
            }
            None => Player::Random(RandomMover::new(options.seed)),
        }
    }
}

/// A configured player with its own game state.
pub struct Engine {
    strategy: StrategyKind,
    options: EngineOptions,
    player: Player,
    board: Board,
    history: Vec<u64>,
}

impl Engine {
    /// Build an engine for `strategy`. Out-of-range options are clamped.
    pub fn new(strategy: StrategyKind, options: EngineOptions) -> Self {
        let options = options.clamped();
        info!(%strategy, ?options, "engine created");
        Self {
            strategy,
            player: Player::build(strategy, &options),
            options,
            board: Board::default(),
            history: Vec::new(),
        }
    }

    /// The strategy fixed at construction.
    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    /// Current options, after clamping.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Position the next search starts from.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Hashes of the positions before [`Engine::board`], oldest first.
    pub fn history(&self) -> &[u64] {
        &self.history
    }

    /// Search parameters in use, or `None` for the random baseline.
    pub fn search_params(&self) -> Option<&SearchParams> {
        match &self.player {
            Player::Search(searcher) => Some(searcher.params()),
            Player::Random(_) => None,
        }
    }

    /// Reset to the starting position and forget cached search results.
    pub fn new_game(&mut self) {
        self.board = Board::default();
        self.history.clear();
        if let Player::Search(searcher) = &mut self.player {
            searcher.clear_tt();
        }
        info!("new game");
    }

    /// Set the current position and the hashes of the positions leading to it.
    pub fn set_position(&mut self, board: Board, history: Vec<u64>) {
        self.board = board;
        self.history = history;
    }

    /// Set the default search depth (clamped to 1..=20).
    pub fn set_max_depth(&mut self, depth: i64) {
        self.options = self.options.with_max_depth(depth);
    }

    /// Resize the transposition table (clamped to 16..=1024 MiB).
    pub fn set_hash_mb(&mut self, mb: i64) {
        self.options = self.options.with_hash_mb(mb);
        if let Player::Search(searcher) = &mut self.player {
            searcher.resize_tt(self.options.hash_mb);
            info!(mb = self.options.hash_mb, "transposition table resized");
        }
    }

    /// Set the null-move reduction R (clamped to 1..=4).
    pub fn set_null_move_reduction(&mut self, r: i64) {
        self.options = self.options.with_null_move_reduction(r);
        if let Player::Search(searcher) = &mut self.player {
            let params = SearchParams::new(&self.options, searcher.evaluator());
            searcher.set_params(params);
        }
    }

    /// Set the acceptable exchange loss in points (clamped to 0..=9).
    pub fn set_see_max_loss(&mut self, points: i64) {
        self.options = self.options.with_see_max_loss(points);
        if let Player::Search(searcher) = &mut self.player
            && let Some(evaluator) = evaluator_for(self.strategy, &self.options)
        {
            let params = SearchParams::new(&self.options, evaluator.as_ref());
            searcher.reconfigure(evaluator, params);
        }
    }

    /// Choose a move for the current position.
    ///
    /// Raising `stopped` from another thread ends the search at the next
    /// check; the best move found so far is still returned. `on_info` is
    /// called after every completed depth.
    pub fn search<F>(
        &mut self,
        constraints: &SearchConstraints,
        stopped: Arc<AtomicBool>,
        mut on_info: F,
    ) -> SearchResult
    where
        F: FnMut(&SearchInfo),
    {
        let control = control_for(constraints, self.board.side_to_move(), stopped);
        let max_depth = depth_limit(constraints, self.options.max_depth);
        debug!(
            max_depth,
            soft = ?control.soft_limit(),
            hard = ?control.hard_limit(),
            nodes = ?constraints.nodes,
            "search started"
        );

        let result = match &mut self.player {
            Player::Search(searcher) => {
                searcher.search(&self.board, &self.history, max_depth, &control, on_info)
            }
            Player::Random(mover) => {
                let result = mover.choose(&self.board);
                if result.best_move.is_some() {
                    on_info(&SearchInfo {
                        depth: result.depth,
                        score: result.score,
                        nodes: result.nodes,
                        elapsed: control.elapsed(),
                        pv: result.pv.clone(),
                    });
                }
                result
            }
        };

        debug!(
            depth = result.depth,
            score = result.score,
            nodes = result.nodes,
            termination = ?result.termination,
            "search finished"
        );
        result
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let player = match &self.player {
            Player::Search(searcher) => format!("{searcher:?}"),
            Player::Random(_) => "random".to_string(),
        };
        f.debug_struct("Engine")
            .field("strategy", &self.strategy)
            .field("options", &self.options)
            .field("player", &player)
            .field("board", &self.board.to_string())
            .finish()
    }
}
