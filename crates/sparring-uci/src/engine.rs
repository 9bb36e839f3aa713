//! Event-driven UCI engine loop.
//!
//! The main thread owns the [`Engine`] while idle. `go` hands it to a search
//! thread, which sends it back with the result; commands that need the engine
//! in the meantime are queued and applied when it returns.

use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};

use cozy_chess::Board;
use tracing::{debug, info, warn};

use sparring_engine::{Engine, EngineOptions, SearchInfo, SearchResult, mate_in_moves};

use crate::command::{Command, GoParams, PositionInfo, UciOption, parse_command};
use crate::error::UciError;
use crate::notation::{format_line, format_move};

/// Internal engine state.
enum EngineState {
    Idle,
    Searching,
    /// An infinite search finished on its own; `bestmove` waits for `stop`.
    Holding(SearchDone),
}

/// Events processed by the main engine loop.
enum EngineEvent {
    UciCommand(Result<Command, UciError>),
    SearchDone(SearchDone),
    InputClosed,
}

/// Payload returned by the search thread when it finishes.
struct SearchDone {
    result: SearchResult,
    engine: Engine,
    board: Board,
}

/// The UCI front-end, holding the current position and the engine.
pub struct UciEngine {
    board: Board,
    history: Vec<u64>,
    engine: Option<Engine>,
    state: EngineState,
    stop_flag: Arc<AtomicBool>,
    infinite: bool,
    pending_new_game: bool,
    pending_options: Vec<UciOption>,
}

impl UciEngine {
    /// Wrap `engine`, starting from the initial position.
    pub fn new(engine: Engine) -> Self {
        Self {
            board: Board::default(),
            history: Vec::new(),
            engine: Some(engine),
            state: EngineState::Idle,
            stop_flag: Arc::new(AtomicBool::new(false)),
            infinite: false,
            pending_new_game: false,
            pending_options: Vec::new(),
        }
    }

    /// Run the UCI event loop, reading from stdin until `quit` or input closes.
    pub fn run(mut self) -> Result<(), UciError> {
        let (tx, rx) = mpsc::channel::<EngineEvent>();

        let stdin_tx = tx.clone();
        std::thread::spawn(move || {
            let stdin = io::stdin();
            let reader = stdin.lock();
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        let trimmed = line.trim().to_string();
                        if trimmed.is_empty() {
                            continue;
                        }
                        debug!(cmd = %trimmed, "received UCI command");
                        let cmd = parse_command(&trimmed);
                        if stdin_tx.send(EngineEvent::UciCommand(cmd)).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "stdin read failed");
                        break;
                    }
                }
            }
            let _ = stdin_tx.send(EngineEvent::InputClosed);
        });

        for event in &rx {
            match event {
                EngineEvent::UciCommand(Ok(cmd)) => match cmd {
                    Command::Uci => self.handle_uci(),
                    Command::IsReady => println!("readyok"),
                    Command::UciNewGame => self.handle_ucinewgame(),
                    Command::Position(info) => self.handle_position(info),
                    Command::Go(params) => self.handle_go(params, &tx),
                    Command::SetOption(opt) => self.handle_setoption(opt),
                    Command::Stop => emit(self.handle_stop()),
                    Command::Quit => {
                        emit(self.handle_stop());
                        if matches!(self.state, EngineState::Searching) {
                            for ev in &rx {
                                if let EngineEvent::SearchDone(done) = ev {
                                    emit(self.finish_search(done));
                                    break;
                                }
                            }
                        }
                        break;
                    }
                    Command::Unknown(_) => {}
                },
                EngineEvent::UciCommand(Err(e)) => {
                    warn!(error = %e, "UCI parse error");
                }
                EngineEvent::SearchDone(done) => {
                    emit(self.finish_search(done));
                }
                EngineEvent::InputClosed => break,
            }
        }

        info!("sparring shutting down");
        Ok(())
    }

    /// Options as the engine last reported them.
    fn options(&self) -> EngineOptions {
        self.engine
            .as_ref()
            .map(|engine| *engine.options())
            .unwrap_or_default()
    }

    fn handle_uci(&self) {
        let strategy = self
            .engine
            .as_ref()
            .map(|engine| engine.strategy().to_string())
            .unwrap_or_default();
        let o = self.options();

        println!("id name sparring {strategy}");
        println!("id author the sparring developers");
        println!(
            "option name MaxDepth type spin default {} min {} max {}",
            o.max_depth,
            EngineOptions::MAX_DEPTH_RANGE.start(),
            EngineOptions::MAX_DEPTH_RANGE.end()
        );
        println!(
            "option name TTSize type spin default {} min {} max {}",
            o.hash_mb,
            EngineOptions::HASH_MB_RANGE.start(),
            EngineOptions::HASH_MB_RANGE.end()
        );
        println!(
            "option name NullMoveReduction type spin default {} min {} max {}",
            o.null_move_reduction,
            EngineOptions::NULL_MOVE_REDUCTION_RANGE.start(),
            EngineOptions::NULL_MOVE_REDUCTION_RANGE.end()
        );
        println!(
            "option name SeeMaxLoss type spin default {} min {} max {}",
            o.see_max_loss,
            EngineOptions::SEE_MAX_LOSS_RANGE.start(),
            EngineOptions::SEE_MAX_LOSS_RANGE.end()
        );
        println!("uciok");
    }

    fn handle_ucinewgame(&mut self) {
        self.board = Board::default();
        self.history.clear();
        match self.engine.as_mut() {
            Some(engine) => engine.new_game(),
            // Search thread owns the engine: defer until it comes back
            None => self.pending_new_game = true,
        }
    }

    fn handle_setoption(&mut self, option: UciOption) {
        match self.engine.as_mut() {
            Some(engine) => apply_option(engine, option),
            None => self.pending_options.push(option),
        }
    }

    fn handle_position(&mut self, info: PositionInfo) {
        self.board = info.board;
        self.history = info.history;
    }

    fn handle_go(&mut self, params: GoParams, tx: &mpsc::Sender<EngineEvent>) {
        if !matches!(self.state, EngineState::Idle) {
            warn!("go received while not idle, ignoring");
            return;
        }
        let Some(mut engine) = self.engine.take() else {
            warn!("go received without an engine, ignoring");
            return;
        };

        self.stop_flag = Arc::new(AtomicBool::new(false));
        self.infinite = params.infinite;
        let stopped = Arc::clone(&self.stop_flag);
        let constraints = params.to_constraints();
        let board = self.board.clone();
        engine.set_position(board.clone(), self.history.clone());
        let tx = tx.clone();

        std::thread::spawn(move || {
            let result = engine.search(&constraints, stopped, |info| {
                println!("{}", info_line(&board, info));
            });
            let _ = tx.send(EngineEvent::SearchDone(SearchDone {
                result,
                engine,
                board,
            }));
        });

        self.state = EngineState::Searching;
    }

    /// Raise the stop flag; returns the held `bestmove` line, if any.
    fn handle_stop(&mut self) -> Option<String> {
        self.stop_flag.store(true, Ordering::Release);
        match std::mem::replace(&mut self.state, EngineState::Idle) {
            EngineState::Holding(done) => self.finish_search(done),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Take the engine back from a finished search and build the `bestmove`
    /// line. An infinite search that ended before `stop` is held instead.
    fn finish_search(&mut self, done: SearchDone) -> Option<String> {
        if self.infinite && !self.stop_flag.load(Ordering::Acquire) {
            debug!("infinite search finished early, holding bestmove until stop");
            self.state = EngineState::Holding(done);
            return None;
        }
        self.infinite = false;

        let mut engine = done.engine;

        if self.pending_new_game {
            engine.new_game();
            self.pending_new_game = false;
        }
        for option in self.pending_options.drain(..) {
            apply_option(&mut engine, option);
        }
        self.engine = Some(engine);

        self.state = EngineState::Idle;
        Some(match done.result.best_move {
            Some(mv) => format!("bestmove {}", format_move(&done.board, mv)),
            None => "bestmove 0000".to_string(),
        })
    }
}

fn emit(line: Option<String>) {
    if let Some(line) = line {
        println!("{line}");
    }
}

fn apply_option(engine: &mut Engine, option: UciOption) {
    match option {
        UciOption::MaxDepth(depth) => engine.set_max_depth(depth),
        UciOption::TtSize(mb) => engine.set_hash_mb(mb),
        UciOption::NullMoveReduction(r) => engine.set_null_move_reduction(r),
        UciOption::SeeMaxLoss(points) => engine.set_see_max_loss(points),
    }
    debug!(?option, options = ?engine.options(), "option applied");
}

/// `info` line for one completed depth.
pub fn info_line(board: &Board, info: &SearchInfo) -> String {
    let elapsed_ms = info.elapsed.as_millis().max(1);
    let nps = (info.nodes as u128 * 1000) / elapsed_ms;
    let score = match mate_in_moves(info.score) {
        Some(moves) => format!("mate {moves}"),
        None => format!("cp {}", info.score),
    };
    format!(
        "info depth {} score {} nodes {} nps {} time {} pv {}",
        info.depth,
        score,
        info.nodes,
        nps,
        info.elapsed.as_millis(),
        format_line(board, &info.pv)
    )
}
