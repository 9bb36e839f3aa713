//! UCI command parsing.

use std::time::Duration;

use cozy_chess::Board;
use sparring_engine::{ClockTime, EngineOptions, SearchConstraints};

use crate::error::UciError;
use crate::notation::parse_move;

/// Parameters for the `go` command.
///
/// All fields are optional; a bare `go` uses defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoParams {
    /// White's remaining time.
    pub wtime: Option<Duration>,
    /// Black's remaining time.
    pub btime: Option<Duration>,
    /// White's increment per move.
    pub winc: Option<Duration>,
    /// Black's increment per move.
    pub binc: Option<Duration>,
    /// Search to this depth only, already clamped to 1..=20.
    pub depth: Option<u8>,
    /// Search for exactly this duration.
    pub movetime: Option<Duration>,
    /// Search this many nodes only.
    pub nodes: Option<u64>,
    /// Search until `stop` (no time limit).
    pub infinite: bool,
}

impl GoParams {
    /// The engine-side view of these parameters.
    ///
    /// A side's increment without its remaining time is dropped.
    pub fn to_constraints(&self) -> SearchConstraints {
        let clock = |remaining: Option<Duration>, increment: Option<Duration>| {
            remaining.map(|remaining| ClockTime {
                remaining,
                increment: increment.unwrap_or(Duration::ZERO),
            })
        };
        SearchConstraints {
            depth: self.depth,
            white: clock(self.wtime, self.winc),
            black: clock(self.btime, self.binc),
            movetime: self.movetime,
            nodes: self.nodes,
            infinite: self.infinite,
        }
    }
}

/// A `position` command resolved to a board.
#[derive(Debug, Clone)]
pub struct PositionInfo {
    /// The position after all listed moves.
    pub board: Board,
    /// Hashes of every earlier position in the move list, oldest first.
    pub history: Vec<u64>,
}

/// An engine option set through `setoption`.
///
/// Values are passed through unclamped; the engine clamps them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UciOption {
    /// `MaxDepth`: default search depth.
    MaxDepth(i64),
    /// `TTSize` (or `Hash`): transposition table size in MiB.
    TtSize(i64),
    /// `NullMoveReduction`: null-move depth reduction R.
    NullMoveReduction(i64),
    /// `SeeMaxLoss`: exchange loss the capture strategy accepts, in points.
    SeeMaxLoss(i64),
}

/// A parsed UCI command.
#[derive(Debug)]
pub enum Command {
    /// `uci` -- identify the engine.
    Uci,
    /// `isready` -- synchronization ping.
    IsReady,
    /// `ucinewgame` -- reset engine state.
    UciNewGame,
    /// `position` -- set up a board position with optional moves applied.
    Position(PositionInfo),
    /// `go` -- start searching with given parameters.
    Go(GoParams),
    /// `setoption name <id> value <x>`.
    SetOption(UciOption),
    /// `stop` -- halt the current search.
    Stop,
    /// `quit` -- exit the engine.
    Quit,
    /// Unrecognized command, silently ignored.
    Unknown(String),
}

/// Parse a single line of UCI input into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(Command::Unknown(String::new()));
    }

    match tokens[0] {
        "uci" => Ok(Command::Uci),
        "isready" => Ok(Command::IsReady),
        "ucinewgame" => Ok(Command::UciNewGame),
        "stop" => Ok(Command::Stop),
        "quit" => Ok(Command::Quit),
        "position" => parse_position(&tokens[1..]),
        "go" => parse_go(&tokens[1..]),
        "setoption" => parse_setoption(&tokens[1..]),
        _ => Ok(Command::Unknown(tokens[0].to_string())),
    }
}

/// Parse the `position` command arguments.
///
/// Supports:
/// - `position startpos [moves e2e4 d7d5 ...]`
/// - `position fen <fen-string> [moves e2e4 d7d5 ...]`
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    if tokens.is_empty() {
        return Err(UciError::MalformedPosition);
    }

    let (mut board, rest) = if tokens[0] == "startpos" {
        (Board::default(), &tokens[1..])
    } else if tokens[0] == "fen" {
        // FEN is 6 space-separated fields
        if tokens.len() < 7 {
            return Err(UciError::InvalidFen {
                fen: tokens[1..].join(" "),
            });
        }
        let fen = tokens[1..7].join(" ");
        let board = Board::from_fen(&fen, false).map_err(|_| UciError::InvalidFen {
            fen: fen.clone(),
        })?;
        (board, &tokens[7..])
    } else {
        return Err(UciError::MalformedPosition);
    };

    let mut history = Vec::new();
    if !rest.is_empty() && rest[0] == "moves" {
        for uci_str in &rest[1..] {
            let mv = parse_move(&board, uci_str).ok_or_else(|| UciError::InvalidMove {
                uci_move: uci_str.to_string(),
            })?;
            history.push(board.hash());
            board.play_unchecked(mv);
        }
    }

    Ok(Command::Position(PositionInfo { board, history }))
}

/// Parse the `go` command arguments.
///
/// Supports: wtime, btime, winc, binc, depth, movetime, nodes, infinite.
/// Unknown tokens are silently skipped.
fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut params = GoParams::default();

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "wtime" => {
                params.wtime = Some(parse_millis(tokens.get(i + 1), "wtime")?);
                i += 2;
            }
            "btime" => {
                params.btime = Some(parse_millis(tokens.get(i + 1), "btime")?);
                i += 2;
            }
            "winc" => {
                params.winc = Some(parse_millis(tokens.get(i + 1), "winc")?);
                i += 2;
            }
            "binc" => {
                params.binc = Some(parse_millis(tokens.get(i + 1), "binc")?);
                i += 2;
            }
            "depth" => {
                params.depth = Some(parse_depth(tokens.get(i + 1))?);
                i += 2;
            }
            "movetime" => {
                params.movetime = Some(parse_millis(tokens.get(i + 1), "movetime")?);
                i += 2;
            }
            "nodes" => {
                params.nodes = Some(parse_int(tokens.get(i + 1), "nodes")?);
                i += 2;
            }
            "infinite" => {
                params.infinite = true;
                i += 1;
            }
            _ => {
                // Unknown token -- skip per UCI convention
                i += 1;
            }
        }
    }

    Ok(Command::Go(params))
}

/// Parse `setoption name <id...> value <x>`.
///
/// Option names are matched case-insensitively and may contain spaces.
fn parse_setoption(tokens: &[&str]) -> Result<Command, UciError> {
    let value_at = tokens.iter().position(|&t| t == "value");
    let name_end = value_at.unwrap_or(tokens.len());
    let name = match tokens.first() {
        Some(&"name") => tokens[1..name_end].join(" "),
        _ => tokens[..name_end].join(" "),
    };
    let raw = value_at
        .map(|at| tokens[at + 1..].join(" "))
        .unwrap_or_default();

    let value = || -> Result<i64, UciError> {
        raw.parse().map_err(|_| UciError::InvalidOptionValue {
            name: name.clone(),
            value: raw.clone(),
        })
    };

    let key = name.to_ascii_lowercase();
    let option = match key.as_str() {
        "maxdepth" => UciOption::MaxDepth(value()?),
        "ttsize" | "hash" => UciOption::TtSize(value()?),
        "nullmovereduction" => UciOption::NullMoveReduction(value()?),
        "seemaxloss" => UciOption::SeeMaxLoss(value()?),
        _ => return Err(UciError::UnknownOption { name }),
    };
    Ok(Command::SetOption(option))
}

/// Parse a millisecond value from a token.
///
/// Negative clock values (some GUIs send them after a flag) read as zero.
fn parse_millis(token: Option<&&str>, param: &str) -> Result<Duration, UciError> {
    let ms: i64 = parse_int(token, param)?;
    Ok(Duration::from_millis(ms.max(0) as u64))
}

/// Parse a `go depth` value, clamped into the engine's depth range.
fn parse_depth(token: Option<&&str>) -> Result<u8, UciError> {
    let depth: i64 = parse_int(token, "depth")?;
    let range = EngineOptions::MAX_DEPTH_RANGE;
    Ok(depth.clamp(*range.start(), *range.end()) as u8)
}

/// Parse an integer value from a token.
fn parse_int<T: std::str::FromStr>(token: Option<&&str>, param: &str) -> Result<T, UciError> {
    let value = token.ok_or_else(|| UciError::MissingGoValue {
        param: param.to_string(),
    })?;
    value.parse().map_err(|_| UciError::InvalidGoValue {
        param: param.to_string(),
        value: value.to_string(),
    })
}
