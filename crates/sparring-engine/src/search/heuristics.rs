//! Killer move table and history heuristic for quiet move ordering.
//!
//! Both tables are allocated fresh for every search call and live only as
//! long as that search.

use cozy_chess::{Move, Piece, Square};

use crate::search::negamax::MAX_PLY;

/// Two killer moves per ply, newest in slot 0.
pub struct KillerTable {
    slots: [[Option<Move>; 2]; MAX_PLY],
}

impl KillerTable {
    /// Create an empty killer table.
    pub fn new() -> Self {
        Self {
            slots: [[None; 2]; MAX_PLY],
        }
    }

    /// Record a quiet move that caused a beta cutoff at `ply`.
    ///
    /// Shifts slot 0 to slot 1 unless the move is already the newest killer.
    pub fn store(&mut self, ply: usize, mv: Move) {
        let Some(slots) = self.slots.get_mut(ply) else {
            return;
        };
        if slots[0] != Some(mv) {
            slots[1] = slots[0];
            slots[0] = Some(mv);
        }
    }

    /// Which killer slot `mv` occupies at `ply`, if any.
    pub fn slot_of(&self, ply: usize, mv: Move) -> Option<usize> {
        let slots = self.slots.get(ply)?;
        slots.iter().position(|&k| k == Some(mv))
    }
}

impl Default for KillerTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Upper bound for a history entry.
pub const HISTORY_MAX: i32 = 1_000_000;

/// History heuristic indexed by `[moving piece][destination square]`.
///
/// Scores only ever grow, by `depth²` per cutoff, and saturate at [`HISTORY_MAX`].
pub struct HistoryTable {
    table: [[i32; Square::NUM]; Piece::NUM],
}

impl HistoryTable {
    /// Create a zeroed history table.
    pub fn new() -> Self {
        Self {
            table: [[0; Square::NUM]; Piece::NUM],
        }
    }

    /// Reward a quiet move that caused a beta cutoff at `depth`.
    pub fn reward(&mut self, piece: Piece, to: Square, depth: u8) {
        let bonus = i32::from(depth) * i32::from(depth);
        let entry = &mut self.table[piece as usize][to as usize];
        *entry = (*entry + bonus).min(HISTORY_MAX);
    }

    /// Current score for `piece` moving to `to`.
    pub fn score(&self, piece: Piece, to: Square) -> i32 {
        self.table[piece as usize][to as usize]
    }
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}
