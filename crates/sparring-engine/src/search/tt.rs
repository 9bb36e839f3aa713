//! Transposition table keyed by the rules crate's Zobrist hash.
//!
//! One entry per slot, indexed by the low bits of the key. The table is owned
//! by a single [`Searcher`](super::Searcher) and only ever touched through
//! `&mut self`, so entries are plain values rather than atomics.
//!
//! Mate scores are stored relative to the node, not the root, so an entry
//! found at a different ply still reports the right mate distance.

use cozy_chess::Move;

use crate::search::negamax::MATE_THRESHOLD;

/// Bound type stored in a TT entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Empty slot.
    None,
    /// The stored score is exact.
    Exact,
    /// The stored score is a lower bound (failed high).
    LowerBound,
    /// The stored score is an upper bound (failed low).
    UpperBound,
}

/// Result of a successful TT probe.
#[derive(Debug, Clone, Copy)]
pub struct TtProbeResult {
    /// Best move from a previous search of this position, if one was found.
    pub best_move: Option<Move>,
    /// Remaining depth the entry was searched to.
    pub depth: u8,
    /// Bound type.
    pub bound: Bound,
    /// Score, already converted back to root-relative mate distance.
    pub score: i32,
}

impl TtProbeResult {
    /// Whether this entry settles a node searched to `depth` with window `[alpha, beta]`.
    ///
    /// Exact scores are always usable. A lower bound only cuts when it already
    /// meets `beta`, an upper bound only when it already fails `alpha`.
    pub fn cuts_off(&self, depth: u8, alpha: i32, beta: i32) -> bool {
        if self.depth < depth {
            return false;
        }
        match self.bound {
            Bound::Exact => true,
            Bound::LowerBound => self.score >= beta,
            Bound::UpperBound => self.score <= alpha,
            Bound::None => false,
        }
    }
}

/// Convert a root-relative search score to node-relative form for storage.
pub fn score_to_tt(score: i32, ply: usize) -> i32 {
    if score > MATE_THRESHOLD {
        score + ply as i32
    } else if score < -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

/// Inverse of [`score_to_tt`].
pub fn score_from_tt(score: i32, ply: usize) -> i32 {
    if score > MATE_THRESHOLD {
        score - ply as i32
    } else if score < -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    key: u64,
    best_move: Option<Move>,
    score: i32,
    depth: u8,
    bound: Bound,
    generation: u8,
}

impl Entry {
    const EMPTY: Self = Self {
        key: 0,
        best_move: None,
        score: 0,
        depth: 0,
        bound: Bound::None,
        generation: 0,
    };
}

/// Fixed-size, power-of-two transposition table.
pub struct TranspositionTable {
    entries: Vec<Entry>,
    mask: u64,
    generation: u8,
}

impl TranspositionTable {
    /// Create a table occupying at most `mb` megabytes.
    ///
    /// The entry count is rounded down to a power of two.
    pub fn new(mb: usize) -> Self {
        let bytes = mb.max(1) * 1024 * 1024;
        let fit = (bytes / std::mem::size_of::<Entry>()).max(1);
        let num_entries = 1usize << fit.ilog2();

        Self {
            entries: vec![Entry::EMPTY; num_entries],
            mask: (num_entries - 1) as u64,
            generation: 0,
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Wipe every entry and reset the generation counter.
    pub fn clear(&mut self) {
        self.entries.fill(Entry::EMPTY);
        self.generation = 0;
    }

    /// Advance the generation. Called once at the start of every search.
    pub fn new_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    /// Look up `hash`. `ply` is the distance from the root of the current search.
    pub fn probe(&self, hash: u64, ply: usize) -> Option<TtProbeResult> {
        let entry = &self.entries[(hash & self.mask) as usize];
        if entry.bound == Bound::None || entry.key != hash {
            return None;
        }

        Some(TtProbeResult {
            best_move: entry.best_move,
            depth: entry.depth,
            bound: entry.bound,
            score: score_from_tt(entry.score, ply),
        })
    }

    /// Record the outcome of a node.
    ///
    /// The slot is overwritten when it is empty, when it was written by an
    /// earlier search, or when the new result is at least as deep.
    pub fn store(
        &mut self,
        hash: u64,
        depth: u8,
        score: i32,
        best_move: Option<Move>,
        bound: Bound,
        ply: usize,
    ) {
        let generation = self.generation;
        let slot = &mut self.entries[(hash & self.mask) as usize];

        let replace = slot.bound == Bound::None
            || slot.generation != generation
            || depth >= slot.depth;
        if !replace {
            return;
        }

        *slot = Entry {
            key: hash,
            best_move,
            score: score_to_tt(score, ply),
            depth,
            bound,
            generation,
        };
    }
}

impl std::fmt::Debug for TranspositionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranspositionTable")
            .field("entries", &self.entries.len())
            .field("generation", &self.generation)
            .finish()
    }
}
