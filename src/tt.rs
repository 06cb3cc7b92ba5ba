use crate::{
    constants::{MATE_THRESHOLD, NUM_HASH_SLOTS},
    moves::Move,
};

/// How the stored score relates to the true minimax value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    /// The score is the exact value at the stored depth
    Exact,
    /// A beta-cutoff occurred; the true value is at least the score
    LowerBound,
    /// No move raised alpha; the true value is at most the score
    UpperBound,
}

/// One slot of the transposition table
#[derive(Clone, Copy)]
pub struct Entry {
    /// Full key for collision detection
    pub key: u64,
    /// Best move found for this position (may be null)
    pub best_move: Move,
    /// Remaining depth when the entry was stored
    pub depth: i32,
    /// Mate-adjusted score (see `save`/`correct_score`)
    pub score: i32,
    pub bound: Bound,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            key: 0,
            best_move: Move::NULL,
            depth: 0,
            score: 0,
            bound: Bound::Exact,
        }
    }
}

/// Fixed-size cache of search results keyed by Zobrist hash. Collisions
/// use always-replace, which outperforms depth-preferred at this table
/// size; revisit if the table grows.
pub struct TranspositionTable {
    entries: Vec<Entry>,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::with_capacity(NUM_HASH_SLOTS)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: vec![Entry::default(); capacity],
        }
    }

    pub fn clear(&mut self) {
        self.entries.fill(Entry::default());
    }

    fn index(&self, key: u64) -> usize {
        (key as usize) % self.entries.len()
    }

    /// Look up the entry for `key`. Returns None on a miss or a collision.
    pub fn probe(&self, key: u64) -> Option<&Entry> {
        let entry = &self.entries[self.index(key)];

        if entry.key == key {
            Some(entry)
        } else {
            None
        }
    }

    /// Store a result. Mate scores are shifted to be relative to the node
    /// they were found at, so the mate distance stays absolute no matter
    /// which ply later retrieves the entry.
    pub fn save(&mut self, key: u64, depth: i32, bound: Bound, score: i32, best_move: Move, ply: usize) {
        let adjusted_score = if score > MATE_THRESHOLD {
            score + ply as i32
        } else if score < -MATE_THRESHOLD {
            score - ply as i32
        } else {
            score
        };

        let index = self.index(key);
        self.entries[index] = Entry {
            key,
            best_move,
            depth,
            score: adjusted_score,
            bound,
        };
    }

    /// Undo the mate adjustment applied by `save` for a read at `ply`
    pub fn correct_score(&self, score: i32, ply: usize) -> i32 {
        if score > MATE_THRESHOLD {
            score - ply as i32
        } else if score < -MATE_THRESHOLD {
            score + ply as i32
        } else {
            score
        }
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new()
    }
}
