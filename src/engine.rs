use std::sync::atomic::Ordering;

use crate::{
    constants::{DEFAULT_MAX_DEPTH, STARTPOS_FEN},
    moves::Move,
    search::{IterationReport, SearchResult, Searcher},
    time::{TimeConfig, TimeManager},
    types::Side,
};

/// Everything a `go` command can constrain
pub struct SearchSettings {
    pub time: TimeConfig,
    pub max_depth: i32,
    pub max_nodes: Option<u64>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            time: TimeConfig::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            max_nodes: None,
        }
    }
}

/// Facade the front-end drives: position management plus the searcher and
/// the long-lived tables it owns.
pub struct Engine {
    pub searcher: Searcher,
    pub settings: SearchSettings,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            searcher: Searcher::new(),
            settings: SearchSettings::default(),
        }
    }

    /// Reset the board and every table that carries state between
    /// searches.
    pub fn new_game(&mut self) {
        self.searcher
            .board
            .set_from_fen(STARTPOS_FEN)
            .expect("start position FEN is valid");
        self.searcher.tt.clear();
        self.searcher.history.clear();
    }

    /// Load a position and replay the given UCI move strings on top of it.
    /// Illegal or unparsable moves are rejected before they touch the
    /// board.
    pub fn set_position(&mut self, fen: &str, moves: &[&str]) -> Result<(), String> {
        self.searcher
            .board
            .set_from_fen(fen)
            .map_err(|e| format!("Invalid FEN: {}", e))?;

        for move_str in moves {
            let mv = Move::from_uci(move_str).map_err(|e| format!("Bad move: {}", e))?;

            if !self.searcher.board.is_legal_move(mv) {
                return Err(format!("Illegal move: {}", move_str));
            }

            self.searcher.board.make_move(mv);
        }

        Ok(())
    }

    /// Run iterative deepening under the current settings. Each completed
    /// depth is reported through `on_iteration`.
    pub fn think<F>(&mut self, on_iteration: Option<F>) -> SearchResult
    where
        F: FnMut(&IterationReport),
    {
        let is_white_turn = self.searcher.board.state.turn == Side::White;

        self.searcher.time = TimeManager::new(self.settings.time, is_white_turn);

        self.searcher
            .think(self.settings.max_depth, self.settings.max_nodes, on_iteration)
    }

    /// Cooperative cancellation: the searcher polls this flag inside its
    /// node loop.
    pub fn stop(&self) {
        self.searcher.stop_flag().store(true, Ordering::Relaxed);
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
