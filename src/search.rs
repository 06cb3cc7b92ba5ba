use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{
    board::Board,
    constants::{
        ASPIRATION_MIN_DEPTH, ASPIRATION_WINDOW, DRAW_SCORE, INFINITY_SCORE, MATE_SCORE, MAX_PLY,
        REVERSE_FUTILITY_BASE_MARGIN, REVERSE_FUTILITY_DEPTH_LIMIT,
        REVERSE_FUTILITY_MARGIN_INCREMENT, TIME_CHECK_INTERVAL,
    },
    eval,
    history::MoveHistory,
    movegen,
    moves::{Move, MoveList},
    picker::{MovePicker, PickerMode},
    time::TimeManager,
    tt::{Bound, TranspositionTable},
    types::Piece,
};

const LMR_TABLE_SIZE: usize = 64;

/// Triangular table that assembles the principal variation as the search
/// backs out of the tree.
struct PrincipalVariation {
    length: [usize; MAX_PLY],
    table: [[Move; MAX_PLY]; MAX_PLY],
}

impl PrincipalVariation {
    fn new() -> Self {
        Self {
            length: [0; MAX_PLY],
            table: [[Move::NULL; MAX_PLY]; MAX_PLY],
        }
    }

    fn clear(&mut self) {
        self.length = [0; MAX_PLY];
    }

    /// Every node opens its line empty
    fn begin_node(&mut self, ply: usize) {
        if ply < MAX_PLY {
            self.length[ply] = ply;
        }
    }

    /// `mv` improved alpha at `ply`: it heads this ply's line, followed by
    /// the child's line.
    fn update(&mut self, ply: usize, mv: Move) {
        if ply + 1 >= MAX_PLY {
            return;
        }

        self.table[ply][ply] = mv;

        let child_length = self.length[ply + 1].max(ply + 1);
        for i in ply + 1..child_length {
            self.table[ply][i] = self.table[ply + 1][i];
        }

        self.length[ply] = child_length;
    }

    fn root_line(&self) -> Vec<Move> {
        self.table[0][..self.length[0]].to_vec()
    }
}

/// Snapshot of one completed iteration, handed to the front-end for the
/// UCI info line.
pub struct IterationReport {
    pub depth: i32,
    pub score: i32,
    pub nodes: u64,
    pub nps: u64,
    pub time_ms: u64,
    pub seldepth: usize,
    pub pv: Vec<Move>,
}

pub struct SearchResult {
    pub best_move: Move,
    pub ponder_move: Option<Move>,
    pub evaluation: i32,
    pub depth: i32,
    pub nodes: u64,
    pub time_ms: u64,
    pub principal_variation: Vec<Move>,
}

/// The search context: exclusive ownership of the board plus the
/// transposition table, heuristic tables, and clock it consults. All
/// dependencies flow from here downward; nothing below holds a
/// back-reference.
pub struct Searcher {
    pub board: Board,
    pub tt: TranspositionTable,
    pub history: MoveHistory,
    pub time: TimeManager,
    stop_flag: Arc<AtomicBool>,
    nodes: u64,
    max_nodes: Option<u64>,
    stopped: bool,
    null_move_allowed: bool,
    pv: PrincipalVariation,
    root_best: Move,
    lmr_table: [[i32; LMR_TABLE_SIZE]; LMR_TABLE_SIZE],
}

impl Searcher {
    pub fn new() -> Self {
        let mut lmr_table = [[0; LMR_TABLE_SIZE]; LMR_TABLE_SIZE];

        for (depth, row) in lmr_table.iter_mut().enumerate().skip(1) {
            for (moves, entry) in row.iter_mut().enumerate().skip(1) {
                let reduction = 0.77 + (depth as f64).ln() + (moves as f64).ln() / 2.36;
                *entry = (reduction.floor() as i32).max(0);
            }
        }

        Self {
            board: Board::new(),
            tt: TranspositionTable::new(),
            history: MoveHistory::new(),
            time: TimeManager::default(),
            stop_flag: Arc::new(AtomicBool::new(false)),
            nodes: 0,
            max_nodes: None,
            stopped: false,
            null_move_allowed: true,
            pv: PrincipalVariation::new(),
            root_best: Move::NULL,
            lmr_table,
        }
    }

    /// Flag an input thread can set to cancel the search cooperatively
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_flag)
    }

    fn lmr_reduction(&self, depth: i32, moves_tried: usize) -> i32 {
        let depth_index = (depth.max(0) as usize).min(LMR_TABLE_SIZE - 1);
        let moves_index = moves_tried.min(LMR_TABLE_SIZE - 1);
        self.lmr_table[depth_index][moves_index]
    }

    /// Poll the clock, the stop flag, and the node budget. Cheap enough to
    /// call once per node.
    fn should_stop(&mut self) -> bool {
        if self.stopped {
            return true;
        }

        if let Some(max_nodes) = self.max_nodes {
            if self.nodes >= max_nodes {
                self.stopped = true;
                return true;
            }
        }

        if self.nodes % TIME_CHECK_INTERVAL == 0
            && (self.stop_flag.load(Ordering::Relaxed) || self.time.times_up())
        {
            self.stopped = true;
        }

        self.stopped
    }

    /// Iterative deepening driver. Each completed depth reports through
    /// `on_iteration`; the result always reflects the last depth that ran
    /// to completion, never a partial one.
    pub fn think<F>(
        &mut self,
        max_depth: i32,
        max_nodes: Option<u64>,
        mut on_iteration: Option<F>,
    ) -> SearchResult
    where
        F: FnMut(&IterationReport),
    {
        self.history.clear_killers();
        self.time.start();
        self.stop_flag.store(false, Ordering::Relaxed);
        self.nodes = 0;
        self.max_nodes = max_nodes;
        self.stopped = false;
        self.null_move_allowed = true;
        self.root_best = Move::NULL;

        let mut result = SearchResult {
            best_move: Move::NULL,
            ponder_move: None,
            evaluation: 0,
            depth: 0,
            nodes: 0,
            time_ms: 0,
            principal_variation: Vec::new(),
        };

        let mut previous_score = 0;

        for depth in 1..=max_depth.max(1) {
            self.pv.clear();

            // Aspiration window around the previous iteration's score,
            // once the score is stable enough to trust
            let (mut alpha, mut beta) = if depth >= ASPIRATION_MIN_DEPTH {
                (
                    previous_score - ASPIRATION_WINDOW,
                    previous_score + ASPIRATION_WINDOW,
                )
            } else {
                (-INFINITY_SCORE, INFINITY_SCORE)
            };

            let mut score = self.search_root(depth, alpha, beta);

            if !self.stopped && (score <= alpha || score >= beta) {
                alpha = -INFINITY_SCORE;
                beta = INFINITY_SCORE;
                self.pv.clear();
                score = self.search_root(depth, alpha, beta);
            }

            if self.stopped {
                break;
            }

            previous_score = score;

            let pv = self.pv.root_line();
            let time_ms = self.time.elapsed_ms();

            result = SearchResult {
                best_move: pv.first().copied().unwrap_or(self.root_best),
                ponder_move: pv.get(1).copied(),
                evaluation: score,
                depth,
                nodes: self.nodes,
                time_ms,
                principal_variation: pv.clone(),
            };

            if let Some(callback) = on_iteration.as_mut() {
                callback(&IterationReport {
                    depth,
                    score,
                    nodes: self.nodes,
                    nps: self.nodes * 1000 / time_ms.max(1),
                    time_ms,
                    seldepth: pv.len(),
                    pv,
                });
            }

            if eval::is_mate_score(score) {
                break;
            }

            if self.time.root_times_up(result.best_move) {
                break;
            }
        }

        // A stop during the very first iteration leaves no completed
        // depth; surface the best root move seen so far anyway.
        if result.best_move.is_null() {
            result.best_move = self.root_best;
            result.principal_variation = if self.root_best.is_null() {
                Vec::new()
            } else {
                vec![self.root_best]
            };
        }

        result.nodes = self.nodes;
        result.time_ms = self.time.elapsed_ms();
        result
    }

    /// Root node: structurally the same loop as `search`, but it is always
    /// a PV node, never prunes the move list, and feeds the per-move node
    /// counts to the time manager.
    fn search_root(&mut self, mut depth: i32, mut alpha: i32, beta: i32) -> i32 {
        self.pv.begin_node(0);

        let side = self.board.state.turn;
        let parent_move = self.board.state.last_move;

        if movegen::king_in_check(&self.board.state, side) {
            depth += 1;
        }

        let tt_move = self
            .tt
            .probe(self.board.state.key)
            .map(|entry| entry.best_move)
            .unwrap_or(Move::NULL);

        let mut picker = MovePicker::new(
            PickerMode::Search,
            tt_move,
            self.history.killers(0),
            self.history.counter_move(parent_move),
        );

        let original_alpha = alpha;
        let mut best_score = -INFINITY_SCORE;
        let mut best_move = Move::NULL;
        let mut legal_moves = 0usize;
        let mut tried_quiets = MoveList::new();

        while let Some(mv) = picker.next(&self.board.state, &self.history) {
            let is_capture = self.board.state.is_capture(mv);
            let is_promotion = mv.promotion().is_some();

            self.board.make_move(mv);

            if movegen::king_in_check(&self.board.state, side) {
                self.board.undo_move();
                continue;
            }

            legal_moves += 1;
            self.nodes += 1;
            self.time.update_nodes_searched();

            let nodes_before = self.nodes;
            let gives_check = movegen::king_in_check(&self.board.state, self.board.state.turn);

            let mut reduction = 0;
            if depth >= 2 && legal_moves > 2 && !is_capture && !is_promotion && !gives_check {
                reduction = self.lmr_reduction(depth, legal_moves - 1);
            }

            let score = if legal_moves == 1 {
                -self.search(depth - 1 - reduction, 1, -beta, -alpha)
            } else {
                let null_window_score =
                    -self.search(depth - 1 - reduction, 1, -alpha - 1, -alpha);

                // Root is a PV node, so every improvement re-searches with
                // the full window at unreduced depth
                if null_window_score > alpha {
                    -self.search(depth - 1, 1, -beta, -alpha)
                } else {
                    null_window_score
                }
            };

            self.board.undo_move();
            self.time
                .update_node_spent_table(mv, self.nodes - nodes_before);

            if self.stopped {
                break;
            }

            if !is_capture && !is_promotion {
                tried_quiets.push(mv);
            }

            if score > best_score {
                best_score = score;
                best_move = mv;
                self.root_best = mv;

                if score > alpha {
                    alpha = score;
                    self.pv.update(0, mv);
                }
            }

            if alpha >= beta {
                if !is_capture && !is_promotion {
                    self.record_quiet_cutoff(0, depth, mv, parent_move, &tried_quiets);
                }
                break;
            }
        }

        if legal_moves == 0 {
            return if movegen::king_in_check(&self.board.state, side) {
                -MATE_SCORE
            } else {
                DRAW_SCORE
            };
        }

        if !self.stopped {
            let bound = if best_score >= beta {
                Bound::LowerBound
            } else if best_score <= original_alpha {
                Bound::UpperBound
            } else {
                Bound::Exact
            };

            self.tt
                .save(self.board.state.key, depth, bound, best_score, best_move, 0);
        }

        best_score
    }

    /// Principal-variation search, fail-soft negamax. Returns the score
    /// from the side to move's perspective.
    fn search(&mut self, mut depth: i32, ply: usize, mut alpha: i32, beta: i32) -> i32 {
        self.pv.begin_node(ply);

        if self.should_stop() {
            return 0;
        }

        if ply >= MAX_PLY {
            return eval::evaluate(&self.board.state);
        }

        if self.board.is_draw() {
            return DRAW_SCORE;
        }

        let pv_node = beta - alpha > 1;
        let original_alpha = alpha;
        let key = self.board.state.key;

        let mut tt_move = Move::NULL;

        if let Some(entry) = self.tt.probe(key) {
            tt_move = entry.best_move;

            if !pv_node && entry.depth >= depth {
                let tt_score = self.tt.correct_score(entry.score, ply);

                let usable = match entry.bound {
                    Bound::Exact => true,
                    Bound::LowerBound => tt_score >= beta,
                    Bound::UpperBound => tt_score <= alpha,
                };

                if usable {
                    return tt_score;
                }
            }
        }

        let side = self.board.state.turn;
        let in_check = movegen::king_in_check(&self.board.state, side);

        // Never drop into quiescence while in check
        if in_check {
            depth += 1;
        }

        if depth <= 0 {
            return self.quiesce(ply, alpha, beta);
        }

        // Reverse futility: a position so far above beta that a shallow
        // search will not bring it back down
        if depth <= REVERSE_FUTILITY_DEPTH_LIMIT && !pv_node && !in_check {
            let static_eval = eval::evaluate(&self.board.state);
            let margin = REVERSE_FUTILITY_BASE_MARGIN + REVERSE_FUTILITY_MARGIN_INCREMENT * depth;

            if static_eval - margin >= beta {
                return static_eval;
            }
        }

        // Null move: hand the opponent a free move; if the position still
        // beats beta the real move surely will. Skipped without non-pawn
        // material (zugzwang) and while another null is on the stack.
        if self.null_move_allowed
            && depth > 2
            && !in_check
            && !pv_node
            && self.board.state.has_non_pawn_material(side)
        {
            self.null_move_allowed = false;
            self.board.make_null_move();

            let reduction = depth / 4 + 3;
            let null_score = -self.search(depth - reduction, ply + 1, -beta, -beta + 1);

            self.board.undo_null_move();
            self.null_move_allowed = true;

            if self.stopped {
                return 0;
            }

            if null_score >= beta {
                return if eval::is_mate_score(null_score) {
                    beta
                } else {
                    null_score
                };
            }
        }

        let parent_move = self.board.state.last_move;
        let mut picker = MovePicker::new(
            PickerMode::Search,
            tt_move,
            self.history.killers(ply),
            self.history.counter_move(parent_move),
        );

        let mut best_score = -INFINITY_SCORE;
        let mut best_move = Move::NULL;
        let mut legal_moves = 0usize;
        let mut tried_quiets = MoveList::new();

        while let Some(mv) = picker.next(&self.board.state, &self.history) {
            let is_capture = self.board.state.is_capture(mv);
            let is_promotion = mv.promotion().is_some();

            self.board.make_move(mv);

            // The generator is pseudo-legal; discard anything that leaves
            // our king hanging
            if movegen::king_in_check(&self.board.state, side) {
                self.board.undo_move();
                continue;
            }

            legal_moves += 1;
            self.nodes += 1;
            self.time.update_nodes_searched();

            let gives_check = movegen::king_in_check(&self.board.state, self.board.state.turn);

            let mut reduction = 0;
            if depth >= 2 && legal_moves > 2 && !is_capture && !is_promotion && !gives_check {
                reduction = self.lmr_reduction(depth, legal_moves - 1);
            }

            let score = if legal_moves == 1 {
                -self.search(depth - 1 - reduction, ply + 1, -beta, -alpha)
            } else {
                let null_window_score =
                    -self.search(depth - 1 - reduction, ply + 1, -alpha - 1, -alpha);

                if null_window_score > alpha && (pv_node || reduction > 0) {
                    -self.search(depth - 1, ply + 1, -beta, -alpha)
                } else {
                    null_window_score
                }
            };

            self.board.undo_move();

            if self.stopped {
                return 0;
            }

            if !is_capture && !is_promotion {
                tried_quiets.push(mv);
            }

            if score > best_score {
                best_score = score;
                best_move = mv;

                if score > alpha {
                    alpha = score;
                    self.pv.update(ply, mv);
                }
            }

            if alpha >= beta {
                if !is_capture && !is_promotion {
                    self.record_quiet_cutoff(ply, depth, mv, parent_move, &tried_quiets);
                }
                break;
            }
        }

        if legal_moves == 0 {
            return if in_check {
                -MATE_SCORE + ply as i32
            } else {
                DRAW_SCORE
            };
        }

        let bound = if best_score >= beta {
            Bound::LowerBound
        } else if best_score <= original_alpha {
            Bound::UpperBound
        } else {
            Bound::Exact
        };

        self.tt.save(key, depth, bound, best_score, best_move, ply);

        best_score
    }

    /// A quiet cutoff feeds every ordering heuristic at once: the killer
    /// slots, the butterfly table (crediting the cutoff move, debiting the
    /// quiets tried before it), and the counter-move table.
    fn record_quiet_cutoff(
        &mut self,
        ply: usize,
        depth: i32,
        mv: Move,
        parent_move: Move,
        tried_quiets: &MoveList,
    ) {
        let side = self.board.state.turn;

        self.history.update_killers(ply, mv);
        self.history.credit_butterfly(side, mv, depth);

        for &quiet in tried_quiets.iter() {
            if quiet != mv {
                self.history.debit_butterfly(side, quiet, depth);
            }
        }

        self.history.update_counter_move(parent_move, mv);
    }

    /// Quiescence: at the horizon, keep resolving forcing moves so the
    /// static evaluation is never taken in the middle of a capture
    /// sequence. When in check, every evasion is searched instead and
    /// standing pat is not an option.
    pub fn quiesce(&mut self, ply: usize, mut alpha: i32, beta: i32) -> i32 {
        self.pv.begin_node(ply);

        if self.should_stop() {
            return 0;
        }

        if self.board.is_draw() {
            return DRAW_SCORE;
        }

        let side = self.board.state.turn;
        let in_check = movegen::king_in_check(&self.board.state, side);

        if ply >= MAX_PLY {
            return if in_check {
                DRAW_SCORE
            } else {
                eval::evaluate(&self.board.state)
            };
        }

        if !movegen::has_legal_move(&mut self.board) {
            return if in_check {
                -MATE_SCORE + ply as i32
            } else {
                DRAW_SCORE
            };
        }

        let mut best_score = -INFINITY_SCORE;

        if !in_check {
            let stand_pat = eval::evaluate(&self.board.state);

            if stand_pat >= beta {
                return stand_pat;
            }

            // Delta pruning: even winning a queen cannot rescue alpha
            if stand_pat + Piece::Queen.value() < alpha {
                return alpha;
            }

            if stand_pat > alpha {
                alpha = stand_pat;
            }

            best_score = stand_pat;
        }

        let tt_move = self
            .tt
            .probe(self.board.state.key)
            .map(|entry| entry.best_move)
            .unwrap_or(Move::NULL);

        let mode = if in_check {
            PickerMode::Search
        } else {
            PickerMode::Quiescence
        };

        let mut picker = MovePicker::new(mode, tt_move, [Move::NULL; 2], Move::NULL);

        while let Some(mv) = picker.next(&self.board.state, &self.history) {
            self.board.make_move(mv);

            if movegen::king_in_check(&self.board.state, side) {
                self.board.undo_move();
                continue;
            }

            self.nodes += 1;
            self.time.update_nodes_searched();

            let score = -self.quiesce(ply + 1, -beta, -alpha);

            self.board.undo_move();

            if self.stopped {
                return 0;
            }

            if score > best_score {
                best_score = score;

                if score > alpha {
                    alpha = score;
                    self.pv.update(ply, mv);
                }
            }

            if alpha >= beta {
                break;
            }
        }

        // Fail-soft: the score may fall outside the original window
        best_score
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}
