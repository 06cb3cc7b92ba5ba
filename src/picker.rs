use crate::{
    constants::{COUNTER_MOVE_BONUS, MAX_MOVES},
    history::MoveHistory,
    movegen::{self, MoveKind},
    moves::Move,
    types::{BoardState, Piece},
};

const BASE_GOOD_CAPTURE_SCORE: i32 = 100_000_000;
const BASE_BAD_CAPTURE_SCORE: i32 = -100_000_000;

const QUEEN_PROMOTION_SCORE: i32 = 1_000_000_000 - 1;
const KNIGHT_PROMOTION_SCORE: i32 = 1_000_000_000 - 2;
/// Rook and bishop promotions are almost never right; bury them so they
/// do not pollute the ordering
const UNDERPROMOTION_SCORE: i32 = -1_000_000_000;

/// Tactical moves losing more than a pawn of material count as bad
const BAD_CAPTURE_MARGIN: i32 = 64;

/// Most-valuable-victim / least-valuable-attacker. The victim dominates
/// the score; a cheaper attacker breaks ties.
#[rustfmt::skip]
const MVV_LVA: [[i32; 6]; 6] = [
    [15, 14, 13, 12, 11, 10], // victim P,    attacker P, N, B, R, Q, K
    [25, 24, 23, 22, 21, 20], // victim N,    attacker P, N, B, R, Q, K
    [35, 34, 33, 32, 31, 30], // victim B,    attacker P, N, B, R, Q, K
    [45, 44, 43, 42, 41, 40], // victim R,    attacker P, N, B, R, Q, K
    [55, 54, 53, 52, 51, 50], // victim Q,    attacker P, N, B, R, Q, K
    [ 0,  0,  0,  0,  0,  0], // victim K,    attacker P, N, B, R, Q, K
];

/// Which positions the picker is feeding
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PickerMode {
    Search,
    /// Only the hash move (if tactical) and good tacticals are yielded
    Quiescence,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Stage {
    TtMove,
    GenerateTacticals,
    GoodTacticals,
    Killer1,
    Killer2,
    GenerateQuiets,
    Quiets,
    BadTacticals,
    Done,
}

struct ScoredMoveList {
    moves: [Move; MAX_MOVES],
    scores: [i32; MAX_MOVES],
    len: usize,
}

impl ScoredMoveList {
    fn new() -> Self {
        Self {
            moves: [Move::NULL; MAX_MOVES],
            scores: [0; MAX_MOVES],
            len: 0,
        }
    }

    fn push(&mut self, mv: Move, score: i32) {
        debug_assert!(self.len < MAX_MOVES);
        self.moves[self.len] = mv;
        self.scores[self.len] = score;
        self.len += 1;
    }

    /// Swap the highest-scored remaining move into `index`. Cheaper than a
    /// full sort because most nodes cut off within the first few moves.
    fn selection_sort(&mut self, index: usize) -> (Move, i32) {
        let mut best_index = index;

        for next in index + 1..self.len {
            if self.scores[next] > self.scores[best_index] {
                best_index = next;
            }
        }

        self.moves.swap(index, best_index);
        self.scores.swap(index, best_index);

        (self.moves[index], self.scores[index])
    }
}

/// Yields moves one stage at a time in the order most likely to cause a
/// cutoff, generating each batch only when the previous stages have run
/// dry: hash move, winning tacticals, killers, quiets by history score,
/// and finally the losing tacticals.
pub struct MovePicker {
    mode: PickerMode,
    stage: Stage,
    tt_move: Move,
    killers: [Move; 2],
    /// The refutation recorded against the parent's move, if any
    counter: Move,
    tacticals: ScoredMoveList,
    bad_tacticals: ScoredMoveList,
    quiets: ScoredMoveList,
    index: usize,
}

impl MovePicker {
    pub fn new(mode: PickerMode, tt_move: Move, killers: [Move; 2], counter: Move) -> Self {
        Self {
            mode,
            stage: Stage::TtMove,
            tt_move,
            killers,
            counter,
            tacticals: ScoredMoveList::new(),
            bad_tacticals: ScoredMoveList::new(),
            quiets: ScoredMoveList::new(),
            index: 0,
        }
    }

    fn score_tactical(&self, state: &BoardState, mv: Move) -> i32 {
        if let Some(promote) = mv.promotion() {
            return match promote {
                Piece::Queen => QUEEN_PROMOTION_SCORE,
                Piece::Knight => KNIGHT_PROMOTION_SCORE,
                _ => UNDERPROMOTION_SCORE,
            };
        }

        let attacker = state.piece_on(mv.from());

        // En passant reads as pawn takes pawn
        let victim = if attacker == Piece::Pawn && state.en_passant == Some(mv.to()) {
            Piece::Pawn
        } else {
            state.piece_on(mv.to())
        };

        let mvv_lva = MVV_LVA[victim as usize][attacker as usize];

        // Winning or even exchanges go up front, losing ones to the back
        if movegen::static_exchange_eval(state, mv, -Piece::Pawn.see_value()) {
            BASE_GOOD_CAPTURE_SCORE + mvv_lva
        } else {
            BASE_BAD_CAPTURE_SCORE + mvv_lva
        }
    }

    fn score_quiet(&self, state: &BoardState, history: &MoveHistory, mv: Move) -> i32 {
        let mut score = history.butterfly_score(state.turn, mv);

        if mv == self.counter {
            score += COUNTER_MOVE_BONUS;
        }

        score
    }

    fn generate_tacticals(&mut self, state: &BoardState) {
        let generated = movegen::generate_moves(state, MoveKind::Tactical);

        for &mv in generated.iter() {
            if mv == self.tt_move {
                continue;
            }

            let score = self.score_tactical(state, mv);
            self.tacticals.push(mv, score);
        }
    }

    fn generate_quiets(&mut self, state: &BoardState, history: &MoveHistory) {
        let generated = movegen::generate_moves(state, MoveKind::Quiet);

        for &mv in generated.iter() {
            if mv == self.tt_move || mv == self.killers[0] || mv == self.killers[1] {
                continue;
            }

            let score = self.score_quiet(state, history, mv);
            self.quiets.push(mv, score);
        }
    }

    /// A killer is only replayed here if it is still a quiet, pseudo-legal
    /// move in this position and was not already yielded as the hash move.
    fn killer_is_playable(&self, state: &BoardState, killer: Move) -> bool {
        !killer.is_null()
            && killer != self.tt_move
            && !state.is_tactical(killer)
            && movegen::is_pseudo_legal(state, killer)
    }

    pub fn next(&mut self, state: &BoardState, history: &MoveHistory) -> Option<Move> {
        if self.stage == Stage::TtMove {
            self.stage = Stage::GenerateTacticals;

            if !self.tt_move.is_null() && movegen::is_pseudo_legal(state, self.tt_move) {
                let tactical_only = self.mode == PickerMode::Quiescence;

                if !tactical_only || state.is_tactical(self.tt_move) {
                    return Some(self.tt_move);
                }
            }
        }

        if self.stage == Stage::GenerateTacticals {
            self.stage = Stage::GoodTacticals;
            self.index = 0;
            self.generate_tacticals(state);
        }

        if self.stage == Stage::GoodTacticals {
            while self.index < self.tacticals.len {
                let (mv, score) = self.tacticals.selection_sort(self.index);
                self.index += 1;

                let is_bad = score <= BASE_BAD_CAPTURE_SCORE + BAD_CAPTURE_MARGIN
                    || (self.mode == PickerMode::Quiescence && score < 0);

                if is_bad {
                    self.bad_tacticals.push(mv, score);
                    continue;
                }

                return Some(mv);
            }

            // Quiescence only wants forcing moves
            if self.mode == PickerMode::Quiescence {
                self.stage = Stage::Done;
                return None;
            }

            self.stage = Stage::Killer1;
        }

        if self.stage == Stage::Killer1 {
            self.stage = Stage::Killer2;

            let killer = self.killers[0];
            if self.killer_is_playable(state, killer) {
                return Some(killer);
            }
        }

        if self.stage == Stage::Killer2 {
            self.stage = Stage::GenerateQuiets;

            let killer = self.killers[1];
            if killer != self.killers[0] && self.killer_is_playable(state, killer) {
                return Some(killer);
            }
        }

        if self.stage == Stage::GenerateQuiets {
            self.stage = Stage::Quiets;
            self.index = 0;
            self.generate_quiets(state, history);
        }

        if self.stage == Stage::Quiets {
            if self.index < self.quiets.len {
                let (mv, _) = self.quiets.selection_sort(self.index);
                self.index += 1;
                return Some(mv);
            }

            self.stage = Stage::BadTacticals;
            self.index = 0;
        }

        if self.stage == Stage::BadTacticals {
            if self.index < self.bad_tacticals.len {
                let (mv, _) = self.bad_tacticals.selection_sort(self.index);
                self.index += 1;
                return Some(mv);
            }

            self.stage = Stage::Done;
        }

        None
    }
}
