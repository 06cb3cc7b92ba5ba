use crate::{
    constants::{CASTLE_MASK, MAX_GAME_PLY, NUM_RANKS, STARTPOS_FEN},
    fen::{self, FenError},
    movegen,
    moves::Move,
    types::{BitBoard, BoardState, Piece, Side, Square},
    zobrist,
};

impl BoardState {
    pub fn occupied(&self) -> BitBoard {
        self.units[Side::White as usize] | self.units[Side::Black as usize]
    }

    pub fn piece_on(&self, square: Square) -> Piece {
        self.piece_at[square as usize]
    }

    pub fn side_on(&self, square: Square) -> Option<Side> {
        if self.units[Side::White as usize].is_bit_set(square) {
            Some(Side::White)
        } else if self.units[Side::Black as usize].is_bit_set(square) {
            Some(Side::Black)
        } else {
            None
        }
    }

    pub fn king_square(&self, side: Side) -> Square {
        Square::from(self.pieces[side as usize][Piece::King as usize])
    }

    /// Zugzwang guard for null-move pruning: does `side` still own a piece
    /// that is neither a pawn nor the king?
    pub fn has_non_pawn_material(&self, side: Side) -> bool {
        let pieces = &self.pieces[side as usize];

        (pieces[Piece::Knight as usize]
            | pieces[Piece::Bishop as usize]
            | pieces[Piece::Rook as usize]
            | pieces[Piece::Queen as usize])
            .is_not_empty()
    }

    /// Is `mv` a capture (including en passant) in this position?
    pub fn is_capture(&self, mv: Move) -> bool {
        self.piece_at[mv.to() as usize] != Piece::Empty
            || (self.piece_at[mv.from() as usize] == Piece::Pawn
                && self.en_passant == Some(mv.to()))
    }

    /// Captures and promotions: the moves quiescence is interested in
    pub fn is_tactical(&self, mv: Move) -> bool {
        self.is_capture(mv) || mv.promotion().is_some()
    }

    fn move_piece(&mut self, side: Side, piece: Piece, from: Square, to: Square) {
        self.pieces[side as usize][piece as usize].clear_bit(from);
        self.pieces[side as usize][piece as usize].set_bit(to);
        self.units[side as usize].clear_bit(from);
        self.units[side as usize].set_bit(to);
        self.piece_at[from as usize] = Piece::Empty;
        self.piece_at[to as usize] = piece;
    }
}

/// The board a search runs on: the current state plus the snapshot stacks
/// that let make_move be undone exactly.
pub struct Board {
    pub state: BoardState,
    history: Vec<BoardState>,
    key_history: Vec<u64>,
}

impl Board {
    pub fn new() -> Self {
        Self::from_fen(STARTPOS_FEN).expect("start position FEN is valid")
    }

    pub fn from_fen(fen_str: &str) -> Result<Self, FenError> {
        Ok(Self {
            state: fen::parse(fen_str)?,
            history: Vec::with_capacity(MAX_GAME_PLY),
            key_history: Vec::with_capacity(MAX_GAME_PLY),
        })
    }

    /// Replace the position. The stacks are reset since the moves that led
    /// here will be re-applied by the caller.
    pub fn set_from_fen(&mut self, fen_str: &str) -> Result<(), FenError> {
        self.state = fen::parse(fen_str)?;
        self.history.clear();
        self.key_history.clear();
        Ok(())
    }

    pub fn to_fen(&self) -> String {
        fen::export(&self.state)
    }

    /// Number of makes that have not been undone
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Apply a pseudo-legal move. The caller is responsible for verifying
    /// afterwards that the mover's king was not left in check.
    pub fn make_move(&mut self, mv: Move) {
        self.history.push(self.state);
        self.key_history.push(self.state.key);

        let side = self.state.turn;
        let other = side.opponent();
        let from = mv.from();
        let to = mv.to();
        let piece = self.state.piece_at[from as usize];

        debug_assert!(piece != Piece::Empty, "no piece on {:?}", from);

        let mut new_fifty = self.state.fifty.saturating_add(1);

        // XOR out the mover at its origin and the old turn contribution
        self.state.key ^= zobrist::piece_square(side, piece, from) ^ zobrist::turn(&self.state);

        let captured = self.state.piece_at[to as usize];
        if captured != Piece::Empty {
            self.state.key ^= zobrist::piece_square(other, captured, to);
            self.state.pieces[other as usize][captured as usize].clear_bit(to);
            self.state.units[other as usize].clear_bit(to);
            self.state.piece_at[to as usize] = Piece::Empty;
            new_fifty = 0;
        }

        // The en-passant key for a fresh double push is folded in only
        // after the turn flips (the key depends on who may capture).
        let mut double_push = false;

        if piece == Piece::Pawn {
            new_fifty = 0;

            if self.state.en_passant == Some(to) {
                // En-passant capture: the victim stands behind the target
                let victim_square = match side {
                    Side::White => Square::try_from(to as i32 - 8).unwrap(),
                    Side::Black => Square::try_from(to as i32 + 8).unwrap(),
                };

                self.state.key ^= zobrist::piece_square(other, Piece::Pawn, victim_square);
                self.state.pieces[other as usize][Piece::Pawn as usize].clear_bit(victim_square);
                self.state.units[other as usize].clear_bit(victim_square);
                self.state.piece_at[victim_square as usize] = Piece::Empty;

                self.state.key ^= zobrist::en_passant(&self.state);
                self.state.en_passant = None;
            } else if from.rank().abs_diff(to.rank()) == 2 {
                self.state.key ^= zobrist::en_passant(&self.state);

                let traversed = (from as i32 + to as i32) / 2;
                self.state.en_passant = Some(Square::try_from(traversed).unwrap());
                double_push = true;
            } else if self.state.en_passant.is_some() {
                self.state.key ^= zobrist::en_passant(&self.state);
                self.state.en_passant = None;
            }
        } else if self.state.en_passant.is_some() {
            self.state.key ^= zobrist::en_passant(&self.state);
            self.state.en_passant = None;
        }

        self.state.move_piece(side, piece, from, to);

        // Castling: the king travels two files and drags its rook along.
        // Any king/rook move or rook capture then clips the rights bits,
        // and a changed subset re-keys the castle contribution.
        self.state.key ^= zobrist::castle_rights(self.state.castle);

        if piece == Piece::King && from.file().abs_diff(to.file()) == 2 {
            let (rook_from, rook_to) = if to.file() > from.file() {
                match side {
                    Side::White => (Square::H1, Square::F1),
                    Side::Black => (Square::H8, Square::F8),
                }
            } else {
                match side {
                    Side::White => (Square::A1, Square::D1),
                    Side::Black => (Square::A8, Square::D8),
                }
            };

            self.state.key ^= zobrist::piece_square(side, Piece::Rook, rook_from);
            self.state.move_piece(side, Piece::Rook, rook_from, rook_to);
            self.state.key ^= zobrist::piece_square(side, Piece::Rook, rook_to);
        }

        self.state.castle &= CASTLE_MASK[from as usize] & CASTLE_MASK[to as usize];
        self.state.key ^= zobrist::castle_rights(self.state.castle);

        if let Some(promote) = mv.promotion() {
            if piece == Piece::Pawn && (to.rank() == 0 || to.rank() == NUM_RANKS as u8 - 1) {
                self.state.pieces[side as usize][Piece::Pawn as usize].clear_bit(to);
                self.state.pieces[side as usize][promote as usize].set_bit(to);
                self.state.piece_at[to as usize] = promote;
            }
        }

        // XOR in whatever now occupies the destination (mover or promotion)
        self.state.key ^=
            zobrist::piece_square(side, self.state.piece_at[to as usize], to);

        self.state.turn = other;
        self.state.key ^= zobrist::turn(&self.state);

        if double_push {
            self.state.key ^= zobrist::en_passant(&self.state);
        }

        self.state.ply += 1;
        self.state.fifty = new_fifty;
        self.state.last_move = mv;
    }

    /// Restore the snapshot taken by the matching make. O(1), cannot fail
    /// as long as makes and unmakes are paired.
    pub fn undo_move(&mut self) {
        self.state = self
            .history
            .pop()
            .expect("undo_move without a matching make_move");
        self.key_history.pop();
    }

    /// Pass the turn without moving a piece. Only the turn key and any
    /// en-passant key are toggled. Forbidden while in check; the search
    /// guards that.
    pub fn make_null_move(&mut self) {
        self.history.push(self.state);
        self.key_history.push(self.state.key);

        self.state.key ^= zobrist::turn(&self.state);
        self.state.key ^= zobrist::en_passant(&self.state);
        self.state.en_passant = None;

        self.state.turn = self.state.turn.opponent();
        self.state.key ^= zobrist::turn(&self.state);
        self.state.last_move = Move::NULL;
    }

    pub fn undo_null_move(&mut self) {
        self.undo_move();
    }

    /// Has the current position occurred at least `times` times before?
    /// Only the reversible tail of the game needs scanning.
    pub fn has_repeated(&self, mut times: u8) -> bool {
        let len = self.key_history.len();
        let start = len.saturating_sub(self.state.fifty as usize);

        for i in (start..len).rev() {
            if self.key_history[i] == self.state.key {
                times -= 1;
                if times == 0 {
                    return true;
                }
            }
        }

        false
    }

    /// Draw by the fifty-move rule, a single repetition (the search treats
    /// the first repetition as a drawn line), or insufficient material.
    pub fn is_draw(&self) -> bool {
        if self.state.fifty >= 100 || self.has_repeated(1) {
            return true;
        }

        Side::iter().all(|side| self.side_has_insufficient_material(side))
    }

    fn side_has_insufficient_material(&self, side: Side) -> bool {
        let pieces = &self.state.pieces[side as usize];

        let pawns = pieces[Piece::Pawn as usize].pop_count();
        let knights = pieces[Piece::Knight as usize].pop_count();
        let bishops = pieces[Piece::Bishop as usize].pop_count();
        let rooks = pieces[Piece::Rook as usize].pop_count();
        let queens = pieces[Piece::Queen as usize].pop_count();

        pawns == 0
            && rooks == 0
            && queens == 0
            && ((bishops == 0 && knights <= 1) || (knights == 0 && bishops <= 1))
    }

    /// Full legality check for moves arriving from outside the search
    /// (the UCI `position ... moves` list).
    pub fn is_legal_move(&mut self, mv: Move) -> bool {
        if !movegen::is_pseudo_legal(&self.state, mv) {
            return false;
        }

        let mover = self.state.turn;
        self.make_move(mv);
        let in_check = movegen::king_in_check(&self.state, mover);
        self.undo_move();

        !in_check
    }

    #[allow(dead_code)]
    pub fn print(&self) {
        for rank in (0..8u8).rev() {
            print!("{} ", rank + 1);
            for file in 0..8u8 {
                let square = Square::from_file_rank(file, rank).unwrap();
                let piece = self.state.piece_on(square);

                let c = match piece {
                    Piece::Empty => '.',
                    Piece::Pawn => 'p',
                    Piece::Knight => 'n',
                    Piece::Bishop => 'b',
                    Piece::Rook => 'r',
                    Piece::Queen => 'q',
                    Piece::King => 'k',
                };

                let c = if self.state.side_on(square) == Some(Side::White) {
                    c.to_ascii_uppercase()
                } else {
                    c
                };

                print!("{} ", c);
            }
            println!();
        }
        println!("  a b c d e f g h");
        println!("{}", self.to_fen());
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
