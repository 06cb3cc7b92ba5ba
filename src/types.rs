use crate::constants::{NUM_PIECE_TYPES, NUM_SIDES, NUM_SQUARES};
use crate::moves::Move;

/// Right-most bit represents A1
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct BitBoard(pub u64);

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[rustfmt::skip]
pub enum Square {
  A1 = 0, B1, C1, D1, E1, F1, G1, H1,
  A2, B2, C2, D2, E2, F2, G2, H2,
  A3, B3, C3, D3, E3, F3, G3, H3,
  A4, B4, C4, D4, E4, F4, G4, H4,
  A5, B5, C5, D5, E5, F5, G5, H5,
  A6, B6, C6, D6, E6, F6, G6, H6,
  A7, B7, C7, D7, E7, F7, G7, H7,
  A8, B8, C8, D8, E8, F8, G8, H8,
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Piece {
    Pawn = 0,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
    Empty,
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    White = 0,
    Black = 1,
}

impl Side {
    pub fn iter() -> impl Iterator<Item = Side> {
        [Side::White, Side::Black].into_iter()
    }

    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = &'static str;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > 1 {
            return Err("Side index out of range (must be 0-1)");
        }

        Ok(unsafe { std::mem::transmute::<u8, Side>(value) })
    }
}

/// Full description of a position. Copyable so that make/unmake can work
/// with whole-state snapshots instead of delta journals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardState {
    /// One board of occupancy per (side, piece kind)
    pub pieces: [[BitBoard; NUM_PIECE_TYPES]; NUM_SIDES],
    /// Union of all piece boards, per side
    pub units: [BitBoard; NUM_SIDES],
    /// Mailbox mirror of the bitboards for O(1) piece lookup
    pub piece_at: [Piece; NUM_SQUARES],
    pub turn: Side,
    /// Castle permission bits: 1 = white kingside, 2 = white queenside,
    /// 4 = black kingside, 8 = black queenside
    pub castle: u8,
    /// Square a capturing pawn would land on, set only right after a
    /// double pawn push
    pub en_passant: Option<Square>,
    /// Plies since the last pawn move or capture (fifty-move rule)
    pub fifty: u8,
    /// Total half-moves from the start of the game
    pub ply: u16,
    /// Incrementally maintained Zobrist key
    pub key: u64,
    /// The move that produced this state (null at the root)
    pub last_move: Move,
}
