use crate::types::Piece;

impl Piece {
    /// Centipawn value used by the evaluator and delta pruning
    pub const fn value(self) -> i32 {
        match self {
            Piece::Pawn => 100,
            Piece::Knight => 300,
            Piece::Bishop => 300,
            Piece::Rook => 500,
            Piece::Queen => 900,
            Piece::King => 10000,
            Piece::Empty => 0,
        }
    }

    /// Centipawn value used by static exchange evaluation. The king is
    /// priced so that it may stand at the end of a capture sequence but
    /// never be profitably traded away.
    pub const fn see_value(self) -> i32 {
        match self {
            Piece::Pawn => 100,
            Piece::Knight => 300,
            Piece::Bishop => 300,
            Piece::Rook => 500,
            Piece::Queen => 900,
            Piece::King => 20000,
            Piece::Empty => 0,
        }
    }

    pub fn iter() -> impl Iterator<Item = Piece> {
        [
            Piece::Pawn,
            Piece::Knight,
            Piece::Bishop,
            Piece::Rook,
            Piece::Queen,
            Piece::King,
        ]
        .into_iter()
    }
}

impl TryFrom<u8> for Piece {
    type Error = &'static str;

    /// Converts from a number representing the piece
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > 6 {
            return Err("Piece index out of range (must be 0-6)");
        }

        // SAFETY: value is in range 0-6, which matches our enum variants
        Ok(unsafe { std::mem::transmute::<u8, Piece>(value) })
    }
}
