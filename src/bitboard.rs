use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use crate::{
    constants::{NUM_FILES, NUM_RANKS},
    types::{BitBoard, Square},
};

/// Compass directions from White's point of view
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    pub fn iter() -> impl Iterator<Item = Direction> {
        [
            Direction::North,
            Direction::South,
            Direction::East,
            Direction::West,
            Direction::NorthEast,
            Direction::NorthWest,
            Direction::SouthEast,
            Direction::SouthWest,
        ]
        .into_iter()
    }

    /// Square-index delta when stepping one square in this direction
    pub const fn offset(self) -> i32 {
        match self {
            Direction::North => 8,
            Direction::South => -8,
            Direction::East => 1,
            Direction::West => -1,
            Direction::NorthEast => 9,
            Direction::NorthWest => 7,
            Direction::SouthEast => -7,
            Direction::SouthWest => -9,
        }
    }
}

const NOT_A_FILE: u64 = 0xfefe_fefe_fefe_fefe;
const NOT_H_FILE: u64 = 0x7f7f_7f7f_7f7f_7f7f;

impl BitBoard {
    pub const EMPTY: BitBoard = BitBoard(0);

    pub fn from_square(square: Square) -> Self {
        BitBoard(square.as_bit())
    }

    pub fn set_bit(&mut self, square: Square) {
        self.0 |= square.as_bit();
    }

    pub fn clear_bit(&mut self, square: Square) {
        self.0 &= !square.as_bit();
    }

    pub fn is_bit_set(&self, square: Square) -> bool {
        (self.0 & square.as_bit()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_not_empty(&self) -> bool {
        self.0 != 0
    }

    /// Exact Hamming weight
    pub fn pop_count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Index of the least significant set bit. Undefined on an empty board.
    pub fn lsb(&self) -> u8 {
        debug_assert!(self.0 != 0, "lsb of empty BitBoard");
        self.0.trailing_zeros() as u8
    }

    /// Index of the most significant set bit. Undefined on an empty board.
    pub fn msb(&self) -> u8 {
        debug_assert!(self.0 != 0, "msb of empty BitBoard");
        (63 - self.0.leading_zeros()) as u8
    }

    /// Returns the square index (0-63) of the least significant set bit
    /// and clears it. Returns 64 when no bits are set.
    pub fn pop_lsb(&mut self) -> u8 {
        if self.0 == 0 {
            return 64; // No bits set
        }

        let bit_position = self.0.trailing_zeros() as u8;
        self.0 &= self.0 - 1; // Clear least significant bit
        bit_position
    }

    /// Shift every bit one square in `direction`, masking off the edge
    /// files first so nothing wraps around the board.
    pub fn shift(&self, direction: Direction) -> BitBoard {
        let bits = self.0;

        BitBoard(match direction {
            Direction::North => bits << 8,
            Direction::South => bits >> 8,
            Direction::East => (bits & NOT_H_FILE) << 1,
            Direction::West => (bits & NOT_A_FILE) >> 1,
            Direction::NorthEast => (bits & NOT_H_FILE) << 9,
            Direction::NorthWest => (bits & NOT_A_FILE) << 7,
            Direction::SouthEast => (bits & NOT_H_FILE) >> 7,
            Direction::SouthWest => (bits & NOT_A_FILE) >> 9,
        })
    }

    /// Iterate over set squares, least significant first
    pub fn squares(self) -> impl Iterator<Item = Square> {
        let mut bits = self;
        std::iter::from_fn(move || {
            if bits.is_empty() {
                None
            } else {
                Some(Square::try_from(bits.pop_lsb()).unwrap())
            }
        })
    }

    #[allow(dead_code)]
    pub fn print(&self) {
        for rank in (0..NUM_RANKS).rev() {
            for file in 0..NUM_FILES {
                let bit = (self.0 >> (rank * NUM_FILES + file)) & 1u64;
                print!("{} ", if bit == 1 { "1" } else { "." });
            }
            println!();
        }
        println!();
    }
}

impl BitAnd for BitBoard {
    type Output = BitBoard;
    fn bitand(self, rhs: BitBoard) -> BitBoard {
        BitBoard(self.0 & rhs.0)
    }
}

impl BitOr for BitBoard {
    type Output = BitBoard;
    fn bitor(self, rhs: BitBoard) -> BitBoard {
        BitBoard(self.0 | rhs.0)
    }
}

impl BitXor for BitBoard {
    type Output = BitBoard;
    fn bitxor(self, rhs: BitBoard) -> BitBoard {
        BitBoard(self.0 ^ rhs.0)
    }
}

impl Not for BitBoard {
    type Output = BitBoard;
    fn not(self) -> BitBoard {
        BitBoard(!self.0)
    }
}

impl BitAndAssign for BitBoard {
    fn bitand_assign(&mut self, rhs: BitBoard) {
        self.0 &= rhs.0;
    }
}

impl BitOrAssign for BitBoard {
    fn bitor_assign(&mut self, rhs: BitBoard) {
        self.0 |= rhs.0;
    }
}

impl BitXorAssign for BitBoard {
    fn bitxor_assign(&mut self, rhs: BitBoard) {
        self.0 ^= rhs.0;
    }
}
