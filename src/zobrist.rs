use std::sync::OnceLock;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    bitboard::Direction,
    constants::{NUM_PIECE_TYPES, NUM_SIDES, NUM_SQUARES},
    types::{BitBoard, BoardState, Piece, Side, Square},
};

/// Fixed seed so transposition keys are reproducible across runs
const ZOBRIST_SEED: u64 = 0x1234_5678_9abc_def0;

struct ZobristTables {
    piece_square: [[[u64; NUM_SQUARES]; NUM_PIECE_TYPES]; NUM_SIDES],
    castle_rights: [u64; 16],
    en_passant_file: [u64; 8],
    side_to_move: u64,
}

static TABLES: OnceLock<ZobristTables> = OnceLock::new();

fn tables() -> &'static ZobristTables {
    TABLES.get_or_init(|| {
        let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);

        let mut piece_square = [[[0u64; NUM_SQUARES]; NUM_PIECE_TYPES]; NUM_SIDES];
        for side in piece_square.iter_mut() {
            for piece in side.iter_mut() {
                for square in piece.iter_mut() {
                    *square = rng.gen();
                }
            }
        }

        let mut castle_rights = [0u64; 16];
        for subset in castle_rights.iter_mut() {
            *subset = rng.gen();
        }

        let mut en_passant_file = [0u64; 8];
        for file in en_passant_file.iter_mut() {
            *file = rng.gen();
        }

        ZobristTables {
            piece_square,
            castle_rights,
            en_passant_file,
            side_to_move: rng.gen(),
        }
    })
}

/// Key for one piece standing on one square
pub fn piece_square(side: Side, piece: Piece, square: Square) -> u64 {
    if piece == Piece::Empty {
        return 0;
    }

    tables().piece_square[side as usize][piece as usize][square as usize]
}

/// Key for whatever occupies `square` in `state` (0 if empty)
fn occupied_square(state: &BoardState, square: Square) -> u64 {
    let piece = state.piece_at[square as usize];

    if piece == Piece::Empty {
        return 0;
    }

    let side = if state.units[Side::White as usize].is_bit_set(square) {
        Side::White
    } else {
        Side::Black
    };

    piece_square(side, piece, square)
}

/// One key per subset of the four castle-permission bits
pub fn castle_rights(castle: u8) -> u64 {
    tables().castle_rights[(castle & 0xf) as usize]
}

/// The side key is folded in only when Black is to move, so this returns
/// the contribution of `state.turn` as it currently stands.
pub fn turn(state: &BoardState) -> u64 {
    match state.turn {
        Side::Black => tables().side_to_move,
        Side::White => 0,
    }
}

/// En-passant contribution of `state` as it currently stands.
///
/// The file key is folded in only when the side to move actually has a
/// pawn beside the double-pushed pawn, i.e. only when an en-passant
/// capture is possible. Positions that differ merely by a dead en-passant
/// target therefore share a key. Callers must consult this AFTER the turn
/// has been flipped so that "side to move" refers to the prospective
/// capturer.
pub fn en_passant(state: &BoardState) -> u64 {
    let Some(target) = state.en_passant else {
        return 0;
    };

    // The double-pushed pawn stands directly behind the target square
    // from the capturer's point of view.
    let pushed_square = match state.turn {
        Side::White => target as i32 - 8,
        Side::Black => target as i32 + 8,
    };

    let Ok(pushed_square) = Square::try_from(pushed_square) else {
        return 0;
    };

    let pushed = BitBoard::from_square(pushed_square);
    let adjacent = pushed.shift(Direction::East) | pushed.shift(Direction::West);
    let capturer_pawns = state.pieces[state.turn as usize][Piece::Pawn as usize];

    if (adjacent & capturer_pawns).is_not_empty() {
        tables().en_passant_file[target.file() as usize]
    } else {
        0
    }
}

/// Fold the key from scratch. The incremental key on the board must always
/// equal this.
pub fn compute(state: &BoardState) -> u64 {
    let mut key = 0u64;

    for square in Square::iter() {
        key ^= occupied_square(state, square);
    }

    key ^= castle_rights(state.castle);
    key ^= en_passant(state);
    key ^= turn(state);

    key
}
