/// NOTE: 1 ply = one move by a single player

pub const NUM_SQUARES: usize = 64;
pub const NUM_PIECE_TYPES: usize = 6;
pub const NUM_SIDES: usize = 2;
pub const NUM_RANKS: usize = 8;
pub const NUM_FILES: usize = 8;

/// Hard limit for maximum search depth (in ply). Used to size arrays with per-ply information.
pub const MAX_PLY: usize = 64;

/// Longest game the board will accept (bounds the history stacks).
pub const MAX_GAME_PLY: usize = 1024;

/// Upper bound on pseudo-legal moves in any one position.
pub const MAX_MOVES: usize = 256;

pub const DEFAULT_MAX_DEPTH: i32 = 64;

pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// Scores

pub const INFINITY_SCORE: i32 = 2_000_000;
pub const MATE_SCORE: i32 = 1_000_000;
/// Anything beyond this magnitude encodes a forced mate.
pub const MATE_THRESHOLD: i32 = MATE_SCORE - MAX_GAME_PLY as i32;
pub const DRAW_SCORE: i32 = 0;

// Search tunables

/// Half-width of the aspiration window around the previous iteration's score.
pub const ASPIRATION_WINDOW: i32 = 75;
/// Aspiration windows start once this depth has been reached.
pub const ASPIRATION_MIN_DEPTH: i32 = 4;

/// Reverse futility pruning applies up to this depth.
pub const REVERSE_FUTILITY_DEPTH_LIMIT: i32 = 6;
pub const REVERSE_FUTILITY_BASE_MARGIN: i32 = 100;
pub const REVERSE_FUTILITY_MARGIN_INCREMENT: i32 = 120;

/// History scores are clamped to this magnitude so old cutoffs decay.
pub const MAX_HISTORY_SCORE: i32 = 10_000;
/// Quiet moves matching the counter-move table get this ordering boost.
pub const COUNTER_MOVE_BONUS: i32 = 2_000;

/// How many nodes pass between clock polls inside the search.
pub const TIME_CHECK_INTERVAL: u64 = 1024;

// Time

pub const DEFAULT_PLAYER_TIME_REMAINING_MS: u64 = 300_000; // 5 minutes
pub const DEFAULT_PLAYER_INCREMENT_MS: u64 = 0;
pub const DEFAULT_MOVETIME_MS: u64 = 1000; // Value for fixed-time mode

pub const SOFT_TO_HARD_LIMIT_RATIO: f64 = 0.75; // Hard limit is 1/30 of time remaining, plus increment

// Hash table configuration

/// Power-of-2 slot count so the index is a bitwise AND instead of a modulo.
pub const NUM_HASH_SLOTS: usize = 1 << 22;

/// Used to determine the castling permissions after a move.
/// We logical-AND the castle bits with the CASTLE_MASK bits for
/// both of the move's squares.
///
/// If castle is 1 (white can castle kingside), and we play a move
/// where the rook on h1 gets captured, we AND castle with
/// CASTLE_MASK[63] (1&14).
///
/// Castle becomes 0 and white can't castle kingside anymore.
///
/// 0001 white kingside  (14: 1110)
/// 0010 white queenside (13: 1101)
/// 0100 black kingside  (11: 1011)
/// 1000 black queenside (7: 0111)
///
/// 12: 1100
///  3: 0011
/// 15: 1111
#[rustfmt::skip]
pub const CASTLE_MASK: [u8; NUM_SQUARES] = [
	  13, 15, 15, 15, 12, 15, 15, 14,
	  15, 15, 15, 15, 15, 15, 15, 15,
	  15, 15, 15, 15, 15, 15, 15, 15,
	  15, 15, 15, 15, 15, 15, 15, 15,
	  15, 15, 15, 15, 15, 15, 15, 15,
	  15, 15, 15, 15, 15, 15, 15, 15,
	  15, 15, 15, 15, 15, 15, 15, 15,
	   7, 15, 15, 15,  3, 15, 15, 11
];

pub const WHITE_KINGSIDE_CASTLE: u8 = 1;
pub const WHITE_QUEENSIDE_CASTLE: u8 = 2;
pub const BLACK_KINGSIDE_CASTLE: u8 = 4;
pub const BLACK_QUEENSIDE_CASTLE: u8 = 8;
