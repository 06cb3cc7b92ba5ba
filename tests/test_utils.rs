#![allow(dead_code)]

use ivory::{
    board::Board,
    engine::Engine,
    movegen::{self, MoveKind},
    moves::Move,
};

pub const STARTPOS_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub fn board_from_fen(fen: &str) -> Board {
    Board::from_fen(fen).unwrap_or_else(|e| panic!("Failed to load FEN {}: {}", fen, e))
}

/// Engine limited only by depth (no clock), for reproducible searches
pub fn engine_for_depth(fen: &str, depth: i32) -> Engine {
    let mut engine = Engine::new();
    engine
        .set_position(fen, &[])
        .unwrap_or_else(|e| panic!("Failed to load FEN {}: {}", fen, e));
    engine.settings.max_depth = depth;
    engine.settings.time.infinite = true;
    engine
}

/// Fully legal moves in the current position
pub fn legal_moves(board: &mut Board) -> Vec<Move> {
    let side = board.state.turn;
    let mut result = Vec::new();

    for &mv in movegen::generate_moves(&board.state, MoveKind::All).iter() {
        board.make_move(mv);
        if !movegen::king_in_check(&board.state, side) {
            result.push(mv);
        }
        board.undo_move();
    }

    result
}

pub fn make_uci_moves(board: &mut Board, moves: &[&str]) {
    for move_str in moves {
        let mv = Move::from_uci(move_str).unwrap();
        assert!(
            board.is_legal_move(mv),
            "move {} is not legal in {}",
            move_str,
            board.to_fen()
        );
        board.make_move(mv);
    }
}

/// Walk the PV from the current position, asserting each move is legal
/// where it applies, then rewind.
pub fn assert_pv_is_playable(board: &mut Board, pv: &[Move]) {
    let mut applied = 0;

    for &mv in pv {
        assert!(
            board.is_legal_move(mv),
            "PV move {} is not legal in {}",
            mv,
            board.to_fen()
        );
        board.make_move(mv);
        applied += 1;
    }

    for _ in 0..applied {
        board.undo_move();
    }
}
