mod test_utils;

use ivory::{
    movegen::{self, MoveKind},
    moves::Move,
    types::{Side, Square},
};
use test_utils::{board_from_fen, legal_moves, STARTPOS_FEN};

#[test]
fn test_startpos_has_twenty_moves() {
    let mut board = board_from_fen(STARTPOS_FEN);
    assert_eq!(legal_moves(&mut board).len(), 20);
}

#[test]
fn test_kiwipete_has_forty_eight_moves() {
    let mut board =
        board_from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    assert_eq!(legal_moves(&mut board).len(), 48);
}

#[test]
fn test_tactical_and_quiet_partition_the_moves() {
    let board =
        board_from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");

    let all = movegen::generate_moves(&board.state, MoveKind::All);
    let tacticals = movegen::generate_moves(&board.state, MoveKind::Tactical);
    let quiets = movegen::generate_moves(&board.state, MoveKind::Quiet);

    assert_eq!(all.len(), tacticals.len() + quiets.len());

    for &mv in tacticals.iter() {
        assert!(
            board.state.is_tactical(mv),
            "{} generated as tactical but is quiet",
            mv
        );
        assert!(all.contains(mv));
    }

    for &mv in quiets.iter() {
        assert!(
            !board.state.is_tactical(mv),
            "{} generated as quiet but is tactical",
            mv
        );
        assert!(all.contains(mv));
    }
}

#[test]
fn test_pawn_promotions_generate_all_pieces() {
    let board = board_from_fen("8/4P1k1/8/8/8/8/8/4K3 w - - 0 1");
    let tacticals = movegen::generate_moves(&board.state, MoveKind::Tactical);

    let promotions: Vec<Move> = tacticals
        .iter()
        .copied()
        .filter(|mv| mv.from() == Square::E7 && mv.to() == Square::E8)
        .collect();

    assert_eq!(promotions.len(), 4);
    assert!(promotions.contains(&Move::from_uci("e7e8q").unwrap()));
    assert!(promotions.contains(&Move::from_uci("e7e8n").unwrap()));
    assert!(promotions.contains(&Move::from_uci("e7e8r").unwrap()));
    assert!(promotions.contains(&Move::from_uci("e7e8b").unwrap()));
}

#[test]
fn test_en_passant_capture_is_generated() {
    let board =
        board_from_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 3");
    let tacticals = movegen::generate_moves(&board.state, MoveKind::Tactical);

    assert!(tacticals.contains(Move::new(Square::D4, Square::E3)));
}

#[test]
fn test_castling_generated_when_path_clear() {
    let board = board_from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    let quiets = movegen::generate_moves(&board.state, MoveKind::Quiet);

    assert!(quiets.contains(Move::new(Square::E1, Square::G1)));
    assert!(quiets.contains(Move::new(Square::E1, Square::C1)));
}

#[test]
fn test_castling_blocked_by_pieces() {
    let board = board_from_fen("r3k2r/8/8/8/8/8/8/RN2K1NR w KQkq - 0 1");
    let quiets = movegen::generate_moves(&board.state, MoveKind::Quiet);

    assert!(!quiets.contains(Move::new(Square::E1, Square::G1)));
    assert!(!quiets.contains(Move::new(Square::E1, Square::C1)));
}

#[test]
fn test_castling_forbidden_through_check() {
    // Black rook on f8 covers f1; kingside castling would cross it
    let board = board_from_fen("r4r2/8/8/8/8/8/8/R3K2R w KQ - 0 1");
    let quiets = movegen::generate_moves(&board.state, MoveKind::Quiet);

    assert!(!quiets.contains(Move::new(Square::E1, Square::G1)));
    assert!(quiets.contains(Move::new(Square::E1, Square::C1)));
}

#[test]
fn test_castling_forbidden_in_check() {
    let board = board_from_fen("r3k2r/8/8/8/8/4r3/8/R3K2R w KQkq - 0 1");
    let quiets = movegen::generate_moves(&board.state, MoveKind::Quiet);

    assert!(!quiets.contains(Move::new(Square::E1, Square::G1)));
    assert!(!quiets.contains(Move::new(Square::E1, Square::C1)));
}

#[test]
fn test_king_in_check_detection() {
    let board = board_from_fen("4k3/8/8/8/8/8/4r3/4K3 w - - 0 1");
    assert!(movegen::king_in_check(&board.state, Side::White));
    assert!(!movegen::king_in_check(&board.state, Side::Black));
}

#[test]
fn test_attacks_to_finds_every_attacker() {
    // d5 is hit by the e4 pawn, the c3 knight, the b3 bishop and the d1 rook
    let board = board_from_fen("3qk3/8/8/3p4/4P3/1BN5/8/3RK3 w - - 0 1");

    let attackers = movegen::attacks_to(
        &board.state,
        Square::D5,
        Side::White,
        board.state.occupied(),
    );

    assert!(attackers.is_bit_set(Square::E4));
    assert!(attackers.is_bit_set(Square::C3));
    assert!(attackers.is_bit_set(Square::G2));
    assert!(attackers.is_bit_set(Square::D1));
    assert_eq!(attackers.pop_count(), 4);
}

#[test]
fn test_pseudo_legal_vets_foreign_moves() {
    let board = board_from_fen(STARTPOS_FEN);

    assert!(movegen::is_pseudo_legal(
        &board.state,
        Move::new(Square::G1, Square::F3)
    ));
    assert!(movegen::is_pseudo_legal(
        &board.state,
        Move::new(Square::E2, Square::E4)
    ));

    // Wrong side, blocked slider, empty origin
    assert!(!movegen::is_pseudo_legal(
        &board.state,
        Move::new(Square::G8, Square::F6)
    ));
    assert!(!movegen::is_pseudo_legal(
        &board.state,
        Move::new(Square::A1, Square::A5)
    ));
    assert!(!movegen::is_pseudo_legal(
        &board.state,
        Move::new(Square::E4, Square::E5)
    ));
    assert!(!movegen::is_pseudo_legal(&board.state, Move::NULL));
}

#[test]
fn test_pseudo_legal_moves_all_come_from_generator() {
    let board =
        board_from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1");
    let all = movegen::generate_moves(&board.state, MoveKind::All);

    for &mv in all.iter() {
        assert!(
            movegen::is_pseudo_legal(&board.state, mv),
            "{} was generated but fails the pseudo-legality vet",
            mv
        );
    }
}

#[test]
fn test_see_winning_capture_of_undefended_pawn() {
    let board = board_from_fen("1k6/8/8/3p4/8/8/3R4/3K4 w - - 0 1");
    let capture = Move::new(Square::D2, Square::D5);

    assert!(movegen::static_exchange_eval(&board.state, capture, 0));
    assert!(movegen::static_exchange_eval(&board.state, capture, 100));
    assert!(!movegen::static_exchange_eval(&board.state, capture, 101));
}

#[test]
fn test_see_losing_rook_takes_defended_pawn() {
    let board = board_from_fen("1k6/2p5/3p4/8/8/8/3R4/3K4 w - - 0 1");
    let capture = Move::new(Square::D2, Square::D6);

    // Pawn for a rook: down 400
    assert!(!movegen::static_exchange_eval(&board.state, capture, 0));
    assert!(movegen::static_exchange_eval(&board.state, capture, -400));
}

#[test]
fn test_see_recapture_sequence_with_xray() {
    // Rook takes the queen, the e8 rook recaptures, and the white queen
    // hiding behind the e2 rook recaptures in turn: White nets a queen
    let board = board_from_fen("1k2r3/8/8/4q3/8/8/4R3/1K2Q3 w - - 0 1");
    let capture = Move::new(Square::E2, Square::E5);

    assert!(movegen::static_exchange_eval(&board.state, capture, 0));
    assert!(movegen::static_exchange_eval(&board.state, capture, 900));
    assert!(!movegen::static_exchange_eval(&board.state, capture, 901));
}

#[test]
fn test_see_en_passant_reads_as_pawn_trade() {
    let board = board_from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1");
    let capture = Move::new(Square::D4, Square::E3);

    assert!(movegen::static_exchange_eval(&board.state, capture, 0));
    assert!(movegen::static_exchange_eval(&board.state, capture, 100));
}

#[test]
fn test_see_king_participates_only_as_final_capturer() {
    // The pawn's sole defender is the king. With the e1 rook backing the
    // capture up, the king may not recapture and White keeps the pawn
    let board = board_from_fen("8/8/4k3/4p3/8/8/4R3/1K2R3 w - - 0 1");
    let capture = Move::new(Square::E2, Square::E5);
    assert!(movegen::static_exchange_eval(&board.state, capture, 0));
    assert!(movegen::static_exchange_eval(&board.state, capture, 100));

    // Without the backup rook the king recaptures freely and the rook is
    // simply lost for a pawn
    let board = board_from_fen("8/8/4k3/4p3/8/8/4R3/1K6 w - - 0 1");
    let capture = Move::new(Square::E2, Square::E5);
    assert!(!movegen::static_exchange_eval(&board.state, capture, 0));
}

#[test]
fn test_has_legal_move_detects_stalemate() {
    let mut stalemate = board_from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");
    assert!(!movegen::has_legal_move(&mut stalemate));

    let mut normal = board_from_fen(STARTPOS_FEN);
    assert!(movegen::has_legal_move(&mut normal));
}
