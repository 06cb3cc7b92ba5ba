mod test_utils;

use ivory::{
    constants::DRAW_SCORE,
    eval,
    moves::Move,
    types::{Side, Square},
};
use test_utils::{assert_pv_is_playable, engine_for_depth, legal_moves};

type NoCallback = Option<fn(&ivory::search::IterationReport)>;

const NO_CALLBACK: NoCallback = None;

/// King-and-pawn endgame: the pawn must advance, not be abandoned
#[test]
fn test_pawn_endgame_pushes_the_pawn() {
    let mut engine = engine_for_depth("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1", 6);
    let result = engine.think(NO_CALLBACK);

    assert!(!result.best_move.is_null());
    assert_eq!(result.best_move.from(), Square::E2);
    assert!(result.evaluation > 0);
}

/// Rook versus bare king side: the search should produce a substantial
/// plan, not a one-move PV
#[test]
fn test_rook_endgame_builds_a_line() {
    let mut engine = engine_for_depth("6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1", 8);
    let result = engine.think(NO_CALLBACK);

    assert!(!result.best_move.is_null());
    assert!(result.evaluation > 0);
    assert!(
        result.principal_variation.len() >= 4,
        "PV too short: {:?}",
        result.principal_variation
    );
    assert_pv_is_playable(&mut engine.searcher.board, &result.principal_variation);
}

/// Back-rank mate in one must be found and scored as mate
#[test]
fn test_finds_back_rank_mate_in_one() {
    let mut engine = engine_for_depth("6k1/5ppp/8/8/8/8/6PP/R5K1 w - - 0 1", 2);
    let result = engine.think(NO_CALLBACK);

    assert_eq!(result.best_move, Move::new(Square::A1, Square::A8));
    assert!(eval::is_mate_score(result.evaluation));
    assert_eq!(eval::mate_in(result.evaluation), 1);
}

/// After knights shuffle out and back twice, the repetition machinery must
/// see the draw inside the search tree
#[test]
fn test_repetition_line_scores_as_draw() {
    let mut engine = engine_for_depth("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 4);
    engine
        .set_position(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            &["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6"],
        )
        .unwrap();

    // The current position already repeats the one after move two, and
    // retreating the knight repeats a third placement
    assert!(engine.searcher.board.is_draw());

    engine
        .searcher
        .board
        .make_move(Move::new(Square::F3, Square::G1));
    assert!(engine.searcher.board.is_draw());
    engine.searcher.board.undo_move();

    let result = engine.think(NO_CALLBACK);
    assert!(!result.best_move.is_null());
}

/// Stalemate: no legal moves and not in check must come out as a draw
/// straight from quiescence
#[test]
fn test_stalemate_scores_as_draw_in_quiescence() {
    let mut engine = engine_for_depth("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1", 4);

    let score = engine.searcher.quiesce(0, -1_000_000, 1_000_000);
    assert_eq!(score, DRAW_SCORE);

    // The full search agrees and has no move to offer
    let result = engine.think(NO_CALLBACK);
    assert!(result.best_move.is_null());
    assert_eq!(result.evaluation, DRAW_SCORE);
}

/// Checkmated side has no move; the score is mate against the mover
#[test]
fn test_checkmate_position_reports_mate() {
    // Fool's mate delivered: White to move, already mated
    let mut engine = engine_for_depth(
        "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
        3,
    );
    let result = engine.think(NO_CALLBACK);

    assert!(result.best_move.is_null());
    assert!(result.evaluation <= -ivory::constants::MATE_THRESHOLD);
}

/// Zugzwang-prone pawn endgame: the null-move guard must keep pruning
/// honest (no non-pawn material, so null move is disabled outright)
#[test]
fn test_null_move_suppressed_in_pawn_endgame() {
    let mut engine = engine_for_depth("8/8/8/3k4/8/8/3KP3/8 w - - 0 1", 6);

    assert!(!engine.searcher.board.state.has_non_pawn_material(Side::White));
    assert!(!engine.searcher.board.state.has_non_pawn_material(Side::Black));

    let result = engine.think(NO_CALLBACK);

    assert!(!result.best_move.is_null());
    // A quiet endgame must not come back with a fail-high mate fantasy
    assert!(!eval::is_mate_score(result.evaluation));
}

/// The best move and every PV move must be legal where they apply
#[test]
fn test_best_move_and_pv_are_legal() {
    let fens = [
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8",
        "r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 10",
    ];

    for fen in fens {
        let mut engine = engine_for_depth(fen, 5);
        let result = engine.think(NO_CALLBACK);

        let legal = legal_moves(&mut engine.searcher.board);
        assert!(
            legal.contains(&result.best_move),
            "best move {} is illegal in {}",
            result.best_move,
            fen
        );

        assert_eq!(result.principal_variation.first(), Some(&result.best_move));
        assert_pv_is_playable(&mut engine.searcher.board, &result.principal_variation);
    }
}

/// Iterative deepening reports every completed depth in order
#[test]
fn test_iteration_reports_are_ordered() {
    let mut engine = engine_for_depth(
        "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
        5,
    );

    let mut depths = Vec::new();
    let result = engine.think(Some(|report: &ivory::search::IterationReport| {
        depths.push(report.depth);
    }));

    assert_eq!(depths, vec![1, 2, 3, 4, 5]);
    assert_eq!(result.depth, 5);
    assert!(result.nodes > 0);
}

/// A node budget stops the search without corrupting the result
#[test]
fn test_node_limit_is_respected() {
    let mut engine = engine_for_depth(
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        64,
    );
    engine.settings.max_nodes = Some(20_000);

    let result = engine.think(NO_CALLBACK);

    assert!(!result.best_move.is_null());
    assert!(result.nodes <= 25_000, "searched {} nodes", result.nodes);

    let legal = legal_moves(&mut engine.searcher.board);
    assert!(legal.contains(&result.best_move));
}

/// Deeper searches on a tactical position must not lose the capture
#[test]
fn test_recapture_is_found() {
    // White queen just got taken on d5; the recapture is forced
    let mut engine = engine_for_depth(
        "rnb1kbnr/ppp1pppp/8/3q4/8/2N5/PPPP1PPP/R1BQKBNR w KQkq - 0 4",
        4,
    );
    let result = engine.think(NO_CALLBACK);

    assert_eq!(result.best_move, Move::new(Square::C3, Square::D5));
}
