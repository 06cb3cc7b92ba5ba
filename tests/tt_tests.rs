use ivory::{
    constants::MATE_SCORE,
    moves::Move,
    tt::{Bound, TranspositionTable},
    types::Square,
};

#[test]
fn test_probe_miss_and_hit() {
    let mut table = TranspositionTable::with_capacity(1024);
    let key = 0xdead_beef_cafe_f00d;

    assert!(table.probe(key).is_none());

    let mv = Move::new(Square::E2, Square::E4);
    table.save(key, 5, Bound::Exact, 33, mv, 0);

    let entry = table.probe(key).expect("entry was just stored");
    assert_eq!(entry.key, key);
    assert_eq!(entry.best_move, mv);
    assert_eq!(entry.depth, 5);
    assert_eq!(entry.score, 33);
    assert_eq!(entry.bound, Bound::Exact);
}

#[test]
fn test_collisions_are_detected_by_key() {
    let mut table = TranspositionTable::with_capacity(1024);

    // Same slot (keys congruent mod capacity), different positions
    let first = 1024 * 3 + 17;
    let second = 1024 * 7 + 17;

    table.save(first, 4, Bound::Exact, 10, Move::new(Square::E2, Square::E4), 0);

    assert!(table.probe(second).is_none());
}

#[test]
fn test_always_replace() {
    let mut table = TranspositionTable::with_capacity(1024);

    let first = 1024 * 3 + 17;
    let second = 1024 * 7 + 17;

    table.save(first, 9, Bound::Exact, 10, Move::new(Square::E2, Square::E4), 0);
    // A shallower entry for a colliding key still wins the slot
    table.save(second, 1, Bound::LowerBound, -5, Move::new(Square::D2, Square::D4), 0);

    assert!(table.probe(first).is_none());
    assert_eq!(table.probe(second).unwrap().depth, 1);
}

/// Mate scores are stored relative to the node, so a mate found at one
/// ply reads back correctly from any other ply
#[test]
fn test_mate_scores_round_trip_through_plies() {
    let mut table = TranspositionTable::with_capacity(1024);
    let key = 42;

    // Mate 3 plies below a node sitting at ply 5: the node's score says
    // mate 8 plies from the root
    let score_at_store = MATE_SCORE - 8;
    table.save(key, 6, Bound::Exact, score_at_store, Move::NULL, 5);

    let entry = table.probe(key).unwrap();

    // Stored form is root-independent: mate in 3 from the node itself
    assert_eq!(entry.score, MATE_SCORE - 3);

    // Read back at ply 2: mate is now 5 plies from the root
    assert_eq!(table.correct_score(entry.score, 2), MATE_SCORE - 5);

    // Read back at the original ply reproduces the original score
    assert_eq!(table.correct_score(entry.score, 5), score_at_store);
}

#[test]
fn test_mated_scores_round_trip_through_plies() {
    let mut table = TranspositionTable::with_capacity(1024);
    let key = 43;

    // Being mated 4 plies below a node at ply 6
    let score_at_store = -(MATE_SCORE - 10);
    table.save(key, 8, Bound::Exact, score_at_store, Move::NULL, 6);

    let entry = table.probe(key).unwrap();
    assert_eq!(entry.score, -(MATE_SCORE - 4));
    assert_eq!(table.correct_score(entry.score, 6), score_at_store);
    assert_eq!(table.correct_score(entry.score, 0), -(MATE_SCORE - 4));
}

#[test]
fn test_ordinary_scores_are_not_adjusted() {
    let mut table = TranspositionTable::with_capacity(1024);
    let key = 44;

    table.save(key, 3, Bound::UpperBound, 250, Move::NULL, 12);

    let entry = table.probe(key).unwrap();
    assert_eq!(entry.score, 250);
    assert_eq!(table.correct_score(entry.score, 30), 250);
}

#[test]
fn test_clear_empties_the_table() {
    let mut table = TranspositionTable::with_capacity(1024);
    let key = 45;

    table.save(key, 3, Bound::Exact, 1, Move::new(Square::E2, Square::E4), 0);
    table.clear();

    assert!(table.probe(key).is_none());
}
