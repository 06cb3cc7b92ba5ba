use std::sync::OnceLock;

use crate::{
    bitboard::Direction,
    board::Board,
    constants::{
        BLACK_KINGSIDE_CASTLE, BLACK_QUEENSIDE_CASTLE, NUM_SQUARES, WHITE_KINGSIDE_CASTLE,
        WHITE_QUEENSIDE_CASTLE,
    },
    moves::{Move, MoveList},
    types::{BitBoard, BoardState, Piece, Side, Square},
};

const RANK_3: u64 = 0x0000_0000_00ff_0000;
const RANK_6: u64 = 0x0000_ff00_0000_0000;
const PROMOTION_RANKS: u64 = 0xff00_0000_0000_00ff;

/// Which subset of pseudo-legal moves to generate
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MoveKind {
    All,
    /// Captures (including en passant) and promotions
    Tactical,
    /// Everything that is not tactical
    Quiet,
}

/// Attack masks shared by generation, check detection, and SEE. Built once
/// on first use.
struct AttackTables {
    knight: [BitBoard; NUM_SQUARES],
    king: [BitBoard; NUM_SQUARES],
    /// Squares a pawn of [side] on [square] attacks
    pawn: [[BitBoard; NUM_SQUARES]; 2],
    /// Open-board ray from [square] heading [direction], exclusive
    rays: [[BitBoard; NUM_SQUARES]; 8],
}

static TABLES: OnceLock<AttackTables> = OnceLock::new();

fn tables() -> &'static AttackTables {
    TABLES.get_or_init(|| {
        let mut knight = [BitBoard::EMPTY; NUM_SQUARES];
        let mut king = [BitBoard::EMPTY; NUM_SQUARES];
        let mut pawn = [[BitBoard::EMPTY; NUM_SQUARES]; 2];
        let mut rays = [[BitBoard::EMPTY; NUM_SQUARES]; 8];

        for square in Square::iter() {
            let bit = BitBoard::from_square(square);

            for (df, dr) in [
                (1, 2),
                (2, 1),
                (2, -1),
                (1, -2),
                (-1, -2),
                (-2, -1),
                (-2, 1),
                (-1, 2),
            ] {
                let file = square.file() as i32 + df;
                let rank = square.rank() as i32 + dr;

                if (0..8).contains(&file) && (0..8).contains(&rank) {
                    knight[square as usize]
                        .set_bit(Square::from_file_rank(file as u8, rank as u8).unwrap());
                }
            }

            for direction in Direction::iter() {
                king[square as usize] |= bit.shift(direction);
            }

            pawn[Side::White as usize][square as usize] =
                bit.shift(Direction::NorthEast) | bit.shift(Direction::NorthWest);
            pawn[Side::Black as usize][square as usize] =
                bit.shift(Direction::SouthEast) | bit.shift(Direction::SouthWest);

            for (index, direction) in Direction::iter().enumerate() {
                let mut ray = BitBoard::EMPTY;
                let mut step = bit.shift(direction);

                while step.is_not_empty() {
                    ray |= step;
                    step = step.shift(direction);
                }

                rays[index][square as usize] = ray;
            }
        }

        AttackTables {
            knight,
            king,
            pawn,
            rays,
        }
    })
}

fn ray(direction: Direction, square: Square) -> BitBoard {
    let index = match direction {
        Direction::North => 0,
        Direction::South => 1,
        Direction::East => 2,
        Direction::West => 3,
        Direction::NorthEast => 4,
        Direction::NorthWest => 5,
        Direction::SouthEast => 6,
        Direction::SouthWest => 7,
    };

    tables().rays[index][square as usize]
}

/// Classical ray-scan: follow each ray to the first blocker in `occupancy`
fn sliding_attacks(square: Square, occupancy: BitBoard, directions: &[Direction]) -> BitBoard {
    let mut attacks = BitBoard::EMPTY;

    for &direction in directions {
        let full_ray = ray(direction, square);
        let blockers = full_ray & occupancy;

        if blockers.is_empty() {
            attacks |= full_ray;
            continue;
        }

        let first_blocker = if direction.offset() > 0 {
            blockers.lsb()
        } else {
            blockers.msb()
        };

        attacks |= full_ray ^ ray(direction, Square::try_from(first_blocker).unwrap());
    }

    attacks
}

const BISHOP_DIRECTIONS: [Direction; 4] = [
    Direction::NorthEast,
    Direction::NorthWest,
    Direction::SouthEast,
    Direction::SouthWest,
];

const ROOK_DIRECTIONS: [Direction; 4] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
];

pub fn bishop_attacks(square: Square, occupancy: BitBoard) -> BitBoard {
    sliding_attacks(square, occupancy, &BISHOP_DIRECTIONS)
}

pub fn rook_attacks(square: Square, occupancy: BitBoard) -> BitBoard {
    sliding_attacks(square, occupancy, &ROOK_DIRECTIONS)
}

pub fn queen_attacks(square: Square, occupancy: BitBoard) -> BitBoard {
    bishop_attacks(square, occupancy) | rook_attacks(square, occupancy)
}

pub fn knight_attacks(square: Square) -> BitBoard {
    tables().knight[square as usize]
}

pub fn king_attacks(square: Square) -> BitBoard {
    tables().king[square as usize]
}

pub fn pawn_attacks(side: Side, square: Square) -> BitBoard {
    tables().pawn[side as usize][square as usize]
}

/// Every square from which `by` attacks `square`, given `occupancy`.
/// Pieces absent from `occupancy` are ignored, which lets SEE peel
/// attackers off and discover the x-rays behind them.
pub fn attacks_to(state: &BoardState, square: Square, by: Side, occupancy: BitBoard) -> BitBoard {
    let pieces = &state.pieces[by as usize];

    let pawns = pawn_attacks(by.opponent(), square) & pieces[Piece::Pawn as usize];
    let knights = knight_attacks(square) & pieces[Piece::Knight as usize];
    let kings = king_attacks(square) & pieces[Piece::King as usize];

    let bishops_queens = pieces[Piece::Bishop as usize] | pieces[Piece::Queen as usize];
    let rooks_queens = pieces[Piece::Rook as usize] | pieces[Piece::Queen as usize];

    let diagonals = bishop_attacks(square, occupancy) & bishops_queens;
    let lines = rook_attacks(square, occupancy) & rooks_queens;

    (pawns | knights | kings | diagonals | lines) & occupancy
}

pub fn is_square_attacked(state: &BoardState, square: Square, by: Side) -> bool {
    attacks_to(state, square, by, state.occupied()).is_not_empty()
}

pub fn king_in_check(state: &BoardState, side: Side) -> bool {
    is_square_attacked(state, state.king_square(side), side.opponent())
}

/// Union of every square `side` attacks (used by the evaluator's
/// square-control term and by castling legality)
pub fn attacked_squares(state: &BoardState, side: Side) -> BitBoard {
    let pieces = &state.pieces[side as usize];
    let occupancy = state.occupied();

    let pawns = pieces[Piece::Pawn as usize];
    let mut attacks = match side {
        Side::White => pawns.shift(Direction::NorthEast) | pawns.shift(Direction::NorthWest),
        Side::Black => pawns.shift(Direction::SouthEast) | pawns.shift(Direction::SouthWest),
    };

    for square in pieces[Piece::Knight as usize].squares() {
        attacks |= knight_attacks(square);
    }

    for square in (pieces[Piece::Bishop as usize] | pieces[Piece::Queen as usize]).squares() {
        attacks |= bishop_attacks(square, occupancy);
    }

    for square in (pieces[Piece::Rook as usize] | pieces[Piece::Queen as usize]).squares() {
        attacks |= rook_attacks(square, occupancy);
    }

    attacks |= king_attacks(state.king_square(side));

    attacks
}

/// Generate pseudo-legal moves of the requested kind. Moves may still
/// leave the mover's king in check; the search verifies legality after
/// playing each one.
pub fn generate_moves(state: &BoardState, kind: MoveKind) -> MoveList {
    let mut list = MoveList::new();

    if kind == MoveKind::All || kind == MoveKind::Tactical {
        generate_pawn_tacticals(state, &mut list);
        generate_piece_moves(state, Target::Enemy, &mut list);
    }

    if kind == MoveKind::All || kind == MoveKind::Quiet {
        generate_pawn_quiets(state, &mut list);
        generate_piece_moves(state, Target::Empty, &mut list);
        generate_castling(state, &mut list);
    }

    list
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Target {
    Enemy,
    Empty,
}

fn push_pawn_moves(list: &mut MoveList, from: Square, to: Square) {
    if BitBoard::from_square(to).0 & PROMOTION_RANKS != 0 {
        // One entry per promotion piece
        for piece in [Piece::Queen, Piece::Knight, Piece::Rook, Piece::Bishop] {
            list.push(Move::new_promotion(from, to, piece));
        }
    } else {
        list.push(Move::new(from, to));
    }
}

fn generate_pawn_tacticals(state: &BoardState, list: &mut MoveList) {
    let side = state.turn;
    let pawns = state.pieces[side as usize][Piece::Pawn as usize];
    let enemy = state.units[side.opponent() as usize];
    let empty = !state.occupied();

    let (forward, capture_directions) = match side {
        Side::White => (
            Direction::North,
            [(Direction::NorthEast, -9), (Direction::NorthWest, -7)],
        ),
        Side::Black => (
            Direction::South,
            [(Direction::SouthEast, 7), (Direction::SouthWest, 9)],
        ),
    };

    for (direction, from_offset) in capture_directions {
        let captures = pawns.shift(direction) & enemy;

        for to in captures.squares() {
            let from = Square::try_from(to as i32 + from_offset).unwrap();
            push_pawn_moves(list, from, to);
        }
    }

    // Push-promotions count as tactical
    let promotion_pushes =
        BitBoard((pawns.shift(forward) & empty).0 & PROMOTION_RANKS);
    let forward_offset = -forward.offset();

    for to in promotion_pushes.squares() {
        let from = Square::try_from(to as i32 + forward_offset).unwrap();
        push_pawn_moves(list, from, to);
    }

    if let Some(target) = state.en_passant {
        let capturers = pawn_attacks(side.opponent(), target) & pawns;

        for from in capturers.squares() {
            list.push(Move::new(from, target));
        }
    }
}

fn generate_pawn_quiets(state: &BoardState, list: &mut MoveList) {
    let side = state.turn;
    let pawns = state.pieces[side as usize][Piece::Pawn as usize];
    let empty = !state.occupied();

    let (forward, double_rank) = match side {
        Side::White => (Direction::North, RANK_3),
        Side::Black => (Direction::South, RANK_6),
    };
    let forward_offset = forward.offset();

    let single = pawns.shift(forward) & empty;
    let non_promotion_single = BitBoard(single.0 & !PROMOTION_RANKS);

    for to in non_promotion_single.squares() {
        let from = Square::try_from(to as i32 - forward_offset).unwrap();
        list.push(Move::new(from, to));
    }

    let double = BitBoard(single.0 & double_rank).shift(forward) & empty;

    for to in double.squares() {
        let from = Square::try_from(to as i32 - 2 * forward_offset).unwrap();
        list.push(Move::new(from, to));
    }
}

fn generate_piece_moves(state: &BoardState, target: Target, list: &mut MoveList) {
    let side = state.turn;
    let occupancy = state.occupied();
    let mask = match target {
        Target::Enemy => state.units[side.opponent() as usize],
        Target::Empty => !occupancy,
    };

    let pieces = &state.pieces[side as usize];

    for from in pieces[Piece::Knight as usize].squares() {
        for to in (knight_attacks(from) & mask).squares() {
            list.push(Move::new(from, to));
        }
    }

    for from in pieces[Piece::Bishop as usize].squares() {
        for to in (bishop_attacks(from, occupancy) & mask).squares() {
            list.push(Move::new(from, to));
        }
    }

    for from in pieces[Piece::Rook as usize].squares() {
        for to in (rook_attacks(from, occupancy) & mask).squares() {
            list.push(Move::new(from, to));
        }
    }

    for from in pieces[Piece::Queen as usize].squares() {
        for to in (queen_attacks(from, occupancy) & mask).squares() {
            list.push(Move::new(from, to));
        }
    }

    let king = state.king_square(side);
    for to in (king_attacks(king) & mask).squares() {
        list.push(Move::new(king, to));
    }
}

fn castling_path_is_clear(
    state: &BoardState,
    empty_squares: &[Square],
    safe_squares: &[Square],
) -> bool {
    let occupancy = state.occupied();
    let enemy = state.turn.opponent();

    empty_squares
        .iter()
        .all(|&square| !occupancy.is_bit_set(square))
        && safe_squares
            .iter()
            .all(|&square| !is_square_attacked(state, square, enemy))
}

/// Castling is generated only when the rights stand, the path is empty,
/// and the king neither starts, crosses, nor lands on an attacked square.
fn generate_castling(state: &BoardState, list: &mut MoveList) {
    match state.turn {
        Side::White => {
            if state.castle & WHITE_KINGSIDE_CASTLE != 0
                && castling_path_is_clear(
                    state,
                    &[Square::F1, Square::G1],
                    &[Square::E1, Square::F1, Square::G1],
                )
            {
                list.push(Move::new(Square::E1, Square::G1));
            }

            if state.castle & WHITE_QUEENSIDE_CASTLE != 0
                && castling_path_is_clear(
                    state,
                    &[Square::B1, Square::C1, Square::D1],
                    &[Square::E1, Square::D1, Square::C1],
                )
            {
                list.push(Move::new(Square::E1, Square::C1));
            }
        }
        Side::Black => {
            if state.castle & BLACK_KINGSIDE_CASTLE != 0
                && castling_path_is_clear(
                    state,
                    &[Square::F8, Square::G8],
                    &[Square::E8, Square::F8, Square::G8],
                )
            {
                list.push(Move::new(Square::E8, Square::G8));
            }

            if state.castle & BLACK_QUEENSIDE_CASTLE != 0
                && castling_path_is_clear(
                    state,
                    &[Square::B8, Square::C8, Square::D8],
                    &[Square::E8, Square::D8, Square::C8],
                )
            {
                list.push(Move::new(Square::E8, Square::C8));
            }
        }
    }
}

/// Could `mv` have been generated in this position? Used to vet moves that
/// arrive from outside the current node: the hash move and the killers.
pub fn is_pseudo_legal(state: &BoardState, mv: Move) -> bool {
    if mv.is_null() {
        return false;
    }

    let from = mv.from();
    let to = mv.to();
    let side = state.turn;
    let piece = state.piece_on(from);

    if piece == Piece::Empty || state.side_on(from) != Some(side) {
        return false;
    }

    if state.units[side as usize].is_bit_set(to) {
        return false;
    }

    let occupancy = state.occupied();

    // Promotion bits are only meaningful on a pawn reaching the last rank
    let is_promotion_square = BitBoard::from_square(to).0 & PROMOTION_RANKS != 0;
    if mv.promotion().is_some() != (piece == Piece::Pawn && is_promotion_square) {
        return false;
    }

    match piece {
        Piece::Pawn => {
            let forward = match side {
                Side::White => Direction::North,
                Side::Black => Direction::South,
            };
            let offset = forward.offset();

            if pawn_attacks(side, from).is_bit_set(to) {
                return state.units[side.opponent() as usize].is_bit_set(to)
                    || state.en_passant == Some(to);
            }

            if to as i32 == from as i32 + offset {
                return !occupancy.is_bit_set(to);
            }

            let double_start_rank = match side {
                Side::White => 1,
                Side::Black => 6,
            };

            if from.rank() == double_start_rank && to as i32 == from as i32 + 2 * offset {
                let traversed = Square::try_from(from as i32 + offset).unwrap();
                return !occupancy.is_bit_set(traversed) && !occupancy.is_bit_set(to);
            }

            false
        }
        Piece::Knight => knight_attacks(from).is_bit_set(to),
        Piece::Bishop => bishop_attacks(from, occupancy).is_bit_set(to),
        Piece::Rook => rook_attacks(from, occupancy).is_bit_set(to),
        Piece::Queen => queen_attacks(from, occupancy).is_bit_set(to),
        Piece::King => {
            if king_attacks(from).is_bit_set(to) {
                return true;
            }

            // Castling: re-run generation conditions for the matching side
            if from.file().abs_diff(to.file()) == 2 {
                let mut castles = MoveList::new();
                generate_castling(state, &mut castles);
                return castles.contains(mv);
            }

            false
        }
        Piece::Empty => false,
    }
}

/// Does the side to move have any fully legal move? Needed so quiescence
/// can recognise checkmate and stalemate at its entry points.
pub fn has_legal_move(board: &mut Board) -> bool {
    let side = board.state.turn;
    let moves = generate_moves(&board.state, MoveKind::All);

    for &mv in moves.iter() {
        board.make_move(mv);
        let legal = !king_in_check(&board.state, side);
        board.undo_move();

        if legal {
            return true;
        }
    }

    false
}

/// Static exchange evaluation: play out the capture sequence on the
/// destination square, cheapest attacker first, and report whether the
/// initiating side comes out at least `threshold` centipawns ahead. The
/// king joins in only when capturing it back would be impossible.
pub fn static_exchange_eval(state: &BoardState, mv: Move, threshold: i32) -> bool {
    let from = mv.from();
    let to = mv.to();
    let attacker = state.piece_on(from);

    let is_en_passant = attacker == Piece::Pawn && state.en_passant == Some(to);
    let victim = if is_en_passant {
        Piece::Pawn
    } else {
        state.piece_on(to)
    };

    let mut occupancy = state.occupied();
    occupancy.clear_bit(from);

    if is_en_passant {
        let victim_square = match state.turn {
            Side::White => Square::try_from(to as i32 - 8).unwrap(),
            Side::Black => Square::try_from(to as i32 + 8).unwrap(),
        };
        occupancy.clear_bit(victim_square);
        occupancy.set_bit(to);
    }

    let mut gain = [0i32; 32];
    let mut depth = 0;
    gain[0] = victim.see_value();

    let mut occupant = attacker;
    let mut side = state.turn.opponent();

    loop {
        let attackers = attacks_to(state, to, side, occupancy);

        if attackers.is_empty() {
            break;
        }

        // Cheapest attacker first
        let mut chosen = None;
        for piece in Piece::iter() {
            let candidates = attackers & state.pieces[side as usize][piece as usize];
            if candidates.is_not_empty() {
                chosen = Some((piece, Square::try_from(candidates.lsb()).unwrap()));
                break;
            }
        }

        let Some((piece, square)) = chosen else {
            break;
        };

        // A king cannot recapture into a defended square
        if piece == Piece::King {
            let defenders = attacks_to(state, to, side.opponent(), occupancy);
            if defenders.is_not_empty() {
                break;
            }
        }

        depth += 1;
        if depth >= gain.len() {
            break;
        }

        gain[depth] = occupant.see_value() - gain[depth - 1];
        occupant = piece;
        occupancy.clear_bit(square);
        side = side.opponent();
    }

    // Fold the swap list back: each side may stand pat instead of
    // continuing a losing sequence
    while depth > 0 {
        gain[depth - 1] = -std::cmp::max(-gain[depth - 1], gain[depth]);
        depth -= 1;
    }

    gain[0] >= threshold
}

/// Count leaf positions `depth` plies deep. The standard correctness
/// yardstick for the generator and make/unmake.
pub fn perft(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let side = board.state.turn;
    let moves = generate_moves(&board.state, MoveKind::All);
    let mut nodes = 0u64;

    for &mv in moves.iter() {
        board.make_move(mv);

        if !king_in_check(&board.state, side) {
            nodes += if depth == 1 {
                1
            } else {
                perft(board, depth - 1)
            };
        }

        board.undo_move();
    }

    nodes
}
