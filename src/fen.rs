use thiserror::Error;

use crate::{
    constants::{
        BLACK_KINGSIDE_CASTLE, BLACK_QUEENSIDE_CASTLE, NUM_PIECE_TYPES, NUM_SIDES, NUM_SQUARES,
        WHITE_KINGSIDE_CASTLE, WHITE_QUEENSIDE_CASTLE,
    },
    moves::Move,
    types::{BitBoard, BoardState, Piece, Side, Square},
    zobrist,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FenError {
    #[error("FEN must have at least 4 fields, got {0}")]
    MissingFields(usize),
    #[error("invalid piece character {0:?}")]
    BadPiece(char),
    #[error("rank {0} does not describe exactly 8 squares")]
    BadRank(u8),
    #[error("board must describe exactly 8 ranks")]
    BadRankCount,
    #[error("invalid side to move {0:?}")]
    BadSideToMove(String),
    #[error("invalid castling field {0:?}")]
    BadCastling(String),
    #[error("invalid en passant field {0:?}")]
    BadEnPassant(String),
    #[error("invalid clock field {0:?}")]
    BadClock(String),
    #[error("each side needs exactly one king")]
    BadKingCount,
}

fn piece_from_char(c: char) -> Result<(Side, Piece), FenError> {
    let side = if c.is_ascii_uppercase() {
        Side::White
    } else {
        Side::Black
    };

    let piece = match c.to_ascii_lowercase() {
        'p' => Piece::Pawn,
        'n' => Piece::Knight,
        'b' => Piece::Bishop,
        'r' => Piece::Rook,
        'q' => Piece::Queen,
        'k' => Piece::King,
        _ => return Err(FenError::BadPiece(c)),
    };

    Ok((side, piece))
}

fn piece_to_char(side: Side, piece: Piece) -> char {
    let c = match piece {
        Piece::Pawn => 'p',
        Piece::Knight => 'n',
        Piece::Bishop => 'b',
        Piece::Rook => 'r',
        Piece::Queen => 'q',
        Piece::King => 'k',
        Piece::Empty => unreachable!(),
    };

    match side {
        Side::White => c.to_ascii_uppercase(),
        Side::Black => c,
    }
}

/// Build a position from a FEN string. The move counters are optional and
/// default to zero, matching what most GUIs send over UCI.
pub fn parse(fen: &str) -> Result<BoardState, FenError> {
    let fields: Vec<&str> = fen.split_whitespace().collect();

    if fields.len() < 4 {
        return Err(FenError::MissingFields(fields.len()));
    }

    let mut pieces = [[BitBoard::EMPTY; NUM_PIECE_TYPES]; NUM_SIDES];
    let mut units = [BitBoard::EMPTY; NUM_SIDES];
    let mut piece_at = [Piece::Empty; NUM_SQUARES];

    let ranks: Vec<&str> = fields[0].split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::BadRankCount);
    }

    for (rank_index, rank_str) in ranks.iter().enumerate() {
        let rank = 7 - rank_index as u8; // FEN starts at rank 8
        let mut file = 0u8;

        for c in rank_str.chars() {
            if let Some(skip) = c.to_digit(10) {
                file += skip as u8;
                continue;
            }

            if file > 7 {
                return Err(FenError::BadRank(rank + 1));
            }

            let (side, piece) = piece_from_char(c)?;
            let square = Square::from_file_rank(file, rank).map_err(|_| FenError::BadRank(rank + 1))?;

            pieces[side as usize][piece as usize].set_bit(square);
            units[side as usize].set_bit(square);
            piece_at[square as usize] = piece;

            file += 1;
        }

        if file != 8 {
            return Err(FenError::BadRank(rank + 1));
        }
    }

    for side in Side::iter() {
        if pieces[side as usize][Piece::King as usize].pop_count() != 1 {
            return Err(FenError::BadKingCount);
        }
    }

    let turn = match fields[1] {
        "w" => Side::White,
        "b" => Side::Black,
        other => return Err(FenError::BadSideToMove(other.to_string())),
    };

    let mut castle = 0u8;
    if fields[2] != "-" {
        for c in fields[2].chars() {
            castle |= match c {
                'K' => WHITE_KINGSIDE_CASTLE,
                'Q' => WHITE_QUEENSIDE_CASTLE,
                'k' => BLACK_KINGSIDE_CASTLE,
                'q' => BLACK_QUEENSIDE_CASTLE,
                _ => return Err(FenError::BadCastling(fields[2].to_string())),
            };
        }
    }

    let en_passant = match fields[3] {
        "-" => None,
        square_str => {
            let bytes = square_str.as_bytes();
            if bytes.len() != 2
                || !(b'a'..=b'h').contains(&bytes[0])
                || !(b'1'..=b'8').contains(&bytes[1])
            {
                return Err(FenError::BadEnPassant(square_str.to_string()));
            }

            Some(Square::from_file_rank(bytes[0] - b'a', bytes[1] - b'1').unwrap())
        }
    };

    let fifty = match fields.get(4) {
        Some(s) => s
            .parse::<u8>()
            .map_err(|_| FenError::BadClock(s.to_string()))?,
        None => 0,
    };

    let ply = match fields.get(5) {
        Some(s) => {
            let full_moves = s
                .parse::<u16>()
                .map_err(|_| FenError::BadClock(s.to_string()))?;
            full_moves.saturating_sub(1) * 2 + if turn == Side::Black { 1 } else { 0 }
        }
        None => 0,
    };

    let mut state = BoardState {
        pieces,
        units,
        piece_at,
        turn,
        castle,
        en_passant,
        fifty,
        ply,
        key: 0,
        last_move: Move::NULL,
    };

    state.key = zobrist::compute(&state);

    Ok(state)
}

/// Serialize a position back to FEN (used by the API layer and debugging)
pub fn export(state: &BoardState) -> String {
    let mut board = String::new();

    for rank in (0..8u8).rev() {
        let mut empty_run = 0;

        for file in 0..8u8 {
            let square = Square::from_file_rank(file, rank).unwrap();
            let piece = state.piece_at[square as usize];

            if piece == Piece::Empty {
                empty_run += 1;
                continue;
            }

            if empty_run > 0 {
                board.push_str(&empty_run.to_string());
                empty_run = 0;
            }

            let side = if state.units[Side::White as usize].is_bit_set(square) {
                Side::White
            } else {
                Side::Black
            };

            board.push(piece_to_char(side, piece));
        }

        if empty_run > 0 {
            board.push_str(&empty_run.to_string());
        }

        if rank > 0 {
            board.push('/');
        }
    }

    let turn = match state.turn {
        Side::White => "w",
        Side::Black => "b",
    };

    let mut castling = String::new();
    for (bit, c) in [
        (WHITE_KINGSIDE_CASTLE, 'K'),
        (WHITE_QUEENSIDE_CASTLE, 'Q'),
        (BLACK_KINGSIDE_CASTLE, 'k'),
        (BLACK_QUEENSIDE_CASTLE, 'q'),
    ] {
        if state.castle & bit != 0 {
            castling.push(c);
        }
    }
    if castling.is_empty() {
        castling.push('-');
    }

    let en_passant = match state.en_passant {
        Some(square) => square.to_algebraic(),
        None => "-".to_string(),
    };

    format!(
        "{} {} {} {} {} {}",
        board,
        turn,
        castling,
        en_passant,
        state.fifty,
        state.ply / 2 + 1
    )
}
