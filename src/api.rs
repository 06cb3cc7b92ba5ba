#[cfg(feature = "api")]
use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::time::TimeConfig;

#[cfg_attr(feature = "api", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub fen: String,
    pub moves: Option<Vec<String>>,
    pub wtime_ms: Option<u64>,
    pub btime_ms: Option<u64>,
    pub winc_ms: Option<u64>,
    pub binc_ms: Option<u64>,
    pub movetime_ms: Option<u64>,
    pub depth: Option<i32>,
}

#[cfg_attr(feature = "api", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct AnalyzeResponse {
    pub best_move: String,           // The best move in UCI format (e.g., e2e4)
    pub ponder_move: Option<String>, // Suggested move to think ahead on
    pub evaluation: i32,             // Position evaluation in centipawns
    pub depth: i32,                  // Search depth reached
    pub nodes: u64,                  // Total nodes searched
    pub pv: Vec<String>,             // Principal variation (best line of play)
    pub time_ms: u64,                // Time spent searching in milliseconds
    pub fen_after_move: String,      // FEN string after applying best move
}

/// Main entry point for API consumers: analyze a position and return the
/// best move with its supporting line.
pub fn analyze_position(request: AnalyzeRequest) -> Result<AnalyzeResponse, String> {
    let mut engine = Engine::new();

    let moves: Vec<&str> = request
        .moves
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .map(|s| s.as_str())
        .collect();

    engine.set_position(&request.fen, &moves)?;

    engine.settings.time = TimeConfig {
        wtime: request.wtime_ms,
        btime: request.btime_ms,
        winc: request.winc_ms,
        binc: request.binc_ms,
        movetime: request.movetime_ms,
        infinite: false,
    };

    if let Some(depth) = request.depth {
        engine.settings.max_depth = depth;
    }

    let result = engine.think(None::<fn(&crate::search::IterationReport)>);

    if result.best_move.is_null() {
        return Err("No legal moves in position (checkmate or stalemate)".to_string());
    }

    // Apply the best move to report the resulting position
    engine.searcher.board.make_move(result.best_move);
    let fen_after_move = engine.searcher.board.to_fen();
    engine.searcher.board.undo_move();

    Ok(AnalyzeResponse {
        best_move: result.best_move.to_uci(),
        ponder_move: result.ponder_move.map(|mv| mv.to_uci()),
        evaluation: result.evaluation,
        depth: result.depth,
        nodes: result.nodes,
        pv: result
            .principal_variation
            .iter()
            .map(|mv| mv.to_uci())
            .collect(),
        time_ms: result.time_ms,
        fen_after_move,
    })
}

/// Simpler interface with just FEN and depth
pub fn get_best_move(fen: &str, depth: i32) -> Result<AnalyzeResponse, String> {
    analyze_position(AnalyzeRequest {
        fen: fen.to_string(),
        moves: None,
        depth: Some(depth),
        movetime_ms: None,
        wtime_ms: None,
        btime_ms: None,
        winc_ms: None,
        binc_ms: None,
    })
}
