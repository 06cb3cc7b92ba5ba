use std::io::{self, Write};

use crate::{
    constants::STARTPOS_FEN,
    engine::Engine,
    eval,
    search::IterationReport,
    time::TimeConfig,
};

const ENGINE_NAME: &str = "Ivory";
const ENGINE_AUTHOR: &str = "Ivory authors";

/// One info line per completed iteration, in the exact shape GUIs parse
fn format_info_line(report: &IterationReport) -> String {
    let score = if eval::is_mate_score(report.score) {
        format!("score mate {}", eval::mate_in(report.score))
    } else {
        format!("score cp {}", report.score)
    };

    let pv: Vec<String> = report.pv.iter().map(|mv| mv.to_uci()).collect();

    format!(
        "info depth {} {} nodes {} nps {} time {} seldepth {} pv {}",
        report.depth,
        score,
        report.nodes,
        report.nps,
        report.time_ms,
        report.seldepth,
        pv.join(" ")
    )
}

pub fn uci_loop(engine: &mut Engine) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        let mut input = String::new();
        if stdin.read_line(&mut input).is_err() {
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        let command = parts[0];

        match command {
            "uci" => {
                println!("id name {}", ENGINE_NAME);
                println!("id author {}", ENGINE_AUTHOR);
                println!("uciok");
                stdout.flush().unwrap();
            }
            "isready" => {
                println!("readyok");
                stdout.flush().unwrap();
            }
            "ucinewgame" => {
                engine.new_game();
            }
            "position" => {
                if let Err(e) = parse_position_command(engine, input) {
                    log::warn!("Error parsing position: {}", e);
                }
            }
            "go" => {
                parse_go_command(engine, input);

                let result = engine.think(Some(|report: &IterationReport| {
                    println!("{}", format_info_line(report));
                }));

                if result.best_move.is_null() {
                    // No legal moves in the position
                    println!("bestmove 0000");
                } else {
                    match result.ponder_move {
                        Some(ponder) => println!(
                            "bestmove {} ponder {}",
                            result.best_move.to_uci(),
                            ponder.to_uci()
                        ),
                        None => println!("bestmove {}", result.best_move.to_uci()),
                    }
                }
                stdout.flush().unwrap();
            }
            "stop" => {
                engine.stop();
            }
            "quit" => {
                break;
            }
            "d" | "display" => {
                engine.searcher.board.print();
            }
            _ => {
                // Unknown command - silently ignore per UCI spec
            }
        }
    }
}

/// Parse UCI position command
/// Examples:
///   position startpos
///   position startpos moves e2e4 e7e5
///   position fen rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1
///   position fen rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 moves e2e4
pub fn parse_position_command(engine: &mut Engine, command: &str) -> Result<(), String> {
    let parts: Vec<&str> = command.split_whitespace().collect();

    if parts.len() < 2 {
        return Err("Invalid position command".to_string());
    }

    let mut index = 1;

    let fen = if parts[index] == "startpos" {
        index += 1;
        STARTPOS_FEN.to_string()
    } else if parts[index] == "fen" {
        index += 1;

        let mut fen_parts = Vec::new();
        // FEN has up to 6 space-separated fields
        for _ in 0..6 {
            if index < parts.len() && parts[index] != "moves" {
                fen_parts.push(parts[index]);
                index += 1;
            }
        }

        if fen_parts.is_empty() {
            return Err("Missing FEN string".to_string());
        }

        fen_parts.join(" ")
    } else {
        return Err(format!("Unknown position type: {}", parts[index]));
    };

    let moves = if index < parts.len() && parts[index] == "moves" {
        parts[index + 1..].to_vec()
    } else {
        Vec::new()
    };

    engine.set_position(&fen, &moves)
}

/// Parse UCI go command and update search settings
/// Examples:
///   go depth 10
///   go movetime 5000
///   go wtime 300000 btime 300000 winc 0 binc 0
///   go infinite
pub fn parse_go_command(engine: &mut Engine, command: &str) {
    let parts: Vec<&str> = command.split_whitespace().collect();

    let mut time = TimeConfig::default();
    let mut max_depth = None;
    let mut max_nodes = None;

    let mut i = 1; // Skip "go"
    while i < parts.len() {
        match parts[i] {
            "wtime" => {
                time.wtime = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 2;
            }
            "btime" => {
                time.btime = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 2;
            }
            "winc" => {
                time.winc = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 2;
            }
            "binc" => {
                time.binc = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 2;
            }
            "movetime" => {
                time.movetime = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 2;
            }
            "depth" => {
                max_depth = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 2;
            }
            "nodes" => {
                max_nodes = parts.get(i + 1).and_then(|v| v.parse().ok());
                i += 2;
            }
            "infinite" => {
                time.infinite = true;
                i += 1;
            }
            _ => {
                i += 1;
            }
        }
    }

    engine.settings.time = time;
    engine.settings.max_depth = max_depth.unwrap_or(crate::constants::DEFAULT_MAX_DEPTH);
    engine.settings.max_nodes = max_nodes;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Move;
    use crate::types::{Side, Square};

    #[test]
    fn test_startpos_position() {
        let mut engine = Engine::new();
        let result = parse_position_command(&mut engine, "position startpos");
        assert!(result.is_ok());
        assert_eq!(engine.searcher.board.state.turn, Side::White);
    }

    #[test]
    fn test_position_with_moves() {
        let mut engine = Engine::new();
        let result = parse_position_command(&mut engine, "position startpos moves e2e4 e7e5");
        assert!(result.is_ok());
        assert_eq!(
            engine.searcher.board.state.last_move,
            Move::new(Square::E7, Square::E5)
        );
    }

    #[test]
    fn test_position_rejects_illegal_move() {
        let mut engine = Engine::new();
        let result = parse_position_command(&mut engine, "position startpos moves e2e5");
        assert!(result.is_err());
    }

    #[test]
    fn test_position_with_fen() {
        let mut engine = Engine::new();
        let result = parse_position_command(
            &mut engine,
            "position fen 4k3/8/8/8/8/8/4P3/4K3 w - - 0 1 moves e2e4",
        );
        assert!(result.is_ok());
        assert_eq!(engine.searcher.board.state.turn, Side::Black);
    }

    #[test]
    fn test_go_command_updates_settings() {
        let mut engine = Engine::new();
        parse_go_command(&mut engine, "go depth 6 nodes 5000");
        assert_eq!(engine.settings.max_depth, 6);
        assert_eq!(engine.settings.max_nodes, Some(5000));

        parse_go_command(&mut engine, "go wtime 60000 btime 60000 winc 1000 binc 1000");
        assert_eq!(engine.settings.time.wtime, Some(60000));
        assert_eq!(engine.settings.time.binc, Some(1000));
    }

    #[test]
    fn test_info_line_format() {
        let report = IterationReport {
            depth: 7,
            score: 42,
            nodes: 123456,
            nps: 1000000,
            time_ms: 123,
            seldepth: 9,
            pv: vec![
                Move::new(Square::E2, Square::E4),
                Move::new(Square::E7, Square::E5),
            ],
        };

        assert_eq!(
            format_info_line(&report),
            "info depth 7 score cp 42 nodes 123456 nps 1000000 time 123 seldepth 9 pv e2e4 e7e5"
        );
    }
}
