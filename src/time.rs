use std::time::{Duration, Instant};

use crate::{
    constants::{
        DEFAULT_MOVETIME_MS, DEFAULT_PLAYER_INCREMENT_MS, DEFAULT_PLAYER_TIME_REMAINING_MS,
        NUM_SQUARES, SOFT_TO_HARD_LIMIT_RATIO,
    },
    moves::Move,
};

/// Clock constraints for one `go` command
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeConfig {
    pub wtime: Option<u64>,
    pub btime: Option<u64>,
    pub winc: Option<u64>,
    pub binc: Option<u64>,
    /// Explicit per-move time in ms; overrides the clock calculation
    pub movetime: Option<u64>,
    /// Search without any clock limit (depth/nodes still apply)
    pub infinite: bool,
}

/// Tracks the search clock plus the per-move node accounting the root uses
/// to decide whether more iterations are worth starting.
#[derive(Debug, Clone)]
pub struct TimeManager {
    start_time: Instant,
    soft_limit: Duration,
    hard_limit: Duration,
    infinite: bool,
    stopped: bool,
    nodes_searched: u64,
    /// Nodes spent below each root move, indexed [from][to]
    node_spent: [[u64; NUM_SQUARES]; NUM_SQUARES],
}

/// For ease of use in tests
impl Default for TimeManager {
    fn default() -> Self {
        let mut manager = Self::new(TimeConfig::default(), true);
        manager.infinite = true;
        manager
    }
}

impl TimeManager {
    /// Create a new TimeManager for each search
    pub fn new(config: TimeConfig, is_white_turn: bool) -> Self {
        let max_search_duration_ms = match config.movetime {
            Some(movetime) => movetime.max(1),
            None => {
                let (time_left, increment) = if is_white_turn {
                    (
                        config.wtime.unwrap_or(DEFAULT_PLAYER_TIME_REMAINING_MS),
                        config.winc.unwrap_or(DEFAULT_PLAYER_INCREMENT_MS),
                    )
                } else {
                    (
                        config.btime.unwrap_or(DEFAULT_PLAYER_TIME_REMAINING_MS),
                        config.binc.unwrap_or(DEFAULT_PLAYER_INCREMENT_MS),
                    )
                };

                if config.wtime.is_none() && config.btime.is_none() && !config.infinite {
                    DEFAULT_MOVETIME_MS
                } else {
                    // Use 1/30 of remaining time + increment, but never more
                    // than 25% of what is left on the clock
                    (time_left / 30 + increment).min(time_left / 4).max(1)
                }
            }
        };

        let soft_limit_ms = match config.movetime {
            Some(movetime) => movetime.max(1),
            None => (max_search_duration_ms as f64 * SOFT_TO_HARD_LIMIT_RATIO) as u64,
        };

        Self {
            start_time: Instant::now(),
            soft_limit: Duration::from_millis(soft_limit_ms),
            hard_limit: Duration::from_millis(max_search_duration_ms),
            infinite: config.infinite,
            stopped: false,
            nodes_searched: 0,
            node_spent: [[0; NUM_SQUARES]; NUM_SQUARES],
        }
    }

    /// Restart the clock and the node accounting for a fresh search
    pub fn start(&mut self) {
        self.start_time = Instant::now();
        self.stopped = false;
        self.nodes_searched = 0;
        self.node_spent = [[0; NUM_SQUARES]; NUM_SQUARES];
    }

    /// Cooperative cancellation from the front-end
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /// Time since search began
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    /// Must the search abort right now?
    pub fn times_up(&self) -> bool {
        if self.stopped {
            return true;
        }

        !self.infinite && self.elapsed() >= self.hard_limit
    }

    /// Should iterative deepening stop starting new depths? Fires at the
    /// soft limit, or earlier when one root move has absorbed more than
    /// half of all nodes so far: the choice is unlikely to change.
    pub fn root_times_up(&self, current_best: Move) -> bool {
        if self.stopped {
            return true;
        }

        if self.infinite {
            return false;
        }

        if self.elapsed() >= self.soft_limit {
            return true;
        }

        if !current_best.is_null() && self.nodes_searched > 0 {
            let spent = self.node_spent[current_best.from() as usize][current_best.to() as usize];

            if spent * 2 > self.nodes_searched && self.elapsed() * 2 >= self.soft_limit {
                return true;
            }
        }

        false
    }

    pub fn update_nodes_searched(&mut self) {
        self.nodes_searched += 1;
    }

    /// Credit `nodes` to the root move that was just searched
    pub fn update_node_spent_table(&mut self, mv: Move, nodes: u64) {
        self.node_spent[mv.from() as usize][mv.to() as usize] += nodes;
    }
}
