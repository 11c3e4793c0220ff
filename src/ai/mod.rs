mod agent;
pub mod heuristic;
pub mod minimax;
mod random;

pub use agent::Agent;
pub use heuristic::{evaluate_window, score_position, Score};
pub use minimax::{
    best_move, is_decided, iterative_deepening, search, MinimaxAgent, SearchResult, SearchStats,
    Searcher, DEFAULT_DEPTH, INFINITY, LOSS_SCORE, NEG_INFINITY, WIN_SCORE,
};
pub use random::RandomAgent;
