//! Core Connect Four game logic: board representation, win detection,
//! player types, and the turn-loop state machine.

mod board;
mod player;
mod state;

pub use board::{
    all_windows, Board, Cell, Direction, Window, CENTER_COL, COLS, ROWS, WINDOW_LENGTH,
};
pub use player::Player;
pub use state::{GameOutcome, GamePhase, GameState};
