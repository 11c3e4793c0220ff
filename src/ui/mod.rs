//! Terminal UI for playing Connect Four against the minimax computer.

mod app;
mod game_view;

pub use app::App;
