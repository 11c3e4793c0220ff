//! # Connect Four
//!
//! Human versus computer Connect Four. The computer picks its moves with a
//! depth-limited minimax search with alpha-beta pruning over a fixed
//! window-based evaluation. A Ratatui terminal UI drives the game.
//!
//! ## Modules
//!
//! - [`game`] — Board model, win/draw detection, players, turn state machine
//! - [`ai`] — Position evaluator, minimax search, agents
//! - [`ui`] — Terminal UI for playing against the computer
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod ai;
pub mod config;
pub mod error;
pub mod game;
pub mod ui;
