use log::info;

use super::{Board, Player};
use crate::error::MoveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
    Winner(Player),
    Draw,
}

/// Where the turn loop stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    PlayerTurn,
    ComputerTurn,
    GameOver(GameOutcome),
}

impl GamePhase {
    fn turn_of(player: Player) -> Self {
        match player {
            Player::Human => GamePhase::PlayerTurn,
            Player::Computer => GamePhase::ComputerTurn,
        }
    }
}

/// The authoritative game: board plus whose turn it is.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameState {
    board: Board,
    phase: GamePhase,
    last_move: Option<(usize, usize)>,
}

impl GameState {
    /// Create a game with `first` to move
    pub fn new(first: Player) -> Self {
        GameState {
            board: Board::new(),
            phase: GamePhase::turn_of(first),
            last_move: None,
        }
    }

    /// Create initial game state, human to move
    pub fn initial() -> Self {
        Self::new(Player::Human)
    }

    /// Play `moves` (columns) alternately starting with `first`.
    pub fn replay(first: Player, moves: &[usize]) -> Result<Self, MoveError> {
        let mut state = Self::new(first);
        for &col in moves {
            state.apply_move_mut(col)?;
        }
        Ok(state)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Player to move, or `None` once the game is over
    pub fn current_player(&self) -> Option<Player> {
        match self.phase {
            GamePhase::PlayerTurn => Some(Player::Human),
            GamePhase::ComputerTurn => Some(Player::Computer),
            GamePhase::GameOver(_) => None,
        }
    }

    /// Get reference to board
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// `(row, col)` of the most recent piece
    pub fn last_move(&self) -> Option<(usize, usize)> {
        self.last_move
    }

    /// Get game outcome if game is over
    pub fn outcome(&self) -> Option<GameOutcome> {
        match self.phase {
            GamePhase::GameOver(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Check if game is over
    pub fn is_terminal(&self) -> bool {
        self.outcome().is_some()
    }

    /// Get list of legal columns (not full)
    pub fn legal_actions(&self) -> Vec<usize> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.board.valid_columns()
    }

    /// Apply a move and return new state (immutable)
    pub fn apply_move(&self, column: usize) -> Result<GameState, MoveError> {
        let mut next = *self;
        next.apply_move_mut(column)?;
        Ok(next)
    }

    /// Apply a move in place, returning the row the piece landed in.
    pub fn apply_move_mut(&mut self, column: usize) -> Result<usize, MoveError> {
        let player = self.current_player().ok_or(MoveError::GameOver)?;
        let row = self.board.try_drop(column, player.to_cell())?;
        self.last_move = Some((row, column));

        self.phase = if self.board.has_won(player) {
            info!("{} won with a piece in column {column}", player.name());
            GamePhase::GameOver(GameOutcome::Winner(player))
        } else if self.board.is_full() {
            info!("board full, game drawn");
            GamePhase::GameOver(GameOutcome::Draw)
        } else {
            GamePhase::turn_of(player.other())
        };

        Ok(row)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::initial()
    }
}
