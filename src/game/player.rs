use serde::{Deserialize, Serialize};

use super::board::Cell;

/// The two sides: the person at the keyboard and the minimax engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    Human,
    Computer,
}

impl Player {
    /// Get the other player
    pub fn other(self) -> Player {
        match self {
            Player::Human => Player::Computer,
            Player::Computer => Player::Human,
        }
    }

    /// Convert player to cell type
    pub fn to_cell(self) -> Cell {
        match self {
            Player::Human => Cell::Human,
            Player::Computer => Cell::Computer,
        }
    }

    /// Get player name for display
    pub fn name(self) -> &'static str {
        match self {
            Player::Human => "You",
            Player::Computer => "Computer",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_player() {
        assert_eq!(Player::Human.other(), Player::Computer);
        assert_eq!(Player::Computer.other(), Player::Human);
    }

    #[test]
    fn test_player_cells() {
        assert_eq!(Player::Human.to_cell(), Cell::Human);
        assert_eq!(Player::Computer.to_cell(), Cell::Computer);
    }

    #[test]
    fn test_player_name() {
        assert_eq!(Player::Human.name(), "You");
        assert_eq!(Player::Computer.name(), "Computer");
    }
}
