use crate::game::GameState;

/// Anything that can pick a column for the side to move.
pub trait Agent {
    /// Select a legal column for the current state, or `None` when the game is over.
    fn select_action(&mut self, state: &GameState) -> Option<usize>;

    /// Return the agent's display name.
    fn name(&self) -> &str;
}
