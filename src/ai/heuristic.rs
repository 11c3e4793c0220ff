use crate::game::{all_windows, Board, Cell, Player, CENTER_COL, WINDOW_LENGTH};

/// Search and evaluation score. Wide enough for the win sentinels.
pub type Score = i64;

const FOUR_SCORE: Score = 100;
const THREE_SCORE: Score = 5;
const TWO_SCORE: Score = 2;
const OPPONENT_THREE_PENALTY: Score = -4;
/// Bonus per own piece in the center column.
const CENTER_WEIGHT: Score = 3;

/// Heuristic value of one window for `player`.
///
/// The cases are tried in order and the first match wins:
/// four own pieces, three own plus an empty cell, two own plus two empty,
/// three opponent pieces plus an empty cell. No window can satisfy two of
/// them at once.
pub fn evaluate_window(window: &[Cell; WINDOW_LENGTH], player: Player) -> Score {
    let count = |target: Cell| window.iter().filter(|&&cell| cell == target).count();
    let own = count(player.to_cell());
    let opp = count(player.other().to_cell());
    let empty = count(Cell::Empty);

    if own == 4 {
        FOUR_SCORE
    } else if own == 3 && empty == 1 {
        THREE_SCORE
    } else if own == 2 && empty == 2 {
        TWO_SCORE
    } else if opp == 3 && empty == 1 {
        OPPONENT_THREE_PENALTY
    } else {
        0
    }
}

/// Static evaluation of `board` from `player`'s point of view.
///
/// Sums the center-column bonus and `evaluate_window` over all 69 windows.
/// Overlapping windows each contribute on their own.
pub fn score_position(board: &Board, player: Player) -> Score {
    let center = board.count_in_column(CENTER_COL, player.to_cell()) as Score * CENTER_WEIGHT;
    let windows: Score = all_windows()
        .map(|(_, window)| evaluate_window(&board.window_cells(&window), player))
        .sum();
    center + windows
}
