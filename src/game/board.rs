use std::fmt;
use std::ops::Range;

use super::player::Player;
use crate::error::MoveError;

pub const ROWS: usize = 6;
pub const COLS: usize = 7;
/// Number of aligned pieces needed to win.
pub const WINDOW_LENGTH: usize = 4;
pub const CENTER_COL: usize = COLS / 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Human,
    Computer,
}

/// Four consecutive `(row, col)` coordinates along one direction.
pub type Window = [(usize, usize); WINDOW_LENGTH];

/// The four line directions a window can run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Horizontal,
    Vertical,
    /// Bottom-left to top-right (/)
    PositiveDiagonal,
    /// Top-left to bottom-right (\)
    NegativeDiagonal,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Horizontal,
        Direction::Vertical,
        Direction::PositiveDiagonal,
        Direction::NegativeDiagonal,
    ];

    /// Row and column ranges of every window's first cell.
    fn starts(self) -> (Range<usize>, Range<usize>) {
        let span = WINDOW_LENGTH - 1;
        match self {
            Direction::Horizontal => (0..ROWS, 0..COLS - span),
            Direction::Vertical => (0..ROWS - span, 0..COLS),
            Direction::PositiveDiagonal => (0..ROWS - span, 0..COLS - span),
            Direction::NegativeDiagonal => (span..ROWS, 0..COLS - span),
        }
    }

    fn step(self, row: usize, col: usize, i: usize) -> (usize, usize) {
        match self {
            Direction::Horizontal => (row, col + i),
            Direction::Vertical => (row + i, col),
            Direction::PositiveDiagonal => (row + i, col + i),
            Direction::NegativeDiagonal => (row - i, col + i),
        }
    }

    /// Every window running in this direction, each yielded exactly once.
    pub fn windows(self) -> impl Iterator<Item = Window> {
        let (rows, cols) = self.starts();
        rows.flat_map(move |row| {
            cols.clone()
                .map(move |col| std::array::from_fn(|i| self.step(row, col, i)))
        })
    }
}

/// All windows on the board, grouped by direction.
pub fn all_windows() -> impl Iterator<Item = (Direction, Window)> {
    Direction::ALL
        .into_iter()
        .flat_map(|dir| dir.windows().map(move |window| (dir, window)))
}

/// A 6x7 Connect Four grid. Row 0 is the bottom row.
///
/// Pieces obey gravity: a cell is only occupied when every cell beneath it
/// in the same column is occupied. `drop_piece` trusts its caller to keep
/// that invariant; `try_drop` enforces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Board {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    /// Get the cell at a specific position
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row][col]
    }

    /// The four cells covered by `window`.
    pub fn window_cells(&self, window: &Window) -> [Cell; WINDOW_LENGTH] {
        window.map(|(row, col)| self.cells[row][col])
    }

    /// True iff the top cell of `col` is empty.
    ///
    /// # Panics
    ///
    /// Panics if `col >= COLS`.
    pub fn is_valid_column(&self, col: usize) -> bool {
        self.cells[ROWS - 1][col] == Cell::Empty
    }

    /// Lowest empty row in `col`, or `None` when the column is full.
    ///
    /// # Panics
    ///
    /// Panics if `col >= COLS`.
    pub fn next_open_row(&self, col: usize) -> Option<usize> {
        (0..ROWS).find(|&row| self.cells[row][col] == Cell::Empty)
    }

    /// Place `cell` at `(row, col)` without any validation.
    pub fn drop_piece(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row][col] = cell;
    }

    /// Clear `(row, col)`. Reverts a `drop_piece` on the topmost piece of a column.
    pub fn remove_piece(&mut self, row: usize, col: usize) {
        self.cells[row][col] = Cell::Empty;
    }

    /// Checked drop: place `cell` in the lowest empty row of `col` and return that row.
    pub fn try_drop(&mut self, col: usize, cell: Cell) -> Result<usize, MoveError> {
        if col >= COLS {
            return Err(MoveError::ColumnOutOfRange(col));
        }
        let row = self.next_open_row(col).ok_or(MoveError::ColumnFull(col))?;
        self.drop_piece(row, col, cell);
        Ok(row)
    }

    /// Columns that still accept a piece, in ascending order.
    pub fn valid_columns(&self) -> Vec<usize> {
        (0..COLS).filter(|&col| self.is_valid_column(col)).collect()
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        (0..COLS).all(|col| !self.is_valid_column(col))
    }

    /// Number of occupied cells.
    pub fn piece_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|&&cell| cell != Cell::Empty)
            .count()
    }

    /// Number of `cell` pieces stacked in `col`.
    pub fn count_in_column(&self, col: usize, cell: Cell) -> usize {
        (0..ROWS).filter(|&row| self.cells[row][col] == cell).count()
    }

    /// First window (in direction order) holding four of `player`'s pieces.
    pub fn winning_window(&self, player: Player) -> Option<(Direction, Window)> {
        let cell = player.to_cell();
        all_windows().find(|(_, window)| self.window_cells(window).iter().all(|&c| c == cell))
    }

    /// Whether `player` has four in a row in any direction.
    pub fn has_won(&self, player: Player) -> bool {
        self.winning_window(player).is_some()
    }

    /// True when either side has won or no column accepts a piece.
    pub fn is_terminal(&self) -> bool {
        self.has_won(Player::Human) || self.has_won(Player::Computer) || self.is_full()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    /// Top row first: `.` empty, `X` human, `O` computer.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..ROWS).rev() {
            let line: String = self.cells[row]
                .iter()
                .map(|cell| match cell {
                    Cell::Empty => '.',
                    Cell::Human => 'X',
                    Cell::Computer => 'O',
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        let labels: String = (0..COLS).map(|col| char::from(b'0' + col as u8)).collect();
        write!(f, "{labels}")
    }
}
