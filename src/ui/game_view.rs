use crate::game::{Cell, GameOutcome, GamePhase, GameState, Window, COLS, ROWS};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(
    frame: &mut Frame,
    game_state: &GameState,
    selected_column: usize,
    message: &Option<String>,
    depth: u32,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(11),   // Board
            Constraint::Length(3), // Message
            Constraint::Length(3), // Controls
        ])
        .split(frame.area());

    render_header(frame, game_state, depth, chunks[0]);
    render_board(frame, game_state, selected_column, chunks[1]);
    render_message(frame, message, chunks[2]);
    render_controls(frame, chunks[3]);
}

fn render_header(frame: &mut Frame, game_state: &GameState, depth: u32, area: Rect) {
    let (status, color) = match game_state.phase() {
        GamePhase::PlayerTurn => ("Your move".to_string(), Color::Red),
        GamePhase::ComputerTurn => ("Computer's move".to_string(), Color::Yellow),
        GamePhase::GameOver(GameOutcome::Draw) => ("Game Over: draw".to_string(), Color::White),
        GamePhase::GameOver(GameOutcome::Winner(player)) => (
            format!("Game Over: {} won", player.name()),
            Color::White,
        ),
    };

    let header = Paragraph::new(format!("{status}  |  Search depth {depth}"))
        .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Connect Four"),
        );

    frame.render_widget(header, area);
}

fn render_board(frame: &mut Frame, game_state: &GameState, selected_column: usize, area: Rect) {
    let board = game_state.board();
    let winning: Option<Window> = match game_state.outcome() {
        Some(GameOutcome::Winner(player)) => board.winning_window(player).map(|(_, w)| w),
        _ => None,
    };
    let mut lines = Vec::new();

    // Column numbers with selection indicator
    let mut col_line = vec![Span::raw("   ")];
    for col in 0..COLS {
        let label = format!(" {col} ");
        if col == selected_column {
            col_line.push(Span::styled(
                label,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ));
        } else {
            col_line.push(Span::raw(label));
        }
    }
    col_line.push(Span::raw("  "));
    lines.push(Line::from(col_line));

    lines.push(Line::from("  ╔═════════════════════╗"));

    // Top row first; row 0 is the bottom of the board.
    for row in (0..ROWS).rev() {
        let mut row_spans = vec![Span::raw("  ║")];

        for col in 0..COLS {
            let (symbol, color) = match board.get(row, col) {
                Cell::Empty => (" . ", Color::DarkGray),
                Cell::Human => (" ● ", Color::Red),
                Cell::Computer => (" ● ", Color::Yellow),
            };
            let mut style = Style::default().fg(color);
            if winning.is_some_and(|w| w.contains(&(row, col))) {
                style = style.bg(Color::Blue).add_modifier(Modifier::BOLD);
            } else if game_state.last_move() == Some((row, col)) {
                style = style.add_modifier(Modifier::BOLD);
            }
            row_spans.push(Span::styled(symbol, style));
        }

        row_spans.push(Span::raw("║"));
        lines.push(Line::from(row_spans));
    }

    lines.push(Line::from("  ╚═════════════════════╝"));

    let mut indicator_line = vec![Span::raw("   ")];
    for col in 0..COLS {
        if col == selected_column {
            indicator_line.push(Span::styled(" ▲ ", Style::default().fg(Color::Cyan)));
        } else {
            indicator_line.push(Span::raw("   "));
        }
    }
    indicator_line.push(Span::raw("  "));
    lines.push(Line::from(indicator_line));

    let board_widget = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(board_widget, area);
}

fn render_message(frame: &mut Frame, message: &Option<String>, area: Rect) {
    let text = message.as_deref().unwrap_or("");
    let msg_widget = Paragraph::new(text)
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(msg_widget, area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let controls = Paragraph::new("←/→: Move  |  Enter: Drop  |  R: Restart  |  Q: Quit")
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Controls"),
        );

    frame.render_widget(controls, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MoveError;
    use crate::game::Player;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(game_state: &GameState, selected_column: usize) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(40, 22)).unwrap();
        terminal
            .draw(|f| render(f, game_state, selected_column, &None, 5))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    #[test]
    fn column_labels_match_move_errors() {
        let state = GameState::replay(Player::Human, &[3; ROWS]).unwrap();
        let lines = draw(&state, 3);

        assert!(
            lines.iter().any(|l| l.contains(" 0  1  2  3  4  5  6 ")),
            "no 0-based column labels in {lines:#?}"
        );
        assert_eq!(MoveError::ColumnFull(3).to_string(), "column 3 is full");
    }

    #[test]
    fn bottom_row_is_drawn_last() {
        let state = GameState::replay(Player::Human, &[0]).unwrap();
        let lines = draw(&state, 0);
        let board_rows: Vec<&String> = lines.iter().filter(|l| l.contains('║')).collect();

        assert_eq!(board_rows.len(), ROWS);
        assert!(!board_rows[0].contains('●'));
        assert!(board_rows[ROWS - 1].contains('●'));
    }
}
