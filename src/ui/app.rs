use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent};
use log::{info, warn};
use ratatui::{backend::Backend, Terminal};

use crate::ai::SearchResult;
use crate::config::AppConfig;
use crate::error::MoveError;
use crate::game::{GameOutcome, GamePhase, GameState, Player, CENTER_COL, COLS};

/// A computer move being searched on a worker thread.
///
/// Dropping it raises the worker's cancel flag so an abandoned search stops.
struct PendingMove {
    rx: mpsc::Receiver<SearchResult>,
    cancel: Arc<AtomicBool>,
    started: Instant,
    result: Option<SearchResult>,
}

impl Drop for PendingMove {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

pub struct App {
    game_state: GameState,
    config: AppConfig,
    selected_column: usize,
    should_quit: bool,
    message: Option<String>,
    pending: Option<PendingMove>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        App {
            game_state: GameState::new(config.game.first_player),
            config,
            selected_column: CENTER_COL,
            should_quit: false,
            message: None,
            pending: None,
        }
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()>
    where
        B::Error: Into<io::Error>,
    {
        loop {
            terminal.draw(|f| self.render(f)).map_err(Into::<io::Error>::into)?;

            if self.should_quit {
                break;
            }

            self.tick();
            self.handle_events()?;
        }
        Ok(())
    }

    /// Handle keyboard events
    fn handle_events(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                self.handle_key(key);
            }
        }
        Ok(())
    }

    /// Handle key press
    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => {
                self.selected_column = self.selected_column.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.selected_column < COLS - 1 {
                    self.selected_column += 1;
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.drop_piece();
            }
            KeyCode::Char('r') => {
                self.restart();
            }
            _ => {}
        }
    }

    fn restart(&mut self) {
        // Cancels any search still running.
        self.pending = None;
        self.game_state = GameState::new(self.config.game.first_player);
        self.selected_column = CENTER_COL;
        self.message = Some("New game started!".to_string());
        info!("new game, {} first", self.config.game.first_player.name());
    }

    /// Drop the human's piece in the selected column
    fn drop_piece(&mut self) {
        match self.game_state.phase() {
            GamePhase::GameOver(_) => {
                self.message = Some("Game over! Press 'r' to restart.".to_string());
                return;
            }
            GamePhase::ComputerTurn => {
                self.message = Some("Wait for the computer to move.".to_string());
                return;
            }
            GamePhase::PlayerTurn => {}
        }

        match self.game_state.apply_move_mut(self.selected_column) {
            Ok(_) => self.announce_outcome(),
            Err(err @ MoveError::ColumnFull(_)) | Err(err @ MoveError::ColumnOutOfRange(_)) => {
                self.message = Some(format!("{}!", capitalize(&err.to_string())));
            }
            Err(MoveError::GameOver) => {
                self.message = Some("Game is over!".to_string());
            }
        }
    }

    /// Start or finish the computer's move.
    fn tick(&mut self) {
        if self.game_state.phase() != GamePhase::ComputerTurn {
            return;
        }

        let Some(pending) = self.pending.as_mut() else {
            self.spawn_search();
            return;
        };

        if pending.result.is_none() {
            match pending.rx.try_recv() {
                Ok(result) => pending.result = Some(result),
                Err(mpsc::TryRecvError::Empty) => return,
                Err(mpsc::TryRecvError::Disconnected) => {
                    warn!("search worker exited without a result");
                    self.pending = None;
                    self.message = Some("Computer search failed, retrying...".to_string());
                    return;
                }
            }
        }

        let delay = Duration::from_millis(self.config.game.computer_delay_ms);
        if pending.started.elapsed() < delay {
            return;
        }

        let result = pending.result;
        self.pending = None;
        let column = result
            .and_then(|r| r.column)
            .or_else(|| self.game_state.legal_actions().first().copied());
        let Some(column) = column else {
            return;
        };

        match self.game_state.apply_move_mut(column) {
            Ok(_) => {
                self.message = None;
                self.announce_outcome();
            }
            Err(err) => {
                warn!("computer chose column {column}: {err}");
            }
        }
    }

    fn spawn_search(&mut self) {
        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let agent = self
            .config
            .search
            .agent()
            .with_cancel_flag(Arc::clone(&cancel));
        let board = *self.game_state.board();

        thread::spawn(move || {
            let result = agent.analyze(&board);
            // The receiver is gone if the game was restarted.
            let _ = tx.send(result);
        });

        self.pending = Some(PendingMove {
            rx,
            cancel,
            started: Instant::now(),
            result: None,
        });
        self.message = Some("Computer is thinking...".to_string());
    }

    fn announce_outcome(&mut self) {
        if let Some(outcome) = self.game_state.outcome() {
            self.message = Some(match outcome {
                GameOutcome::Winner(Player::Human) => "You win!".to_string(),
                GameOutcome::Winner(Player::Computer) => "Computer wins!".to_string(),
                GameOutcome::Draw => "It's a draw!".to_string(),
            });
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        super::game_view::render(
            frame,
            &self.game_state,
            self.selected_column,
            &self.message,
            self.config.search.depth,
        );
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
