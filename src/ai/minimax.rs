use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;

use super::agent::Agent;
use super::heuristic::{score_position, Score};
use crate::game::{Board, GameState, Player};

/// Base terminal score for a computer win. Larger than any heuristic sum.
///
/// Terminal scores carry the remaining depth on top of this, so a win found
/// nearer the root outranks a later one and a later loss outranks a sooner one.
pub const WIN_SCORE: Score = 100_000_000_000_000;
/// Base terminal score for a human win.
pub const LOSS_SCORE: Score = -WIN_SCORE;
pub const NEG_INFINITY: Score = Score::MIN;
pub const INFINITY: Score = Score::MAX;
/// Plies searched on the computer's turn.
pub const DEFAULT_DEPTH: u32 = 5;

/// The side every search maximizes for.
pub const AI_PLAYER: Player = Player::Computer;

/// Whether `score` is a forced win or loss rather than a heuristic value.
pub fn is_decided(score: Score) -> bool {
    score >= WIN_SCORE || score <= LOSS_SCORE
}

/// Chosen column and its minimax value.
///
/// `column` is `None` when the searched position itself was a base case
/// (depth exhausted or game over).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub column: Option<usize>,
    pub score: Score,
}

/// Counters collected over one or more searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub cutoffs: u64,
}

/// Depth-limited minimax with alpha-beta pruning.
///
/// Moves are applied to a private copy of the caller's board and reverted
/// after each child returns, so one search never allocates a board per node.
pub struct Searcher {
    prune: bool,
    stats: SearchStats,
    cancel: Option<Arc<AtomicBool>>,
}

impl Searcher {
    pub fn new() -> Self {
        Searcher {
            prune: true,
            stats: SearchStats::default(),
            cancel: None,
        }
    }

    /// Plain minimax: alpha and beta are still tracked but never cut.
    pub fn without_pruning() -> Self {
        Searcher {
            prune: false,
            ..Self::new()
        }
    }

    /// Abandon the search once `flag` is set. A cancelled search returns
    /// whatever it had so far; its result is not meaningful.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Search `board` to `depth` plies within the `(alpha, beta)` window.
    ///
    /// `maximizing` is true when the computer is to move. The caller's
    /// board is left untouched.
    pub fn search(
        &mut self,
        board: &Board,
        depth: u32,
        alpha: Score,
        beta: Score,
        maximizing: bool,
    ) -> SearchResult {
        let mut work = *board;
        self.minimax(&mut work, depth, alpha, beta, maximizing)
    }

    /// Deepen one ply at a time until `max_depth`, a decided score, or `budget`.
    ///
    /// Each depth runs to completion; the budget only stops a new depth from
    /// starting. The shallowest depth always runs.
    pub fn iterative_deepening(
        &mut self,
        board: &Board,
        max_depth: u32,
        budget: Duration,
    ) -> SearchResult {
        let started = Instant::now();
        let mut depth = max_depth.min(1);
        let mut result = self.search(board, depth, NEG_INFINITY, INFINITY, true);

        while depth < max_depth
            && started.elapsed() < budget
            && !is_decided(result.score)
            && !self.is_cancelled()
        {
            depth += 1;
            result = self.search(board, depth, NEG_INFINITY, INFINITY, true);
        }

        debug!(
            "iterative deepening reached depth {depth}/{max_depth} in {:?} ({} nodes)",
            started.elapsed(),
            self.stats.nodes
        );
        result
    }

    fn minimax(
        &mut self,
        board: &mut Board,
        depth: u32,
        mut alpha: Score,
        mut beta: Score,
        maximizing: bool,
    ) -> SearchResult {
        self.stats.nodes += 1;

        // A full board is terminal, so past this point at least one column is open.
        if depth == 0 || board.is_terminal() {
            return SearchResult {
                column: None,
                score: leaf_score(board, depth),
            };
        }

        let valid = board.valid_columns();
        let (mover, start) = if maximizing {
            (AI_PLAYER, NEG_INFINITY)
        } else {
            (AI_PLAYER.other(), INFINITY)
        };
        let mut best = SearchResult {
            column: valid.first().copied(),
            score: start,
        };

        for col in valid {
            if self.is_cancelled() {
                break;
            }
            let Some(row) = board.next_open_row(col) else {
                continue;
            };
            board.drop_piece(row, col, mover.to_cell());
            let score = self
                .minimax(board, depth - 1, alpha, beta, !maximizing)
                .score;
            board.remove_piece(row, col);

            if maximizing {
                if score > best.score {
                    best = SearchResult {
                        column: Some(col),
                        score,
                    };
                }
                alpha = alpha.max(best.score);
            } else {
                if score < best.score {
                    best = SearchResult {
                        column: Some(col),
                        score,
                    };
                }
                beta = beta.min(best.score);
            }

            if self.prune && alpha >= beta {
                self.stats.cutoffs += 1;
                break;
            }
        }

        best
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Value of a base-case node, always from the computer's side.
///
/// `depth` is the number of plies left unsearched when the node was reached.
fn leaf_score(board: &Board, depth: u32) -> Score {
    if board.has_won(AI_PLAYER) {
        WIN_SCORE + Score::from(depth)
    } else if board.has_won(AI_PLAYER.other()) {
        LOSS_SCORE - Score::from(depth)
    } else if board.is_full() {
        0
    } else {
        score_position(board, AI_PLAYER)
    }
}

/// One alpha-beta search with a fresh `Searcher`.
pub fn search(
    board: &Board,
    depth: u32,
    alpha: Score,
    beta: Score,
    maximizing: bool,
) -> SearchResult {
    Searcher::new().search(board, depth, alpha, beta, maximizing)
}

/// Best column for the computer with a full window.
pub fn best_move(board: &Board, depth: u32) -> SearchResult {
    search(board, depth, NEG_INFINITY, INFINITY, true)
}

/// Time-boxed search with a fresh `Searcher`; see [`Searcher::iterative_deepening`].
pub fn iterative_deepening(board: &Board, max_depth: u32, budget: Duration) -> SearchResult {
    Searcher::new().iterative_deepening(board, max_depth, budget)
}

/// The computer player. Always plays the computer's pieces.
pub struct MinimaxAgent {
    depth: u32,
    time_budget: Option<Duration>,
    cancel: Option<Arc<AtomicBool>>,
}

impl MinimaxAgent {
    pub fn new(depth: u32) -> Self {
        MinimaxAgent {
            depth,
            time_budget: None,
            cancel: None,
        }
    }

    /// Iterative deepening up to `max_depth`, starting no new ply after `budget`.
    pub fn with_time_budget(max_depth: u32, budget: Duration) -> Self {
        MinimaxAgent {
            time_budget: Some(budget),
            ..Self::new(max_depth)
        }
    }

    /// Stop searching as soon as `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    fn searcher(&self) -> Searcher {
        match &self.cancel {
            Some(flag) => Searcher::new().with_cancel_flag(Arc::clone(flag)),
            None => Searcher::new(),
        }
    }

    /// Full search result for `board`, logging node statistics.
    pub fn analyze(&self, board: &Board) -> SearchResult {
        let mut searcher = self.searcher();
        if let Some(budget) = self.time_budget {
            return searcher.iterative_deepening(board, self.depth, budget);
        }

        let started = Instant::now();
        let result = searcher.search(board, self.depth, NEG_INFINITY, INFINITY, true);
        let stats = searcher.stats();
        debug!(
            "depth {} chose {:?} (score {}) after {} nodes, {} cutoffs in {:?}",
            self.depth,
            result.column,
            result.score,
            stats.nodes,
            stats.cutoffs,
            started.elapsed()
        );
        result
    }
}

impl Default for MinimaxAgent {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH)
    }
}

impl Agent for MinimaxAgent {
    fn select_action(&mut self, state: &GameState) -> Option<usize> {
        if state.is_terminal() {
            return None;
        }
        // Depth 0 yields no column; fall back to the first legal one.
        self.analyze(state.board())
            .column
            .or_else(|| state.legal_actions().first().copied())
    }

    fn name(&self) -> &str {
        "Minimax"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::RandomAgent;
    use crate::game::{Cell, GameOutcome, COLS, ROWS};

    fn build(moves: &[(usize, Cell)]) -> Board {
        let mut board = Board::new();
        for &(col, cell) in moves {
            board.try_drop(col, cell).unwrap();
        }
        board
    }

    fn drawn_board() -> Board {
        let state = GameState::replay(Player::Human, &drawn_game()).unwrap();
        assert_eq!(state.outcome(), Some(GameOutcome::Draw));
        *state.board()
    }

    fn drawn_game() -> Vec<usize> {
        let mut moves = Vec::new();
        for (a, b) in [(0, 1), (2, 3), (4, 5)] {
            for _ in 0..3 {
                moves.extend([a, b]);
            }
            for _ in 0..3 {
                moves.extend([b, a]);
            }
        }
        moves.extend([6; ROWS]);
        moves
    }

    // --- Base cases ---

    #[test]
    fn depth_zero_returns_static_score() {
        let board = build(&[(3, Cell::Human), (2, Cell::Computer), (3, Cell::Computer)]);
        let result = search(&board, 0, NEG_INFINITY, INFINITY, true);
        assert_eq!(result.column, None);
        assert_eq!(result.score, score_position(&board, Player::Computer));

        // Perspective is fixed even when the human is to move.
        let result = search(&board, 0, NEG_INFINITY, INFINITY, false);
        assert_eq!(result.score, score_position(&board, Player::Computer));
    }

    #[test]
    fn terminal_positions_return_sentinels() {
        let computer_won = build(&[(2, Cell::Computer); 4]);
        let human_won = build(&[(4, Cell::Human); 4]);

        for depth in [0, 1, 3] {
            let bonus = Score::from(depth);
            assert_eq!(
                search(&computer_won, depth, NEG_INFINITY, INFINITY, false),
                SearchResult { column: None, score: WIN_SCORE + bonus }
            );
            assert_eq!(
                search(&human_won, depth, NEG_INFINITY, INFINITY, true),
                SearchResult { column: None, score: LOSS_SCORE - bonus }
            );
        }
    }

    #[test]
    fn full_board_scores_zero() {
        let board = drawn_board();
        assert!(board.valid_columns().is_empty());
        assert_eq!(best_move(&board, 4), SearchResult { column: None, score: 0 });
    }

    #[test]
    fn sentinels_dominate_heuristics() {
        // Every window at its best plus a full center column.
        let ceiling = 69 * 100 + ROWS as Score * 3;
        assert!(WIN_SCORE > ceiling);
        assert!(LOSS_SCORE < -ceiling);
        assert!(!is_decided(ceiling));
        assert!(!is_decided(-ceiling));
    }

    // --- Move choice ---

    #[test]
    fn opening_prefers_center() {
        let board = Board::new();
        let result = best_move(&board, 1);
        assert_eq!(result, SearchResult { column: Some(3), score: 3 });

        // Center scores at least as high as either edge.
        let score_of = |col: usize| {
            let mut child = board;
            child.try_drop(col, Cell::Computer).unwrap();
            search(&child, 0, NEG_INFINITY, INFINITY, false).score
        };
        assert!(score_of(3) >= score_of(0));
        assert!(score_of(3) >= score_of(COLS - 1));
    }

    #[test]
    fn takes_immediate_win_at_any_depth() {
        // Computer has three stacked in column 0.
        let board = build(&[
            (0, Cell::Computer),
            (1, Cell::Human),
            (0, Cell::Computer),
            (5, Cell::Human),
            (0, Cell::Computer),
            (6, Cell::Human),
        ]);
        for depth in 1..=5 {
            let result = best_move(&board, depth);
            assert_eq!(
                result,
                SearchResult {
                    column: Some(0),
                    score: WIN_SCORE + Score::from(depth - 1),
                },
                "depth {depth}"
            );
        }
    }

    #[test]
    fn prefers_immediate_win_over_later_win() {
        // Computer has three stacked in both column 5 and column 6. Playing
        // column 0 still wins two plies later, so the win must be ranked by
        // how soon it lands.
        let board = build(&[
            (0, Cell::Human),
            (5, Cell::Computer),
            (0, Cell::Human),
            (5, Cell::Computer),
            (2, Cell::Human),
            (5, Cell::Computer),
            (2, Cell::Human),
            (6, Cell::Computer),
            (4, Cell::Human),
            (6, Cell::Computer),
            (4, Cell::Human),
            (6, Cell::Computer),
        ]);
        for depth in 1..=DEFAULT_DEPTH + 1 {
            let result = best_move(&board, depth);
            let col = result.column.unwrap();
            let mut after = board;
            after.try_drop(col, Cell::Computer).unwrap();
            assert!(after.has_won(Player::Computer), "depth {depth} played {col}");
            assert_eq!(
                result,
                SearchResult {
                    column: Some(5),
                    score: WIN_SCORE + Score::from(depth - 1),
                },
                "depth {depth}"
            );
        }
    }

    #[test]
    fn delays_unavoidable_loss() {
        // Human threatens both ends of an open three on the bottom row; the
        // loss lands in two plies whatever the computer does.
        let board = build(&[
            (2, Cell::Human),
            (2, Cell::Computer),
            (3, Cell::Human),
            (3, Cell::Computer),
            (4, Cell::Human),
            (4, Cell::Computer),
        ]);
        let result = best_move(&board, 4);
        assert_eq!(result.score, LOSS_SCORE - 2);
    }

    #[test]
    fn blocks_opponent_win() {
        // Human has bottom-row columns 0..3; column 3 must be blocked.
        let board = build(&[
            (6, Cell::Computer),
            (0, Cell::Human),
            (6, Cell::Computer),
            (1, Cell::Human),
            (5, Cell::Computer),
            (2, Cell::Human),
        ]);
        for depth in 2..=5 {
            let result = best_move(&board, depth);
            assert_eq!(result.column, Some(3), "depth {depth}");
            assert!(!is_decided(result.score));
        }
    }

    #[test]
    fn minimizing_side_finds_human_win() {
        // Human to move with three stacked in column 4.
        let board = build(&[
            (4, Cell::Human),
            (0, Cell::Computer),
            (4, Cell::Human),
            (1, Cell::Computer),
            (4, Cell::Human),
            (6, Cell::Computer),
        ]);
        let result = search(&board, 1, NEG_INFINITY, INFINITY, false);
        assert_eq!(result, SearchResult { column: Some(4), score: LOSS_SCORE });
    }

    #[test]
    fn search_leaves_caller_board_untouched() {
        let board = build(&[(3, Cell::Human), (3, Cell::Computer), (4, Cell::Human)]);
        let before = board;
        let _ = best_move(&board, 4);
        assert_eq!(board, before);
    }

    // --- Pruning ---

    #[test]
    fn pruning_matches_plain_minimax_on_empty_board() {
        let board = Board::new();
        let mut pruned = Searcher::new();
        let mut plain = Searcher::without_pruning();

        let a = pruned.search(&board, 3, NEG_INFINITY, INFINITY, true);
        let b = plain.search(&board, 3, NEG_INFINITY, INFINITY, true);
        assert_eq!(a, b);
        assert_eq!(a, SearchResult { column: Some(3), score: 8 });

        assert_eq!(plain.stats().cutoffs, 0);
        assert!(pruned.stats().nodes < plain.stats().nodes);
    }

    #[test]
    fn pruning_matches_plain_minimax_mid_game() {
        let mut rng = RandomAgent::seeded(42);
        let mut state = GameState::initial();
        for ply in 0..12 {
            if state.is_terminal() {
                break;
            }
            for depth in 1..=4 {
                for maximizing in [true, false] {
                    let board = state.board();
                    let a = Searcher::new()
                        .search(board, depth, NEG_INFINITY, INFINITY, maximizing);
                    let b = Searcher::without_pruning()
                        .search(board, depth, NEG_INFINITY, INFINITY, maximizing);
                    assert_eq!(a, b, "ply {ply} depth {depth} maximizing {maximizing}");
                }
            }
            let col = rng.select_action(&state).unwrap();
            state.apply_move_mut(col).unwrap();
        }
    }

    // --- Iterative deepening ---

    #[test]
    fn iterative_deepening_with_ample_budget_matches_fixed_depth() {
        let board = Board::new();
        let result = iterative_deepening(&board, 4, Duration::from_secs(600));
        assert_eq!(result, best_move(&board, 4));
    }

    #[test]
    fn iterative_deepening_always_completes_first_ply() {
        let board = Board::new();
        let result = iterative_deepening(&board, 6, Duration::ZERO);
        assert_eq!(result, best_move(&board, 1));
    }

    #[test]
    fn iterative_deepening_stops_on_decided_score() {
        let board = build(&[
            (2, Cell::Computer),
            (5, Cell::Human),
            (2, Cell::Computer),
            (5, Cell::Human),
            (2, Cell::Computer),
        ]);
        let result = iterative_deepening(&board, 8, Duration::from_secs(600));
        assert_eq!(result, SearchResult { column: Some(2), score: WIN_SCORE });
    }

    // --- Cancellation ---

    #[test]
    fn cancelled_search_stops_at_root() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut searcher = Searcher::new().with_cancel_flag(Arc::clone(&flag));
        let _ = searcher.search(&Board::new(), DEFAULT_DEPTH, NEG_INFINITY, INFINITY, true);
        assert_eq!(searcher.stats().nodes, 1);

        let mut deepening = Searcher::new().with_cancel_flag(flag);
        let _ = deepening.iterative_deepening(&Board::new(), 8, Duration::from_secs(600));
        assert_eq!(deepening.stats().nodes, 1);
    }

    #[test]
    fn unset_cancel_flag_changes_nothing() {
        let flag = Arc::new(AtomicBool::new(false));
        let agent = MinimaxAgent::new(3).with_cancel_flag(flag);
        assert_eq!(agent.analyze(&Board::new()), best_move(&Board::new(), 3));
    }

    // --- Agent ---

    #[test]
    fn agent_selects_legal_action() {
        let mut agent = MinimaxAgent::new(4);
        let state = GameState::new(Player::Computer);
        let action = agent.select_action(&state).unwrap();
        assert!(state.legal_actions().contains(&action));
    }

    #[test]
    fn agent_returns_none_when_game_over() {
        let mut agent = MinimaxAgent::default();
        let state = GameState::replay(Player::Human, &drawn_game()).unwrap();
        assert_eq!(agent.select_action(&state), None);
    }

    #[test]
    fn agent_with_zero_depth_still_moves() {
        let mut agent = MinimaxAgent::new(0);
        let state = GameState::new(Player::Computer);
        assert_eq!(agent.select_action(&state), Some(0));
    }

    #[test]
    fn name_is_minimax() {
        assert_eq!(MinimaxAgent::default().name(), "Minimax");
        assert_eq!(MinimaxAgent::default().depth(), DEFAULT_DEPTH);
    }

    #[test]
    fn beats_random_agent() {
        let games_per_side = 10;
        let mut wins = 0;

        for game in 0..games_per_side * 2 {
            let first = if game % 2 == 0 { Player::Computer } else { Player::Human };
            let mut minimax = MinimaxAgent::new(4);
            let mut random = RandomAgent::seeded(game as u64);
            let mut state = GameState::new(first);

            while let Some(player) = state.current_player() {
                let action = match player {
                    Player::Computer => minimax.select_action(&state),
                    Player::Human => random.select_action(&state),
                }
                .unwrap();
                state.apply_move_mut(action).unwrap();
            }

            if state.outcome() == Some(GameOutcome::Winner(Player::Computer)) {
                wins += 1;
            }
        }

        let total = games_per_side * 2;
        let win_rate = wins as f64 / total as f64;
        assert!(
            win_rate > 0.80,
            "Minimax should beat random >80% of the time, got {:.0}% ({wins}/{total})",
            win_rate * 100.0
        );
    }
}
