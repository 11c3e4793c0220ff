use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;

use connect_four::ai::{
    Score, Searcher, DEFAULT_DEPTH, INFINITY, LOSS_SCORE, NEG_INFINITY, WIN_SCORE,
};
use connect_four::game::{GameState, Player, COLS};

/// Search a position and report the minimax choice for the side to move.
#[derive(Parser)]
#[command(name = "analyze", about = "Analyze a Connect Four position")]
struct Cli {
    /// Moves played so far, one column digit per ply (e.g. "3344")
    #[arg(default_value = "")]
    moves: String,

    /// Who made the first move: human or computer
    #[arg(long, default_value = "human", value_parser = parse_player)]
    first: Player,

    /// Search depth in plies
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    depth: u32,

    /// Also run plain minimax and check it agrees with alpha-beta
    #[arg(long)]
    compare: bool,
}

fn parse_player(s: &str) -> Result<Player, String> {
    match s {
        "human" => Ok(Player::Human),
        "computer" => Ok(Player::Computer),
        other => Err(format!("unknown player '{other}' (expected 'human' or 'computer')")),
    }
}

fn parse_moves(text: &str) -> Result<Vec<usize>> {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| match c.to_digit(10) {
            Some(d) if (d as usize) < COLS => Ok(d as usize),
            _ => bail!("invalid column '{c}' (expected 0-{})", COLS - 1),
        })
        .collect()
}

fn describe(score: Score) -> String {
    if score >= WIN_SCORE {
        format!("computer wins ({score})")
    } else if score <= LOSS_SCORE {
        format!("human wins ({score})")
    } else {
        format!("{score}")
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let moves = parse_moves(&cli.moves)?;
    let state = GameState::replay(cli.first, &moves)
        .with_context(|| format!("replaying moves '{}'", cli.moves))?;

    println!("{}\n", state.board());

    let Some(to_move) = state.current_player() else {
        println!("Game over: {:?}", state.outcome());
        return Ok(());
    };
    let maximizing = to_move == Player::Computer;

    let started = Instant::now();
    let mut searcher = Searcher::new();
    let result = searcher.search(state.board(), cli.depth, NEG_INFINITY, INFINITY, maximizing);
    let elapsed = started.elapsed();
    let stats = searcher.stats();

    println!("To move:  {}", to_move.name());
    match result.column {
        Some(col) => println!("Best:     column {col}"),
        None => println!("Best:     (none, depth 0)"),
    }
    println!("Score:    {} (computer's perspective)", describe(result.score));
    println!(
        "Searched: {} nodes, {} cutoffs, depth {} in {:.2?}",
        stats.nodes, stats.cutoffs, cli.depth, elapsed
    );

    if cli.compare {
        let mut plain = Searcher::without_pruning();
        let reference = plain.search(state.board(), cli.depth, NEG_INFINITY, INFINITY, maximizing);
        println!(
            "Minimax:  column {:?}, score {}, {} nodes",
            reference.column,
            describe(reference.score),
            plain.stats().nodes
        );
        if reference != result {
            bail!("alpha-beta result {result:?} differs from plain minimax {reference:?}");
        }
        println!("Alpha-beta agrees with plain minimax.");
    }

    Ok(())
}
