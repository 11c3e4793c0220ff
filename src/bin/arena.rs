use std::time::Instant;

use anyhow::{bail, Result};
use clap::Parser;
use log::info;

use connect_four::ai::{Agent, MinimaxAgent, RandomAgent, DEFAULT_DEPTH};
use connect_four::game::{GameOutcome, GameState, Player};

/// Pit the minimax computer against a uniformly random opponent.
#[derive(Parser)]
#[command(name = "arena", about = "Play minimax against a random agent")]
struct Cli {
    /// Number of games (first move alternates between sides)
    #[arg(long, default_value_t = 20)]
    games: usize,

    /// Minimax search depth in plies
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    depth: u32,

    /// Seed for the random agent
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Default)]
struct Tally {
    wins: usize,
    draws: usize,
    losses: usize,
}

fn play(
    minimax: &mut MinimaxAgent,
    random: &mut RandomAgent,
    first: Player,
) -> Result<(GameOutcome, usize)> {
    let mut state = GameState::new(first);
    let mut plies = 0;

    while let Some(player) = state.current_player() {
        let agent: &mut dyn Agent = match player {
            Player::Computer => &mut *minimax,
            Player::Human => &mut *random,
        };
        let Some(col) = agent.select_action(&state) else {
            bail!("{} had no move in a live game", agent.name());
        };
        state.apply_move_mut(col)?;
        plies += 1;
    }

    match state.outcome() {
        Some(outcome) => Ok((outcome, plies)),
        None => bail!("game stopped without an outcome"),
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut minimax = MinimaxAgent::new(cli.depth);
    let mut random = match cli.seed {
        Some(seed) => RandomAgent::seeded(seed),
        None => RandomAgent::new(),
    };

    let started = Instant::now();
    let mut tally = Tally::default();
    for game in 0..cli.games {
        let first = if game % 2 == 0 { Player::Computer } else { Player::Human };
        let (outcome, plies) = play(&mut minimax, &mut random, first)?;
        match outcome {
            GameOutcome::Winner(Player::Computer) => tally.wins += 1,
            GameOutcome::Winner(Player::Human) => tally.losses += 1,
            GameOutcome::Draw => tally.draws += 1,
        }
        info!("game {}: {:?} in {plies} plies ({} first)", game + 1, outcome, first.name());
    }

    println!(
        "Minimax (depth {}) vs Random over {} games: {} wins, {} draws, {} losses in {:.2?}",
        cli.depth,
        cli.games,
        tally.wins,
        tally.draws,
        tally.losses,
        started.elapsed()
    );
    Ok(())
}
