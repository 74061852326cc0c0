use anyhow::{Context, Result};
use clap::Parser;
use monster_merge::config::GameConfig;
use monster_merge::game::Game;
use monster_merge::heuristics::StrategyType;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to a JSON board configuration (built-in 8x8 board if omitted)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Grid id within the configuration
    #[clap(short, long, default_value_t = 0)]
    grid: usize,

    /// Number of turns to play
    #[clap(short, long, default_value_t = 10)]
    turns: u32,

    /// Seed for board generation and refills
    #[clap(short, long, default_value_t = 514514)]
    seed: u64,

    /// Swap selection strategy
    #[clap(long, value_enum, default_value_t = StrategyType::HighOrderFirst)]
    strategy: StrategyType,

    /// Print near-match hints before every turn
    #[clap(long)]
    hints: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(GameConfig::default()),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = load_config(args.config.as_ref())?;
    let setup = config
        .board_setup(args.grid)
        .with_context(|| format!("Invalid grid {}", args.grid))?;
    let mut game = Game::new(&setup, args.seed).context("Failed to generate the initial board")?;

    println!("Initial board state (seed {}):\n{}\n", args.seed, game.board());
    println!("Playing {} turns with {}...\n", args.turns, args.strategy);

    for turn in 1..=args.turns {
        if args.hints {
            for candidate in game.hints() {
                println!(
                    "  Hint: {}{} at {:?} (weight {:.1})",
                    candidate.kind,
                    candidate.tier,
                    game.board().coords(candidate.index),
                    candidate.weight
                );
            }
            if let Some((position, partner)) = game.hint_swap() {
                println!(
                    "  Suggested swap: {:?} <-> {:?}",
                    game.board().coords(position),
                    game.board().coords(partner)
                );
            }
        }

        let outcome = game.play_turn(args.strategy);
        let Some(plan) = outcome.plan.filter(|_| outcome.applied) else {
            println!("Turn {}: no swap available.\n", turn);
            break;
        };
        println!(
            "Turn {}: swap {:?} <-> {:?} (effect {}), cascades: {}, synthesized: {}, removed: {}",
            turn,
            game.board().coords(plan.first),
            game.board().coords(plan.second),
            plan.effect,
            outcome.cascades,
            outcome.synthesized,
            outcome.removed
        );
        println!("{}\n", game.board());
    }

    println!("Turns played: {}", game.turns());
    println!("Ledger:");
    let records = game.ledger().records();
    if records.is_empty() {
        println!("  Nothing synthesized.");
    }
    for record in records {
        println!("  {}", record);
    }
    println!("Total: {}", game.ledger().total());
    Ok(())
}
