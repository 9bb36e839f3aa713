use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sparring_engine::{Engine, EngineOptions, StrategyKind};
use sparring_uci::UciEngine;

#[derive(Parser, Debug)]
#[command(author, version, about = "Weak, deterministic UCI sparring engines", long_about = None)]
struct Args {
    /// Evaluation strategy: material, bishop-pair, positional, capture, coverage or random
    #[arg(short, long, default_value_t = StrategyKind::Material)]
    strategy: StrategyKind,

    /// Maximum iterative-deepening depth
    #[arg(short, long, default_value_t = i64::from(EngineOptions::DEFAULT_MAX_DEPTH))]
    depth: i64,

    /// Transposition table size in MiB
    #[arg(long, default_value_t = EngineOptions::DEFAULT_HASH_MB as i64)]
    hash: i64,

    /// Null-move depth reduction
    #[arg(long, default_value_t = i64::from(EngineOptions::DEFAULT_NULL_MOVE_REDUCTION))]
    null_move_reduction: i64,

    /// Largest exchange loss, in points, the capture strategy still rewards
    #[arg(long, default_value_t = i64::from(EngineOptions::DEFAULT_SEE_MAX_LOSS))]
    see_max_loss: i64,

    /// Seed for the random strategy
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the protocol; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let options = EngineOptions::default()
        .with_max_depth(args.depth)
        .with_hash_mb(args.hash)
        .with_null_move_reduction(args.null_move_reduction)
        .with_see_max_loss(args.see_max_loss)
        .with_seed(args.seed);

    info!(strategy = %args.strategy, ?options, "sparring starting");
    let engine = Engine::new(args.strategy, options);
    UciEngine::new(engine).run()?;
    Ok(())
}
