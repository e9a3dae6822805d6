use anyhow::Context;
use clap::Parser;
use npstack::ga::{GaConfig, GaRunner};
use npstack::io::read_boxes;
use std::path::PathBuf;

/// Genetic-algorithm search for the tallest strictly-shrinking box stack.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Box list file: one `width height length` triple per line.
    boxes_file: PathBuf,

    /// Total stack constructions to spend; must be at least the population
    /// size (1000).
    solutions: u64,

    /// Random seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Build offspring sequentially instead of in parallel.
    #[arg(long)]
    sequential: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let boxes = read_boxes(&args.boxes_file)
        .with_context(|| format!("reading {}", args.boxes_file.display()))?;

    let mut config = GaConfig::default()
        .with_solution_budget(args.solutions)
        .with_parallel(!args.sequential);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    config.validate()?;

    let result = GaRunner::run(&boxes, &config)?;

    // Winning stack, top to bottom, with running total height.
    print!("{}", result.best);
    println!(
        "{} boxes, total height {}",
        result.best.len(),
        result.best_height
    );
    Ok(())
}
