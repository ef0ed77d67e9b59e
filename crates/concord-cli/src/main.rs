//! Concord command-line checker.
//!
//! # Usage
//!
//! ```bash
//! # Two participants at 0.5 each, accepted only when both confirm
//! concord
//!
//! # Three participants, two accepted outcomes, DOT export and simulation
//! concord --probabilities 0.9,0.5,0.2 --pattern 111 --pattern 110 \
//!     --dot round.dot --samples 10000 --seed 7
//! ```

use std::io::Write;

use clap::Parser;
use concord_cli::{RunConfig, analyze, parse_patterns, parse_probabilities};
use concord_core::ModelConfig;
use concord_harness::ExploreConfig;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Concord consensus round checker
#[derive(Parser, Debug)]
#[command(name = "concord")]
#[command(about = "Explore and analyse a probabilistic consensus round")]
#[command(version)]
struct Args {
    /// Number of participants (defaults to the number of probabilities)
    #[arg(short = 'n', long)]
    participants: Option<usize>,

    /// Comma-separated confirmation probability per participant
    #[arg(short, long, default_value = "0.5,0.5")]
    probabilities: String,

    /// Accepted outcome, e.g. "101" or "1,0,1" (repeatable; defaults to all
    /// participants confirming)
    #[arg(long = "pattern")]
    patterns: Vec<String>,

    /// Write the explored chain to this file as Graphviz DOT
    #[arg(long)]
    dot: Option<std::path::PathBuf>,

    /// Number of paths to simulate (0 disables simulation)
    #[arg(long, default_value = "0")]
    samples: usize,

    /// Simulation seed
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Maximum number of states to explore
    #[arg(long, default_value_t = concord_harness::DEFAULT_MAX_STATES)]
    max_states: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let probabilities = parse_probabilities(&args.probabilities)?;
    let participants = args.participants.unwrap_or(probabilities.len());
    let patterns = parse_patterns(&args.patterns, participants)?;

    let config = RunConfig {
        model: ModelConfig { participants, probabilities, patterns },
        explore: ExploreConfig { max_states: args.max_states },
        dot: args.dot,
        samples: args.samples,
        seed: args.seed,
        ..RunConfig::default()
    };

    let report = analyze(&config)?;

    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{report}")?;
    stdout.flush()?;

    Ok(())
}
