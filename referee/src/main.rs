use std::path::PathBuf;
use std::time::Instant;

use arena::{GameConfig, GameSession};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use referee::{serve, Recorder};
use tracing::info;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
struct Args {
    /// Path to the game configuration JSON file
    config: PathBuf,

    /// RNG seed for the external object ids
    #[arg(long)]
    seed: Option<u64>,

    /// Record each match's requests and responses as JSON files into this directory
    #[arg(short, long)]
    record_matches_to_directory: Option<PathBuf>,

    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    initialize_logging(args.log_level);

    // Get a random seed
    let seed = args.seed.unwrap_or_else(rand::random);
    info!(seed);
    let rng = StdRng::seed_from_u64(seed);

    let mut recorder = if let Some(dir_path) = args.record_matches_to_directory {
        Some(Recorder::new(dir_path)?)
    } else {
        None
    };

    let config = GameConfig::load(&args.config)?;
    let mut session = GameSession::new(config, rng, Instant::now())?;

    // Requests come in on stdin and responses go out on stdout,
    // so logging has to use stderr.
    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout().lock();
    serve(&mut session, stdin, stdout, &mut recorder, Instant::now)
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
