//! Command-line player and tooling for txtad games.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(
    name = "txtad",
    about = "txtad: play and check rule-driven text adventures",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log engine activity to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game interactively on stdin
    Play {
        /// Game directory containing settings.json and game_files/
        dir: PathBuf,

        /// User id (default: a random UUID)
        #[arg(short, long)]
        user: Option<String>,

        /// Maximum drain rounds per event
        #[arg(long, default_value = "64")]
        max_rounds: usize,
    },

    /// Load a game, verify its references and list its contexts
    Check {
        /// Game directory containing settings.json and game_files/
        dir: PathBuf,
    },

    /// Evaluate an expression
    Eval {
        /// Expression, e.g. "20+10*2" or "book:[bottle;book]"
        expression: String,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Play {
            dir,
            user,
            max_rounds,
        } => commands::play::run(&dir, user, max_rounds),
        Commands::Check { dir } => commands::check::run(&dir),
        Commands::Eval { expression } => commands::eval::run(&expression),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
