//! Encore CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use encore_foundation::Result;
use encore_runtime::{ConfigOverrides, Repl, RuntimeConfig, print_error};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "encore")]
#[command(about = "Music performance archive with enforced key integrity", long_about = None)]
#[command(version)]
struct Args {
    /// Scripts to run before starting the REPL
    files: Vec<PathBuf>,

    /// Run the scripts and exit
    #[arg(short, long)]
    batch: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, env = "ENCORE_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long)]
    log: Option<String>,

    /// REPL prompt
    #[arg(long)]
    prompt: Option<String>,

    /// Skip the welcome banner
    #[arg(long)]
    no_banner: bool,

    /// File to keep REPL history in
    #[arg(long, env = "ENCORE_HISTORY")]
    history: Option<PathBuf>,

    /// Require explicit begin/commit around changes
    #[arg(long)]
    manual_commit: bool,

    /// Start with a small demonstration archive
    #[arg(long)]
    demo: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };
    let config = file_config.with_overrides(ConfigOverrides {
        log_filter: args.log,
        prompt: args.prompt,
        no_banner: args.no_banner,
        history_file: args.history,
        manual_commit: args.manual_commit,
        seed_demo: args.demo,
    });

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| config.log_filter.clone().into());
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
    info!(version = env!("CARGO_PKG_VERSION"), "starting encore");

    let mut repl = Repl::from_config(&config)?;

    for file in &args.files {
        if !repl.eval_file(file)? {
            return Ok(());
        }
    }

    if args.batch {
        return Ok(());
    }

    // Scripts already set the scene.
    if !args.files.is_empty() {
        repl = repl.without_banner();
    }

    repl.run()
}
