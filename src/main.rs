use clap::Parser;
use kanban::cli::commands::Cli;
use kanban::cli::handlers;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `KANBAN_LOG=kanban=debug`
const LOG_ENV: &str = "KANBAN_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
