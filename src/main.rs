// Entrypoint for the CLI application.
// - Keeps `main` small: set up logging, build the client, dispatch.
// - Returns `anyhow::Result`; only start-up problems end up here, call
//   failures are reported by the UI itself.

use clap::{Parser, Subcommand};
use primes_cli::{ui, PrimesClient};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "primes-cli", about = "Client for the prime generation service")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Request 3 primes of 12 digits, wait and print them
    Quick,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    // Base url and timeout come from `PRIMES_API_URL` and
    // `PRIMES_HTTP_TIMEOUT_SECS`, see `config::ClientConfig::from_env`.
    let api = PrimesClient::from_env()?;

    match args.command {
        Some(Command::Quick) => ui::quick(&api)?,
        None => ui::main_menu(api)?,
    }
    Ok(())
}
