mod input;
mod logging;
mod model;
mod pipeline;
mod report;
mod server;

#[cfg(test)]
#[path = "../tests/src_inline/fixtures.rs"]
mod fixtures;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::model::{ModelLoadError, load_model};
use crate::pipeline::AppContext;

#[derive(Debug, Parser)]
#[command(
    name = "kira-scdefg",
    version,
    about = "Interactive differential expression between groups of cell types"
)]
struct Cli {
    /// Default log level when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a model directory and serve the web front-end.
    Serve(ServeArgs),
}

#[derive(Debug, Clone, clap::Args)]
struct ServeArgs {
    /// Directory holding the expression matrix, obs.tsv and optional var.tsv / model.json.
    #[arg(long, default_value = "model")]
    model: PathBuf,

    #[arg(long, default_value = "127.0.0.1:5000")]
    bind: SocketAddr,
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Model(#[from] ModelLoadError),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log_level);
    if let Err(err) = run(cli) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), RunError> {
    match cli.command {
        Command::Serve(args) => serve(args),
    }
}

fn serve(args: ServeArgs) -> Result<(), RunError> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        model = %args.model.display(),
        "starting kira-scdefg"
    );
    let loaded = load_model(&args.model)?;
    let ctx = Arc::new(AppContext::from_loaded(loaded));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(server::serve(ctx, args.bind))?;
    Ok(())
}
