use clap::Parser;
use meshscan::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Scan(cmd) => cmd.execute().await,
        Commands::Last(cmd) => cmd.execute(),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "meshscan=debug" } else { "meshscan=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_target(false)
        .init();
}
