use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use sous_gateway::{Config, Server};

/// Sous - voice cooking assistant gateway
#[derive(Parser)]
#[command(name = "sous", version, about)]
struct Cli {
    /// Port to listen on (overrides SOUS_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,sous_gateway=info",
        1 => "info,sous_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(port) = cli.port {
        config.port = port;
    }

    Server::new(config)?.run().await?;
    Ok(())
}
