mod admission;
mod check;
mod cli;
mod handlers;
mod router;
mod startup;
mod state;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};

fn load_config() -> aegir_core::Config {
    aegir_core::config::load_dotenv();
    aegir_core::Config::from_env()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let mut config = load_config();

    match cli.command {
        Command::Server(args) => {
            args.apply(&mut config);
            config.validate()?;
            config.log_summary();

            if rustls::crypto::aws_lc_rs::default_provider()
                .install_default()
                .is_err()
            {
                anyhow::bail!("failed to install the TLS crypto provider");
            }

            let state = startup::build_state(&config)?;
            info!(version = env!("CARGO_PKG_VERSION"), "starting aegir");
            startup::serve(&config, state).await
        }
        Command::Check(args) => {
            let passed = check::run(&args, &config)?;
            if !passed {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}
