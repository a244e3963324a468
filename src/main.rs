use crate::app::App;
use crate::config::cli::Args;
use crate::config::Config;
use crate::error::{GameError, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod domain;
mod error;
mod infrastructure;
mod services;

async fn run(args: Args) -> Result<()> {
    let command = args.command.clone();
    let config = Config::from_args(args)?;
    config.ensure_directories()?;

    App::new(config).run(command).await
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args).await {
        eprintln!("error: {e}");
        match e {
            GameError::Auth(_) => eprintln!("Check your RAWG API key (`gamebacklog key set <KEY>`)."),
            GameError::Network(_) => {
                eprintln!("The RAWG service could not be reached, please try again.")
            }
            _ => {}
        }
        std::process::exit(1);
    }
}
