use crate::config::cli::Args;
use crate::error::Result;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

pub(crate) mod cli;

pub struct Config {
    pub args: Args,
    pub http_client: Client,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(args.timeout_secs))
            .user_agent(concat!("gamebacklog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { args, http_client })
    }

    pub fn ensure_directories(&self) -> Result<()> {
        if !self.args.data_dir.exists() {
            std::fs::create_dir_all(&self.args.data_dir)?;
        }

        info!("Data dir {:?} exists", self.args.data_dir);
        Ok(())
    }
}
