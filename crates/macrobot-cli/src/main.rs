//! Macrobot binary entry point.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use macrobot_discord_runtime::{run_bot, MacroBotConfig};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

mod config;

use config::Settings;

#[derive(Debug, Parser)]
#[command(name = "macrobot", about = "Macro summoning bot for Discord communities")]
struct Cli {
    /// Path to the settings file.
    #[arg(long, default_value = "macrobot.toml")]
    config: PathBuf,

    /// Run against the [dev] settings profile.
    #[arg(long)]
    dev: bool,

    /// Bot token override.
    #[arg(long, env = "MACROBOT_TOKEN")]
    token: Option<String>,
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings = Settings::load(&cli.config)?;
    let token = match cli.token {
        Some(token) => token,
        None => settings.profile(cli.dev)?.token.clone(),
    };

    run_bot(MacroBotConfig {
        token,
        cache: settings.cache_config(),
    })
    .await
}
