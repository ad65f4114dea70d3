mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use p4act::{Config, WorkspaceContext};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "P4ACT_LOG";

fn main() {
    match run() {
        Ok(false) => {}
        Ok(true) => std::process::exit(1),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(1);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_tracing();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let ctx = match cli.cwd {
        Some(dir) => WorkspaceContext::from_folder(dir),
        None => WorkspaceContext::current_dir()?,
    };
    commands::run(cli.command, ctx, config).await
}
