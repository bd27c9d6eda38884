mod cli;
mod compare;
mod data;
mod run;

use anyhow::Result;
use clap::Parser;

use cli::Cli;

fn main() -> Result<()> {
    // Warnings (duplicate subject codes, missing subject info) should be
    // visible without RUST_LOG being set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    run::run(&cli)
}
