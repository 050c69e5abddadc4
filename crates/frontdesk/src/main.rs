mod cli;
mod config;
mod export;
mod log;
mod logging;
mod show;
mod update;

use anyhow::Result;
use clap::Parser;

use crate::cli::{Cli, Command};
use crate::config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().with_overrides(cli.ledger, cli.routing, cli.sheet);
    logging::init(cli.verbose || config.verbose);
    match cli.command {
        Command::Log { action, record } => log::run(&config, action, record),
        Command::Update {
            action,
            search,
            updates,
        } => update::run(&config, action, search, updates),
        Command::Show { worksheet } => show::run(&config, worksheet),
        Command::Export { worksheet, output } => export::run(&config, worksheet, output),
    }
}
