//! Hookwright CLI entry point.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use hookwright_core::log;
use hookwright_types::LogFormat;

mod cli;
mod commands;
mod ui;

use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = log::init(cli.log_level(), LogFormat::Pretty) {
        eprintln!("{} {}", "Warning:".yellow().bold(), e);
    }

    match cli.execute() {
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}
