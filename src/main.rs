mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() -> miette::Result<()> {
    match Cli::parse().command {
        Commands::Render { path, common } => commands::render::run(path, common),
        Commands::String { template, common } => commands::string::run(template, common),
    }
}
