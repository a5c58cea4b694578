use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "engine-tera",
    about = "Render Tera templates the way a build pipeline would",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a template file from the template root
    Render {
        /// Template path, relative to the root
        path: String,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Render a template given on the command line
    String {
        /// Template source
        template: String,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
pub struct CommonArgs {
    /// Template root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Options file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Set context values (can be repeated: -d key=value)
    #[arg(short, long = "data", value_name = "KEY=VALUE")]
    pub data: Vec<String>,

    /// Do not log render errors (they are still reported on exit)
    #[arg(long)]
    pub silent: bool,
}
