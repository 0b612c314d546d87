pub mod commands;

use clap::{Parser, Subcommand};

use crate::domain::TargetId;

#[derive(Parser)]
#[command(name = "chorus")]
#[command(about = "Send one prompt to multiple AI chat tabs and compare the answers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a prompt to the enabled targets
    Send {
        /// The prompt text
        prompt: String,

        /// Targets to send to (default: all)
        #[arg(short, long, value_delimiter = ',')]
        targets: Vec<TargetId>,

        /// Produce a comparison summary of the valid responses
        #[arg(short, long)]
        summarize: bool,
    },
    /// List supported targets and whether a matching tab is open
    Targets,
}
