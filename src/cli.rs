use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Poll CoinMarketCap and upsert the top assets (default)
    Extract {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,

        /// Keep documents in memory instead of the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the trade streams the watch-list would subscribe to
    DepthTrade,
    /// Check the Telegram bot token with getMe
    TelegramCheck,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Extract {
            once: false,
            dry_run: false,
        })
    }
}
