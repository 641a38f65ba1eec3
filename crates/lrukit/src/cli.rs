use clap::{Parser, Subcommand};
use lrukit_core::CacheVariant;
use lrukit_core::config::LogFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lrukit")]
#[command(about = "Run and cross-check fixed-capacity LRU cache variants")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to an lrukit.toml config file
    #[arg(long, short = 'c', global = true, env = "LRUKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "LRUKIT_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log output format on stderr (pretty, json)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the built-in capacity walkthrough on both variants
    Demo {
        /// Maximum resident entries (overrides the config file)
        #[arg(long, short = 'n')]
        capacity: Option<usize>,
    },

    /// Run an operation script on one variant
    Replay {
        /// Script file: JSON array or one `get <k>` / `put <k> <v>` per line
        #[arg(long, short = 's')]
        script: PathBuf,

        /// Maximum resident entries (overrides the config file)
        #[arg(long, short = 'n')]
        capacity: Option<usize>,

        /// Cache variant (linked, arena)
        #[arg(long)]
        variant: Option<CacheVariant>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run an operation script on both variants and compare every result
    Diff {
        /// Script file: JSON array or one `get <k>` / `put <k> <v>` per line
        #[arg(long, short = 's')]
        script: PathBuf,

        /// Maximum resident entries (overrides the config file)
        #[arg(long, short = 'n')]
        capacity: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
