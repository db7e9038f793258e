//! CLI module - Command-line interface for the catalog server
//!
//! Every subcommand shares the loaded configuration; `serve` is the default.

mod commands;

use clap::{Parser, Subcommand};

/// Cinema Catalog - bilingual media catalog server
#[derive(Parser)]
#[command(name = "cinema-catalog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    #[command(alias = "daemon", alias = "web")]
    Serve,

    /// Print row counts for every expected table
    #[command(alias = "check")]
    CheckSchema,

    /// Clear the query cache of a running server
    ClearCache {
        /// Only clear keys containing this substring
        #[arg(long)]
        pattern: Option<String>,
        /// Server base URL
        #[arg(long)]
        url: Option<String>,
        /// Admin username (defaults to the configured admin)
        #[arg(long)]
        username: Option<String>,
        /// Admin password (defaults to ADMIN_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },

    /// Insert the default categories and genres
    Seed {
        /// Also add sample content when the catalog is empty
        #[arg(long)]
        demo: bool,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
