//! Pinkdex CLI
//!
//! Command-line tools for maintaining a pinkdex catalog file.
//!
//! # Commands
//!
//! - `verify` - Parse every line and report the ones that fail
//! - `sort` - Rewrite the catalog in sort order
//! - `grep` - Search the catalog
//! - `stats` - Copy totals per shelfcode
//! - `shelve` - List one shelf in physical order
//! - `subtract` - Show what remains after removing another catalog's holdings

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Pinkdex catalog tools.
#[derive(Parser)]
#[command(name = "pinkdex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON shelfcode registry (`{"atomic": [...], "double": [...]}`)
    #[arg(global = true, short, long)]
    shelfcodes: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse every line and report the ones that fail
    Verify {
        /// Catalog file
        catalog: PathBuf,
    },

    /// Rewrite the catalog in sort order
    Sort {
        /// Catalog file
        catalog: PathBuf,

        /// Save even if some lines were rejected (they are dropped)
        #[arg(short, long)]
        force: bool,
    },

    /// Print matching lines in sort order
    Grep {
        /// Catalog file
        catalog: PathBuf,

        /// Pattern: `ANY` or `AUTHOR<TITLE<SERIES<CODE,CODE`
        pattern: String,
    },

    /// Copy totals per shelfcode
    Stats {
        /// Catalog file
        catalog: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List the lines on one shelf in physical order
    Shelve {
        /// Catalog file
        catalog: PathBuf,

        /// Shelfcode, with qualifier for double codes
        shelfcode: String,
    },

    /// Print what would remain after removing another catalog's holdings
    Subtract {
        /// Catalog file
        catalog: PathBuf,

        /// Catalog of holdings to remove
        other: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let registry = cli.shelfcodes.as_deref();
    match cli.command {
        Commands::Verify { catalog } => {
            let grammar = commands::load_grammar(registry)?;
            commands::verify::run(&catalog, &grammar)?;
        }
        Commands::Sort { catalog, force } => {
            let grammar = commands::load_grammar(registry)?;
            commands::sort::run(&catalog, &grammar, force)?;
        }
        Commands::Grep { catalog, pattern } => {
            let grammar = commands::load_grammar(registry)?;
            commands::grep::run(&catalog, &grammar, &pattern)?;
        }
        Commands::Stats { catalog, format } => {
            let grammar = commands::load_grammar(registry)?;
            commands::stats::run(&catalog, &grammar, &format)?;
        }
        Commands::Shelve { catalog, shelfcode } => {
            let grammar = commands::load_grammar(registry)?;
            commands::shelve::run(&catalog, &grammar, &shelfcode)?;
        }
        Commands::Subtract { catalog, other } => {
            let grammar = commands::load_grammar(registry)?;
            commands::subtract::run(&catalog, &other, &grammar)?;
        }
        Commands::Version => {
            println!("Pinkdex CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Pinkdex Core v{}", pinkdex_core::VERSION);
        }
    }

    Ok(())
}
