//! # Signet CLI Module
//!
//! ## Available Commands
//!
//! - `connect` - Build a network around seed identifiers
//! - `compare` - Compare two saved networks
//! - `history` - Inspect, render or check out a saved history tree

mod commands;

use clap::{Args, Parser, Subcommand};
use signet_core::NetworkError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Signet - signed interaction network builder
///
/// Grows a directed, signed molecular interaction network around seed
/// entities from an interaction table, keeping every step in a history tree.
#[derive(Parser, Debug)]
#[command(name = "signet")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./signet.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a network around seed identifiers
    Connect(ConnectArgs),

    /// Compare two networks saved as JSON
    Compare {
        /// First network file
        first: PathBuf,

        /// Second network file
        second: PathBuf,
    },

    /// Inspect a saved history tree (JSON or .sgnt)
    History {
        /// History file
        file: PathBuf,

        /// Print the tree as Graphviz DOT
        #[arg(long)]
        dot: bool,

        /// Snapshot to check out
        #[arg(long)]
        checkout: Option<u64>,

        /// Write the checked-out snapshot's network here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compare two snapshots
        #[arg(long, num_args = 2, value_names = ["FIRST", "SECOND"])]
        compare_states: Option<Vec<u64>>,
    },
}

/// Arguments of `signet connect`.
#[derive(Args, Debug, Default)]
pub struct ConnectArgs {
    /// Interaction table (overrides `[resource] path`)
    #[arg(short, long)]
    pub resource: Option<PathBuf>,

    /// Interaction table format (tsv, sif)
    #[arg(short = 't', long)]
    pub format: Option<String>,

    /// Seed identifiers (comma-separated)
    #[arg(short, long)]
    pub seeds: String,

    /// Connection algorithm (rpe, ine)
    #[arg(short, long, default_value = "rpe")]
    pub algorithm: String,

    /// Maximum path length in hops (radial rounds for ine)
    #[arg(short = 'l', long)]
    pub max_len: Option<usize>,

    /// Path search strategy (bfs, dfs)
    #[arg(long)]
    pub search_mode: Option<String>,

    /// Discard undefined and bimodal interactions
    #[arg(long)]
    pub only_signed: bool,

    /// Require the consensus marker
    #[arg(long)]
    pub consensus: bool,

    /// Prefer curated / high-confidence next hops
    #[arg(long)]
    pub bias: bool,

    /// Bias priority when bias and consensus are both set (consensus-first, confidence-first)
    #[arg(long)]
    pub bias_priority: Option<String>,

    /// Radial direction for ine (out, in, both)
    #[arg(long)]
    pub direction: Option<String>,

    /// Admit self-interactions
    #[arg(long)]
    pub loops: bool,

    /// Afterwards, connect disconnected components
    #[arg(long)]
    pub components: bool,

    /// Afterwards, collect upstream regulators this many levels deep
    #[arg(long)]
    pub upstream: Option<usize>,

    /// Regulators kept per upstream level
    #[arg(long, default_value = "1")]
    pub rank: usize,

    /// Term table for phenotype attachment (overrides `[resource] ontology`)
    #[arg(long)]
    pub ontology: Option<PathBuf>,

    /// Identifier mapping table (overrides `[resource] translator`)
    #[arg(long)]
    pub translator: Option<PathBuf>,

    /// Afterwards, attach the genes annotated with this term
    #[arg(long)]
    pub phenotype: Option<String>,

    /// Replace annotated genes with a single phenotype node
    #[arg(long)]
    pub compress: bool,

    /// Finally, remove nodes without edges (seeds are kept)
    #[arg(long)]
    pub prune: bool,

    /// Retained snapshots (overrides `[engine] max_history`)
    #[arg(long)]
    pub max_history: Option<usize>,

    /// Write the network as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the history tree (`.sgnt` for binary, JSON otherwise)
    #[arg(long)]
    pub history: Option<PathBuf>,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), NetworkError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Connect(args) => cmd_connect(cli.config.as_deref(), json_mode, &args),
        Commands::Compare { first, second } => cmd_compare(&first, &second, json_mode),
        Commands::History {
            file,
            dot,
            checkout,
            output,
            compare_states,
        } => cmd_history(
            &file,
            json_mode,
            &HistoryAction::from_flags(dot, checkout, output, compare_states)?,
        ),
    }
}
