//! # Signet
//!
//! Command-line front end for the signet-core network construction engine.
//!
//! ## Usage
//!
//! ```bash
//! # Connect two seeds through a TSV interaction table
//! signet connect -r interactions.tsv -s P31749,Q9Y243 -o network.json
//!
//! # Compare two saved networks
//! signet compare first.json second.json
//!
//! # Render a saved history tree
//! signet history history.json --dot
//! ```

use clap::Parser;
use signet::cli;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "signet=info,signet_core=info";

/// Logs go to stderr so stdout stays clean for `--json-mode` output.
/// `SIGNET_LOG_FORMAT=json` switches to one JSON object per event.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("SIGNET_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn main() {
    init_tracing();

    if let Err(e) = cli::execute(cli::Cli::parse()) {
        tracing::error!(error = %e, "signet failed");
        std::process::exit(1);
    }
}
