//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::ConnectArgs;
use crate::config::{AppConfig, ResourceFormat};
use crate::loader;
use signet_core::{
    Algorithm, BiasPriority, Comparison, ComponentMode, ConnectionReport, EngineConfig, Graph,
    History, Membership, Network, NetworkError, PhenotypeRequest, RadialDirection, SearchMode,
    SnapshotId, compare,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

// =============================================================================
// ARGUMENT PARSING
// =============================================================================

fn invalid_argument(name: &str, value: &str, expected: &str) -> NetworkError {
    NetworkError::DeserializationError(format!(
        "Invalid {} '{}' (expected {})",
        name, value, expected
    ))
}

/// Parse an algorithm name.
pub fn parse_algorithm(value: &str) -> Result<Algorithm, NetworkError> {
    match value.to_ascii_lowercase().as_str() {
        "rpe" => Ok(Algorithm::Rpe),
        "ine" => Ok(Algorithm::Ine),
        _ => Err(invalid_argument("algorithm", value, "rpe or ine")),
    }
}

fn parse_search_mode(value: &str) -> Result<SearchMode, NetworkError> {
    match value.to_ascii_lowercase().as_str() {
        "bfs" => Ok(SearchMode::Bfs),
        "dfs" => Ok(SearchMode::Dfs),
        _ => Err(invalid_argument("search mode", value, "bfs or dfs")),
    }
}

fn parse_bias_priority(value: &str) -> Result<BiasPriority, NetworkError> {
    match value.to_ascii_lowercase().as_str() {
        "consensus-first" => Ok(BiasPriority::ConsensusFirst),
        "confidence-first" => Ok(BiasPriority::ConfidenceFirst),
        _ => Err(invalid_argument(
            "bias priority",
            value,
            "consensus-first or confidence-first",
        )),
    }
}

fn parse_direction(value: &str) -> Result<RadialDirection, NetworkError> {
    match value.to_ascii_lowercase().as_str() {
        "out" => Ok(RadialDirection::Out),
        "in" => Ok(RadialDirection::In),
        "both" => Ok(RadialDirection::Both),
        _ => Err(invalid_argument("direction", value, "out, in or both")),
    }
}

/// Split a comma-separated identifier list, dropping empty entries.
#[must_use]
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Apply command-line overrides to the configured engine defaults.
pub fn engine_config(base: EngineConfig, args: &ConnectArgs) -> Result<EngineConfig, NetworkError> {
    let mut engine = base;
    if let Some(max_len) = args.max_len {
        engine.max_len = max_len;
    }
    if let Some(mode) = &args.search_mode {
        engine.search_mode = parse_search_mode(mode)?;
    }
    if let Some(priority) = &args.bias_priority {
        engine.bias_priority = parse_bias_priority(priority)?;
    }
    if let Some(direction) = &args.direction {
        engine.direction = parse_direction(direction)?;
    }
    if args.max_history.is_some() {
        engine.max_history = args.max_history;
    }
    engine.only_signed |= args.only_signed;
    engine.consensus |= args.consensus;
    engine.connect_with_bias |= args.bias;
    engine.loops |= args.loops;
    Ok(engine)
}

// =============================================================================
// CONNECT COMMAND
// =============================================================================

/// Build a network around seeds and run the requested connection steps.
pub fn cmd_connect(
    config_path: Option<&Path>,
    json_mode: bool,
    args: &ConnectArgs,
) -> Result<(), NetworkError> {
    let config = AppConfig::load(config_path)?;
    let engine = engine_config(config.engine, args)?;
    let algorithm = parse_algorithm(&args.algorithm)?;

    let resource_path = args
        .resource
        .clone()
        .or(config.resource.path)
        .ok_or_else(|| NetworkError::MissingCollaborator("interaction resource".to_string()))?;
    let format = match &args.format {
        Some(name) => ResourceFormat::parse(name)?,
        None => config
            .resource
            .format
            .unwrap_or_else(|| ResourceFormat::from_path(&resource_path)),
    };
    let resource = loader::load_resource(&resource_path, format)?;

    let mut builder = Network::builder(Arc::new(resource)).config(engine);
    if let Some(path) = args.translator.as_ref().or(config.resource.translator.as_ref()) {
        builder = builder.translator(Arc::new(loader::load_translator(path)?));
    }
    if let Some(path) = args.ontology.as_ref().or(config.resource.ontology.as_ref()) {
        builder = builder.ontology(Arc::new(loader::load_ontology(path)?));
    }

    let mut network = builder.seeds(split_list(&args.seeds)).build();
    for skipped in network.skipped_seeds() {
        tracing::warn!("Skipping seed {}: {}", skipped.identifier, skipped.reason);
    }
    if network.seeds().is_empty() {
        return Err(NetworkError::InvalidSeed(args.seeds.clone()));
    }

    let options = network.default_options();
    let mut steps: Vec<(&str, ConnectionReport)> = Vec::new();

    let report = match algorithm {
        Algorithm::Rpe => network.complete_connection(None, &options)?,
        Algorithm::Ine => network.connect_network_radially(&options)?,
    };
    steps.push(("connect", report));

    if args.components {
        let report = network.connect_component(algorithm, ComponentMode::All, &options)?;
        steps.push(("components", report));
    }
    if let Some(depth) = args.upstream {
        let report = network.connect_to_upstream_nodes(None, depth, args.rank, &options)?;
        steps.push(("upstream", report));
    }
    if let Some(term) = &args.phenotype {
        let mut request = PhenotypeRequest::new(term.clone()).with_max_len(options.max_len);
        if options.only_signed {
            request = request.signed_only();
        }
        if args.compress {
            request = request.compressed();
        }
        let report = network.connect_genes_to_phenotype(&request)?;
        steps.push(("phenotype", report));
    }
    if args.prune {
        let removed = network.remove_disconnected_nodes()?;
        tracing::info!("Removed {} disconnected nodes", removed);
    }

    if let Some(path) = &args.output {
        loader::save_network(network.graph(), path)?;
        tracing::info!("Network written to {:?}", path);
    }
    if let Some(path) = &args.history {
        loader::save_history(network.history(), path)?;
        tracing::info!("History written to {:?}", path);
    }

    if json_mode {
        let output = serde_json::json!({
            "nodes": network.graph().node_count(),
            "edges": network.graph().edge_count(),
            "connected": network.is_connected(),
            "snapshot": network.current_snapshot_id().0,
            "skipped_seeds": network.skipped_seeds(),
            "steps": steps
                .iter()
                .map(|(name, report)| serde_json::json!({ "step": name, "report": report }))
                .collect::<Vec<_>>(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Signet Network");
    println!("==============");
    println!("Seeds:     {}", network.seeds().len());
    println!("Nodes:     {}", network.graph().node_count());
    println!("Edges:     {}", network.graph().edge_count());
    println!("Connected: {}", network.is_connected());
    println!("Snapshot:  {}", network.current_snapshot_id());
    for (name, report) in &steps {
        println!(
            "  {:<10} paths={} unconnected={} +nodes={} +edges={}",
            name,
            report.paths.len(),
            report.unconnected.len(),
            report.nodes_added,
            report.edges_added
        );
    }
    if args.output.is_none() {
        println!();
        print_edges(network.graph());
    }

    Ok(())
}

fn print_edges(graph: &Graph) {
    for edge in graph.edges() {
        println!("{}\t{}\t{}", edge.source, edge.primary_effect(), edge.target);
    }
}

// =============================================================================
// COMPARE COMMAND
// =============================================================================

/// Compare two networks saved as JSON.
pub fn cmd_compare(first: &Path, second: &Path, json_mode: bool) -> Result<(), NetworkError> {
    let first = loader::load_network(first)?;
    let second = loader::load_network(second)?;
    print_comparison(&compare(&first, &second), json_mode);
    Ok(())
}

/// JSON view of a comparison; edge pairs are rendered `source->target`.
#[must_use]
pub fn comparison_json(comparison: &Comparison) -> serde_json::Value {
    let nodes = |m: Membership| -> Vec<String> {
        comparison
            .nodes_with(m)
            .into_iter()
            .map(ToString::to_string)
            .collect()
    };
    let pair = |(s, t): &(signet_core::Accession, signet_core::Accession)| format!("{}->{}", s, t);
    let edges = |m: Membership| -> Vec<String> {
        comparison.edges_with(m).into_iter().map(pair).collect()
    };

    serde_json::json!({
        "nodes": {
            "only_first": nodes(Membership::OnlyFirst),
            "only_second": nodes(Membership::OnlySecond),
            "common": nodes(Membership::Common),
        },
        "edges": {
            "only_first": edges(Membership::OnlyFirst),
            "only_second": edges(Membership::OnlySecond),
            "common": edges(Membership::Common),
        },
        "conflicts": comparison
            .conflicting_edges()
            .iter()
            .map(pair)
            .collect::<Vec<_>>(),
    })
}

fn print_comparison(comparison: &Comparison, json_mode: bool) {
    let json = comparison_json(comparison);
    if json_mode {
        println!("{}", serde_json::to_string_pretty(&json).unwrap_or_default());
        return;
    }

    println!("Network Comparison");
    println!("==================");
    for (section, key) in [("Nodes", "nodes"), ("Edges", "edges")] {
        println!("{}:", section);
        for membership in ["only_first", "only_second", "common"] {
            let items = json[key][membership]
                .as_array()
                .map(|a| {
                    a.iter()
                        .filter_map(|v| v.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                })
                .unwrap_or_default();
            println!("  {:<12} {}", membership, items);
        }
    }
    if !comparison.conflicting_edges().is_empty() {
        println!("Conflicting effects: {}", comparison.conflicting_edges().len());
    }
}

// =============================================================================
// HISTORY COMMAND
// =============================================================================

/// What `signet history` does with the loaded tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryAction {
    List,
    Dot,
    Checkout {
        id: SnapshotId,
        output: Option<PathBuf>,
    },
    CompareStates(SnapshotId, SnapshotId),
}

impl HistoryAction {
    /// Resolve mutually exclusive command-line flags.
    pub fn from_flags(
        dot: bool,
        checkout: Option<u64>,
        output: Option<PathBuf>,
        compare_states: Option<Vec<u64>>,
    ) -> Result<Self, NetworkError> {
        match (dot, checkout, compare_states) {
            (false, None, None) => Ok(Self::List),
            (true, None, None) => Ok(Self::Dot),
            (false, Some(id), None) => Ok(Self::Checkout {
                id: SnapshotId(id),
                output,
            }),
            (false, None, Some(ids)) => match ids.as_slice() {
                [first, second] => Ok(Self::CompareStates(SnapshotId(*first), SnapshotId(*second))),
                _ => Err(NetworkError::DeserializationError(
                    "--compare-states takes exactly two snapshot ids".to_string(),
                )),
            },
            _ => Err(NetworkError::DeserializationError(
                "--dot, --checkout and --compare-states are mutually exclusive".to_string(),
            )),
        }
    }
}

/// Inspect a saved history tree.
pub fn cmd_history(file: &Path, json_mode: bool, action: &HistoryAction) -> Result<(), NetworkError> {
    let mut history = loader::load_history(file)?;

    match action {
        HistoryAction::Dot => {
            print!("{}", history.to_dot());
        }
        HistoryAction::CompareStates(first, second) => {
            let comparison = compare(history.get(*first)?.graph(), history.get(*second)?.graph());
            print_comparison(&comparison, json_mode);
        }
        HistoryAction::Checkout { id, output } => {
            let graph = history.checkout(*id)?.clone();
            match output {
                Some(path) => {
                    loader::save_network(&graph, path)?;
                    tracing::info!("Snapshot {} written to {:?}", id, path);
                }
                None => print_edges(&graph),
            }
        }
        HistoryAction::List => print_states(&history, json_mode),
    }
    Ok(())
}

fn print_states(history: &History, json_mode: bool) {
    let states = history.list();
    if json_mode {
        let output = serde_json::json!({
            "root": history.root_id().0,
            "current": history.current_id().0,
            "states": states,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
        return;
    }

    println!("Signet History");
    println!("==============");
    for state in &states {
        let marker = if state.id == history.current_id() { "*" } else { " " };
        let parent = state
            .parent
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{} State {:<4} parent={:<4} nodes={:<5} edges={:<5} {}",
            marker, state.id, parent, state.node_count, state.edge_count, state.cause
        );
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_on_top_of_config() {
        let args = ConnectArgs {
            max_len: Some(4),
            search_mode: Some("dfs".to_string()),
            consensus: true,
            ..ConnectArgs::default()
        };
        let base = EngineConfig {
            only_signed: true,
            ..EngineConfig::default()
        };
        let engine = engine_config(base, &args).expect("overrides");

        assert_eq!(engine.max_len, 4);
        assert_eq!(engine.search_mode, SearchMode::Dfs);
        assert!(engine.consensus);
        assert!(engine.only_signed);
    }

    #[test]
    fn bad_enum_values_rejected() {
        assert!(parse_algorithm("astar").is_err());
        assert!(parse_bias_priority("both").is_err());
        assert!(parse_direction("sideways").is_err());
        assert_eq!(parse_algorithm("INE").expect("parse"), Algorithm::Ine);
    }

    #[test]
    fn list_splitting() {
        assert_eq!(split_list(" A, B,,C "), vec!["A", "B", "C"]);
    }

    #[test]
    fn history_flags_are_exclusive() {
        assert_eq!(
            HistoryAction::from_flags(false, None, None, None).expect("list"),
            HistoryAction::List
        );
        assert_eq!(
            HistoryAction::from_flags(false, None, None, Some(vec![0, 2])).expect("compare"),
            HistoryAction::CompareStates(SnapshotId(0), SnapshotId(2))
        );
        assert!(HistoryAction::from_flags(true, Some(1), None, None).is_err());
    }
}
