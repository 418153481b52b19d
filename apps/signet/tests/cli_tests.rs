//! Integration tests for the command implementations and file loaders.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use signet::cli::{ConnectArgs, HistoryAction, cmd_compare, cmd_connect, cmd_history};
use signet::config::ResourceFormat;
use signet::loader;
use signet_core::{Accession, Effect, NetworkError, SnapshotId};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const INTERACTIONS: &str = "\
source\ttarget\teffect\tconsensus\tcurated\tconfidence\ttype\treferences\tsource_tag
A\tC\tstimulation\ttrue\tfalse\t2\ttranscriptional\tPMID:1\ttest
C\tB\tinhibition\ttrue\ttrue\t4\tpost_translational\tPMID:2;PMID:3\ttest
B\tD\tstimulation\tfalse\tfalse\t1\t\t\ttest
";

const TERMS: &str = "GO:0008219\tcell death\tD\n";

fn acc(s: &str) -> Accession {
    Accession::parse(s).unwrap()
}

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn empty_config(dir: &TempDir) -> PathBuf {
    write(dir, "signet.toml", "")
}

fn connect_args(resource: &Path, seeds: &str) -> ConnectArgs {
    ConnectArgs {
        resource: Some(resource.to_path_buf()),
        seeds: seeds.to_string(),
        algorithm: "rpe".to_string(),
        rank: 1,
        ..ConnectArgs::default()
    }
}

// =============================================================================
// LOADERS
// =============================================================================

#[test]
fn tsv_resource_loads_all_columns() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "net.tsv", INTERACTIONS);

    let table = loader::load_resource(&path, ResourceFormat::Tsv).unwrap();
    assert_eq!(table.len(), 3);
    let curated = table
        .interactions()
        .find(|i| i.source == acc("C"))
        .unwrap();
    assert!(curated.curated);
    assert_eq!(curated.references.len(), 2);
}

#[test]
fn sif_resource_loads() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "net.sif", "A stimulation B C\nC inhibition B\n");

    let table = loader::load_resource(&path, ResourceFormat::from_path(&path)).unwrap();
    assert_eq!(table.len(), 3);
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = loader::load_network(&dir.path().join("absent.json"));
    assert!(matches!(result, Err(NetworkError::IoError(_))));
}

#[test]
fn malformed_network_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "bad.json",
        r#"{"nodes":[],"edges":[{"source":"A","target":"B","records":[]}]}"#,
    );
    assert!(loader::load_network(&path).is_err());
}

// =============================================================================
// CONNECT
// =============================================================================

#[test]
fn connect_writes_network_and_history() {
    let dir = TempDir::new().unwrap();
    let resource = write(&dir, "net.tsv", INTERACTIONS);
    let config = empty_config(&dir);
    let output = dir.path().join("network.json");
    let history = dir.path().join("history.json");

    let args = ConnectArgs {
        output: Some(output.clone()),
        history: Some(history.clone()),
        only_signed: true,
        ..connect_args(&resource, "A,B")
    };
    cmd_connect(Some(&config), true, &args).unwrap();

    let graph = loader::load_network(&output).unwrap();
    assert!(graph.contains_edge(&acc("A"), &acc("C")));
    assert_eq!(
        graph.edge(&acc("C"), &acc("B")).unwrap().primary_effect(),
        Effect::Inhibition
    );

    let history = loader::load_history(&history).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history.current().unwrap().graph(), &graph);
}

#[test]
fn connect_binary_history_roundtrip() {
    let dir = TempDir::new().unwrap();
    let resource = write(&dir, "net.tsv", INTERACTIONS);
    let config = empty_config(&dir);
    let history = dir.path().join("history.sgnt");

    let args = ConnectArgs {
        history: Some(history.clone()),
        algorithm: "ine".to_string(),
        ..connect_args(&resource, "C")
    };
    cmd_connect(Some(&config), true, &args).unwrap();

    let bytes = std::fs::read(&history).unwrap();
    assert!(bytes.starts_with(b"SGNT"));
    let history = loader::load_history(&history).unwrap();
    let graph = history.current().unwrap().graph();
    assert!(graph.contains_node(&acc("A")));
    assert!(graph.contains_node(&acc("D")));
}

#[test]
fn connect_with_compressed_phenotype() {
    let dir = TempDir::new().unwrap();
    let resource = write(&dir, "net.tsv", INTERACTIONS);
    let terms = write(&dir, "terms.tsv", TERMS);
    let config = empty_config(&dir);
    let output = dir.path().join("network.json");

    let args = ConnectArgs {
        output: Some(output.clone()),
        ontology: Some(terms),
        phenotype: Some("GO:0008219".to_string()),
        compress: true,
        ..connect_args(&resource, "A,B")
    };
    cmd_connect(Some(&config), true, &args).unwrap();

    let graph = loader::load_network(&output).unwrap();
    assert!(graph.contains_edge(&acc("B"), &acc("cell_death")));
    assert!(!graph.contains_node(&acc("D")));
}

#[test]
fn connect_uses_config_file() {
    let dir = TempDir::new().unwrap();
    let resource = write(&dir, "net.tsv", INTERACTIONS);
    let config = write(
        &dir,
        "signet.toml",
        &format!(
            "[engine]\nmax_len = 1\n\n[resource]\npath = {:?}\n",
            resource.to_string_lossy()
        ),
    );
    let output = dir.path().join("network.json");

    let args = ConnectArgs {
        resource: None,
        output: Some(output.clone()),
        ..connect_args(&resource, "A,B")
    };
    cmd_connect(Some(&config), true, &args).unwrap();

    // max_len = 1 cannot bridge A -> C -> B
    let graph = loader::load_network(&output).unwrap();
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn connect_without_known_seeds_fails() {
    let dir = TempDir::new().unwrap();
    let resource = write(&dir, "net.tsv", INTERACTIONS);
    let config = empty_config(&dir);

    let result = cmd_connect(Some(&config), true, &connect_args(&resource, "X,Y"));
    assert!(matches!(result, Err(NetworkError::InvalidSeed(_))));
}

#[test]
fn connect_without_resource_fails() {
    let dir = TempDir::new().unwrap();
    let config = empty_config(&dir);
    let args = ConnectArgs {
        seeds: "A".to_string(),
        algorithm: "rpe".to_string(),
        ..ConnectArgs::default()
    };

    let result = cmd_connect(Some(&config), true, &args);
    assert!(matches!(result, Err(NetworkError::MissingCollaborator(_))));
}

// =============================================================================
// COMPARE AND HISTORY
// =============================================================================

#[test]
fn compare_and_history_commands_run() {
    let dir = TempDir::new().unwrap();
    let resource = write(&dir, "net.tsv", INTERACTIONS);
    let config = empty_config(&dir);
    let first = dir.path().join("first.json");
    let second = dir.path().join("second.json");
    let history = dir.path().join("history.json");

    let args = ConnectArgs {
        output: Some(first.clone()),
        history: Some(history.clone()),
        ..connect_args(&resource, "A,B")
    };
    cmd_connect(Some(&config), true, &args).unwrap();
    let args = ConnectArgs {
        output: Some(second.clone()),
        algorithm: "ine".to_string(),
        ..connect_args(&resource, "B")
    };
    cmd_connect(Some(&config), true, &args).unwrap();

    cmd_compare(&first, &second, true).unwrap();
    cmd_history(&history, true, &HistoryAction::List).unwrap();
    cmd_history(&history, false, &HistoryAction::Dot).unwrap();
    cmd_history(
        &history,
        true,
        &HistoryAction::CompareStates(SnapshotId(0), SnapshotId(1)),
    )
    .unwrap();

    let root = dir.path().join("root.json");
    cmd_history(
        &history,
        true,
        &HistoryAction::Checkout {
            id: SnapshotId(0),
            output: Some(root.clone()),
        },
    )
    .unwrap();
    let graph = loader::load_network(&root).unwrap();
    assert_eq!(graph.edge_count(), 0);
    assert!(graph.contains_node(&acc("A")));

    let missing = cmd_history(
        &history,
        true,
        &HistoryAction::Checkout {
            id: SnapshotId(9),
            output: None,
        },
    );
    assert!(matches!(missing, Err(NetworkError::SnapshotNotFound(_))));
}
