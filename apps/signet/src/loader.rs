//! # File Loaders
//!
//! Every file the tool reads or writes goes through here. Parsing itself is
//! done by the pure constructors in signet-core.

use crate::config::ResourceFormat;
use signet_core::{
    Graph, History, HistoryRecord, NetworkError, SerializableGraph, StaticOntology,
    TableResource, TableTranslator, history_from_bytes, history_to_bytes, primitives,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size for interaction, term and mapping tables (100 MB).
pub const MAX_TABLE_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Maximum size for saved networks and histories (500 MB).
pub const MAX_STATE_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Maximum size for `signet.toml` (1 MB).
pub const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Resolve `path` and require a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, NetworkError> {
    let canonical = path.canonicalize().map_err(|e| {
        NetworkError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(NetworkError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), NetworkError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| NetworkError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(NetworkError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Read a whole file after path and size validation.
pub fn read_bytes(path: &Path, max_size: u64) -> Result<Vec<u8>, NetworkError> {
    let validated = validate_file_path(path)?;
    validate_file_size(&validated, max_size)?;
    std::fs::read(&validated)
        .map_err(|e| NetworkError::IoError(format!("Read '{}': {}", path.display(), e)))
}

/// Read a UTF-8 text file after path and size validation.
pub fn read_text(path: &Path, max_size: u64) -> Result<String, NetworkError> {
    let bytes = read_bytes(path, max_size)?;
    String::from_utf8(bytes).map_err(|e| {
        NetworkError::DeserializationError(format!("'{}' is not UTF-8: {}", path.display(), e))
    })
}

fn write_bytes(path: &Path, data: &[u8]) -> Result<(), NetworkError> {
    std::fs::write(path, data)
        .map_err(|e| NetworkError::IoError(format!("Write '{}': {}", path.display(), e)))
}

// =============================================================================
// COLLABORATORS
// =============================================================================

/// Load an interaction table.
pub fn load_resource(path: &Path, format: ResourceFormat) -> Result<TableResource, NetworkError> {
    let text = read_text(path, MAX_TABLE_FILE_SIZE)?;
    let table = match format {
        ResourceFormat::Tsv => TableResource::from_tsv(&text)?,
        ResourceFormat::Sif => TableResource::from_sif(&text)?,
    };
    tracing::info!(
        "Loaded {} interactions from {:?} ({:?})",
        table.len(),
        path,
        format
    );
    Ok(table)
}

/// Load a term table.
pub fn load_ontology(path: &Path) -> Result<StaticOntology, NetworkError> {
    let text = read_text(path, MAX_TABLE_FILE_SIZE)?;
    StaticOntology::from_tsv(&text)
}

/// Load an identifier mapping table.
pub fn load_translator(path: &Path) -> Result<TableTranslator, NetworkError> {
    let text = read_text(path, MAX_TABLE_FILE_SIZE)?;
    TableTranslator::from_tsv(&text)
}

// =============================================================================
// NETWORKS
// =============================================================================

/// Read a network saved as JSON.
pub fn load_network(path: &Path) -> Result<Graph, NetworkError> {
    let data = read_bytes(path, MAX_STATE_FILE_SIZE)?;
    let serializable: SerializableGraph = serde_json::from_slice(&data).map_err(|e| {
        NetworkError::DeserializationError(format!("Invalid network '{}': {}", path.display(), e))
    })?;
    Graph::try_from(serializable)
}

/// Write a network as pretty JSON.
pub fn save_network(graph: &Graph, path: &Path) -> Result<(), NetworkError> {
    let json = serde_json::to_vec_pretty(&SerializableGraph::from(graph))
        .map_err(|e| NetworkError::SerializationError(e.to_string()))?;
    write_bytes(path, &json)
}

// =============================================================================
// HISTORIES
// =============================================================================

/// Binary histories are written when the path ends in `.sgnt`.
fn is_binary_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("sgnt"))
}

/// Read a history tree, binary or JSON, detected by the magic bytes.
pub fn load_history(path: &Path) -> Result<History, NetworkError> {
    let data = read_bytes(path, MAX_STATE_FILE_SIZE)?;
    if data.starts_with(primitives::MAGIC_BYTES) {
        return history_from_bytes(&data);
    }
    let record: HistoryRecord = serde_json::from_slice(&data).map_err(|e| {
        NetworkError::DeserializationError(format!("Invalid history '{}': {}", path.display(), e))
    })?;
    History::from_record(record)
}

/// Write a history tree; binary for `.sgnt` paths, JSON otherwise.
pub fn save_history(history: &History, path: &Path) -> Result<(), NetworkError> {
    let data = if is_binary_path(path) {
        history_to_bytes(history)?
    } else {
        serde_json::to_vec_pretty(&history.to_record())
            .map_err(|e| NetworkError::SerializationError(e.to_string()))?
    };
    write_bytes(path, &data)
}
