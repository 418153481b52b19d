//! # Persistence Format
//!
//! Binary serialization for Signet snapshots and history trees.
//!
//! File I/O operations are in the app layer.
//!
//! Format: Header (5 bytes) + postcard-serialized record.
//! - 4 bytes: Magic ("SGNT")
//! - 1 byte: Version
//!
//! Size and header are validated before the payload is parsed; structural
//! problems in a decoded record are reported as `MalformedSnapshot`.

use crate::history::{History, HistoryRecord};
use crate::primitives::{self, MAX_PAYLOAD_SIZE};
use crate::{Graph, NetworkError, SerializableGraph};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Header length in bytes.
const HEADER_SIZE: usize = 5;

// =============================================================================
// FILE HEADER
// =============================================================================

/// The persistence header precedes every payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl PersistenceHeader {
    /// Create a new header with current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), NetworkError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(NetworkError::DeserializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(NetworkError::DeserializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Write header to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let [a, b, c, d] = self.magic;
        [a, b, c, d, self.version]
    }

    /// Read header from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NetworkError> {
        match bytes {
            [a, b, c, d, version, ..] => Ok(Self {
                magic: [*a, *b, *c, *d],
                version: *version,
            }),
            _ => Err(NetworkError::DeserializationError(
                "Header too short".to_string(),
            )),
        }
    }
}

impl Default for PersistenceHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>, NetworkError> {
    let payload =
        postcard::to_stdvec(record).map_err(|e| NetworkError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_SIZE.saturating_add(payload.len()));
    result.extend_from_slice(&PersistenceHeader::new().to_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, NetworkError> {
    if bytes.len() > MAX_PAYLOAD_SIZE {
        return Err(NetworkError::DeserializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_PAYLOAD_SIZE
        )));
    }

    let header = PersistenceHeader::from_bytes(bytes)?;
    header.validate()?;

    let payload = bytes.get(HEADER_SIZE..).unwrap_or_default();
    postcard::from_bytes(payload).map_err(|e| {
        NetworkError::DeserializationError(format!("Failed to decode payload: {}", e))
    })
}

/// Serialize a graph snapshot to bytes (header + payload).
///
/// This is a pure transformation - no file I/O.
pub fn graph_to_bytes(graph: &Graph) -> Result<Vec<u8>, NetworkError> {
    encode(&SerializableGraph::from(graph))
}

/// Deserialize a graph snapshot from bytes.
///
/// This is a pure transformation - no file I/O.
pub fn graph_from_bytes(bytes: &[u8]) -> Result<Graph, NetworkError> {
    let serializable: SerializableGraph = decode(bytes)?;
    Graph::try_from(serializable)
}

/// Serialize a whole history tree to bytes.
pub fn history_to_bytes(history: &History) -> Result<Vec<u8>, NetworkError> {
    encode(&history.to_record())
}

/// Deserialize and validate a history tree.
pub fn history_from_bytes(bytes: &[u8]) -> Result<History, NetworkError> {
    let record: HistoryRecord = decode(bytes)?;
    History::from_record(record)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Cause;
    use crate::{Accession, Effect, EffectRecord, EndpointPolicy, SnapshotId};

    fn sample() -> Graph {
        let mut graph = Graph::new();
        let a = Accession::parse("P31749").expect("valid");
        let b = Accession::parse("Q9Y243").expect("valid");
        graph
            .add_edge(
                &a,
                &b,
                EffectRecord::new(Effect::Stimulation).with_reference("PMID:1"),
                EndpointPolicy::Create,
            )
            .expect("edge");
        graph
    }

    #[test]
    fn header_roundtrip() {
        let header = PersistenceHeader::new();
        let restored = PersistenceHeader::from_bytes(&header.to_bytes()).expect("parse header");

        assert_eq!(restored.magic, *primitives::MAGIC_BYTES);
        assert_eq!(restored.version, primitives::FORMAT_VERSION);
    }

    #[test]
    fn bytes_roundtrip_bit_exact() {
        let graph = sample();
        let bytes1 = graph_to_bytes(&graph).expect("first serialize");
        let restored = graph_from_bytes(&bytes1).expect("deserialize");
        let bytes2 = graph_to_bytes(&restored).expect("second serialize");

        assert_eq!(restored, graph);
        assert_eq!(
            bytes1, bytes2,
            "save -> load -> save must produce identical bytes"
        );
    }

    #[test]
    fn history_roundtrip() {
        let mut history = History::new(Cause::new("init"), &Graph::new());
        history.commit(Cause::new("add_edge"), &sample());
        history.undo().expect("undo");

        let restored = history_from_bytes(&history_to_bytes(&history).expect("encode"))
            .expect("decode");
        assert_eq!(restored.current_id(), SnapshotId(0));
        assert_eq!(restored.len(), 2);
        assert_eq!(
            restored.get(SnapshotId(1)).expect("snapshot").graph(),
            &sample()
        );
    }

    #[test]
    fn invalid_magic_rejected() {
        let mut bytes = graph_to_bytes(&sample()).expect("serialize");
        bytes[0] = b'X';
        assert!(matches!(
            graph_from_bytes(&bytes),
            Err(NetworkError::DeserializationError(_))
        ));
    }

    #[test]
    fn short_input_rejected() {
        assert!(graph_from_bytes(b"SGN").is_err());
    }
}
