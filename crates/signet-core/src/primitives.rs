//! # Engine Primitives
//!
//! Hardcoded runtime constants for the Signet CORE.
//!
//! These values are compiled into the binary and are immutable at runtime.
//! Tunables a caller may legitimately change live in `EngineConfig` instead.

/// Default maximum path length (in hops) for connection requests.
pub const DEFAULT_MAX_LEN: usize = 2;

/// Radial expansion beyond this depth is explosive around hub nodes
/// and triggers a warning.
pub const RADIAL_SAFE_DEPTH: usize = 2;

/// Deepest upstream level tried when connecting outputs topologically.
pub const ATOPO_MAX_DEPTH: usize = 4;

/// Evidence count from which an interaction counts as high-confidence
/// even when it is not flagged as curated.
pub const HIGH_CONFIDENCE_THRESHOLD: u32 = 3;

/// Magic bytes for the Signet binary format header.
///
/// - File Header = Magic Bytes ("SGNT") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"SGNT";

/// Current serialization format version.
///
/// Increment this when making breaking changes to the serialization format.
pub const FORMAT_VERSION: u8 = 1;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length of an accession in bytes.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Maximum size of a persisted payload (256 MB).
///
/// Larger payloads are rejected before deserialization.
pub const MAX_PAYLOAD_SIZE: usize = 256 * 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_length_is_radially_safe() {
        const { assert!(DEFAULT_MAX_LEN <= RADIAL_SAFE_DEPTH) };
    }

    #[test]
    fn magic_bytes_are_ascii() {
        assert!(MAGIC_BYTES.iter().all(u8::is_ascii_uppercase));
    }
}
