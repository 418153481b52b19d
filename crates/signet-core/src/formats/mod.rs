//! # Formats
//!
//! Binary encodings of graphs and history trees.

pub mod persistence;

pub use persistence::{
    PersistenceHeader, graph_from_bytes, graph_to_bytes, history_from_bytes, history_to_bytes,
};
