//! # Engine Configuration
//!
//! Defaults applied to connection requests and history retention.
//! Deserializable so the app can load it from a `[engine]` TOML table.

use crate::connect::{BiasPriority, ConnectOptions, RadialDirection, SearchMode};
use crate::primitives::DEFAULT_MAX_LEN;
use serde::{Deserialize, Serialize};

/// Engine-wide defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub max_len: usize,
    pub search_mode: SearchMode,
    pub only_signed: bool,
    pub consensus: bool,
    pub connect_with_bias: bool,
    pub bias_priority: BiasPriority,
    pub direction: RadialDirection,
    pub loops: bool,
    /// Maximum retained snapshots. `None` keeps everything.
    pub max_history: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_len: DEFAULT_MAX_LEN,
            search_mode: SearchMode::Bfs,
            only_signed: false,
            consensus: false,
            connect_with_bias: false,
            bias_priority: BiasPriority::ConsensusFirst,
            direction: RadialDirection::Both,
            loops: false,
            max_history: None,
        }
    }
}

impl EngineConfig {
    /// Connection options carrying these defaults.
    #[must_use]
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            max_len: self.max_len,
            search_mode: self.search_mode,
            only_signed: self.only_signed,
            consensus: self.consensus,
            connect_with_bias: self.connect_with_bias,
            bias_priority: self.bias_priority,
            direction: self.direction,
            loops: self.loops,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_connect_options() {
        assert_eq!(
            EngineConfig::default().connect_options(),
            ConnectOptions::default()
        );
        assert_eq!(EngineConfig::default().max_history, None);
    }
}
