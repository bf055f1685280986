//! Configuration for flush ordering

use serde::{Deserialize, Serialize};
use std::env;

/// Flush configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlushConfig {
    /// Maximum tracked nodes per build
    pub max_node_count: usize,
    /// Maximum edges per build
    pub max_edge_count: usize,
    /// Instructions per executor batch (0 = whole order in one batch)
    pub batch_size: usize,
    /// Skip instructions for nodes without pending changes when draining
    pub skip_clean: bool,
}

impl Default for FlushConfig {
    fn default() -> Self {
        Self {
            max_node_count: 100_000,
            max_edge_count: 1_000_000,
            batch_size: 0,
            skip_clean: true,
        }
    }
}

impl FlushConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `UOW_MAX_NODES`: Node limit (default: 100000)
    /// - `UOW_MAX_EDGES`: Edge limit (default: 1000000)
    /// - `UOW_BATCH_SIZE`: Executor batch size, 0 for unbounded (default: 0)
    /// - `UOW_SKIP_CLEAN`: Skip clean instructions (default: true)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_node_count: parse_var("UOW_MAX_NODES").unwrap_or(defaults.max_node_count),
            max_edge_count: parse_var("UOW_MAX_EDGES").unwrap_or(defaults.max_edge_count),
            batch_size: parse_var("UOW_BATCH_SIZE").unwrap_or(defaults.batch_size),
            skip_clean: env::var("UOW_SKIP_CLEAN")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.skip_clean),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
