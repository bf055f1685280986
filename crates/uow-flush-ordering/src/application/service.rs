//! Flush Ordering Service
//!
//! Main service implementing FlushOrderingApi.

use crate::algorithms::build_flush_order;
use crate::config::FlushConfig;
use crate::domain::entities::FlushOrder;
use crate::domain::errors::FlushError;
use crate::domain::registry::WorkRegistry;
use crate::ports::inbound::FlushOrderingApi;

use tracing::{error, info, warn};

/// Flush Ordering Service
///
/// Orchestrates one build:
/// 1. Validate registry size
/// 2. Run the flush stack builder
/// 3. Return the flush order
pub struct FlushOrderingService {
    config: FlushConfig,
}

impl FlushOrderingService {
    /// Create a new service with default config
    pub fn new() -> Self {
        Self {
            config: FlushConfig::default(),
        }
    }

    /// Create a new service with custom config
    pub fn with_config(config: FlushConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FlushConfig {
        &self.config
    }
}

impl Default for FlushOrderingService {
    fn default() -> Self {
        Self::new()
    }
}

impl FlushOrderingApi for FlushOrderingService {
    fn build_flush_order(&self, registry: &mut WorkRegistry) -> Result<FlushOrder, FlushError> {
        self.validate_registry(registry)?;

        info!(
            node_count = registry.len(),
            edge_count = registry.edge_count(),
            head_count = registry.heads().len(),
            "Building flush order"
        );

        let order = build_flush_order(registry).inspect_err(|e| {
            error!(error = %e, "[uow] Flush order build failed");
        })?;

        info!(
            instructions = order.len(),
            join_records = order.join_records().len(),
            "Flush order complete"
        );

        Ok(order)
    }

    fn validate_registry(&self, registry: &WorkRegistry) -> Result<(), FlushError> {
        if registry.len() > self.config.max_node_count {
            warn!(
                count = registry.len(),
                max = self.config.max_node_count,
                "Node limit exceeded"
            );
            return Err(FlushError::TooManyNodes {
                count: registry.len(),
                max: self.config.max_node_count,
            });
        }

        if registry.edge_count() > self.config.max_edge_count {
            warn!(
                count = registry.edge_count(),
                max = self.config.max_edge_count,
                "Edge limit exceeded"
            );
            return Err(FlushError::TooManyEdges {
                count: registry.edge_count(),
                max: self.config.max_edge_count,
            });
        }

        Ok(())
    }
}
