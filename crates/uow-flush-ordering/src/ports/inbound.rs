//! Inbound Ports (Driving Ports / API)

use crate::domain::entities::FlushOrder;
use crate::domain::errors::FlushError;
use crate::domain::registry::WorkRegistry;

/// Primary flush ordering API
pub trait FlushOrderingApi: Send + Sync {
    /// Build the flush order for one flush.
    ///
    /// This is the main entry point. It:
    /// 1. Checks the registry against configured limits
    /// 2. Resets traversal marks
    /// 3. Traverses from every head node in registration order
    /// 4. Returns the complete order, or an error and no order at all
    fn build_flush_order(&self, registry: &mut WorkRegistry) -> Result<FlushOrder, FlushError>;

    /// Check a registry against configured limits without building.
    fn validate_registry(&self, registry: &WorkRegistry) -> Result<(), FlushError>;
}
