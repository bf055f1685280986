//! Unit of Work
//!
//! Persistence-context facade over one [`WorkRegistry`]. Tracks entities as
//! they are persisted, merged or removed, then builds and drains the flush
//! order on commit.

use super::drainer::{FlushDrainer, FlushReport};
use super::service::FlushOrderingService;
use crate::config::FlushConfig;
use crate::domain::entities::FlushOrder;
use crate::domain::errors::FlushError;
use crate::domain::registry::WorkRegistry;
use crate::domain::value_objects::{EntityType, LifecycleState, OwningSide, RelationKind};
use crate::ports::inbound::FlushOrderingApi;
use crate::ports::outbound::{FlushExecutor, LifecycleHooks, RelationMetadata};
use tracing::{debug, info};

pub struct UnitOfWork {
    registry: WorkRegistry,
    service: FlushOrderingService,
    drainer: FlushDrainer,
}

impl UnitOfWork {
    pub fn new() -> Self {
        Self::with_config(FlushConfig::default())
    }

    pub fn with_config(config: FlushConfig) -> Self {
        Self {
            registry: WorkRegistry::new(),
            service: FlushOrderingService::with_config(config.clone()),
            drainer: FlushDrainer::with_config(config),
        }
    }

    /// Track a new entity for insertion.
    pub fn persist(&mut self, entity_id: &str, entity_type: EntityType) -> Result<(), FlushError> {
        self.track(entity_id, entity_type, LifecycleState::New)
    }

    /// Track an existing entity for update.
    pub fn merge(&mut self, entity_id: &str, entity_type: EntityType) -> Result<(), FlushError> {
        self.track(entity_id, entity_type, LifecycleState::Managed)
    }

    /// Schedule an entity for deletion.
    pub fn remove(&mut self, entity_id: &str, entity_type: EntityType) -> Result<(), FlushError> {
        self.track(entity_id, entity_type, LifecycleState::Removed)
    }

    pub fn link(
        &mut self,
        parent: &str,
        child: &str,
        relation_kind: RelationKind,
        owning_side: Option<OwningSide>,
    ) -> Result<(), FlushError> {
        self.registry.link(parent, child, relation_kind, owning_side)
    }

    pub fn link_with_catalog(
        &mut self,
        parent: &str,
        child: &str,
        relation_kind: RelationKind,
        catalog: &dyn RelationMetadata,
    ) -> Result<(), FlushError> {
        self.registry
            .link_with_catalog(parent, child, relation_kind, catalog)
    }

    /// Build the flush order without draining it. The registry is kept.
    pub fn flush_order(&mut self) -> Result<FlushOrder, FlushError> {
        self.service.build_flush_order(&mut self.registry)
    }

    /// Build, drain and end the unit of work.
    ///
    /// The registry is cleared only on success; on failure it is left intact
    /// so the caller can inspect it or roll back.
    pub fn commit(
        &mut self,
        executor: &mut dyn FlushExecutor,
        hooks: &mut dyn LifecycleHooks,
    ) -> Result<FlushReport, FlushError> {
        let order = self.flush_order()?;
        let report = self.drainer.drain(order, executor, hooks)?;
        self.registry.clear();
        info!(written = report.written, deleted = report.deleted, "Unit of work committed");
        Ok(report)
    }

    /// Discard every tracked entity.
    pub fn rollback(&mut self) {
        debug!(tracked = self.registry.len(), "Unit of work rolled back");
        self.registry.clear();
    }

    pub fn registry(&self) -> &WorkRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut WorkRegistry {
        &mut self.registry
    }

    fn track(
        &mut self,
        entity_id: &str,
        entity_type: EntityType,
        state: LifecycleState,
    ) -> Result<(), FlushError> {
        self.registry.add_node(entity_id, entity_type, state)?;
        self.registry.mark_dirty(entity_id, true)?;
        self.registry.register_head(entity_id)
    }
}

impl Default for UnitOfWork {
    fn default() -> Self {
        Self::new()
    }
}
