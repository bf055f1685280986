//! Outbound Ports (Driven Ports / SPI)
//!
//! Collaborators the flush core consumes: the relationship metadata catalog,
//! the store executor, and the persistence context's life-cycle callbacks.

use crate::domain::entities::{FlushInstruction, JoinTableRecord};
use crate::domain::errors::{ExecutorError, HookError};
use crate::domain::value_objects::{EntityType, OwningSide, RelationKind};

/// Relationship metadata catalog
///
/// Answers which endpoint of a relationship stores the foreign key.
/// Ownership is independent of multiplicity, so the catalog is asked per
/// (kind, parent type, child type).
pub trait RelationMetadata {
    /// `None` when the catalog has no mapping for this relationship.
    fn owning_side_for(
        &self,
        relation_kind: RelationKind,
        types: (&EntityType, &EntityType),
    ) -> Option<OwningSide>;
}

/// Store executor
///
/// Performs the actual writes and deletes. May fail per instruction; the
/// flush core neither retries nor compensates.
pub trait FlushExecutor {
    /// Apply one batch of instructions, in slice order.
    fn execute_batch(&mut self, batch: &[FlushInstruction]) -> Result<(), ExecutorError>;

    /// Persist many-to-many join-table rows.
    fn persist_join_rows(&mut self, rows: &[JoinTableRecord]) -> Result<(), ExecutorError>;
}

/// Entity life-cycle callbacks (pre/post persist hooks)
///
/// Invoked around every instruction the drainer hands to the executor.
pub trait LifecycleHooks {
    fn pre_flush(&mut self, _instruction: &FlushInstruction) -> Result<(), HookError> {
        Ok(())
    }

    fn post_flush(&mut self, _instruction: &FlushInstruction) -> Result<(), HookError> {
        Ok(())
    }
}

/// Hooks that do nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl LifecycleHooks for NoopHooks {}
