//! Error types for flush ordering

use super::value_objects::{EntityId, EntityType, RelationKind};
use thiserror::Error;

/// All errors that can occur while tracking a unit of work or building its flush order.
///
/// Every variant is a structural defect of the graph, its metadata, or the
/// collaborator that drained it. None of them is retried internally.
#[derive(Debug, Error)]
pub enum FlushError {
    /// Same identity registered with an incompatible type
    #[error("Identity conflict for {entity_id}: registered as {existing}, requested {requested}")]
    IdentityConflict {
        entity_id: EntityId,
        existing: EntityType,
        requested: EntityType,
    },

    /// Edge endpoint is not a registered node
    #[error("Dangling reference: {source_id} -> {target_id}")]
    DanglingReference {
        source_id: EntityId,
        target_id: EntityId,
    },

    /// Edge without ownership metadata
    #[error("Malformed relation {kind:?} {source_id} -> {target_id}: owning side unknown")]
    MalformedRelation {
        source_id: EntityId,
        target_id: EntityId,
        kind: RelationKind,
    },

    /// Identity not tracked by the registry
    #[error("Entity not found: {0}")]
    NotFound(EntityId),

    /// Registry exceeds configured node limit
    #[error("Node count exceeded: {count} > {max}")]
    TooManyNodes { count: usize, max: usize },

    /// Registry exceeds configured edge limit
    #[error("Edge count exceeded: {count} > {max}")]
    TooManyEdges { count: usize, max: usize },

    /// Executor or life-cycle hook failed while draining a flush order
    #[error("Flush execution failed at {entity_id}: {reason}")]
    ExecutionFailed { entity_id: EntityId, reason: String },
}

/// Failure reported by a [`FlushExecutor`](crate::FlushExecutor).
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Write rejected for {entity_id}: {reason}")]
    WriteRejected { entity_id: EntityId, reason: String },

    #[error("Delete rejected for {entity_id}: {reason}")]
    DeleteRejected { entity_id: EntityId, reason: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl ExecutorError {
    /// Entity the store rejected, when the failure is tied to one.
    pub fn entity_id(&self) -> Option<&EntityId> {
        match self {
            ExecutorError::WriteRejected { entity_id, .. }
            | ExecutorError::DeleteRejected { entity_id, .. } => Some(entity_id),
            ExecutorError::Unavailable(_) => None,
        }
    }
}

/// Failure reported by a [`LifecycleHooks`](crate::LifecycleHooks) callback.
#[derive(Debug, Error)]
#[error("Lifecycle hook failed: {0}")]
pub struct HookError(pub String);
