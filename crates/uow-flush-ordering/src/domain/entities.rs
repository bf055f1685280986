//! Core entities for flush ordering

use super::value_objects::{
    EntityId, EntityType, LifecycleState, OperationKind, OwningSide, RelationKind,
};
use serde::{Deserialize, Serialize};

/// Transient per-build traversal marker.
///
/// Reset to `Unvisited` at the start of every build; never carried across builds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TraversalMark {
    #[default]
    Unvisited,
    /// On the current traversal path, instruction not yet placed
    InProgress,
    /// Instruction placed in the flush order
    Placed,
}

/// Directed relationship link from a traversal parent to a child.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source_id: EntityId,
    pub target_id: EntityId,
    pub relation_kind: RelationKind,
    /// `None` when the metadata catalog could not tell; rejected at build time.
    pub owning_side: Option<OwningSide>,
}

impl Edge {
    pub fn new(
        source_id: EntityId,
        target_id: EntityId,
        relation_kind: RelationKind,
        owning_side: Option<OwningSide>,
    ) -> Self {
        Self {
            source_id,
            target_id,
            relation_kind,
            owning_side,
        }
    }

    /// Endpoint that must be committed first (the referenced side).
    pub fn referenced_id(&self) -> Option<&EntityId> {
        match self.owning_side? {
            OwningSide::Parent => Some(&self.target_id),
            OwningSide::Child => Some(&self.source_id),
        }
    }

    /// Endpoint that carries the foreign key (the referencing side).
    pub fn owner_id(&self) -> Option<&EntityId> {
        match self.owning_side? {
            OwningSide::Parent => Some(&self.source_id),
            OwningSide::Child => Some(&self.target_id),
        }
    }
}

/// One tracked entity instance for the lifetime of a unit of work.
#[derive(Clone, Debug)]
pub struct Node {
    pub(crate) entity_id: EntityId,
    pub(crate) entity_type: EntityType,
    pub(crate) state: LifecycleState,
    pub(crate) dirty: bool,
    pub(crate) mark: TraversalMark,
    /// Outgoing edges in insertion order
    pub(crate) children: Vec<Edge>,
}

impl Node {
    pub(crate) fn new(entity_id: EntityId, entity_type: EntityType, state: LifecycleState) -> Self {
        Self {
            entity_id,
            entity_type,
            state,
            dirty: false,
            mark: TraversalMark::Unvisited,
            children: Vec::new(),
        }
    }

    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// True once this node's instruction has been placed in the current build.
    pub fn is_visited(&self) -> bool {
        self.mark == TraversalMark::Placed
    }

    pub fn mark(&self) -> TraversalMark {
        self.mark
    }

    pub fn edges(&self) -> &[Edge] {
        &self.children
    }
}

/// A single commit instruction handed to the executor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushInstruction {
    pub entity_id: EntityId,
    pub entity_type: EntityType,
    pub operation: OperationKind,
    /// Pending changes exist; executors may skip clean instructions
    pub dirty: bool,
}

impl FlushInstruction {
    pub(crate) fn for_node(node: &Node) -> Self {
        Self {
            entity_id: node.entity_id.clone(),
            entity_type: node.entity_type.clone(),
            operation: node.state.operation(),
            dirty: node.dirty,
        }
    }
}

/// Join-table row for a many-to-many link.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinTableRecord {
    /// Owning endpoint (join column value)
    pub owner: EntityId,
    /// Inverse endpoint (inverse join column value)
    pub inverse: EntityId,
}

/// Ordered commit sequence for one flush.
///
/// Built once per flush, consumed once by the executor. There is no way to
/// mutate or extend an order after it has been built.
///
/// Executors consume it through `IntoIterator` or [`FlushOrder::into_parts`];
/// both take the order by value, and the order is not `Clone`, so a drained
/// order cannot be replayed. A new pass means a new build from the registry.
/// [`iter`](FlushOrder::iter) and [`position`](FlushOrder::position) are
/// read-only inspection before hand-off.
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushOrder {
    instructions: Vec<FlushInstruction>,
    join_records: Vec<JoinTableRecord>,
}

impl FlushOrder {
    pub(crate) fn new(
        instructions: Vec<FlushInstruction>,
        join_records: Vec<JoinTableRecord>,
    ) -> Self {
        Self {
            instructions,
            join_records,
        }
    }

    /// Number of instructions
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Borrowing view for inspection; does not consume the order.
    pub fn iter(&self) -> std::slice::Iter<'_, FlushInstruction> {
        self.instructions.iter()
    }

    /// Entity ids in commit order
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.instructions
            .iter()
            .map(|i| i.entity_id.clone())
            .collect()
    }

    /// Position of an entity in the order, if it was reached.
    pub fn position(&self, entity_id: &str) -> Option<usize> {
        self.instructions
            .iter()
            .position(|i| i.entity_id.as_str() == entity_id)
    }

    pub fn join_records(&self) -> &[JoinTableRecord] {
        &self.join_records
    }

    /// Split into instructions and join-table rows.
    pub fn into_parts(self) -> (Vec<FlushInstruction>, Vec<JoinTableRecord>) {
        (self.instructions, self.join_records)
    }
}

impl IntoIterator for FlushOrder {
    type Item = FlushInstruction;
    type IntoIter = std::vec::IntoIter<FlushInstruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.into_iter()
    }
}
