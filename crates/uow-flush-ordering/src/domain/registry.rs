//! Work Registry
//!
//! Session-scoped cache of one unit of work: owns every node touched during
//! the unit of work and the ordered list of head nodes (traversal roots).
//! Created when the unit of work starts, cleared at commit or rollback.
//! Not synchronized; each unit of work owns its own registry.

use super::entities::{Edge, Node, TraversalMark};
use super::errors::FlushError;
use super::graph::EntityGraph;
use super::value_objects::{EntityId, EntityType, LifecycleState, OwningSide, RelationKind};
use crate::ports::outbound::RelationMetadata;

#[derive(Debug, Clone, Default)]
pub struct WorkRegistry {
    graph: EntityGraph,
    /// Traversal roots in registration order
    head_nodes: Vec<EntityId>,
}

impl WorkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// See [`EntityGraph::add_node`].
    pub fn add_node(
        &mut self,
        entity_id: impl Into<EntityId>,
        entity_type: EntityType,
        state: LifecycleState,
    ) -> Result<&Node, FlushError> {
        self.graph.add_node(entity_id, entity_type, state)
    }

    /// See [`EntityGraph::link`].
    pub fn link(
        &mut self,
        parent: &str,
        child: &str,
        relation_kind: RelationKind,
        owning_side: Option<OwningSide>,
    ) -> Result<(), FlushError> {
        self.graph.link(parent, child, relation_kind, owning_side)
    }

    /// Link two nodes, asking the metadata catalog which side owns the FK.
    ///
    /// An unanswered lookup is stored as unset and fails the next build.
    pub fn link_with_catalog(
        &mut self,
        parent: &str,
        child: &str,
        relation_kind: RelationKind,
        catalog: &dyn RelationMetadata,
    ) -> Result<(), FlushError> {
        let types = match (self.graph.get(parent), self.graph.get(child)) {
            (Some(p), Some(c)) => (p.entity_type().clone(), c.entity_type().clone()),
            _ => {
                return Err(FlushError::DanglingReference {
                    source_id: EntityId::from(parent),
                    target_id: EntityId::from(child),
                })
            }
        };

        let owning_side = catalog.owning_side_for(relation_kind, (&types.0, &types.1));
        self.graph.link(parent, child, relation_kind, owning_side)
    }

    /// See [`EntityGraph::children_of`].
    pub fn children_of(&self, entity_id: &str) -> Result<Vec<(&Edge, &Node)>, FlushError> {
        self.graph.children_of(entity_id)
    }

    /// Append a node to the head list, once.
    pub fn register_head(&mut self, entity_id: &str) -> Result<(), FlushError> {
        let node = self
            .graph
            .get(entity_id)
            .ok_or_else(|| FlushError::NotFound(EntityId::from(entity_id)))?;

        if !self.head_nodes.iter().any(|h| h.as_str() == entity_id) {
            self.head_nodes.push(node.entity_id().clone());
        }
        Ok(())
    }

    pub fn lookup(&self, entity_id: &str) -> Option<&Node> {
        self.graph.get(entity_id)
    }

    /// Set the life-cycle state of a tracked node (persistence context only).
    pub fn set_state(&mut self, entity_id: &str, state: LifecycleState) -> Result<(), FlushError> {
        self.node_mut(entity_id)?.state = state;
        Ok(())
    }

    /// Set the dirty flag of a tracked node (persistence context only).
    pub fn mark_dirty(&mut self, entity_id: &str, dirty: bool) -> Result<(), FlushError> {
        self.node_mut(entity_id)?.dirty = dirty;
        Ok(())
    }

    /// Stop tracking a node.
    ///
    /// Edges from other nodes that still point at it will fail the next build
    /// with `DanglingReference`.
    pub fn detach(&mut self, entity_id: &str) -> Option<Node> {
        self.head_nodes.retain(|h| h.as_str() != entity_id);
        self.graph.remove(entity_id)
    }

    /// Clear `visited` on every node. Called once at the start of each build.
    pub fn reset_traversal_marks(&mut self) {
        for node in self.graph.nodes_mut() {
            node.mark = TraversalMark::Unvisited;
        }
    }

    /// Drop all nodes and heads (end of the unit of work).
    pub fn clear(&mut self) {
        self.graph.clear();
        self.head_nodes.clear();
    }

    pub fn heads(&self) -> &[EntityId] {
        &self.head_nodes
    }

    pub fn graph(&self) -> &EntityGraph {
        &self.graph
    }

    pub(crate) fn graph_mut(&mut self) -> &mut EntityGraph {
        &mut self.graph
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    fn node_mut(&mut self, entity_id: &str) -> Result<&mut Node, FlushError> {
        self.graph
            .get_mut(entity_id)
            .ok_or_else(|| FlushError::NotFound(EntityId::from(entity_id)))
    }
}
