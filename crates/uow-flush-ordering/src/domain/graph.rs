//! Entity Graph Model
//!
//! Node/edge representation of the in-memory object graph of one unit of work.
//! Linking never touches `state` or `dirty`; those belong to the surrounding
//! persistence context.

use super::entities::{Edge, Node};
use super::errors::FlushError;
use super::value_objects::{EntityId, EntityType, LifecycleState, OwningSide, RelationKind};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Entity graph keyed by identity.
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    nodes: HashMap<EntityId, Node>,
    edge_count: usize,
}

impl EntityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent upsert of a node.
    ///
    /// Re-registering an identity updates the state of the existing node and
    /// keeps its edges and dirty flag. Fails only when the identity is already
    /// tracked under a different type.
    pub fn add_node(
        &mut self,
        entity_id: impl Into<EntityId>,
        entity_type: EntityType,
        state: LifecycleState,
    ) -> Result<&Node, FlushError> {
        match self.nodes.entry(entity_id.into()) {
            Entry::Occupied(entry) => {
                let node = entry.into_mut();
                if node.entity_type != entity_type {
                    return Err(FlushError::IdentityConflict {
                        entity_id: node.entity_id.clone(),
                        existing: node.entity_type.clone(),
                        requested: entity_type,
                    });
                }
                node.state = state;
                Ok(&*node)
            }
            Entry::Vacant(entry) => {
                let id = entry.key().clone();
                Ok(&*entry.insert(Node::new(id, entity_type, state)))
            }
        }
    }

    /// Add a directed edge from `parent` to `child`.
    ///
    /// Linking the same edge twice is a no-op.
    pub fn link(
        &mut self,
        parent: &str,
        child: &str,
        relation_kind: RelationKind,
        owning_side: Option<OwningSide>,
    ) -> Result<(), FlushError> {
        let dangling = || FlushError::DanglingReference {
            source_id: EntityId::from(parent),
            target_id: EntityId::from(child),
        };

        if !self.nodes.contains_key(child) {
            return Err(dangling());
        }
        let node = self.nodes.get_mut(parent).ok_or_else(dangling)?;

        let edge = Edge::new(
            node.entity_id.clone(),
            EntityId::from(child),
            relation_kind,
            owning_side,
        );
        if node.children.contains(&edge) {
            return Ok(());
        }

        node.children.push(edge);
        self.edge_count += 1;
        Ok(())
    }

    /// Read-only view of a node's outgoing edges and the nodes they point to.
    pub fn children_of(&self, entity_id: &str) -> Result<Vec<(&Edge, &Node)>, FlushError> {
        let node = self
            .nodes
            .get(entity_id)
            .ok_or_else(|| FlushError::NotFound(EntityId::from(entity_id)))?;

        node.children
            .iter()
            .map(|edge| {
                let child = self.nodes.get(edge.target_id.as_str()).ok_or_else(|| {
                    FlushError::DanglingReference {
                        source_id: edge.source_id.clone(),
                        target_id: edge.target_id.clone(),
                    }
                })?;
                Ok((edge, child))
            })
            .collect()
    }

    pub fn get(&self, entity_id: &str) -> Option<&Node> {
        self.nodes.get(entity_id)
    }

    pub(crate) fn get_mut(&mut self, entity_id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(entity_id)
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.nodes.contains_key(entity_id)
    }

    /// Remove a node together with its outgoing edges.
    ///
    /// Inbound edges from other nodes are left in place.
    pub(crate) fn remove(&mut self, entity_id: &str) -> Option<Node> {
        let node = self.nodes.remove(entity_id)?;
        self.edge_count -= node.children.len();
        Some(node)
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.edge_count = 0;
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}
