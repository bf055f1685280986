//! Domain invariants for flush ordering
//!
//! Checkers used by tests and debug assertions on built orders.

use super::entities::FlushOrder;
use super::registry::WorkRegistry;
use super::value_objects::EntityId;
use std::collections::{HashMap, HashSet};

/// INVARIANT-1: Exactly Once
/// No entity contributes more than one instruction.
pub fn invariant_exactly_once(order: &FlushOrder) -> bool {
    let mut seen = HashSet::new();
    order.iter().all(|i| seen.insert(i.entity_id.as_str()))
}

/// INVARIANT-2: Completeness
/// The order contains exactly the nodes reachable from the head nodes.
pub fn invariant_completeness(order: &FlushOrder, registry: &WorkRegistry) -> bool {
    let placed: HashSet<EntityId> = order.iter().map(|i| i.entity_id.clone()).collect();
    placed.len() == order.len() && placed == reachable_from_heads(registry)
}

/// INVARIANT-3: Dependency Order
/// For every reachable edge, the referenced side is placed before the owning side.
///
/// Only meaningful when the ownership relation is acyclic; a cycle of FK
/// owners has no order satisfying every edge.
pub fn invariant_dependency_order(order: &FlushOrder, registry: &WorkRegistry) -> bool {
    let positions: HashMap<&str, usize> = order
        .iter()
        .enumerate()
        .map(|(pos, i)| (i.entity_id.as_str(), pos))
        .collect();

    for node in registry.graph().nodes() {
        if !positions.contains_key(node.entity_id().as_str()) {
            continue;
        }
        for edge in node.edges() {
            let (Some(referenced), Some(owner)) = (edge.referenced_id(), edge.owner_id()) else {
                return false;
            };
            if referenced == owner {
                continue; // self-reference
            }
            match (positions.get(referenced.as_str()), positions.get(owner.as_str())) {
                (Some(r), Some(o)) if r < o => {}
                _ => return false,
            }
        }
    }

    true
}

/// Identities reachable from the head nodes, skipping dangling edges.
pub fn reachable_from_heads(registry: &WorkRegistry) -> HashSet<EntityId> {
    let mut reached = HashSet::new();
    let mut stack: Vec<&EntityId> = registry.heads().iter().collect();

    while let Some(id) = stack.pop() {
        let Some(node) = registry.lookup(id) else {
            continue;
        };
        if !reached.insert(node.entity_id().clone()) {
            continue;
        }
        stack.extend(node.edges().iter().map(|e| &e.target_id));
    }

    reached
}
