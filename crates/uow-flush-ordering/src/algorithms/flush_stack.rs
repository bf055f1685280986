//! Flush Stack Builder
//!
//! Depth-first traversal from every head node, in head registration order.
//! For a node `n`:
//! - children on edges where `n` owns the FK are placed before `n`
//! - `n` is placed
//! - children on edges where the child owns the FK are placed after `n`
//!
//! A node is marked `InProgress` on entry and `Placed` when its instruction
//! is pushed. Entering a node that is not `Unvisited` is a no-op, which
//! terminates cycles and places every reachable node exactly once.
//!
//! The traversal runs on an explicit work stack, so graph depth is bounded by
//! heap rather than call stack.
//!
//! The walk only sees a node's outgoing edges. Its output is then handed to
//! the settling pass (`settle.rs`), which moves a node behind any referenced
//! node it reached later through an inbound edge.

use super::settle::settle_dependencies;
use crate::domain::entities::{FlushInstruction, FlushOrder, JoinTableRecord, TraversalMark};
use crate::domain::errors::FlushError;
use crate::domain::graph::EntityGraph;
use crate::domain::registry::WorkRegistry;
use crate::domain::value_objects::{EntityId, OwningSide, RelationKind};
use std::collections::HashSet;
use tracing::debug;

/// Pending traversal step.
enum Step {
    Enter(EntityId),
    Place(EntityId),
}

/// Accumulates the order for one build.
#[derive(Default)]
struct FlushStack {
    instructions: Vec<FlushInstruction>,
    join_records: Vec<JoinTableRecord>,
    seen_join_records: HashSet<JoinTableRecord>,
}

impl FlushStack {
    fn push(&mut self, instruction: FlushInstruction) {
        self.instructions.push(instruction);
    }

    fn push_join_record(&mut self, record: JoinTableRecord) {
        if self.seen_join_records.insert(record.clone()) {
            self.join_records.push(record);
        }
    }

    fn into_parts(self) -> (Vec<FlushInstruction>, Vec<JoinTableRecord>) {
        (self.instructions, self.join_records)
    }
}

/// Build the flush order for everything reachable from the registry's head nodes.
///
/// Traversal marks are reset once per build. On error no order is returned
/// and the marks are reset again, so a failed build leaves nothing behind.
pub fn build_flush_order(registry: &mut WorkRegistry) -> Result<FlushOrder, FlushError> {
    registry.reset_traversal_marks();

    let heads = registry.heads().to_vec();
    let mut stack = FlushStack::default();

    for head in heads {
        if let Err(e) = traverse(registry.graph_mut(), head, &mut stack) {
            registry.reset_traversal_marks();
            return Err(e);
        }
    }

    let (walked, join_records) = stack.into_parts();
    let instructions = settle_dependencies(registry.graph(), walked);
    Ok(FlushOrder::new(instructions, join_records))
}

fn traverse(
    graph: &mut EntityGraph,
    head: EntityId,
    stack: &mut FlushStack,
) -> Result<(), FlushError> {
    let mut work = vec![Step::Enter(head)];

    while let Some(step) = work.pop() {
        match step {
            Step::Enter(entity_id) => enter(graph, entity_id, &mut work, stack)?,
            Step::Place(entity_id) => {
                let node = graph
                    .get_mut(&entity_id)
                    .ok_or_else(|| FlushError::NotFound(entity_id.clone()))?;
                node.mark = TraversalMark::Placed;
                let instruction = FlushInstruction::for_node(node);

                debug!(
                    entity_id = %instruction.entity_id,
                    operation = ?instruction.operation,
                    position = stack.instructions.len(),
                    "Placed flush instruction"
                );
                stack.push(instruction);
            }
        }
    }

    Ok(())
}

/// Schedule the children and the placement of one node.
fn enter(
    graph: &mut EntityGraph,
    entity_id: EntityId,
    work: &mut Vec<Step>,
    stack: &mut FlushStack,
) -> Result<(), FlushError> {
    let node = graph
        .get(&entity_id)
        .ok_or_else(|| FlushError::NotFound(entity_id.clone()))?;
    if node.mark() != TraversalMark::Unvisited {
        return Ok(());
    }

    // Validate every edge before scheduling anything
    let mut owning = Vec::new();
    let mut referenced_by = Vec::new();
    for edge in node.edges() {
        let side = edge.owning_side.ok_or_else(|| FlushError::MalformedRelation {
            source_id: edge.source_id.clone(),
            target_id: edge.target_id.clone(),
            kind: edge.relation_kind,
        })?;
        if !graph.contains(&edge.target_id) {
            return Err(FlushError::DanglingReference {
                source_id: edge.source_id.clone(),
                target_id: edge.target_id.clone(),
            });
        }

        if edge.relation_kind == RelationKind::ManyToMany {
            if let (Some(owner), Some(inverse)) = (edge.owner_id(), edge.referenced_id()) {
                stack.push_join_record(JoinTableRecord {
                    owner: owner.clone(),
                    inverse: inverse.clone(),
                });
            }
        }

        match side {
            OwningSide::Parent => owning.push(edge.target_id.clone()),
            OwningSide::Child => referenced_by.push(edge.target_id.clone()),
        }
    }

    // LIFO: owning children pop first (in insertion order), then this node,
    // then the children that reference it.
    work.extend(referenced_by.into_iter().rev().map(Step::Enter));
    work.push(Step::Place(entity_id.clone()));
    work.extend(owning.into_iter().rev().map(Step::Enter));

    if let Some(node) = graph.get_mut(&entity_id) {
        node.mark = TraversalMark::InProgress;
    }
    Ok(())
}
