//! In-Memory Executor Adapter
//!
//! Implements `FlushExecutor` over an in-process row store. Used by tests and
//! demos to observe the exact sequence of writes, deletes and join rows.

use crate::domain::entities::{FlushInstruction, JoinTableRecord};
use crate::domain::errors::ExecutorError;
use crate::domain::value_objects::{EntityId, EntityType, OperationKind};
use crate::ports::outbound::FlushExecutor;
use std::collections::{HashMap, HashSet};

/// In-memory implementation of FlushExecutor for testing and demos.
///
/// Keeps one row per written entity, the join-table rows, and a log of every
/// applied operation in application order.
pub struct InMemoryExecutor {
    rows: HashMap<EntityId, EntityType>,
    join_rows: HashSet<JoinTableRecord>,
    log: Vec<(EntityId, OperationKind)>,
    batches: usize,
    rejected: HashSet<EntityId>,
}

impl InMemoryExecutor {
    pub fn new() -> Self {
        Self {
            rows: HashMap::new(),
            join_rows: HashSet::new(),
            log: Vec::new(),
            batches: 0,
            rejected: HashSet::new(),
        }
    }

    /// Reject any operation on `entity_id` (failure injection).
    pub fn rejecting(mut self, entity_id: impl Into<EntityId>) -> Self {
        self.rejected.insert(entity_id.into());
        self
    }

    /// Seed a row as already present in the store.
    pub fn with_row(mut self, entity_id: impl Into<EntityId>, entity_type: EntityType) -> Self {
        self.rows.insert(entity_id.into(), entity_type);
        self
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.rows.contains_key(entity_id)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Applied operations in application order
    pub fn log(&self) -> &[(EntityId, OperationKind)] {
        &self.log
    }

    pub fn join_rows(&self) -> &HashSet<JoinTableRecord> {
        &self.join_rows
    }

    pub fn batch_count(&self) -> usize {
        self.batches
    }
}

impl Default for InMemoryExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl FlushExecutor for InMemoryExecutor {
    fn execute_batch(&mut self, batch: &[FlushInstruction]) -> Result<(), ExecutorError> {
        self.batches += 1;
        for instruction in batch {
            let entity_id = instruction.entity_id.clone();
            match instruction.operation {
                OperationKind::Write => {
                    if self.rejected.contains(&entity_id) {
                        return Err(ExecutorError::WriteRejected {
                            entity_id,
                            reason: "rejected by store".to_string(),
                        });
                    }
                    self.rows
                        .insert(entity_id.clone(), instruction.entity_type.clone());
                }
                OperationKind::Delete => {
                    if self.rejected.contains(&entity_id) {
                        return Err(ExecutorError::DeleteRejected {
                            entity_id,
                            reason: "rejected by store".to_string(),
                        });
                    }
                    self.rows.remove(&entity_id);
                    self.join_rows
                        .retain(|r| r.owner != entity_id && r.inverse != entity_id);
                }
            }
            self.log.push((entity_id, instruction.operation));
        }
        Ok(())
    }

    fn persist_join_rows(&mut self, rows: &[JoinTableRecord]) -> Result<(), ExecutorError> {
        for row in rows {
            if !self.rows.contains_key(&row.owner) || !self.rows.contains_key(&row.inverse) {
                return Err(ExecutorError::WriteRejected {
                    entity_id: row.owner.clone(),
                    reason: format!("join row references missing {}", row.inverse),
                });
            }
            self.join_rows.insert(row.clone());
        }
        Ok(())
    }
}
