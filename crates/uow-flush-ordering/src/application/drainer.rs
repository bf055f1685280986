//! Flush Drainer
//!
//! Hands a built flush order to the store executor.
//!
//! Writes go out in flush order. Deletes go out in reverse flush order, since
//! the owning (referencing) side must be removed before the row it points at.
//! Join-table rows follow the entity writes and precede the deletes.

use crate::config::FlushConfig;
use crate::domain::entities::{FlushInstruction, FlushOrder, JoinTableRecord};
use crate::domain::errors::{ExecutorError, FlushError};
use crate::domain::value_objects::{EntityId, OperationKind};
use crate::ports::outbound::{FlushExecutor, LifecycleHooks};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, error, info};

/// Outcome of one drained flush
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlushReport {
    pub written: usize,
    pub deleted: usize,
    /// Instructions skipped because the node had no pending changes
    pub skipped: usize,
    pub join_rows: usize,
    /// Executor batches issued
    pub batches: usize,
}

pub struct FlushDrainer {
    config: FlushConfig,
}

impl FlushDrainer {
    pub fn new() -> Self {
        Self {
            config: FlushConfig::default(),
        }
    }

    pub fn with_config(config: FlushConfig) -> Self {
        Self { config }
    }

    /// Drain `order` through `executor`, running `hooks` around each instruction.
    ///
    /// Stops at the first failure; nothing is retried or compensated.
    pub fn drain(
        &self,
        order: FlushOrder,
        executor: &mut dyn FlushExecutor,
        hooks: &mut dyn LifecycleHooks,
    ) -> Result<FlushReport, FlushError> {
        let mut report = FlushReport::default();
        let (instructions, join_records) = order.into_parts();

        let mut writes = Vec::new();
        let mut deletes = Vec::new();
        for instruction in instructions {
            if self.config.skip_clean && !instruction.dirty {
                report.skipped += 1;
                continue;
            }
            match instruction.operation {
                OperationKind::Write => writes.push(instruction),
                OperationKind::Delete => deletes.push(instruction),
            }
        }
        deletes.reverse();

        let deleted_ids: HashSet<EntityId> =
            deletes.iter().map(|i| i.entity_id.clone()).collect();
        let join_rows: Vec<JoinTableRecord> = join_records
            .into_iter()
            .filter(|r| !deleted_ids.contains(&r.owner) && !deleted_ids.contains(&r.inverse))
            .collect();

        self.run_phase(&writes, executor, hooks, &mut report)?;
        report.written = writes.len();

        if !join_rows.is_empty() {
            executor.persist_join_rows(&join_rows).map_err(|e| {
                let entity_id = e
                    .entity_id()
                    .cloned()
                    .unwrap_or_else(|| join_rows[0].owner.clone());
                execution_failed(entity_id, e)
            })?;
            report.join_rows = join_rows.len();
        }

        self.run_phase(&deletes, executor, hooks, &mut report)?;
        report.deleted = deletes.len();

        info!(
            written = report.written,
            deleted = report.deleted,
            skipped = report.skipped,
            join_rows = report.join_rows,
            batches = report.batches,
            "Flush drained"
        );

        Ok(report)
    }

    fn run_phase(
        &self,
        instructions: &[FlushInstruction],
        executor: &mut dyn FlushExecutor,
        hooks: &mut dyn LifecycleHooks,
        report: &mut FlushReport,
    ) -> Result<(), FlushError> {
        if instructions.is_empty() {
            return Ok(());
        }
        let batch_size = match self.config.batch_size {
            0 => instructions.len(),
            n => n,
        };

        for batch in instructions.chunks(batch_size) {
            for instruction in batch {
                hooks.pre_flush(instruction).map_err(|e| FlushError::ExecutionFailed {
                    entity_id: instruction.entity_id.clone(),
                    reason: e.to_string(),
                })?;
            }

            debug!(size = batch.len(), "Executing flush batch");
            executor.execute_batch(batch).map_err(|e| {
                let entity_id = e
                    .entity_id()
                    .cloned()
                    .unwrap_or_else(|| batch[0].entity_id.clone());
                execution_failed(entity_id, e)
            })?;
            report.batches += 1;

            for instruction in batch {
                hooks.post_flush(instruction).map_err(|e| FlushError::ExecutionFailed {
                    entity_id: instruction.entity_id.clone(),
                    reason: e.to_string(),
                })?;
            }
        }

        Ok(())
    }
}

impl Default for FlushDrainer {
    fn default() -> Self {
        Self::new()
    }
}

fn execution_failed(entity_id: EntityId, e: ExecutorError) -> FlushError {
    error!(entity_id = %entity_id, error = %e, "[uow] Executor failed");
    FlushError::ExecutionFailed {
        entity_id,
        reason: e.to_string(),
    }
}
