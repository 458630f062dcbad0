use tracing::info;

use crate::model::*;

use super::{Engine, EngineError};

impl Engine {
    /// Undo the most recent `count` operations, newest first.
    ///
    /// Only `ALLOCATE` records are reverted: the request is erased and, if it
    /// still holds its slot, the slot goes back to the tail of its zone's queue.
    /// `RELEASE` and `CANCEL` records in the window are dropped without being
    /// reverted. The whole window leaves the log either way. A `count` beyond
    /// the log length covers the whole log.
    ///
    /// Returns the number of allocations reverted.
    pub fn rollback(&mut self, count: usize) -> Result<usize, EngineError> {
        let start = self.log.len().saturating_sub(count);

        // Plan first: an unknown slot id aborts with nothing changed.
        let mut undo = Vec::new();
        for op in self.log[start..].iter().rev() {
            if op.kind != OperationKind::Allocate {
                continue;
            }
            let Some(request) = self.requests.get(&op.request_id) else {
                continue;
            };
            // A released or cancelled request's slot is already back in circulation.
            let slot_ref = match (&op.slot_id, request.status.is_active()) {
                (Some(s), true) => Some(self.resolve_slot(s)?),
                _ => None,
            };
            undo.push((op.request_id, slot_ref));
        }

        for &(request_id, slot_ref) in &undo {
            if let Some(r) = slot_ref {
                self.return_slot(r);
            }
            self.requests.remove(&request_id);
        }
        let dropped = self.log.len() - start;
        self.log.truncate(start);

        info!(dropped, reverted = undo.len(), "rolled back operations");
        Ok(undo.len())
    }

    /// The operation log, oldest first.
    pub fn operations(&self) -> &[Operation] {
        &self.log
    }
}
