use tracing::{debug, info};
use ulid::Ulid;

use crate::limits::MAX_DURATION_HOURS;
use crate::model::*;
use crate::plate::normalize_plate;

use super::{Engine, EngineError, now_ms};

/// Bounds a bookable stay: at least one hour, at most `MAX_DURATION_HOURS`.
pub fn check_duration(duration_hours: u32) -> Result<(), EngineError> {
    if duration_hours == 0 {
        return Err(EngineError::LimitExceeded("duration must be at least one hour"));
    }
    if duration_hours > MAX_DURATION_HOURS {
        return Err(EngineError::LimitExceeded("duration too long"));
    }
    Ok(())
}

impl Engine {
    /// Allocate the longest-free slot in `zone_id`, falling back to the first
    /// zone in creation order that still has one.
    ///
    /// The plate is normalized but not validated; callers check the format.
    pub fn allocate(
        &mut self,
        zone_id: &str,
        plate: &str,
        duration_hours: u32,
    ) -> Result<Request, EngineError> {
        check_duration(duration_hours)?;

        let requested = self.zone_index.get(zone_id).copied();
        let zone = requested
            .filter(|&z| !self.queues[z].is_empty())
            .or_else(|| self.queues.iter().position(|q| !q.is_empty()))
            .ok_or(EngineError::NoSlotAvailable)?;
        if requested != Some(zone) {
            debug!(
                requested = zone_id,
                fallback = %self.zones[zone].id,
                "cross-zone allocation"
            );
        }

        let id = self.next_id();
        let slot_ref = self.take_slot(zone).ok_or(EngineError::NoSlotAvailable)?;
        let slot = self.slot(slot_ref);
        let (slot_id, slot_number) = (slot.id.clone(), slot.number);
        let charges = self.tariff.compute_charges(duration_hours);
        let now = now_ms();

        let request = Request {
            id,
            plate: normalize_plate(plate),
            zone_id: self.zones[zone].id.clone(),
            slot_id: Some(slot_id.clone()),
            slot_number: Some(slot_number),
            duration_hours,
            hourly_rate: charges.hourly_rate,
            base_fee: charges.base_fee,
            total_charges: charges.total,
            status: RequestStatus::Allocated,
            created_at: now,
            allocated_at: Some(now),
            released_at: None,
        };
        self.requests.insert(id, request.clone());
        self.log.push(Operation {
            kind: OperationKind::Allocate,
            request_id: id,
            slot_id: Some(slot_id),
            at: now,
        });

        info!(
            request = %id,
            plate = %request.plate,
            zone = %request.zone_id,
            slot = slot_number,
            "slot allocated"
        );
        Ok(request)
    }

    /// End a session normally. Only `ALLOCATED`/`OCCUPIED` requests qualify.
    /// Charges computed at allocation are kept as-is.
    pub fn release(&mut self, id: Ulid) -> Result<Request, EngineError> {
        let request = self.requests.get(&id).ok_or(EngineError::NotFound(id))?;
        if !request.status.is_active() {
            return Err(EngineError::InvalidTransition {
                id,
                status: request.status,
            });
        }
        if request.slot_id.is_none() {
            return Err(EngineError::Inconsistent(format!(
                "active request {id} holds no slot"
            )));
        }
        self.close(id, RequestStatus::Released, OperationKind::Release)
    }

    /// Abandon a request that has not reached a terminal state, returning any
    /// held slot. Charges stay on the record but never count as revenue.
    pub fn cancel(&mut self, id: Ulid) -> Result<Request, EngineError> {
        let request = self.requests.get(&id).ok_or(EngineError::NotFound(id))?;
        if request.status.is_terminal() {
            return Err(EngineError::InvalidTransition {
                id,
                status: request.status,
            });
        }
        self.close(id, RequestStatus::Cancelled, OperationKind::Cancel)
    }

    /// Record arrival at the slot: `ALLOCATED` → `OCCUPIED`. Inventory is
    /// untouched and no operation is logged.
    pub fn occupy(&mut self, id: Ulid) -> Result<Request, EngineError> {
        let request = self.requests.get_mut(&id).ok_or(EngineError::NotFound(id))?;
        if request.status != RequestStatus::Allocated {
            return Err(EngineError::InvalidTransition {
                id,
                status: request.status,
            });
        }
        request.status = RequestStatus::Occupied;
        debug!(request = %id, "slot occupied");
        Ok(request.clone())
    }

    /// Move an eligible request to a terminal status, returning its slot if it
    /// holds one, and append the matching operation record.
    fn close(
        &mut self,
        id: Ulid,
        status: RequestStatus,
        kind: OperationKind,
    ) -> Result<Request, EngineError> {
        let request = self.requests.get(&id).ok_or(EngineError::NotFound(id))?;
        let slot_id = request.slot_id.clone();
        // Resolve before mutating anything.
        let slot_ref = match (&slot_id, request.status.is_active()) {
            (Some(s), true) => Some(self.resolve_slot(s)?),
            _ => None,
        };

        if let Some(r) = slot_ref {
            self.return_slot(r);
        }
        let now = now_ms();
        let request = self.requests.get_mut(&id).ok_or(EngineError::NotFound(id))?;
        request.status = status;
        request.released_at = Some(now);
        let closed = request.clone();

        self.log.push(Operation {
            kind,
            request_id: id,
            slot_id,
            at: now,
        });

        info!(request = %id, status = %status, "request closed");
        Ok(closed)
    }
}
