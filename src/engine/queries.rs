use std::collections::HashSet;

use ulid::Ulid;

use crate::model::*;
use crate::pricing::{Charges, Tariff};

use super::{Engine, EngineError};

impl Engine {
    pub fn list_zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zone(&self, zone_id: &str) -> Option<&Zone> {
        self.zone_index.get(zone_id).map(|&z| &self.zones[z])
    }

    pub fn get_request(&self, id: &Ulid) -> Option<&Request> {
        self.requests.get(id)
    }

    /// All requests in creation order.
    pub fn requests(&self) -> impl Iterator<Item = &Request> {
        self.requests.values()
    }

    /// Requests currently holding a slot.
    pub fn list_active_requests(&self) -> Vec<Request> {
        self.requests()
            .filter(|r| r.status.is_active())
            .cloned()
            .collect()
    }

    /// Released and cancelled requests.
    pub fn list_history_requests(&self) -> Vec<Request> {
        self.requests()
            .filter(|r| r.status.is_terminal())
            .cloned()
            .collect()
    }

    /// Free slot ids of a zone in the order they will be handed out.
    pub fn free_queue(&self, zone_id: &str) -> Option<Vec<String>> {
        let z = *self.zone_index.get(zone_id)?;
        Some(
            self.queues[z]
                .iter()
                .map(|&r| self.slot(r).id.clone())
                .collect(),
        )
    }

    pub fn tariff(&self) -> Tariff {
        self.tariff
    }

    /// Price preview; does not touch any state.
    pub fn compute_charges(&self, duration_hours: u32) -> Charges {
        self.tariff.compute_charges(duration_hours)
    }

    /// Occupancy and revenue, folded from current zones and requests.
    pub fn snapshot(&self) -> Analytics {
        let total_slots: usize = self.zones.iter().map(|z| z.total_slots).sum();
        let available_slots: usize = self.zones.iter().map(|z| z.available_slots).sum();

        let mut active_requests = 0;
        let mut completed_sessions = 0;
        let mut cancelled_sessions = 0;
        let mut total_revenue = 0.0;
        for request in self.requests() {
            match request.status {
                RequestStatus::Allocated | RequestStatus::Occupied => active_requests += 1,
                RequestStatus::Released => {
                    completed_sessions += 1;
                    total_revenue += request.total_charges;
                }
                RequestStatus::Cancelled => cancelled_sessions += 1,
                RequestStatus::Requested => {}
            }
        }

        Analytics {
            total_slots,
            occupied_slots: total_slots - available_slots,
            available_slots,
            active_requests,
            completed_sessions,
            cancelled_sessions,
            total_revenue,
            zone_stats: self
                .zones
                .iter()
                .map(|z| ZoneStats {
                    zone_id: z.id.clone(),
                    zone_name: z.name.clone(),
                    total: z.total_slots,
                    occupied: z.occupied_slots(),
                    available: z.available_slots,
                })
                .collect(),
        }
    }

    /// Check slot conservation: every slot is either queued exactly once or
    /// bound to exactly one active request, and each zone's cached counter
    /// matches its slot flags and queue length.
    pub fn verify_invariants(&self) -> Result<(), EngineError> {
        let mut seen: HashSet<&str> = HashSet::with_capacity(self.slot_index.len());

        for (zone, queue) in self.zones.iter().zip(&self.queues) {
            let flagged = zone.count_available();
            if zone.available_slots != flagged || queue.len() != flagged {
                return Err(EngineError::Inconsistent(format!(
                    "zone {}: counter {}, flags {}, queued {}",
                    zone.id,
                    zone.available_slots,
                    flagged,
                    queue.len()
                )));
            }
            for &r in queue {
                let slot = self.slot(r);
                if !slot.is_available || !seen.insert(slot.id.as_str()) {
                    return Err(EngineError::Inconsistent(format!(
                        "slot {} queued twice or while taken",
                        slot.id
                    )));
                }
            }
        }

        for request in self.requests().filter(|r| r.status.is_active()) {
            let Some(slot_id) = request.slot_id.as_deref() else {
                continue;
            };
            let slot = self.slot(self.resolve_slot(slot_id)?);
            if slot.is_available || !seen.insert(slot.id.as_str()) {
                return Err(EngineError::Inconsistent(format!(
                    "slot {} bound to {} but also free or bound elsewhere",
                    slot.id, request.id
                )));
            }
        }

        if seen.len() != self.slot_index.len() {
            return Err(EngineError::Inconsistent(format!(
                "{} of {} slots accounted for",
                seen.len(),
                self.slot_index.len()
            )));
        }
        Ok(())
    }
}
