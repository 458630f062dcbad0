mod error;
mod inventory;
mod mutations;
mod queries;
mod rollback;

pub use error::EngineError;
pub use inventory::initialize;
pub use mutations::check_duration;

use std::collections::{BTreeMap, HashMap, VecDeque};

use ulid::{Generator, Ulid};

use crate::config::Config;
use crate::model::*;
use crate::pricing::Tariff;

pub(crate) fn now_ms() -> Ms {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as Ms)
        .unwrap_or(0)
}

/// Position of a slot inside `Engine::zones`. Slots never move, so this is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct SlotRef {
    zone: usize,
    area: usize,
    slot: usize,
}

/// Sole owner of the inventory, the per-zone free queues, the request table and
/// the operation log. Every operation takes `&mut self` and runs to completion,
/// so a caller never observes a half-applied transition.
pub struct Engine {
    zones: Vec<Zone>,
    zone_index: HashMap<String, usize>,
    slot_index: HashMap<String, SlotRef>,
    /// Free slots per zone, parallel to `zones`. Head is the longest-free slot.
    queues: Vec<VecDeque<SlotRef>>,
    /// Keyed by monotonic ULID, so iteration is creation order.
    requests: BTreeMap<Ulid, Request>,
    log: Vec<Operation>,
    tariff: Tariff,
    ids: Generator,
}

impl Engine {
    /// Take ownership of a freshly built inventory. Queues are seeded with every
    /// available slot in zone/area/slot order.
    pub fn new(zones: Vec<Zone>, tariff: Tariff) -> Self {
        let mut zone_index = HashMap::with_capacity(zones.len());
        let mut slot_index = HashMap::new();
        let mut queues = Vec::with_capacity(zones.len());

        for (zi, zone) in zones.iter().enumerate() {
            zone_index.insert(zone.id.clone(), zi);
            let mut queue = VecDeque::with_capacity(zone.total_slots);
            for (ai, area) in zone.areas.iter().enumerate() {
                for (si, slot) in area.slots.iter().enumerate() {
                    let r = SlotRef {
                        zone: zi,
                        area: ai,
                        slot: si,
                    };
                    slot_index.insert(slot.id.clone(), r);
                    if slot.is_available {
                        queue.push_back(r);
                    }
                }
            }
            queues.push(queue);
        }

        Self {
            zones,
            zone_index,
            slot_index,
            queues,
            requests: BTreeMap::new(),
            log: Vec::new(),
            tariff,
            ids: Generator::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let zones = initialize(
            &config.zone_names,
            config.areas_per_zone,
            config.slots_per_area,
        );
        Self::new(zones, config.tariff)
    }

    fn next_id(&mut self) -> Ulid {
        // Overflow needs 2^80 ids in one millisecond.
        self.ids.generate().unwrap_or_else(|_| Ulid::new())
    }

    fn slot(&self, r: SlotRef) -> &Slot {
        &self.zones[r.zone].areas[r.area].slots[r.slot]
    }

    fn slot_mut(&mut self, r: SlotRef) -> &mut Slot {
        &mut self.zones[r.zone].areas[r.area].slots[r.slot]
    }

    pub(super) fn resolve_slot(&self, slot_id: &str) -> Result<SlotRef, EngineError> {
        self.slot_index
            .get(slot_id)
            .copied()
            .ok_or_else(|| EngineError::Inconsistent(format!("unknown slot {slot_id}")))
    }

    /// Pop the head of a zone's queue and mark it taken.
    fn take_slot(&mut self, zone: usize) -> Option<SlotRef> {
        let r = self.queues[zone].pop_front()?;
        self.slot_mut(r).is_available = false;
        self.zones[zone].available_slots -= 1;
        Some(r)
    }

    /// Push a slot to the tail of its zone's queue and mark it free.
    fn return_slot(&mut self, r: SlotRef) {
        self.slot_mut(r).is_available = true;
        self.zones[r.zone].available_slots += 1;
        self.queues[r.zone].push_back(r);
    }
}
