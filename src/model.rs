use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds.
pub type Ms = i64;

/// Lifecycle of a parking request.
///
/// `Allocated`/`Occupied` hold a slot. `Released` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Requested,
    Allocated,
    Occupied,
    Released,
    Cancelled,
}

impl RequestStatus {
    /// Holds a slot right now.
    pub fn is_active(self) -> bool {
        matches!(self, RequestStatus::Allocated | RequestStatus::Occupied)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Released | RequestStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Requested => "REQUESTED",
            RequestStatus::Allocated => "ALLOCATED",
            RequestStatus::Occupied => "OCCUPIED",
            RequestStatus::Released => "RELEASED",
            RequestStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Smallest allocatable unit. Never moves between areas or zones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub id: String,
    pub zone_id: String,
    pub area_id: String,
    /// Human-readable number, unique across the whole inventory.
    pub number: u32,
    pub is_available: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: String,
    pub name: String,
    pub zone_id: String,
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
    pub areas: Vec<Area>,
    /// Fixed at initialization.
    pub total_slots: usize,
    /// Cached count of slots with `is_available`, kept in step by the engine.
    pub available_slots: usize,
}

impl Zone {
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.areas.iter().flat_map(|a| a.slots.iter())
    }

    /// Recount available slots from the slot flags, ignoring the cache.
    pub fn count_available(&self) -> usize {
        self.slots().filter(|s| s.is_available).count()
    }

    pub fn occupied_slots(&self) -> usize {
        self.total_slots - self.available_slots
    }
}

/// A request for a slot, created by a successful allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: Ulid,
    /// Normalized license plate.
    pub plate: String,
    /// Zone the slot was actually taken from (may differ from the one asked for).
    pub zone_id: String,
    pub slot_id: Option<String>,
    pub slot_number: Option<u32>,
    pub duration_hours: u32,
    pub hourly_rate: f64,
    pub base_fee: f64,
    pub total_charges: f64,
    pub status: RequestStatus,
    pub created_at: Ms,
    pub allocated_at: Option<Ms>,
    pub released_at: Option<Ms>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    Allocate,
    Release,
    Cancel,
}

/// One entry of the operation log. This is the rollback record format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,
    pub request_id: Ulid,
    pub slot_id: Option<String>,
    pub at: Ms,
}

// ── Query result types ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneStats {
    pub zone_id: String,
    pub zone_name: String,
    pub total: usize,
    pub occupied: usize,
    pub available: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analytics {
    pub total_slots: usize,
    pub occupied_slots: usize,
    pub available_slots: usize,
    pub active_requests: usize,
    pub completed_sessions: usize,
    pub cancelled_sessions: usize,
    /// Sum of charges over released requests only.
    pub total_revenue: f64,
    pub zone_stats: Vec<ZoneStats>,
}

/// Everything a caller needs to redraw after a mutation, read in one consistent cut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemView {
    pub zones: Vec<Zone>,
    pub active: Vec<Request>,
    pub history: Vec<Request>,
    pub analytics: Analytics,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(n: u32, available: bool) -> Slot {
        Slot {
            id: format!("zone-1-area-1-slot-{n}"),
            zone_id: "zone-1".into(),
            area_id: "zone-1-area-1".into(),
            number: n,
            is_available: available,
        }
    }

    #[test]
    fn status_classification() {
        assert!(RequestStatus::Allocated.is_active());
        assert!(RequestStatus::Occupied.is_active());
        assert!(!RequestStatus::Requested.is_active());
        assert!(!RequestStatus::Released.is_active());

        assert!(RequestStatus::Released.is_terminal());
        assert!(RequestStatus::Cancelled.is_terminal());
        assert!(!RequestStatus::Occupied.is_terminal());
    }

    #[test]
    fn status_serializes_uppercase() {
        let json = serde_json::to_string(&RequestStatus::Allocated).unwrap();
        assert_eq!(json, "\"ALLOCATED\"");
        let back: RequestStatus = serde_json::from_str("\"CANCELLED\"").unwrap();
        assert_eq!(back, RequestStatus::Cancelled);
        assert_eq!(RequestStatus::Occupied.to_string(), "OCCUPIED");
    }

    #[test]
    fn zone_recount_ignores_cache() {
        let zone = Zone {
            id: "zone-1".into(),
            name: "Downtown Core".into(),
            areas: vec![Area {
                id: "zone-1-area-1".into(),
                name: "Area A".into(),
                zone_id: "zone-1".into(),
                slots: vec![slot(1, true), slot(2, false), slot(3, true)],
            }],
            total_slots: 3,
            available_slots: 3, // stale on purpose
        };
        assert_eq!(zone.count_available(), 2);
        assert_eq!(zone.slots().count(), 3);
        assert_eq!(zone.occupied_slots(), 0);
    }

    #[test]
    fn operation_kind_serializes_uppercase() {
        let op = Operation {
            kind: OperationKind::Allocate,
            request_id: Ulid::nil(),
            slot_id: Some("zone-1-area-1-slot-1".into()),
            at: 0,
        };
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["kind"], "ALLOCATE");
    }
}
