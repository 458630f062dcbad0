/// Max zones an inventory may be built with.
pub const MAX_ZONES: usize = 64;

/// Areas per zone. Slot numbers are `zone*100 + area*10 + slot + 1`, so both
/// area and slot counts must stay within one decimal digit to remain unique.
pub const MAX_AREAS_PER_ZONE: usize = 10;

/// Slots per area (see `MAX_AREAS_PER_ZONE`).
pub const MAX_SLOTS_PER_AREA: usize = 10;

/// Max length of a zone display name, in bytes.
pub const MAX_NAME_LEN: usize = 128;

/// Longest bookable stay: 30 days.
pub const MAX_DURATION_HOURS: u32 = 720;

/// Plate length bounds after normalization.
pub const MIN_PLATE_LEN: usize = 2;
pub const MAX_PLATE_LEN: usize = 10;

/// Max bytes in one console command line.
pub const MAX_LINE_LEN: usize = 64 * 1024;
