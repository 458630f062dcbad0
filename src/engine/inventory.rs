use crate::model::*;

/// Build the static zone → area → slot hierarchy.
///
/// Zones are `zone-1..`, areas are labelled `Area A`, `Area B`, … and every slot
/// gets the number `zone_index*100 + area_index*10 + slot_index + 1`. All slots
/// start available. Callers keep `areas_per_zone` and `slots_per_area` at or
/// below 10 (see `limits`) for the numbers to stay unique.
pub fn initialize<S: AsRef<str>>(
    zone_names: &[S],
    areas_per_zone: usize,
    slots_per_area: usize,
) -> Vec<Zone> {
    zone_names
        .iter()
        .enumerate()
        .map(|(zone_index, name)| {
            let zone_id = format!("zone-{}", zone_index + 1);
            let areas = (0..areas_per_zone)
                .map(|area_index| {
                    let area_id = format!("{zone_id}-area-{}", area_index + 1);
                    let slots = (0..slots_per_area)
                        .map(|slot_index| Slot {
                            id: format!("{area_id}-slot-{}", slot_index + 1),
                            zone_id: zone_id.clone(),
                            area_id: area_id.clone(),
                            number: (zone_index * 100 + area_index * 10 + slot_index + 1) as u32,
                            is_available: true,
                        })
                        .collect();
                    Area {
                        id: area_id,
                        name: format!("Area {}", area_label(area_index)),
                        zone_id: zone_id.clone(),
                        slots,
                    }
                })
                .collect();
            let total = areas_per_zone * slots_per_area;
            Zone {
                id: zone_id,
                name: name.as_ref().to_string(),
                areas,
                total_slots: total,
                available_slots: total,
            }
        })
        .collect()
}

/// A, B, … Z, then AA, AB, … like spreadsheet columns.
fn area_label(index: usize) -> String {
    let mut n = index + 1;
    let mut label = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        label.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    label.reverse();
    String::from_utf8(label).unwrap_or_default()
}
