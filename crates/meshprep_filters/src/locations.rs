//! Attribute slot assignment

use std::collections::BTreeMap;

use indexmap::IndexMap;
use meshprep_core::{names, Geometry};

/// Semantics bound before all others, in this order, when present.
/// Slot 0 ends up on a position attribute, which some drivers require to be
/// an enabled array.
const PRIORITY_SEMANTICS: [&str; 12] = [
    names::POSITION,
    "positionHigh",
    "positionLow",
    "position3DHigh",
    "position3DLow",
    "position2DHigh",
    "position2DLow",
    names::PICK_COLOR,
    names::NORMAL,
    names::ST,
    names::TANGENT,
    names::BINORMAL,
];

/// Assign each attribute a zero-based slot.
///
/// Well-known semantics come first in a fixed order, then every other
/// attribute in insertion order. The result iterates in slot order and is
/// identical for identical attribute maps.
pub fn create_attribute_locations(geometry: &Geometry) -> IndexMap<String, u32> {
    let mut locations = IndexMap::with_capacity(geometry.attributes.len());
    let mut next = 0u32;

    for semantic in PRIORITY_SEMANTICS {
        if geometry.attributes.contains_key(semantic) {
            locations.insert(semantic.to_string(), next);
            next += 1;
        }
    }

    for name in geometry.attributes.keys() {
        if !locations.contains_key(name) {
            locations.insert(name.clone(), next);
            next += 1;
        }
    }

    locations
}

/// Map old slots to new slots by attribute name.
///
/// Names in `old` that are absent from `new` are dropped.
pub fn remap_attribute_locations(
    old: &IndexMap<String, u32>,
    new: &IndexMap<String, u32>,
) -> BTreeMap<u32, u32> {
    old.iter()
        .filter_map(|(name, &old_slot)| new.get(name).map(|&new_slot| (old_slot, new_slot)))
        .collect()
}
