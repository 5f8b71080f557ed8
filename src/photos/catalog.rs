use anyhow::{bail, Result};

use crate::mapping::coords::{Anchor, CoordinateSpec};
use crate::models::PhotoSlot;

/// Display grouping for the photo-collection step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotGroup {
    SiteOverview,
    Rectifier,
    Battery,
    Electrical,
    Handover,
}

impl SlotGroup {
    pub fn label(&self) -> &'static str {
        match self {
            SlotGroup::SiteOverview => "Site Overview",
            SlotGroup::Rectifier => "Rectifier",
            SlotGroup::Battery => "Battery",
            SlotGroup::Electrical => "Electrical",
            SlotGroup::Handover => "Handover",
        }
    }
}

pub struct SlotSpec {
    pub slot: PhotoSlot,
    pub group: SlotGroup,
    pub label: &'static str,
    pub coord: CoordinateSpec,
}

const fn region(c0: f64, r0: f64, c1: f64, r1: f64) -> CoordinateSpec {
    CoordinateSpec::BoundingRegion {
        top_left: Anchor::new(c0, r0),
        bottom_right: Anchor::new(c1, r1),
    }
}

const fn fixed(col: f64, row: f64, width_px: u32, height_px: u32) -> CoordinateSpec {
    CoordinateSpec::FixedExtent {
        anchor: Anchor::new(col, row),
        width_px,
        height_px,
    }
}

/// The ordered evidence catalog: 16 required slots in 5 groups. Coordinates
/// are transcribed from the printed form's photo frames; the .1/.9 anchor
/// fractions are the frame-margin convention.
pub const PHOTO_CATALOG: &[SlotSpec] = &[
    SlotSpec {
        slot: PhotoSlot::TowerProfile,
        group: SlotGroup::SiteOverview,
        label: "Tower profile",
        coord: region(1.1, 62.1, 3.9, 66.9),
    },
    SlotSpec {
        slot: PhotoSlot::ShelterExterior,
        group: SlotGroup::SiteOverview,
        label: "Shelter exterior",
        coord: region(5.1, 62.1, 7.9, 66.9),
    },
    SlotSpec {
        slot: PhotoSlot::ShelterInterior,
        group: SlotGroup::SiteOverview,
        label: "Shelter interior",
        coord: region(1.1, 68.1, 3.9, 72.9),
    },
    SlotSpec {
        slot: PhotoSlot::RectifierBefore,
        group: SlotGroup::Rectifier,
        label: "Rectifier before installation",
        coord: region(5.1, 68.1, 7.9, 72.9),
    },
    SlotSpec {
        slot: PhotoSlot::RectifierAfter,
        group: SlotGroup::Rectifier,
        label: "Rectifier after installation",
        coord: region(1.1, 74.1, 3.9, 78.9),
    },
    SlotSpec {
        slot: PhotoSlot::RectifierModules,
        group: SlotGroup::Rectifier,
        label: "Rectifier modules",
        coord: region(5.1, 74.1, 7.9, 78.9),
    },
    SlotSpec {
        slot: PhotoSlot::RectifierSerial,
        group: SlotGroup::Rectifier,
        label: "Rectifier serial plate",
        coord: fixed(1.2, 80.2, 220, 140),
    },
    SlotSpec {
        slot: PhotoSlot::BatteryBankA,
        group: SlotGroup::Battery,
        label: "Battery bank A",
        coord: region(2.1, 92.1, 5.9, 96.9),
    },
    SlotSpec {
        slot: PhotoSlot::BatteryBankB,
        group: SlotGroup::Battery,
        label: "Battery bank B",
        coord: region(2.1, 98.1, 5.9, 102.9),
    },
    SlotSpec {
        slot: PhotoSlot::BatterySerial,
        group: SlotGroup::Battery,
        label: "Battery serial plate",
        coord: fixed(6.2, 92.2, 220, 140),
    },
    SlotSpec {
        slot: PhotoSlot::AcBreaker,
        group: SlotGroup::Electrical,
        label: "AC breaker panel",
        coord: region(1.1, 106.1, 3.9, 110.9),
    },
    SlotSpec {
        slot: PhotoSlot::DcDistribution,
        group: SlotGroup::Electrical,
        label: "DC distribution",
        coord: region(5.1, 106.1, 7.9, 110.9),
    },
    SlotSpec {
        slot: PhotoSlot::Grounding,
        group: SlotGroup::Electrical,
        label: "Grounding connection",
        coord: region(1.1, 112.1, 3.9, 116.9),
    },
    SlotSpec {
        slot: PhotoSlot::MeterReading,
        group: SlotGroup::Handover,
        label: "Meter reading",
        coord: region(5.1, 112.1, 7.9, 116.9),
    },
    SlotSpec {
        slot: PhotoSlot::TeamPhoto,
        group: SlotGroup::Handover,
        label: "Installation team",
        coord: region(1.1, 120.1, 7.9, 126.9),
    },
    SlotSpec {
        slot: PhotoSlot::SiteSignage,
        group: SlotGroup::Handover,
        label: "Site signage",
        coord: fixed(1.2, 128.2, 260, 180),
    },
];

pub fn required_slots() -> impl Iterator<Item = PhotoSlot> {
    PHOTO_CATALOG.iter().map(|spec| spec.slot)
}

pub fn coord_for(slot: PhotoSlot) -> Option<CoordinateSpec> {
    PHOTO_CATALOG
        .iter()
        .find(|spec| spec.slot == slot)
        .map(|spec| spec.coord)
}

/// Load-time completeness check: every slot appears exactly once with one
/// coordinate spec. Run at controller construction so a broken table fails
/// before any wizard session starts.
pub fn validate_catalog() -> Result<()> {
    let mut seen = std::collections::BTreeSet::new();
    for spec in PHOTO_CATALOG {
        if !seen.insert(spec.slot) {
            bail!("photo catalog lists slot '{}' twice", spec.slot.as_str());
        }
    }
    if seen.len() != 16 {
        bail!("photo catalog has {} slots, expected 16", seen.len());
    }
    Ok(())
}
