//! Placement Rule Table
//!
//! One rule per placement variant. Mandatory phrases are emitted verbatim,
//! prohibited phrases must never appear in a composed prompt, and exclusions
//! feed the corrective-constraint section.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker proving the placement section survived composition.
pub const PLACEMENT_MARKER: &str = "PLACEMENT TYPE:";

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PlacementType {
    WallMounted,
    #[default]
    FloorStanding,
    Tabletop,
    CeilingMounted,
    Other,
}

impl PlacementType {
    pub const ALL: [PlacementType; 5] = [
        Self::WallMounted,
        Self::FloorStanding,
        Self::Tabletop,
        Self::CeilingMounted,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::WallMounted => "wall_mounted",
            Self::FloorStanding => "floor_standing",
            Self::Tabletop => "tabletop",
            Self::CeilingMounted => "ceiling_mounted",
            Self::Other => "other",
        }
    }

    /// Unrecognized values resolve to `Other`.
    pub fn from_str_lossy(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .unwrap_or(Self::Other)
    }

    pub fn rule(self) -> &'static PlacementRule {
        match self {
            Self::WallMounted => &WALL_MOUNTED,
            Self::FloorStanding => &FLOOR_STANDING,
            Self::Tabletop => &TABLETOP,
            Self::CeilingMounted => &CEILING_MOUNTED,
            Self::Other => &GENERAL,
        }
    }
}

impl fmt::Display for PlacementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct PlacementRule {
    pub mandatory: &'static [&'static str],
    pub prohibited: &'static [&'static str],
    pub exclusions: &'static [&'static str],
    pub general: &'static str,
}

impl PlacementRule {
    pub fn is_empty(&self) -> bool {
        self.mandatory.is_empty() && self.prohibited.is_empty()
    }

    /// Prohibited phrases found in `text`, case-insensitive.
    pub fn prohibited_in(&self, text: &str) -> Vec<&'static str> {
        let lowered = text.to_lowercase();
        self.prohibited
            .iter()
            .copied()
            .filter(|p| lowered.contains(&p.to_lowercase()))
            .collect()
    }
}

static WALL_MOUNTED: PlacementRule = PlacementRule {
    mandatory: &[
        "visible mounting hardware securing the product to the wall",
        "minimum 30 cm clearance between the underside and the floor",
        "zero floor contact",
    ],
    prohibited: &[
        "standing on the floor",
        "supported by legs",
        "on its feet",
        "pedestal base",
        "floor-standing",
    ],
    exclusions: &[
        "No floor contact: nothing beneath the product touches the ground",
        "No legs, feet, stands or pedestal supports",
    ],
    general: "The product hangs on a solid vertical wall surface at a realistic installation height.",
};

static FLOOR_STANDING: PlacementRule = PlacementRule {
    mandatory: &[
        "all support points in full contact with the floor",
        "realistic clearance of 5-15 cm from the nearest wall",
    ],
    prohibited: &[
        "floating in mid-air",
        "hovering above the floor",
        "mounted on the wall",
    ],
    exclusions: &[
        "No gaps between supports and the floor surface",
        "No hovering or wall attachment",
    ],
    general: "The product stands level on a flat floor with believable weight.",
};

static TABLETOP: PlacementRule = PlacementRule {
    mandatory: &[
        "resting stably on a table or counter surface",
        "soft contact shadow where the base meets the surface",
    ],
    prohibited: &[
        "placed directly on the floor",
        "mounted on the wall",
        "floating in mid-air",
    ],
    exclusions: &["No placement on the ground or against the ceiling"],
    general: "The product sits on an appropriately scaled supporting surface.",
};

static CEILING_MOUNTED: PlacementRule = PlacementRule {
    mandatory: &[
        "visible suspension point at the ceiling",
        "zero floor contact and zero wall contact",
    ],
    prohibited: &[
        "resting on the floor",
        "standing on legs",
        "mounted on the wall",
    ],
    exclusions: &[
        "No floor or wall support of any kind",
        "No missing cord, rod or canopy at the suspension point",
    ],
    general: "The product hangs from the ceiling at a realistic drop height.",
};

static GENERAL: PlacementRule = PlacementRule {
    mandatory: &[],
    prohibited: &[],
    exclusions: &[],
    general: "Place the product in a physically plausible, stable position with correct contact shadows.",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_variants_have_rules() {
        for placement in PlacementType::ALL {
            let rule = placement.rule();
            if placement == PlacementType::Other {
                assert!(rule.is_empty());
            } else {
                assert!(!rule.mandatory.is_empty(), "{placement} has no mandatory phrases");
                assert!(!rule.prohibited.is_empty(), "{placement} has no prohibited phrases");
            }
            assert!(!rule.general.is_empty());
        }
    }

    #[test]
    fn test_rules_do_not_contradict_themselves() {
        for placement in PlacementType::ALL {
            let rule = placement.rule();
            let own_text = [rule.mandatory, rule.exclusions].concat().join(" ") + rule.general;
            assert!(rule.prohibited_in(&own_text).is_empty(), "{placement} contradicts itself");
        }
    }

    #[test]
    fn test_lossy_parse() {
        assert_eq!(PlacementType::from_str_lossy("wall-mounted"), PlacementType::WallMounted);
        assert_eq!(PlacementType::from_str_lossy("Ceiling Mounted"), PlacementType::CeilingMounted);
        assert_eq!(PlacementType::from_str_lossy("bolted"), PlacementType::Other);
    }
}
