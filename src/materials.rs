//! Material Rule Table
//!
//! Authenticity guidance per primary material. Every rule rejects
//! artificial or plastic-looking renderings.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MaterialType {
    Wood,
    Metal,
    Fabric,
    Leather,
    Glass,
    Stone,
    Rattan,
    #[default]
    Composite,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReflectanceLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextureComplexity {
    Low,
    Medium,
    High,
}

pub struct MaterialRule {
    pub keywords: &'static [&'static str],
    pub reflectance: ReflectanceLevel,
    pub texture: TextureComplexity,
    pub lighting: &'static str,
    pub guidance: &'static str,
    pub compact_guidance: &'static str,
}

pub const AUTHENTICITY_REJECTION: &str = "never artificial or plastic-looking";

impl MaterialType {
    pub const ALL: [MaterialType; 8] = [
        Self::Wood,
        Self::Metal,
        Self::Fabric,
        Self::Leather,
        Self::Glass,
        Self::Stone,
        Self::Rattan,
        Self::Composite,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wood => "wood",
            Self::Metal => "metal",
            Self::Fabric => "fabric",
            Self::Leather => "leather",
            Self::Glass => "glass",
            Self::Stone => "stone",
            Self::Rattan => "rattan",
            Self::Composite => "composite",
        }
    }

    /// Unrecognized values resolve to `Composite`.
    pub fn from_str_lossy(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .unwrap_or(Self::Composite)
    }

    pub fn rule(self) -> &'static MaterialRule {
        match self {
            Self::Wood => &WOOD,
            Self::Metal => &METAL,
            Self::Fabric => &FABRIC,
            Self::Leather => &LEATHER,
            Self::Glass => &GLASS,
            Self::Stone => &STONE,
            Self::Rattan => &RATTAN,
            Self::Composite => &COMPOSITE,
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Guidance text for the primary material.
pub fn primary_guidance(material: MaterialType, compact: bool) -> String {
    let rule = material.rule();
    let body = if compact { rule.compact_guidance } else { rule.guidance };
    format!("Primary material ({material}): {body}; {AUTHENTICITY_REJECTION}.")
}

/// Shorter generic clause for secondary materials, closed by the dominance statement.
pub fn secondary_guidance(primary: MaterialType, secondary: &[MaterialType]) -> Option<String> {
    let others: Vec<&str> = secondary
        .iter()
        .filter(|m| **m != primary)
        .map(|m| m.as_str())
        .collect();
    if others.is_empty() {
        return None;
    }
    Some(format!(
        "Secondary materials ({}): render with authentic surface character and correct joins. \
         The primary material ({primary}) remains visually dominant.",
        others.join(", ")
    ))
}

static WOOD: MaterialRule = MaterialRule {
    keywords: &[
        "wood", "wooden", "oak", "walnut", "pine", "teak", "maple", "birch", "ash", "beech",
        "mahogany", "cherry", "bamboo", "plywood", "veneer", "acacia", "mango",
    ],
    reflectance: ReflectanceLevel::Low,
    texture: TextureComplexity::High,
    lighting: "directional light that rakes across the grain",
    guidance: "show natural grain direction, pores and subtle color variation between boards, \
               with crisp edges and an honest oiled or lacquered finish",
    compact_guidance: "natural visible grain and color variation",
};

static METAL: MaterialRule = MaterialRule {
    keywords: &[
        "metal", "steel", "iron", "aluminum", "aluminium", "brass", "copper", "chrome", "bronze",
        "zinc",
    ],
    reflectance: ReflectanceLevel::High,
    texture: TextureComplexity::Medium,
    lighting: "large soft sources producing smooth gradient reflections",
    guidance: "render true metallic reflectance with controlled highlights, brushed or powder-coated \
               texture where specified, and clean welds and fixings",
    compact_guidance: "true metallic reflectance with controlled highlights",
};

static FABRIC: MaterialRule = MaterialRule {
    keywords: &[
        "fabric", "linen", "cotton", "velvet", "wool", "boucle", "upholstered", "upholstery",
        "textile", "polyester", "chenille", "felt",
    ],
    reflectance: ReflectanceLevel::Low,
    texture: TextureComplexity::High,
    lighting: "soft side light that reveals the weave",
    guidance: "show the visible weave, natural drape, seams and soft compression where cushions \
               are loaded",
    compact_guidance: "visible weave and natural drape",
};

static LEATHER: MaterialRule = MaterialRule {
    keywords: &["leather", "suede", "nubuck"],
    reflectance: ReflectanceLevel::Medium,
    texture: TextureComplexity::Medium,
    lighting: "soft key light with a gentle rim to trace the sheen",
    guidance: "show natural hide grain, a soft sheen, stitching detail and gentle creasing at \
               stress points",
    compact_guidance: "natural hide grain and soft sheen",
};

static GLASS: MaterialRule = MaterialRule {
    keywords: &["glass", "crystal", "mirror", "mirrored", "tempered"],
    reflectance: ReflectanceLevel::High,
    texture: TextureComplexity::Low,
    lighting: "backlit or edge-lit setup that defines transparent edges",
    guidance: "balance transparency and reflection, keep edges defined, and show realistic \
               refraction of what lies behind",
    compact_guidance: "balanced transparency and reflection with defined edges",
};

static STONE: MaterialRule = MaterialRule {
    keywords: &["stone", "marble", "granite", "travertine", "concrete", "terrazzo", "slate"],
    reflectance: ReflectanceLevel::Medium,
    texture: TextureComplexity::High,
    lighting: "directional light that reveals veining and surface depth",
    guidance: "show natural veining or aggregate, honed or polished finish as specified, and the \
               visual weight of solid stone",
    compact_guidance: "natural veining and believable weight",
};

static RATTAN: MaterialRule = MaterialRule {
    keywords: &["rattan", "wicker", "cane", "seagrass", "jute"],
    reflectance: ReflectanceLevel::Low,
    texture: TextureComplexity::High,
    lighting: "warm directional light that casts fine weave shadows",
    guidance: "show the hand-woven pattern, individual strands and the slight irregularity of \
               natural fibre",
    compact_guidance: "hand-woven strands with natural irregularity",
};

static COMPOSITE: MaterialRule = MaterialRule {
    keywords: &["composite", "mdf", "laminate", "melamine", "resin", "acrylic", "plastic"],
    reflectance: ReflectanceLevel::Medium,
    texture: TextureComplexity::Low,
    lighting: "even soft lighting",
    guidance: "render the engineered surface with a true-to-life finish, accurate color and \
               crisp edge banding",
    compact_guidance: "true-to-life engineered finish",
};
