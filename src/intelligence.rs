//! Product Intelligence Classifier
//!
//! Best-effort keyword matching over the product specification. Classification
//! never fails: unmatched input lands on a floor-standing composite profile.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::materials::{MaterialType, ReflectanceLevel, TextureComplexity};
use crate::placement::PlacementType;
use crate::product::ProductSpecification;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Seating,
    Table,
    Storage,
    Bed,
    Lighting,
    Decor,
    Outdoor,
    #[default]
    General,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 8] = [
        Self::Seating,
        Self::Table,
        Self::Storage,
        Self::Bed,
        Self::Lighting,
        Self::Decor,
        Self::Outdoor,
        Self::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Seating => "seating",
            Self::Table => "table",
            Self::Storage => "storage",
            Self::Bed => "bed",
            Self::Lighting => "lighting",
            Self::Decor => "decor",
            Self::Outdoor => "outdoor",
            Self::General => "general",
        }
    }

    pub fn from_str_lossy(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .unwrap_or(Self::General)
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViewingDistance {
    Close,
    Medium,
    Far,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MaterialProfile {
    pub primary: MaterialType,
    #[serde(default)]
    pub secondary: Vec<MaterialType>,
    pub reflectance_level: ReflectanceLevel,
    pub texture_complexity: TextureComplexity,
    pub required_lighting: String,
}

impl MaterialProfile {
    /// Profile derived from the material rule table.
    pub fn from_materials(primary: MaterialType, secondary: Vec<MaterialType>) -> Self {
        let rule = primary.rule();
        Self {
            primary,
            secondary,
            reflectance_level: rule.reflectance,
            texture_complexity: rule.texture,
            required_lighting: rule.lighting.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScaleGuidance {
    pub human_reference_needed: bool,
    pub viewing_distance: ViewingDistance,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductIntelligence {
    pub category: ProductCategory,
    pub placement_type: PlacementType,
    pub material_profile: MaterialProfile,
    pub scale_guidance: ScaleGuidance,
}

const CATEGORY_KEYWORDS: &[(ProductCategory, &[&str])] = &[
    (ProductCategory::Outdoor, &["outdoor", "patio", "garden", "terrace", "deckchair", "parasol"]),
    (
        ProductCategory::Lighting,
        &[
            "lamp", "pendant", "chandelier", "sconce", "lighting", "lantern", "light fixture",
            "ceiling light", "wall light", "floor light", "pendant light", "string light",
        ],
    ),
    (ProductCategory::Bed, &["bed", "headboard", "bunk", "daybed", "crib", "cot"]),
    (
        ProductCategory::Seating,
        &[
            "sofa", "couch", "chair", "armchair", "stool", "bench", "ottoman", "sectional",
            "loveseat", "recliner", "pouf",
        ],
    ),
    (
        ProductCategory::Table,
        &["table", "desk", "console", "nightstand", "workstation", "bar"],
    ),
    (
        ProductCategory::Storage,
        &[
            "cabinet", "dresser", "wardrobe", "bookcase", "bookshelf", "shelf", "shelves",
            "shelving", "sideboard", "credenza", "chest", "drawer", "rack", "cupboard",
        ],
    ),
    (
        ProductCategory::Decor,
        &["vase", "mirror", "rug", "frame", "clock", "candle", "planter", "sculpture", "tray"],
    ),
];

/// An explicit wall keyword outranks generic hanging words; the wall row is
/// split so that "ceiling mounted" still resolves to the ceiling.
const PLACEMENT_KEYWORDS: &[(PlacementType, &[&str])] = &[
    (PlacementType::WallMounted, &["wall", "wallmount", "sconce"]),
    (
        PlacementType::CeilingMounted,
        &["ceiling", "pendant", "chandelier", "suspended", "hanging"],
    ),
    (PlacementType::WallMounted, &["mounted", "floating", "shelf", "shelves"]),
    (
        PlacementType::Tabletop,
        &[
            "tabletop", "table lamp", "desk lamp", "countertop", "vase", "candle", "tray",
            "sculpture", "planter", "clock",
        ],
    ),
];

/// Space-padded lowercase token stream for whole-word and phrase matching.
struct Tokens(String);

impl Tokens {
    fn new(text: &str) -> Self {
        let joined = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Self(format!(" {} ", joined))
    }

    /// Byte position of the first whole-word match, accepting a plural "s".
    fn find(&self, keyword: &str) -> Option<usize> {
        let exact = format!(" {} ", keyword);
        let plural = format!(" {}s ", keyword);
        match (self.0.find(&exact), self.0.find(&plural)) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn contains(&self, keyword: &str) -> bool {
        self.find(keyword).is_some()
    }
}

fn match_table<T: Copy>(table: &[(T, &[&str])], sources: &[&Tokens]) -> Option<T> {
    sources.iter().find_map(|tokens| {
        table
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|kw| tokens.contains(kw)))
            .map(|(value, _)| *value)
    })
}

pub fn classify_category(spec: &ProductSpecification) -> ProductCategory {
    let product_type = Tokens::new(&spec.product_type);
    let name = Tokens::new(&spec.product_name);
    match_table(CATEGORY_KEYWORDS, &[&product_type, &name]).unwrap_or_else(|| {
        debug!(product = %spec.product_name, "no category keyword matched, using general");
        ProductCategory::General
    })
}

pub fn classify_placement(spec: &ProductSpecification) -> PlacementType {
    let product_type = Tokens::new(&spec.product_type);
    let name = Tokens::new(&spec.product_name);
    match_table(PLACEMENT_KEYWORDS, &[&product_type, &name]).unwrap_or(PlacementType::FloorStanding)
}

/// Materials in order of first mention; the first one is primary.
pub fn classify_materials(spec: &ProductSpecification) -> (MaterialType, Vec<MaterialType>) {
    let found = materials_in(&Tokens::new(&spec.materials_description));
    let found = if found.is_empty() {
        materials_in(&Tokens::new(&format!("{} {}", spec.product_type, spec.product_name)))
    } else {
        found
    };

    match found.split_first() {
        Some((primary, rest)) => (*primary, rest.to_vec()),
        None => {
            debug!(product = %spec.product_name, "no material keyword matched, using composite");
            (MaterialType::Composite, Vec::new())
        }
    }
}

fn materials_in(tokens: &Tokens) -> Vec<MaterialType> {
    let mut hits: Vec<(usize, MaterialType)> = MaterialType::ALL
        .into_iter()
        .filter_map(|material| {
            material
                .rule()
                .keywords
                .iter()
                .filter_map(|kw| tokens.find(kw))
                .min()
                .map(|pos| (pos, material))
        })
        .collect();
    hits.sort();
    hits.into_iter().map(|(_, material)| material).collect()
}

pub fn scale_guidance(spec: &ProductSpecification, category: ProductCategory) -> ScaleGuidance {
    let viewing_distance = match spec.usable_dimensions() {
        Some(dims) => {
            let extent = dims.max_extent_cm();
            if extent >= 150.0 {
                ViewingDistance::Far
            } else if extent < 45.0 {
                ViewingDistance::Close
            } else {
                ViewingDistance::Medium
            }
        }
        None => match category {
            ProductCategory::Bed | ProductCategory::Outdoor => ViewingDistance::Far,
            ProductCategory::Decor => ViewingDistance::Close,
            _ => ViewingDistance::Medium,
        },
    };

    ScaleGuidance {
        human_reference_needed: viewing_distance == ViewingDistance::Far,
        viewing_distance,
    }
}

/// Derive the full intelligence profile for a specification.
pub fn classify(spec: &ProductSpecification) -> ProductIntelligence {
    let category = classify_category(spec);
    let placement_type = classify_placement(spec);
    let (primary, secondary) = classify_materials(spec);

    let intelligence = ProductIntelligence {
        category,
        placement_type,
        material_profile: MaterialProfile::from_materials(primary, secondary),
        scale_guidance: scale_guidance(spec, category),
    };
    debug!(
        category = %intelligence.category,
        placement = %intelligence.placement_type,
        material = %intelligence.material_profile.primary,
        "classified product"
    );
    intelligence
}
