//! Context Rule Table - Format Enforcement
//!
//! Each preset owns its aspect ratio, target resolution and narrative block.
//! Markers are the defining phrases of a preset; no other preset may emit them.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum ContextPreset {
    #[default]
    Packshot,
    Lifestyle,
    SocialSquare,
    SocialStory,
    HeroBanner,
    DetailCloseup,
}

pub struct ContextRule {
    pub aspect_ratio: [u32; 2],
    pub pixel_dimensions: [u32; 2],
    pub format_narrative: &'static str,
    pub narrative: &'static str,
    pub markers: &'static [&'static str],
    pub uses_environment: bool,
    pub approved_props: &'static [&'static str],
    pub checklist_item: &'static str,
}

impl ContextPreset {
    pub const ALL: [ContextPreset; 6] = [
        Self::Packshot,
        Self::Lifestyle,
        Self::SocialSquare,
        Self::SocialStory,
        Self::HeroBanner,
        Self::DetailCloseup,
    ];

    /// Preset used whenever the requested one is unknown.
    pub const SAFE_BASELINE: ContextPreset = ContextPreset::Packshot;

    pub fn id(self) -> &'static str {
        match self {
            Self::Packshot => "packshot",
            Self::Lifestyle => "lifestyle",
            Self::SocialSquare => "social-square",
            Self::SocialStory => "social-story",
            Self::HeroBanner => "hero-banner",
            Self::DetailCloseup => "detail-closeup",
        }
    }

    /// Strict parse over ids and common aliases.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        let preset = match normalized.as_str() {
            "packshot" | "studio" | "isolated" | "catalog" => Self::Packshot,
            "lifestyle" | "in-situ" | "scene" => Self::Lifestyle,
            "social-square" | "instagram" | "square" => Self::SocialSquare,
            "social-story" | "story" | "reel" => Self::SocialStory,
            "hero-banner" | "hero" | "banner" => Self::HeroBanner,
            "detail-closeup" | "detail" | "closeup" | "close-up" => Self::DetailCloseup,
            _ => return None,
        };
        Some(preset)
    }

    /// Parse with fallback to the safe baseline. The flag reports whether it was used.
    pub fn resolve(value: &str) -> (Self, bool) {
        match Self::parse(value) {
            Some(preset) => (preset, false),
            None => {
                debug!(requested = value, baseline = %Self::SAFE_BASELINE, "unknown context preset");
                (Self::SAFE_BASELINE, true)
            }
        }
    }

    pub fn rule(self) -> &'static ContextRule {
        match self {
            Self::Packshot => &PACKSHOT,
            Self::Lifestyle => &LIFESTYLE,
            Self::SocialSquare => &SOCIAL_SQUARE,
            Self::SocialStory => &SOCIAL_STORY,
            Self::HeroBanner => &HERO_BANNER,
            Self::DetailCloseup => &DETAIL_CLOSEUP,
        }
    }
}

impl fmt::Display for ContextPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

static PACKSHOT: ContextRule = ContextRule {
    aspect_ratio: [1, 1],
    pixel_dimensions: [2048, 2048],
    format_narrative: "Square frame, product centered and filling about 80% of the frame.",
    narrative: "Catalog packshot: the product isolated on a pure white seamless background \
                (#FFFFFF) with even studio fill light and only the soft natural shadow the \
                product itself casts.",
    markers: &["pure white seamless background", "catalog packshot"],
    uses_environment: false,
    approved_props: &[],
    checklist_item: "Background is uniform pure white with no gradient or vignette",
};

static LIFESTYLE: ContextRule = ContextRule {
    aspect_ratio: [3, 2],
    pixel_dimensions: [3000, 2000],
    format_narrative: "Landscape editorial frame, product as the clear focal point at 40-60% of the frame.",
    narrative: "Lifestyle narrative: the product styled in a lived-in interior scene that feels \
                authentic and aspirational, supporting decor kept secondary and depth of field \
                guiding the eye to the product.",
    markers: &["lived-in interior scene", "lifestyle narrative"],
    uses_environment: true,
    approved_props: &["a small potted plant", "a folded throw", "a few closed books"],
    checklist_item: "Scene styling supports the product without competing for attention",
};

static SOCIAL_SQUARE: ContextRule = ContextRule {
    aspect_ratio: [1, 1],
    pixel_dimensions: [1080, 1080],
    format_narrative: "Square frame for mobile viewing, product centered with generous negative space.",
    narrative: "Social feed post: a scroll-stopping square composition with bold color blocking \
                behind the product and high contrast that stays readable at thumbnail size.",
    markers: &["scroll-stopping square composition", "social feed"],
    uses_environment: true,
    approved_props: &["one accent object in a complementary color"],
    checklist_item: "Product silhouette reads clearly at thumbnail size",
};

static SOCIAL_STORY: ContextRule = ContextRule {
    aspect_ratio: [9, 16],
    pixel_dimensions: [1080, 1920],
    format_narrative: "Tall frame, product in the central band with the top 14% and bottom 20% \
                       kept clear for interface overlays.",
    narrative: "Vertical story format: a full-bleed vertical composition with the product rising \
                through the center, immersive depth behind it and a strong sense of height.",
    markers: &["vertical story format", "full-bleed vertical"],
    uses_environment: true,
    approved_props: &["one tall slender plant"],
    checklist_item: "Key product details sit inside the central safe band",
};

static HERO_BANNER: ContextRule = ContextRule {
    aspect_ratio: [16, 9],
    pixel_dimensions: [1920, 1080],
    format_narrative: "Wide cinematic frame, product anchored in the right third.",
    narrative: "Website hero banner: a wide composition with the product on the right and a \
                calm, low-detail text-overlay reserved zone across the left 40% of the frame.",
    markers: &["website hero banner", "text-overlay reserved zone"],
    uses_environment: true,
    approved_props: &["one understated accessory beside the product"],
    checklist_item: "Left side stays calm enough for headline copy",
};

static DETAIL_CLOSEUP: ContextRule = ContextRule {
    aspect_ratio: [4, 5],
    pixel_dimensions: [2400, 3000],
    format_narrative: "Portrait frame, tightly cropped on one signature feature of the product.",
    narrative: "Macro detail close-up: craftsmanship detail such as joinery, stitching or \
                surface finish at close range, shallow depth of field and a background that \
                falls off into a soft neutral blur.",
    markers: &["macro detail close-up", "craftsmanship detail"],
    uses_environment: false,
    approved_props: &[],
    checklist_item: "Texture is sharp and tactile at the focal point",
};
