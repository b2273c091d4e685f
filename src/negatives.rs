//! Negative-Constraint Library
//!
//! Baseline prohibitions apply to every composition. Context deltas only add.

use serde::{Deserialize, Serialize};

use crate::contexts::ContextPreset;

/// Marker proving the human-exclusion directive survived composition.
pub const HUMAN_EXCLUSION_MARKER: &str = "NO HUMAN FIGURES";

pub const BASELINE_IDS: [&str; 5] = [
    "human_figures",
    "irrelevant_props",
    "text_labels",
    "artifacts",
    "duplication",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NegativeConstraint {
    pub id: String,
    pub text: String,
}

impl NegativeConstraint {
    fn new(id: &str, text: impl Into<String>) -> Self {
        Self { id: id.to_string(), text: text.into() }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NegativeSet {
    pub constraints: Vec<NegativeConstraint>,
}

impl NegativeSet {
    /// Fixed baseline. The prop clause names the approved props, if any.
    pub fn baseline(approved_props: &[&str]) -> Self {
        let props = if approved_props.is_empty() {
            "No props or accessories of any kind".to_string()
        } else {
            format!("No props other than {}", approved_props.join(", "))
        };

        Self {
            constraints: vec![
                NegativeConstraint::new(
                    "human_figures",
                    format!(
                        "{HUMAN_EXCLUSION_MARKER}: no people, hands, faces, silhouettes or body \
                         parts anywhere in frame"
                    ),
                ),
                NegativeConstraint::new("irrelevant_props", props),
                NegativeConstraint::new(
                    "text_labels",
                    "No text, labels, logos, price tags or watermarks",
                ),
                NegativeConstraint::new(
                    "artifacts",
                    "No photographic artifacts: noise, banding, chromatic fringing, warped \
                     geometry or distorted perspective",
                ),
                NegativeConstraint::new(
                    "duplication",
                    "Exactly one product: no duplicates, mirrored copies or partial second units",
                ),
            ],
        }
    }

    /// Baseline plus the context delta.
    pub fn for_context(preset: ContextPreset) -> Self {
        let mut set = Self::baseline(preset.rule().approved_props);
        set.constraints.extend(context_delta(preset));
        set
    }

    pub fn push(&mut self, id: &str, text: impl Into<String>) {
        self.constraints.push(NegativeConstraint::new(id, text));
    }

    pub fn ids(&self) -> Vec<&str> {
        self.constraints.iter().map(|c| c.id.as_str()).collect()
    }

    pub fn contains_all(&self, other: &NegativeSet) -> bool {
        other
            .constraints
            .iter()
            .all(|c| self.constraints.iter().any(|own| own.id == c.id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &NegativeConstraint> {
        self.constraints.iter()
    }
}

pub fn context_delta(preset: ContextPreset) -> Vec<NegativeConstraint> {
    match preset {
        ContextPreset::Packshot => vec![NegativeConstraint::new(
            "environmental_elements",
            "No environmental elements: no room setting, plants or decor around the product",
        )],
        ContextPreset::Lifestyle => vec![NegativeConstraint::new(
            "competing_decor",
            "No decor that hides, overlaps or outshines the product",
        )],
        ContextPreset::SocialSquare => vec![NegativeConstraint::new(
            "busy_backdrop",
            "No busy patterns or clutter that weaken contrast",
        )],
        ContextPreset::SocialStory => vec![NegativeConstraint::new(
            "unsafe_margins",
            "No key product detail inside the top or bottom interface margins",
        )],
        ContextPreset::HeroBanner => vec![NegativeConstraint::new(
            "overlay_zone",
            "No text, objects or busy detail inside the text-overlay reserved zone",
        )],
        ContextPreset::DetailCloseup => vec![
            NegativeConstraint::new("wide_views", "No wide room views; the crop stays on the product"),
            NegativeConstraint::new("soft_focal_point", "No motion blur or soft focus at the focal point"),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_baseline_ids_are_stable() {
        let set = NegativeSet::baseline(&[]);
        assert_eq!(set.ids(), BASELINE_IDS.to_vec());
    }

    #[test]
    fn test_context_deltas_are_additive() {
        for preset in ContextPreset::ALL {
            let set = NegativeSet::for_context(preset);
            assert!(set.contains_all(&NegativeSet::baseline(&[])), "{preset}");
            assert!(set.constraints.len() > BASELINE_IDS.len(), "{preset} has no delta");
        }
    }

    #[test]
    fn test_delta_ids_do_not_shadow_baseline() {
        for preset in ContextPreset::ALL {
            for delta in context_delta(preset) {
                assert!(!BASELINE_IDS.contains(&delta.id.as_str()));
            }
        }
    }

    #[test]
    fn test_props_clause_lists_approved_props() {
        let set = NegativeSet::for_context(ContextPreset::Lifestyle);
        let props = set.iter().find(|c| c.id == "irrelevant_props").unwrap();
        assert!(props.text.contains("a small potted plant"));

        let set = NegativeSet::for_context(ContextPreset::Packshot);
        let props = set.iter().find(|c| c.id == "irrelevant_props").unwrap();
        assert!(props.text.contains("of any kind"));
    }

    #[test]
    fn test_packshot_excludes_environment() {
        let set = NegativeSet::for_context(ContextPreset::Packshot);
        assert!(set.iter().any(|c| c.text.to_lowercase().contains("no environmental elements")));
    }
}
