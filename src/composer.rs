//! Constraint Composer
//!
//! An ordered table of pure section builders joined into one prompt. Same
//! inputs, same text: no randomness, no I/O.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::contexts::ContextPreset;
use crate::intelligence::{ProductIntelligence, ViewingDistance};
use crate::materials::{primary_guidance, secondary_guidance};
use crate::negatives::NegativeSet;
use crate::placement::PlacementType;
use crate::product::ProductSpecification;
use crate::settings::GenerationSettings;
use crate::DEFAULT_MAX_PROMPT_LENGTH;

const SECTION_SEPARATOR: &str = "\n\n";
const COMPACT_SPECS_LIMIT: usize = 200;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    Preservation,
    Format,
    PhotographyCore,
    ProductDefinition,
    ContextRequirements,
    Placement,
    Material,
    CorrectiveConstraints,
    QualityChecklist,
    FinalValidation,
}

impl SectionId {
    pub fn header(self) -> &'static str {
        match self {
            Self::Preservation => "PRODUCT PRESERVATION",
            Self::Format => "OUTPUT FORMAT",
            Self::PhotographyCore => "PHOTOGRAPHY CORE",
            Self::ProductDefinition => "PRODUCT DEFINITION",
            Self::ContextRequirements => "CONTEXT REQUIREMENTS",
            Self::Placement => "PLACEMENT TYPE",
            Self::Material => "MATERIAL AUTHENTICITY",
            Self::CorrectiveConstraints => "CORRECTIVE CONSTRAINTS",
            Self::QualityChecklist => "QUALITY CHECKLIST",
            Self::FinalValidation => "FINAL VALIDATION",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Verbosity {
    #[default]
    Full,
    Compact,
}

/// Everything a section builder may read.
#[derive(Debug, Clone, Copy)]
pub struct CompositionInputs<'a> {
    pub spec: &'a ProductSpecification,
    pub preset: ContextPreset,
    pub settings: &'a GenerationSettings,
    pub intelligence: &'a ProductIntelligence,
    pub verbosity: Verbosity,
    /// Char cap on custom instructions; `None` leaves them whole.
    pub custom_limit: Option<usize>,
}

impl<'a> CompositionInputs<'a> {
    pub fn new(
        spec: &'a ProductSpecification,
        preset: ContextPreset,
        settings: &'a GenerationSettings,
        intelligence: &'a ProductIntelligence,
    ) -> Self {
        Self {
            spec,
            preset,
            settings,
            intelligence,
            verbosity: Verbosity::Full,
            custom_limit: None,
        }
    }

    fn compact(&self) -> bool {
        self.verbosity == Verbosity::Compact
    }

    fn placement(&self) -> PlacementType {
        self.intelligence.placement_type
    }
}

pub type SectionBuilder = fn(&CompositionInputs<'_>) -> String;

/// Fixed section order.
pub const SECTIONS: [(SectionId, SectionBuilder); 10] = [
    (SectionId::Preservation, preservation_section),
    (SectionId::Format, format_section),
    (SectionId::PhotographyCore, photography_core_section),
    (SectionId::ProductDefinition, product_definition_section),
    (SectionId::ContextRequirements, context_requirements_section),
    (SectionId::Placement, placement_section),
    (SectionId::Material, material_section),
    (SectionId::CorrectiveConstraints, corrective_constraints_section),
    (SectionId::QualityChecklist, quality_checklist_section),
    (SectionId::FinalValidation, final_validation_section),
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptSection {
    pub id: SectionId,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ComposedPrompt {
    pub context: ContextPreset,
    pub verbosity: Verbosity,
    pub sections: Vec<PromptSection>,
}

impl ComposedPrompt {
    pub fn text(&self) -> String {
        self.sections
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(SECTION_SEPARATOR)
    }

    /// Length in chars, the unit the validator measures.
    pub fn len(&self) -> usize {
        self.text().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|s| s.text.is_empty())
    }

    pub fn section(&self, id: SectionId) -> Option<&str> {
        self.sections.iter().find(|s| s.id == id).map(|s| s.text.as_str())
    }
}

/// Build every section at the requested verbosity, in order.
pub fn build_sections(inputs: &CompositionInputs<'_>) -> ComposedPrompt {
    ComposedPrompt {
        context: inputs.preset,
        verbosity: inputs.verbosity,
        sections: SECTIONS
            .iter()
            .map(|(id, build)| PromptSection { id: *id, text: build(inputs) })
            .collect(),
    }
}

pub struct Composer {
    max_length: usize,
}

impl Composer {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    /// Compose, stepping down to compact wording and then trimming custom
    /// instructions while the text exceeds the ceiling.
    pub fn compose(
        &self,
        spec: &ProductSpecification,
        preset: ContextPreset,
        settings: &GenerationSettings,
        intelligence: &ProductIntelligence,
    ) -> ComposedPrompt {
        let mut inputs = CompositionInputs::new(spec, preset, settings, intelligence);
        let full = build_sections(&inputs);
        let full_len = full.len();
        if full_len <= self.max_length {
            return full;
        }

        debug!(length = full_len, max = self.max_length, "prompt over ceiling, compacting");
        inputs.verbosity = Verbosity::Compact;
        let compact = build_sections(&inputs);
        let compact_len = compact.len();
        if compact_len <= self.max_length {
            return compact;
        }

        let custom_len = settings
            .custom_instructions
            .as_deref()
            .map(|c| c.trim().chars().count())
            .unwrap_or(0);
        if custom_len == 0 {
            return compact;
        }

        // One extra char: a cut clause gains a closing period.
        let overflow = compact_len - self.max_length + 1;
        inputs.custom_limit = Some(custom_len.saturating_sub(overflow));
        debug!(overflow, "trimming custom instructions");
        build_sections(&inputs)
    }
}

impl Default for Composer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PROMPT_LENGTH)
    }
}

/// Compose against the default ceiling.
pub fn compose_prompt(
    spec: &ProductSpecification,
    preset: ContextPreset,
    settings: &GenerationSettings,
    intelligence: &ProductIntelligence,
) -> ComposedPrompt {
    Composer::default().compose(spec, preset, settings, intelligence)
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].trim_end(),
        None => text,
    }
}

fn sentence(text: &str) -> String {
    let trimmed = text.trim().trim_end_matches('.');
    format!("{}.", trimmed)
}

// --- Section builders ---

pub fn preservation_section(inputs: &CompositionInputs<'_>) -> String {
    let name = inputs.spec.product_name.trim();
    let body = if inputs.compact() {
        format!("Reproduce the {name} exactly; do not redesign or add features.")
    } else {
        format!(
            "Reproduce the {name} exactly as specified: identical silhouette, proportions, \
             colors, materials, hardware and construction details. Do not redesign, restyle, \
             simplify or add features."
        )
    };
    format!("{}: {}", SectionId::Preservation.header(), body)
}

pub fn format_section(inputs: &CompositionInputs<'_>) -> String {
    let rule = inputs.preset.rule();
    let [rw, rh] = rule.aspect_ratio;
    let [pw, ph] = rule.pixel_dimensions;
    let mut text = format!(
        "{}: {rw}:{rh} aspect ratio, {pw}x{ph} px. {}",
        SectionId::Format.header(),
        rule.format_narrative
    );

    let formats = &inputs.settings.output_formats;
    if let Some(first) = formats.first() {
        text.push_str(&format!(" Deliver {}", first.delivery_note()));
        if formats.len() > 1 {
            let labels: Vec<_> = formats.iter().map(|f| f.label()).collect();
            text.push_str(&format!(" (targets: {})", labels.join(", ")));
        }
        text.push('.');
    }
    text
}

pub fn photography_core_section(inputs: &CompositionInputs<'_>) -> String {
    let s = inputs.settings;
    let body = if inputs.compact() {
        format!(
            "Commercial product photo, {} style, {}, {}, sharp true-to-life detail.",
            s.style.trim(),
            s.lighting.trim(),
            s.camera_angle.trim()
        )
    } else {
        format!(
            "Professional commercial product photography in a {} style. Lighting: {} \
             Camera: {} Tack-sharp focus on the product, true-to-life color, physically \
             accurate shadows and reflections, no clipped highlights.",
            s.style.trim(),
            sentence(&s.lighting),
            sentence(&s.camera_angle)
        )
    };
    format!("{}: {}", SectionId::PhotographyCore.header(), body)
}

pub fn product_definition_section(inputs: &CompositionInputs<'_>) -> String {
    let spec = inputs.spec;
    let category = inputs.intelligence.category;
    let mut parts = Vec::new();

    let product_type = spec.product_type.trim();
    if product_type.is_empty() {
        parts.push(format!("{}, a {category} product.", spec.product_name.trim()));
    } else {
        parts.push(format!("{}, a {category} piece ({product_type}).", spec.product_name.trim()));
    }

    if !spec.materials_description.trim().is_empty() {
        parts.push(format!("Materials: {}", sentence(&spec.materials_description)));
    }

    if let Some(dims) = spec.usable_dimensions() {
        parts.push(format!("Dimensions: {}; keep proportions exact.", dims.describe()));
    }

    let specs = spec.additional_specs_text.trim();
    if !specs.is_empty() {
        let specs = if inputs.compact() { truncate_chars(specs, COMPACT_SPECS_LIMIT) } else { specs };
        parts.push(format!("Specifications: {}", sentence(specs)));
    }

    if inputs.preset.rule().uses_environment {
        let scale = &inputs.intelligence.scale_guidance;
        if scale.human_reference_needed {
            parts.push(
                "Convey real-world scale through architectural cues such as door frames and \
                 skirting, never through people."
                    .to_string(),
            );
        }
        if !inputs.compact() {
            let distance = match scale.viewing_distance {
                ViewingDistance::Close => "close",
                ViewingDistance::Medium => "medium",
                ViewingDistance::Far => "far",
            };
            parts.push(format!("Frame for a {distance} viewing distance."));
        }
    }

    format!("{}: {}", SectionId::ProductDefinition.header(), parts.join(" "))
}

pub fn context_requirements_section(inputs: &CompositionInputs<'_>) -> String {
    let rule = inputs.preset.rule();
    let mut text = format!("{}: {}", SectionId::ContextRequirements.header(), rule.narrative);

    if rule.uses_environment {
        let environment = inputs.settings.environment.trim();
        if !environment.is_empty() {
            text.push_str(&format!(" Setting: {}", sentence(environment)));
        }
    }

    if let Some(custom) = inputs.settings.custom_instructions.as_deref() {
        let custom = custom.trim();
        let custom = match inputs.custom_limit {
            Some(limit) => truncate_chars(custom, limit),
            None => custom,
        };
        if !custom.is_empty() {
            text.push_str(&format!(" Additional direction: {}", sentence(custom)));
        }
    }
    text
}

pub fn placement_section(inputs: &CompositionInputs<'_>) -> String {
    let placement = inputs.placement();
    let rule = placement.rule();
    let mut text = format!("{}: {placement}. {}", SectionId::Placement.header(), rule.general);
    if !rule.mandatory.is_empty() {
        text.push_str(&format!(" Required: {}.", rule.mandatory.join("; ")));
    }
    text
}

pub fn material_section(inputs: &CompositionInputs<'_>) -> String {
    let profile = &inputs.intelligence.material_profile;
    let mut parts = vec![primary_guidance(profile.primary, inputs.compact())];
    if !inputs.compact() {
        parts.push(format!("Light it with {}", sentence(&profile.required_lighting)));
    }
    if let Some(secondary) = secondary_guidance(profile.primary, &profile.secondary) {
        parts.push(secondary);
    }
    format!("{}: {}", SectionId::Material.header(), parts.join(" "))
}

/// Context negatives plus placement exclusions.
pub fn negative_constraints(inputs: &CompositionInputs<'_>) -> NegativeSet {
    let mut set = NegativeSet::for_context(inputs.preset);
    for (i, exclusion) in inputs.placement().rule().exclusions.iter().enumerate() {
        set.push(&format!("placement_{}", i + 1), *exclusion);
    }
    set
}

pub fn corrective_constraints_section(inputs: &CompositionInputs<'_>) -> String {
    let lines: Vec<String> = negative_constraints(inputs)
        .iter()
        .map(|c| format!("- {}.", c.text))
        .collect();
    format!("{}:\n{}", SectionId::CorrectiveConstraints.header(), lines.join("\n"))
}

pub fn quality_checklist_section(inputs: &CompositionInputs<'_>) -> String {
    let rule = inputs.preset.rule();
    let placement_check = match inputs.placement().rule().mandatory.first() {
        Some(phrase) => format!("placement shows {phrase}"),
        None => "placement is physically plausible".to_string(),
    };

    let items = if inputs.compact() {
        vec![
            "proportions match the product definition".to_string(),
            placement_check,
            rule.checklist_item.to_lowercase(),
        ]
    } else {
        vec![
            "proportions and details match the product definition".to_string(),
            format!(
                "{} surface reads as authentic",
                inputs.intelligence.material_profile.primary
            ),
            placement_check,
            rule.checklist_item.to_lowercase(),
            "lighting direction is consistent across product and shadows".to_string(),
        ]
    };
    format!("{}: Verify {}.", SectionId::QualityChecklist.header(), items.join("; "))
}

pub fn final_validation_section(inputs: &CompositionInputs<'_>) -> String {
    let [rw, rh] = inputs.preset.rule().aspect_ratio;
    format!(
        "{}: Before finalizing, confirm exactly one {}, placement type {}, a {rw}:{rh} frame, \
         and that every corrective constraint above is satisfied.",
        SectionId::FinalValidation.header(),
        inputs.spec.product_name.trim(),
        inputs.placement()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intelligence::{classify, ProductCategory};
    use crate::settings::{OutputFormat, PartialGenerationSettings, SettingsResolver};

    fn settings_for(category: ProductCategory) -> GenerationSettings {
        SettingsResolver::default()
            .resolve(&PartialGenerationSettings::default(), category)
            .settings
    }

    fn oak_desk() -> ProductSpecification {
        ProductSpecification::new("Oak Desk", "desk", "oak wood")
    }

    #[test]
    fn test_sections_follow_fixed_order() {
        let spec = oak_desk();
        let intel = classify(&spec);
        let settings = settings_for(intel.category);
        let prompt = compose_prompt(&spec, ContextPreset::Lifestyle, &settings, &intel);
        assert!(!prompt.is_empty());
        let ids: Vec<_> = prompt.sections.iter().map(|s| s.id).collect();
        let expected: Vec<_> = SECTIONS.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, expected);
        for section in &prompt.sections {
            assert!(section.text.starts_with(section.id.header()));
        }
    }

    #[test]
    fn test_dimensions_clause_is_optional() {
        let spec = oak_desk();
        let intel = classify(&spec);
        let settings = settings_for(intel.category);
        let inputs = CompositionInputs::new(&spec, ContextPreset::Packshot, &settings, &intel);
        assert!(!product_definition_section(&inputs).contains("Dimensions:"));

        let spec = oak_desk().with_dimensions(crate::product::Dimensions::new(
            140.0,
            75.0,
            70.0,
            crate::product::DimensionUnit::Cm,
        ));
        let inputs = CompositionInputs::new(&spec, ContextPreset::Packshot, &settings, &intel);
        assert!(product_definition_section(&inputs).contains("Dimensions: 140 W x 75 H x 70 D cm"));
    }

    #[test]
    fn test_packshot_ignores_environment() {
        let spec = oak_desk();
        let intel = classify(&spec);
        let settings = settings_for(intel.category);
        let inputs = CompositionInputs::new(&spec, ContextPreset::Packshot, &settings, &intel);
        let text = context_requirements_section(&inputs);
        assert!(!text.contains("Setting:"));
        assert!(!text.contains(&settings.environment));

        let inputs = CompositionInputs::new(&spec, ContextPreset::Lifestyle, &settings, &intel);
        assert!(context_requirements_section(&inputs).contains(&settings.environment));
    }

    #[test]
    fn test_format_lists_multiple_targets() {
        let spec = oak_desk();
        let intel = classify(&spec);
        let mut settings = settings_for(intel.category);
        settings.output_formats = vec![OutputFormat::Png, OutputFormat::Webp];
        let inputs = CompositionInputs::new(&spec, ContextPreset::HeroBanner, &settings, &intel);
        let text = format_section(&inputs);
        assert!(text.starts_with("OUTPUT FORMAT: 16:9 aspect ratio, 1920x1080 px."));
        assert!(text.contains("(targets: PNG, WebP)"));
    }

    #[test]
    fn test_compaction_keeps_under_ceiling() {
        let spec = oak_desk().with_additional_specs("Cable tray under the top. ".repeat(20));
        let intel = classify(&spec);
        let mut settings = settings_for(intel.category);
        settings.custom_instructions = Some("Show the drawer half open. ".repeat(40));

        let composer = Composer::new(3000);
        let prompt = composer.compose(&spec, ContextPreset::Lifestyle, &settings, &intel);
        assert_eq!(prompt.verbosity, Verbosity::Compact);
        assert!(prompt.len() <= 3000, "length {}", prompt.len());
        let context = prompt.section(SectionId::ContextRequirements).unwrap_or_default();
        assert!(context.contains("Additional direction: Show the drawer"));
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
