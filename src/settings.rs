//! Generation Settings - Fallback Resolution
//!
//! Partial settings arrive from the dashboard. The resolver fills each unset
//! field in a fixed order (style, environment, lighting, camera angle, output
//! formats); each step reads only fields resolved before it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::intelligence::ProductCategory;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Jpeg,
    Webp,
}

impl OutputFormat {
    pub fn label(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Webp => "WebP",
        }
    }

    pub fn delivery_note(self) -> &'static str {
        match self {
            Self::Png => "crisp, clean product edges suitable for lossless export",
            Self::Jpeg => "smooth tonal gradients that survive high-quality compression",
            Self::Webp => "web-optimized detail without fine noise",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    pub style: String,
    pub environment: String,
    pub lighting: String,
    pub camera_angle: String,
    pub output_formats: Vec<OutputFormat>,
    #[serde(default)]
    pub custom_instructions: Option<String>,
}

/// Settings as received; any field may be missing or blank.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PartialGenerationSettings {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub lighting: Option<String>,
    #[serde(default)]
    pub camera_angle: Option<String>,
    #[serde(default)]
    pub output_formats: Option<Vec<OutputFormat>>,
    #[serde(default)]
    pub custom_instructions: Option<String>,
}

impl From<GenerationSettings> for PartialGenerationSettings {
    fn from(settings: GenerationSettings) -> Self {
        Self {
            style: Some(settings.style),
            environment: Some(settings.environment),
            lighting: Some(settings.lighting),
            camera_angle: Some(settings.camera_angle),
            output_formats: Some(settings.output_formats),
            custom_instructions: settings.custom_instructions,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SettingField {
    Style,
    Environment,
    Lighting,
    CameraAngle,
    OutputFormats,
}

impl fmt::Display for SettingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Style => "style",
            Self::Environment => "environment",
            Self::Lighting => "lighting",
            Self::CameraAngle => "camera_angle",
            Self::OutputFormats => "output_formats",
        };
        f.write_str(name)
    }
}

/// Where a defaulted value came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FallbackSource {
    /// Product category lookup
    Category,
    /// Derived from the resolved environment
    Environment,
    /// System default, no lookup matched
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFallback {
    pub field: SettingField,
    pub value: String,
    pub source: FallbackSource,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSettings {
    pub settings: GenerationSettings,
    pub applied_fallbacks: Vec<AppliedFallback>,
}

impl ResolvedSettings {
    pub fn defaulted(&self, field: SettingField) -> Option<&AppliedFallback> {
        self.applied_fallbacks.iter().find(|f| f.field == field)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentLighting {
    pub keyword: String,
    pub lighting: String,
}

/// Immutable lookup tables for the resolver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct FallbackDefaults {
    pub style_by_category: BTreeMap<ProductCategory, String>,
    pub environment_by_category: BTreeMap<ProductCategory, String>,
    pub lighting_by_environment: Vec<EnvironmentLighting>,
    pub camera_by_category: BTreeMap<ProductCategory, String>,
    pub default_style: String,
    pub default_environment: String,
    pub default_lighting: String,
    pub default_camera_angle: String,
    pub default_output_formats: Vec<OutputFormat>,
}

fn category_table(entries: [(ProductCategory, &str); 8]) -> BTreeMap<ProductCategory, String> {
    entries.into_iter().map(|(c, v)| (c, v.to_string())).collect()
}

impl Default for FallbackDefaults {
    fn default() -> Self {
        use ProductCategory::*;

        let lighting_by_environment = [
            ("salon", "soft, even salon lighting with gentle warm accents"),
            ("studio", "controlled softbox studio lighting"),
            ("living", "warm natural window light with soft fill"),
            ("bedroom", "soft morning light through sheer curtains"),
            ("office", "bright neutral daylight"),
            ("kitchen", "bright natural daylight with soft fill"),
            ("dining", "warm ambient light with a gentle overhead glow"),
            ("patio", "natural open-shade daylight"),
            ("garden", "natural open-shade daylight"),
            ("terrace", "natural open-shade daylight"),
            ("loft", "diffused daylight from large industrial windows"),
            ("lobby", "layered warm ambient lighting"),
        ]
        .into_iter()
        .map(|(keyword, lighting)| EnvironmentLighting {
            keyword: keyword.to_string(),
            lighting: lighting.to_string(),
        })
        .collect();

        Self {
            style_by_category: category_table([
                (Seating, "contemporary Scandinavian"),
                (Table, "modern minimalist"),
                (Storage, "warm modern"),
                (Bed, "calm Japandi"),
                (Lighting, "refined contemporary"),
                (Decor, "curated modern"),
                (Outdoor, "relaxed coastal"),
                (General, "modern minimalist"),
            ]),
            environment_by_category: category_table([
                (Seating, "bright modern living room"),
                (Table, "calm home office"),
                (Storage, "styled living room"),
                (Bed, "serene bedroom"),
                (Lighting, "softly lit dining room"),
                (Decor, "styled dining area"),
                (Outdoor, "sunlit garden patio"),
                (General, "bright contemporary loft"),
            ]),
            lighting_by_environment,
            camera_by_category: category_table([
                (Seating, "three-quarter front view at seated eye level"),
                (Table, "elevated three-quarter view showing the top surface"),
                (Storage, "straight-on front view with a slight three-quarter turn"),
                (Bed, "elevated three-quarter view from the foot of the bed"),
                (Lighting, "eye-level view that shows the light source"),
                (Decor, "close three-quarter view at eye level"),
                (Outdoor, "wide three-quarter view at standing eye level"),
                (General, "three-quarter front view at eye level"),
            ]),
            default_style: "modern minimalist".to_string(),
            default_environment: "bright contemporary interior".to_string(),
            default_lighting: "soft diffused natural light".to_string(),
            default_camera_angle: "three-quarter front view at eye level".to_string(),
            default_output_formats: vec![OutputFormat::Png],
        }
    }
}

fn provided(value: &Option<String>) -> Option<&String> {
    value.as_ref().filter(|v| !v.trim().is_empty())
}

pub struct SettingsResolver {
    defaults: FallbackDefaults,
}

impl SettingsResolver {
    pub fn new(defaults: FallbackDefaults) -> Self {
        Self { defaults }
    }

    /// Complete `partial`, recording every field that was defaulted.
    pub fn resolve(
        &self,
        partial: &PartialGenerationSettings,
        category: ProductCategory,
    ) -> ResolvedSettings {
        let mut applied = Vec::new();

        let style = self.resolve_field(&partial.style, SettingField::Style, &mut applied, || {
            self.by_category(&self.defaults.style_by_category, category, &self.defaults.default_style)
        });

        let environment =
            self.resolve_field(&partial.environment, SettingField::Environment, &mut applied, || {
                self.by_category(
                    &self.defaults.environment_by_category,
                    category,
                    &self.defaults.default_environment,
                )
            });

        let lighting = self.resolve_field(&partial.lighting, SettingField::Lighting, &mut applied, || {
            self.lighting_for(&environment)
        });

        let camera_angle =
            self.resolve_field(&partial.camera_angle, SettingField::CameraAngle, &mut applied, || {
                self.by_category(
                    &self.defaults.camera_by_category,
                    category,
                    &self.defaults.default_camera_angle,
                )
            });

        let output_formats = match partial.output_formats.as_ref().filter(|f| !f.is_empty()) {
            Some(formats) => formats.clone(),
            None => {
                let formats = self.defaults.default_output_formats.clone();
                let value = formats.iter().map(|f| f.label()).collect::<Vec<_>>().join(", ");
                applied.push(AppliedFallback {
                    field: SettingField::OutputFormats,
                    value,
                    source: FallbackSource::System,
                });
                formats
            }
        };

        for fallback in &applied {
            debug!(field = %fallback.field, value = %fallback.value, source = ?fallback.source, "applied setting fallback");
        }

        ResolvedSettings {
            settings: GenerationSettings {
                style,
                environment,
                lighting,
                camera_angle,
                output_formats,
                custom_instructions: partial.custom_instructions.clone(),
            },
            applied_fallbacks: applied,
        }
    }

    fn resolve_field(
        &self,
        value: &Option<String>,
        field: SettingField,
        applied: &mut Vec<AppliedFallback>,
        fallback: impl FnOnce() -> (String, FallbackSource),
    ) -> String {
        if let Some(value) = provided(value) {
            return value.clone();
        }
        let (value, source) = fallback();
        applied.push(AppliedFallback { field, value: value.clone(), source });
        value
    }

    fn by_category(
        &self,
        table: &BTreeMap<ProductCategory, String>,
        category: ProductCategory,
        system: &str,
    ) -> (String, FallbackSource) {
        match table.get(&category) {
            Some(value) => (value.clone(), FallbackSource::Category),
            None => (system.to_string(), FallbackSource::System),
        }
    }

    fn lighting_for(&self, environment: &str) -> (String, FallbackSource) {
        let environment = environment.to_lowercase();
        self.defaults
            .lighting_by_environment
            .iter()
            .find(|entry| environment.contains(&entry.keyword.to_lowercase()))
            .map(|entry| (entry.lighting.clone(), FallbackSource::Environment))
            .unwrap_or_else(|| (self.defaults.default_lighting.clone(), FallbackSource::System))
    }
}

impl Default for SettingsResolver {
    fn default() -> Self {
        Self::new(FallbackDefaults::default())
    }
}
