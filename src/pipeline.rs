//! Composition Pipeline - Single Entry Point
//!
//! compile MUST call validate internally. An invalid report is returned to
//! the caller, not raised: the caller decides whether to submit or recompose.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::composer::{ComposedPrompt, Composer};
use crate::config::ComposerConfig;
use crate::contexts::ContextPreset;
use crate::hashing::{compute_prompt_hash, compute_request_hash};
use crate::intelligence::{classify, ProductIntelligence};
use crate::product::{ProductSpecification, SpecificationError};
use crate::settings::{AppliedFallback, GenerationSettings, PartialGenerationSettings, SettingsResolver};
use crate::validation::{ValidationReport, Validator};
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid specification: {0}")]
    InvalidSpecification(#[from] SpecificationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionRequest {
    pub specification: ProductSpecification,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub settings: PartialGenerationSettings,
    /// Skips classification when supplied.
    #[serde(default)]
    pub intelligence: Option<ProductIntelligence>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptManifest {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub engine_version: String,
    pub context: ContextPreset,
    pub context_defaulted: bool,
    pub intelligence: ProductIntelligence,
    pub settings: GenerationSettings,
    pub applied_fallbacks: Vec<AppliedFallback>,
    pub composed: ComposedPrompt,
    pub prompt: String,
    pub prompt_hash: String,
    pub request_hash: String,
    pub validation: ValidationReport,
}

pub struct CompositionPipeline {
    resolver: SettingsResolver,
    composer: Composer,
    validator: Validator,
}

impl CompositionPipeline {
    pub fn new(config: ComposerConfig) -> Self {
        Self {
            resolver: SettingsResolver::new(config.fallbacks),
            composer: Composer::new(config.max_length),
            validator: Validator::new(config.max_length),
        }
    }

    pub fn resolver(&self) -> &SettingsResolver {
        &self.resolver
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Compose and validate a prompt.
    ///
    /// Only a structurally invalid specification is an error; every other
    /// degradation shows up in the manifest.
    pub fn compile(&self, request: &CompositionRequest) -> Result<PromptManifest, PipelineError> {
        request.specification.validate()?;

        let intelligence = match &request.intelligence {
            Some(intelligence) => intelligence.clone(),
            None => classify(&request.specification),
        };
        let (context, context_defaulted) = ContextPreset::resolve(&request.context);
        let resolved = self.resolver.resolve(&request.settings, intelligence.category);

        let composed = self.composer.compose(
            &request.specification,
            context,
            &resolved.settings,
            &intelligence,
        );
        let prompt = composed.text();

        // MANDATORY: every compiled prompt carries its validation report.
        let validation = self.validator.validate(&prompt);

        let manifest = PromptManifest {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            context,
            context_defaulted,
            intelligence,
            settings: resolved.settings,
            applied_fallbacks: resolved.applied_fallbacks,
            prompt_hash: compute_prompt_hash(&prompt),
            request_hash: compute_request_hash(request, ENGINE_VERSION)?,
            composed,
            prompt,
            validation,
        };

        info!(
            id = %manifest.id,
            context = %manifest.context,
            length = manifest.validation.length,
            valid = manifest.validation.is_valid,
            "compiled prompt"
        );
        Ok(manifest)
    }
}

impl Default for CompositionPipeline {
    fn default() -> Self {
        Self::new(ComposerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::PlacementType;

    fn request(context: &str) -> CompositionRequest {
        CompositionRequest {
            specification: ProductSpecification::new("Oak Desk", "desk", "oak wood"),
            context: context.to_string(),
            settings: PartialGenerationSettings::default(),
            intelligence: None,
        }
    }

    #[test]
    fn test_compile_produces_valid_manifest() {
        let manifest = CompositionPipeline::default().compile(&request("lifestyle")).unwrap();
        assert!(manifest.validation.is_valid, "{:?}", manifest.validation.issues);
        assert_eq!(manifest.context, ContextPreset::Lifestyle);
        assert!(!manifest.context_defaulted);
        assert_eq!(manifest.applied_fallbacks.len(), 5);
        assert_eq!(manifest.prompt, manifest.composed.text());
    }

    #[test]
    fn test_unknown_context_is_reported_not_raised() {
        let manifest = CompositionPipeline::default().compile(&request("billboard")).unwrap();
        assert_eq!(manifest.context, ContextPreset::SAFE_BASELINE);
        assert!(manifest.context_defaulted);
    }

    #[test]
    fn test_missing_name_is_hard_error() {
        let mut req = request("packshot");
        req.specification.product_name = String::new();
        let err = CompositionPipeline::default().compile(&req).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidSpecification(_)));
    }

    #[test]
    fn test_intelligence_override_skips_classifier() {
        let mut req = request("packshot");
        let mut intelligence = classify(&req.specification);
        intelligence.placement_type = PlacementType::WallMounted;
        req.intelligence = Some(intelligence);
        let manifest = CompositionPipeline::default().compile(&req).unwrap();
        assert!(manifest.prompt.contains("PLACEMENT TYPE: wall_mounted"));
    }

    #[test]
    fn test_hashes_are_deterministic() {
        let pipeline = CompositionPipeline::default();
        let a = pipeline.compile(&request("hero-banner")).unwrap();
        let b = pipeline.compile(&request("hero-banner")).unwrap();
        assert_eq!(a.prompt_hash, b.prompt_hash);
        assert_eq!(a.request_hash, b.request_hash);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_small_ceiling_reports_invalid() {
        let config = ComposerConfig { max_length: 500, ..Default::default() };
        let manifest = CompositionPipeline::new(config).compile(&request("packshot")).unwrap();
        assert!(!manifest.validation.is_valid);
        assert_eq!(manifest.validation.max_length, 500);
    }
}
