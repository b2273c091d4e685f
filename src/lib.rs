//! ForgePrompts Core - Product Prompt Compiler
//!
//! # The Five Laws (Non-Negotiable)
//! 1. Composition Is Pure
//! 2. Rule Tables Are Exhaustive
//! 3. Negatives Only Add
//! 4. Validation Reports, Callers Decide
//! 5. Degrade, Never Block

pub mod product;
pub mod intelligence;
pub mod contexts;
pub mod placement;
pub mod materials;
pub mod negatives;
pub mod settings;
pub mod composer;
pub mod validation;
pub mod config;
pub mod hashing;
pub mod pipeline;

pub use product::{ProductSpecification, Dimensions, DimensionUnit, SpecificationError};
pub use intelligence::{classify, ProductIntelligence, ProductCategory, MaterialProfile, ScaleGuidance};
pub use contexts::ContextPreset;
pub use placement::PlacementType;
pub use materials::MaterialType;
pub use negatives::NegativeSet;
pub use settings::{GenerationSettings, PartialGenerationSettings, SettingsResolver, FallbackDefaults, ResolvedSettings};
pub use composer::{compose_prompt, ComposedPrompt, Composer, SectionId};
pub use validation::{validate_prompt, ValidationReport, Validator};
pub use config::{ComposerConfig, ConfigError};
pub use pipeline::{CompositionPipeline, CompositionRequest, PromptManifest, PipelineError};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MIN_CONFIG_ENGINE_VERSION: &str = "1.0.0";
pub const DEFAULT_MAX_PROMPT_LENGTH: usize = 4000;
