//! Contract Invariant Tests
//!
//! These tests verify the non-negotiable guarantees.

use forgeprompts_core::{
    classify,
    composer::{negative_constraints, CompositionInputs},
    compose_prompt,
    negatives::{NegativeSet, BASELINE_IDS},
    settings::OutputFormat,
    validate_prompt, ContextPreset, GenerationSettings, PartialGenerationSettings, PlacementType,
    ProductIntelligence, ProductSpecification, SettingsResolver, Validator,
};
use proptest::prelude::*;

fn fixtures() -> Vec<ProductSpecification> {
    vec![
        ProductSpecification::new("Oak Desk", "desk", "oak wood"),
        ProductSpecification::new("Float", "wall shelf", "walnut with brass brackets"),
        ProductSpecification::new("Orb", "pendant lamp", "glass and brass"),
        ProductSpecification::new("Lounge", "armchair", "steel frame with leather seat"),
        ProductSpecification::new("Column", "vase", "marble"),
        ProductSpecification::new("Nest", "chair", "rattan"),
        ProductSpecification::new("Cloud", "sofa", "linen upholstery on a beech frame"),
        ProductSpecification::new("Thing", "gizmo", "unobtainium"),
    ]
}

fn resolved_settings(intelligence: &ProductIntelligence) -> GenerationSettings {
    SettingsResolver::default()
        .resolve(&PartialGenerationSettings::default(), intelligence.category)
        .settings
}

fn compose_text(spec: &ProductSpecification, preset: ContextPreset) -> String {
    let intel = classify(spec);
    let settings = resolved_settings(&intel);
    compose_prompt(spec, preset, &settings, &intel).text()
}

fn compose_with_placement(
    spec: &ProductSpecification,
    preset: ContextPreset,
    placement: PlacementType,
) -> String {
    let mut intel = classify(spec);
    intel.placement_type = placement;
    let settings = resolved_settings(&intel);
    compose_prompt(spec, preset, &settings, &intel).text()
}

#[test]
fn invariant_contexts_are_disjoint() {
    for spec in fixtures() {
        for a in ContextPreset::ALL {
            for b in ContextPreset::ALL.into_iter().filter(|b| *b != a) {
                let output = compose_text(&spec, b).to_lowercase();
                for marker in a.rule().markers {
                    assert!(
                        !output.contains(marker),
                        "{} marker '{}' leaked into {} output for {}",
                        a,
                        marker,
                        b,
                        spec.product_name
                    );
                }
            }
        }
    }
}

#[test]
fn invariant_context_markers_present() {
    for spec in fixtures() {
        for preset in ContextPreset::ALL {
            let output = compose_text(&spec, preset).to_lowercase();
            for marker in preset.rule().markers {
                assert!(output.contains(marker), "{} output lacks '{}'", preset, marker);
            }
        }
    }
}

#[test]
fn invariant_negatives_are_additive() {
    let spec = ProductSpecification::new("Oak Desk", "desk", "oak wood");
    let intel = classify(&spec);
    let settings = resolved_settings(&intel);
    let baseline = NegativeSet::baseline(&[]);

    for preset in ContextPreset::ALL {
        for placement in PlacementType::ALL {
            let mut intel = intel.clone();
            intel.placement_type = placement;
            let inputs = CompositionInputs::new(&spec, preset, &settings, &intel);
            let set = negative_constraints(&inputs);
            assert!(set.contains_all(&baseline), "{preset}/{placement} dropped a baseline");

            let output = compose_prompt(&spec, preset, &settings, &intel).text();
            for constraint in set.iter() {
                assert!(output.contains(&constraint.text), "{} missing from output", constraint.id);
            }
        }
    }
    assert_eq!(baseline.ids(), BASELINE_IDS.to_vec());
}

#[test]
fn invariant_placement_exhaustive() {
    for spec in fixtures() {
        for preset in ContextPreset::ALL {
            for placement in PlacementType::ALL {
                let output = compose_with_placement(&spec, preset, placement);
                let rule = placement.rule();

                assert!(output.contains(&format!("PLACEMENT TYPE: {}", placement)));
                assert!(output.contains(rule.general));

                if placement != PlacementType::Other {
                    assert!(
                        rule.mandatory.iter().any(|m| output.contains(m)),
                        "{placement}/{preset}: no mandatory phrase"
                    );
                }
                let found = rule.prohibited_in(&output);
                assert!(found.is_empty(), "{placement}/{preset}: prohibited {:?}", found);

                if matches!(placement, PlacementType::WallMounted | PlacementType::CeilingMounted) {
                    assert!(
                        !output.to_lowercase().contains("contact shadow"),
                        "{placement}/{preset}: contact shadow contradicts zero floor contact"
                    );
                }
            }
        }
    }
}

#[test]
fn invariant_composed_prompts_validate() {
    let validator = Validator::default();
    for spec in fixtures() {
        for preset in ContextPreset::ALL {
            for placement in PlacementType::ALL {
                let output = compose_with_placement(&spec, preset, placement);
                let report = validator.validate(&output);
                assert!(
                    report.is_valid,
                    "{}/{}/{}: {:?}",
                    spec.product_name,
                    preset,
                    placement,
                    report.issues
                );
                assert!(report.length <= 4000);
            }
        }
    }
}

#[test]
fn scenario_a_oak_desk_packshot() {
    let spec = ProductSpecification::new("Oak Desk", "desk", "oak wood");
    let output = compose_text(&spec, ContextPreset::Packshot);
    let lowered = output.to_lowercase();

    assert!(lowered.contains("pure white"));
    assert!(lowered.contains("no environmental elements"));
    for marker in ContextPreset::Lifestyle.rule().markers {
        assert!(!lowered.contains(marker));
    }
    assert!(!output.contains("Setting:"));
}

#[test]
fn scenario_b_wall_shelf() {
    let spec = ProductSpecification::new("Float", "wall shelf", "oak");
    let intel = classify(&spec);
    assert_eq!(intel.placement_type, PlacementType::WallMounted);

    let output = compose_text(&spec, ContextPreset::Lifestyle);
    assert!(output.contains("minimum 30 cm clearance between the underside and the floor"));
    assert!(output.to_lowercase().contains("no floor contact"));
    assert!(PlacementType::WallMounted.rule().prohibited_in(&output).is_empty());
}

#[test]
fn scenario_c_salon_lighting() {
    let partial = PartialGenerationSettings {
        environment: Some("salon".to_string()),
        ..Default::default()
    };
    let resolved = SettingsResolver::default().resolve(&partial, forgeprompts_core::ProductCategory::Seating);
    assert!(resolved.settings.lighting.contains("salon"));
    assert!(resolved
        .applied_fallbacks
        .iter()
        .any(|f| f.field == forgeprompts_core::settings::SettingField::Lighting));
}

#[test]
fn scenario_d_padded_text_fails() {
    let base = compose_text(&ProductSpecification::new("Oak Desk", "desk", "oak"), ContextPreset::Packshot);
    let padded = format!("{}\n{}", base, "lorem ipsum ".repeat(400));
    let report = validate_prompt(&padded, 4000);

    assert!(!report.is_valid);
    assert!(report.length > 4000);
    assert!(report.issues.iter().any(|i| i.contains("exceeds maximum of 4000")));
    assert!(report.suggestions.iter().any(|s| s.contains("Reduce verbosity")));
}

#[test]
fn invariant_dropped_section_is_reported() {
    let spec = ProductSpecification::new("Oak Desk", "desk", "oak wood");
    let intel = classify(&spec);
    let settings = resolved_settings(&intel);
    let mut prompt = compose_prompt(&spec, ContextPreset::Lifestyle, &settings, &intel);
    prompt
        .sections
        .retain(|s| s.id != forgeprompts_core::SectionId::CorrectiveConstraints);

    let report = Validator::default().validate(&prompt.text());
    assert!(!report.is_valid);
    assert!(report.issues.iter().any(|i| i.contains("human_exclusion")));
}

fn spec_strategy() -> impl Strategy<Value = ProductSpecification> {
    (
        "[A-Z][a-z]{2,10}( [A-Z][a-z]{2,10})?",
        prop::sample::select(vec![
            "desk", "wall shelf", "pendant lamp", "sofa", "vase", "bed", "gizmo", "table lamp",
        ]),
        prop::sample::select(vec![
            "oak", "steel and glass", "linen", "leather", "marble", "rattan", "unknown", "",
        ]),
    )
        .prop_map(|(name, product_type, materials)| {
            ProductSpecification::new(name, product_type, materials)
        })
}

fn settings_strategy() -> impl Strategy<Value = GenerationSettings> {
    (
        "[a-z][a-z ]{0,20}",
        "[a-z][a-z ]{0,20}",
        "[a-z][a-z ]{0,20}",
        "[a-z][a-z ]{0,20}",
        prop::collection::vec(
            prop::sample::select(vec![OutputFormat::Png, OutputFormat::Jpeg, OutputFormat::Webp]),
            1..3,
        ),
        proptest::option::of("[A-Za-z][A-Za-z ]{0,40}"),
    )
        .prop_map(|(style, environment, lighting, camera_angle, output_formats, custom)| {
            GenerationSettings {
                style,
                environment,
                lighting,
                camera_angle,
                output_formats,
                custom_instructions: custom,
            }
        })
}

proptest! {
    #[test]
    fn prop_composition_is_deterministic(
        spec in spec_strategy(),
        preset in prop::sample::select(ContextPreset::ALL.to_vec()),
        settings in settings_strategy(),
    ) {
        let intel = classify(&spec);
        let first = compose_prompt(&spec, preset, &settings, &intel);
        let second = compose_prompt(&spec, preset, &settings, &intel);
        prop_assert_eq!(first.text(), second.text());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_fallback_resolution_is_idempotent(settings in settings_strategy()) {
        let resolver = SettingsResolver::default();
        for category in forgeprompts_core::ProductCategory::ALL {
            let resolved = resolver.resolve(&settings.clone().into(), category);
            prop_assert_eq!(&resolved.settings, &settings);
            prop_assert!(resolved.applied_fallbacks.is_empty());
        }
    }

    #[test]
    fn prop_resolving_twice_changes_nothing(
        environment in proptest::option::of("[a-z][a-z ]{0,20}"),
        category in prop::sample::select(forgeprompts_core::ProductCategory::ALL.to_vec()),
    ) {
        let resolver = SettingsResolver::default();
        let partial = PartialGenerationSettings { environment, ..Default::default() };
        let once = resolver.resolve(&partial, category);
        let twice = resolver.resolve(&once.settings.clone().into(), category);
        prop_assert_eq!(twice.settings, once.settings);
        prop_assert!(twice.applied_fallbacks.is_empty());
    }

    #[test]
    fn prop_over_ceiling_is_invalid(max in 1usize..5000, extra in 1usize..500) {
        let text = "a".repeat(max + extra);
        let report = validate_prompt(&text, max);
        prop_assert!(!report.is_valid);
        prop_assert!(!report.issues.is_empty());
        prop_assert_eq!(report.length, max + extra);
    }
}
