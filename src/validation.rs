//! Validation System - Rule/Policy Separation
//!
//! Rules produce structured violations.
//! The report projects errors into issues and remediation into suggestions.
//! Validation never fails; callers decide whether to regenerate.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::negatives::HUMAN_EXCLUSION_MARKER;
use crate::placement::{PlacementType, PLACEMENT_MARKER};
use crate::DEFAULT_MAX_PROMPT_LENGTH;

/// Share of the ceiling above which a headroom warning is emitted.
const HEADROOM_WARNING_RATIO: f64 = 0.9;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ViolationSeverity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub severity: ViolationSeverity,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub remediation: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub length: usize,
    pub max_length: usize,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
    pub violations: Vec<ValidationViolation>,
}

impl ValidationReport {
    fn from_violations(length: usize, max_length: usize, violations: Vec<ValidationViolation>) -> Self {
        let issues: Vec<String> = violations
            .iter()
            .filter(|v| v.severity == ViolationSeverity::Error)
            .map(|v| v.message.clone())
            .collect();

        let mut suggestions: Vec<String> = Vec::new();
        for remedy in violations.iter().flat_map(|v| v.remediation.iter()) {
            if !suggestions.contains(remedy) {
                suggestions.push(remedy.clone());
            }
        }

        Self {
            is_valid: issues.is_empty(),
            length,
            max_length,
            issues,
            suggestions,
            violations,
        }
    }

    pub fn has_warnings(&self) -> bool {
        self.violations.iter().any(|v| v.severity == ViolationSeverity::Warning)
    }
}

/// What a rule sees.
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub text: &'a str,
    pub length: usize,
    pub max_length: usize,
}

/// Validation rule trait - produces violations
pub trait PromptRule {
    fn name(&self) -> &'static str;
    fn check(&self, input: &PromptInput<'_>) -> Vec<ValidationViolation>;
}

// --- Concrete Rules ---

pub struct EmptyPromptRule;

impl PromptRule for EmptyPromptRule {
    fn name(&self) -> &'static str { "empty_prompt" }

    fn check(&self, input: &PromptInput<'_>) -> Vec<ValidationViolation> {
        if !input.text.trim().is_empty() {
            return vec![];
        }
        vec![ValidationViolation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Error,
            message: "Prompt is empty".to_string(),
            expected: Some("non-empty prompt text".to_string()),
            actual: None,
            remediation: vec!["Recompose the prompt from the product specification".to_string()],
        }]
    }
}

pub struct LengthRule;

impl PromptRule for LengthRule {
    fn name(&self) -> &'static str { "length" }

    fn check(&self, input: &PromptInput<'_>) -> Vec<ValidationViolation> {
        if input.length <= input.max_length {
            return vec![];
        }
        vec![ValidationViolation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Error,
            message: format!(
                "Prompt length {} exceeds maximum of {} characters",
                input.length, input.max_length
            ),
            expected: Some(format!("<= {} characters", input.max_length)),
            actual: Some(format!("{} characters", input.length)),
            remediation: vec![format!(
                "Reduce verbosity by at least {} characters: shorten custom instructions \
                 and additional specifications, or compose in compact mode",
                input.length - input.max_length
            )],
        }]
    }
}

pub struct LengthHeadroomRule;

impl PromptRule for LengthHeadroomRule {
    fn name(&self) -> &'static str { "length_headroom" }

    fn check(&self, input: &PromptInput<'_>) -> Vec<ValidationViolation> {
        let threshold = (input.max_length as f64 * HEADROOM_WARNING_RATIO) as usize;
        if input.length <= threshold || input.length > input.max_length {
            return vec![];
        }
        vec![ValidationViolation {
            rule: self.name().to_string(),
            severity: ViolationSeverity::Warning,
            message: "Prompt is close to the length ceiling".to_string(),
            expected: Some(format!("<= {} characters for headroom", threshold)),
            actual: Some(format!("{} characters", input.length)),
            remediation: vec![
                "Keep custom instructions brief to leave room for later additions".to_string(),
            ],
        }]
    }
}

/// Marker phrases proving critical sections were not dropped.
pub const REQUIRED_MARKERS: [(&str, &str, &str); 5] = [
    (
        "human_exclusion",
        HUMAN_EXCLUSION_MARKER,
        "Restore the human-exclusion directive in the corrective constraints",
    ),
    (
        "placement_type",
        PLACEMENT_MARKER,
        "Restore the placement section naming the placement type",
    ),
    (
        "product_preservation",
        "PRODUCT PRESERVATION:",
        "Restore the product preservation section",
    ),
    ("output_format", "OUTPUT FORMAT:", "Restore the output format section"),
    ("final_validation", "FINAL VALIDATION:", "Restore the final validation section"),
];

pub struct RequiredMarkersRule;

impl PromptRule for RequiredMarkersRule {
    fn name(&self) -> &'static str { "required_markers" }

    fn check(&self, input: &PromptInput<'_>) -> Vec<ValidationViolation> {
        REQUIRED_MARKERS
            .iter()
            .filter(|(_, marker, _)| !input.text.contains(marker))
            .map(|(label, marker, remedy)| ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: format!("Missing required marker '{}' ({})", marker, label),
                expected: Some((*marker).to_string()),
                actual: None,
                remediation: vec![(*remedy).to_string()],
            })
            .collect()
    }
}

pub struct PlacementConsistencyRule;

impl PlacementConsistencyRule {
    /// Placement type named right after the placement marker.
    pub fn declared_placement(text: &str) -> Option<PlacementType> {
        let start = text.find(PLACEMENT_MARKER)? + PLACEMENT_MARKER.len();
        let value: String = text[start..]
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        match PlacementType::from_str_lossy(&value) {
            PlacementType::Other => None,
            placement => Some(placement),
        }
    }
}

impl PromptRule for PlacementConsistencyRule {
    fn name(&self) -> &'static str { "placement_consistency" }

    fn check(&self, input: &PromptInput<'_>) -> Vec<ValidationViolation> {
        let Some(placement) = Self::declared_placement(input.text) else {
            return vec![];
        };
        placement
            .rule()
            .prohibited_in(input.text)
            .into_iter()
            .map(|phrase| ValidationViolation {
                rule: self.name().to_string(),
                severity: ViolationSeverity::Error,
                message: format!("Contradictory placement phrase '{}' for {}", phrase, placement),
                expected: Some(format!("no {} prohibited phrasing", placement)),
                actual: Some(phrase.to_string()),
                remediation: vec![format!(
                    "Remove '{}' from settings or custom instructions",
                    phrase
                )],
            })
            .collect()
    }
}

/// Validator orchestrates rules and applies policy
pub struct Validator {
    max_length: usize,
    rules: Vec<Box<dyn PromptRule + Send + Sync>>,
}

impl Validator {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            rules: vec![
                Box::new(EmptyPromptRule),
                Box::new(LengthRule),
                Box::new(LengthHeadroomRule),
                Box::new(RequiredMarkersRule),
                Box::new(PlacementConsistencyRule),
            ],
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn validate(&self, text: &str) -> ValidationReport {
        let input = PromptInput {
            text,
            length: text.chars().count(),
            max_length: self.max_length,
        };

        let violations: Vec<_> = self.rules.iter().flat_map(|rule| rule.check(&input)).collect();
        let report = ValidationReport::from_violations(input.length, self.max_length, violations);

        if !report.is_valid {
            warn!(
                length = report.length,
                max = report.max_length,
                issues = report.issues.len(),
                "prompt failed validation"
            );
        }
        report
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PROMPT_LENGTH)
    }
}

/// Validate against an explicit ceiling.
pub fn validate_prompt(text: &str, max_length: usize) -> ValidationReport {
    Validator::new(max_length).validate(text)
}
