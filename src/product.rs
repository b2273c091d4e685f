//! Product Specification - Request-Scoped Input
//!
//! Supplied by the upstream profile-extraction workflow. Only a missing
//! product name is a hard error; everything else degrades.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SpecificationError {
    #[error("Product specification is missing a product name")]
    MissingProductName,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductSpecification {
    pub product_name: String,
    #[serde(default)]
    pub product_type: String,
    #[serde(default)]
    pub materials_description: String,
    #[serde(default)]
    pub additional_specs_text: String,
    #[serde(default)]
    pub dimensions: Option<Dimensions>,
}

impl ProductSpecification {
    pub fn new(
        product_name: impl Into<String>,
        product_type: impl Into<String>,
        materials_description: impl Into<String>,
    ) -> Self {
        Self {
            product_name: product_name.into(),
            product_type: product_type.into(),
            materials_description: materials_description.into(),
            additional_specs_text: String::new(),
            dimensions: None,
        }
    }

    pub fn with_dimensions(mut self, dimensions: Dimensions) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn with_additional_specs(mut self, text: impl Into<String>) -> Self {
        self.additional_specs_text = text.into();
        self
    }

    /// Boundary check. Called by the pipeline before any derivation.
    pub fn validate(&self) -> Result<(), SpecificationError> {
        if self.product_name.trim().is_empty() {
            return Err(SpecificationError::MissingProductName);
        }
        Ok(())
    }

    /// Dimensions usable for composition, or `None` when absent or malformed.
    pub fn usable_dimensions(&self) -> Option<&Dimensions> {
        self.dimensions.as_ref().filter(|d| d.is_usable())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    #[serde(default)]
    pub unit: DimensionUnit,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DimensionUnit {
    Mm,
    #[default]
    Cm,
    M,
    In,
}

impl DimensionUnit {
    pub fn label(self) -> &'static str {
        match self {
            Self::Mm => "mm",
            Self::Cm => "cm",
            Self::M => "m",
            Self::In => "in",
        }
    }

    fn to_cm_factor(self) -> f64 {
        match self {
            Self::Mm => 0.1,
            Self::Cm => 1.0,
            Self::M => 100.0,
            Self::In => 2.54,
        }
    }
}

impl Dimensions {
    pub fn new(width: f64, height: f64, depth: f64, unit: DimensionUnit) -> Self {
        Self { width, height, depth, unit }
    }

    fn is_usable(&self) -> bool {
        [self.width, self.height, self.depth]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0)
    }

    /// Largest side converted to centimeters.
    pub fn max_extent_cm(&self) -> f64 {
        self.width.max(self.height).max(self.depth) * self.unit.to_cm_factor()
    }

    /// Human-readable "W x H x D unit" clause.
    pub fn describe(&self) -> String {
        format!(
            "{} W x {} H x {} D {}",
            trim_number(self.width),
            trim_number(self.height),
            trim_number(self.depth),
            self.unit.label()
        )
    }
}

fn trim_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_name_is_rejected() {
        let spec = ProductSpecification::new("   ", "desk", "oak");
        assert_eq!(spec.validate(), Err(SpecificationError::MissingProductName));
    }

    #[test]
    fn test_malformed_dimensions_are_ignored() {
        let spec = ProductSpecification::new("Desk", "desk", "oak")
            .with_dimensions(Dimensions::new(120.0, -1.0, 60.0, DimensionUnit::Cm));
        assert!(spec.validate().is_ok());
        assert!(spec.usable_dimensions().is_none());
    }

    #[test]
    fn test_dimension_description_and_extent() {
        let dims = Dimensions::new(40.0, 12.5, 20.0, DimensionUnit::In);
        assert_eq!(dims.describe(), "40 W x 12.5 H x 20 D in");
        assert!((dims.max_extent_cm() - 101.6).abs() < 1e-9);
    }

    #[test]
    fn test_deserializes_camel_case() {
        let spec: ProductSpecification = serde_json::from_str(
            r#"{"productName":"Oak Desk","productType":"desk","materialsDescription":"oak wood"}"#,
        )
        .unwrap();
        assert_eq!(spec.product_name, "Oak Desk");
        assert!(spec.dimensions.is_none());
        assert!(spec.additional_specs_text.is_empty());
    }
}
