//! Pipeline configuration.
//!
//! Every threshold of every stage lives here. Documents may be partial; any
//! key left out takes its default.
//!
//! ```json
//! {
//!   "intake": { "min_area": 500 },
//!   "dedup": { "iou_threshold": 0.8 },
//!   "layout": { "row_coefficient": 0.5 },
//!   "text": { "fallbacks": { "button": "Click me" } }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierConfig;
use crate::dedup::DedupConfig;
use crate::design::DesignConfig;
use crate::layout::LayoutConfig;
use crate::text::TextConfig;
use crate::{SketchError, SketchResult};

/// Observation intake parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeConfig {
    /// Shapes smaller than this area are treated as noise.
    pub min_area: f32,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self { min_area: 500.0 }
    }
}

/// Configuration for the whole conversion pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Noise floor.
    pub intake: IntakeConfig,
    /// Rule table.
    pub classifier: ClassifierConfig,
    /// Duplicate thresholds.
    pub dedup: DedupConfig,
    /// Row grouping.
    pub layout: LayoutConfig,
    /// Design-tool typing.
    pub design: DesignConfig,
    /// Fallback text and normalization.
    pub text: TextConfig,
}

impl PipelineConfig {
    /// Parse a (possibly partial) JSON document and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or a value is out of range.
    pub fn from_json(json: &str) -> SketchResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid config.
    pub fn from_file(path: impl AsRef<Path>) -> SketchResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        tracing::info!("Loaded pipeline config from {}", path.display());
        Self::from_json(&json)
    }

    /// Check that every threshold is usable.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::Config`] naming the first bad value.
    pub fn validate(&self) -> SketchResult<()> {
        fn non_negative(name: &str, value: f32) -> SketchResult<()> {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(SketchError::Config(format!(
                    "{name} must be a finite non-negative number (got {value})"
                )))
            }
        }

        fn unit(name: &str, value: f32) -> SketchResult<()> {
            if value.is_finite() && (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(SketchError::Config(format!(
                    "{name} must be between 0 and 1 (got {value})"
                )))
            }
        }

        non_negative("intake.min_area", self.intake.min_area)?;
        unit("dedup.iou_threshold", self.dedup.iou_threshold)?;
        unit("dedup.containment_ratio", self.dedup.containment_ratio)?;
        unit("dedup.same_type_size_ratio", self.dedup.same_type_size_ratio)?;
        unit("dedup.cross_type_size_ratio", self.dedup.cross_type_size_ratio)?;
        non_negative("layout.row_coefficient", self.layout.row_coefficient)?;
        non_negative("design.input_aspect_ratio", self.design.input_aspect_ratio)?;

        for (i, rule) in self.classifier.rules.iter().enumerate() {
            if !rule.when.is_finite() {
                return Err(SketchError::Config(format!(
                    "classifier.rules[{i}] ({}) has a non-finite bound",
                    rule.component
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::component::ComponentType;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        config.validate().expect("defaults should validate");
        assert!((config.dedup.iou_threshold - 0.75).abs() < f32::EPSILON);
        assert!((config.layout.row_coefficient - 0.6).abs() < f32::EPSILON);
        assert_eq!(config.classifier.rules.len(), 4);
    }

    #[test]
    fn test_partial_document() {
        let config = PipelineConfig::from_json(r#"{"layout": {"row_coefficient": 0.5}}"#)
            .expect("should parse");
        assert!((config.layout.row_coefficient - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.dedup, DedupConfig::default());
        assert_eq!(config.text.fallback(ComponentType::Button), "Button");
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = PipelineConfig::from_json(r#"{"dedup": {"iou_threshold": 1.5}}"#)
            .expect_err("should reject");
        assert!(err.to_string().contains("dedup.iou_threshold"));

        let err = PipelineConfig::from_json(r#"{"layout": {"row_coefficient": -1}}"#)
            .expect_err("should reject");
        assert!(matches!(err, SketchError::Config(_)));
    }

    #[test]
    fn test_invalid_json() {
        let err = PipelineConfig::from_json("{ nope").expect_err("should reject");
        assert!(matches!(err, SketchError::Serialization(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"intake": {{"min_area": 250}}}}"#).expect("write config");

        let config = PipelineConfig::from_file(file.path()).expect("should load");

        assert!((config.intake.min_area - 250.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_missing_file() {
        let err = PipelineConfig::from_file("/definitely/not/here.json").expect_err("should fail");
        assert!(matches!(err, SketchError::Io(_)));
    }

    #[test]
    fn test_classifier_rules_replace_defaults() {
        let config = PipelineConfig::from_json(
            r#"{"classifier": {"rules": [
                {"component": "label", "when": {"height": {"max": 20}}}
            ]}}"#,
        )
        .expect("should parse");
        assert_eq!(config.classifier.rules.len(), 1);
        assert_eq!(config.classifier.rules[0].component, ComponentType::Label);
    }
}
