//! # Shape Classifier
//!
//! Maps the geometry of one observation to a component type using an ordered
//! rule table. The first rule whose predicate holds wins; when none does the
//! shape is typed [`ComponentType::Box`].
//!
//! | Rule      | Condition                                        |
//! |-----------|--------------------------------------------------|
//! | checkbox  | `200 < area < 2000` and `0.8 < ratio < 1.2`      |
//! | input     | `ratio > 2.5` and `h < 60`                       |
//! | button    | `1.5 < ratio < 4` and `h > 30` and `area < 20000`|
//! | container | `area > 40000`                                   |
//!
//! Ranges overlap, so order matters: a small near-square shape has to be
//! checked before the generic button rule.

use serde::{Deserialize, Serialize};

use crate::component::ComponentType;
use crate::geometry::ShapeGeometry;

/// Open interval `(min, max)`; a missing bound is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Range {
    /// Exclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f32>,
    /// Exclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f32>,
}

impl Range {
    /// Unbounded on both sides.
    pub const ANY: Range = Range {
        min: None,
        max: None,
    };

    /// `min < value < max`.
    #[must_use]
    pub const fn between(min: f32, max: f32) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// `value > min`.
    #[must_use]
    pub const fn above(min: f32) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    /// `value < max`.
    #[must_use]
    pub const fn below(max: f32) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Whether `value` lies strictly inside the range.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        self.min.is_none_or(|min| value > min) && self.max.is_none_or(|max| value < max)
    }

    fn is_finite(&self) -> bool {
        self.min.is_none_or(f32::is_finite) && self.max.is_none_or(f32::is_finite)
    }
}

/// Conjunction of ranges over the shape geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapePredicate {
    /// Bounds on `w * h`.
    #[serde(default)]
    pub area: Range,
    /// Bounds on `w / h`.
    #[serde(default)]
    pub aspect_ratio: Range,
    /// Bounds on width.
    #[serde(default)]
    pub width: Range,
    /// Bounds on height.
    #[serde(default)]
    pub height: Range,
}

impl ShapePredicate {
    /// Whether the geometry satisfies every range.
    #[must_use]
    pub fn matches(&self, geometry: &ShapeGeometry) -> bool {
        self.area.contains(geometry.area)
            && self.aspect_ratio.contains(geometry.aspect_ratio)
            && self.width.contains(geometry.w)
            && self.height.contains(geometry.h)
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.area.is_finite()
            && self.aspect_ratio.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
    }
}

/// One row of the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRule {
    /// Type assigned when the predicate holds.
    pub component: ComponentType,
    /// Geometric condition.
    #[serde(default)]
    pub when: ShapePredicate,
}

/// Ordered rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Rules, evaluated first to last.
    pub rules: Vec<ClassificationRule>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rules: vec![
                ClassificationRule {
                    component: ComponentType::Checkbox,
                    when: ShapePredicate {
                        area: Range::between(200.0, 2000.0),
                        aspect_ratio: Range::between(0.8, 1.2),
                        ..ShapePredicate::default()
                    },
                },
                ClassificationRule {
                    component: ComponentType::Input,
                    when: ShapePredicate {
                        aspect_ratio: Range::above(2.5),
                        height: Range::below(60.0),
                        ..ShapePredicate::default()
                    },
                },
                ClassificationRule {
                    component: ComponentType::Button,
                    when: ShapePredicate {
                        area: Range::below(20000.0),
                        aspect_ratio: Range::between(1.5, 4.0),
                        height: Range::above(30.0),
                        width: Range::ANY,
                    },
                },
                ClassificationRule {
                    component: ComponentType::Container,
                    when: ShapePredicate {
                        area: Range::above(40000.0),
                        ..ShapePredicate::default()
                    },
                },
            ],
        }
    }
}

/// Rule-based shape classifier.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    /// Create a classifier over the given rule table.
    #[must_use]
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// The rule table in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[ClassificationRule] {
        &self.config.rules
    }

    /// Classify one shape. Never fails; unmatched shapes are `Box`.
    #[must_use]
    pub fn classify(&self, geometry: &ShapeGeometry) -> ComponentType {
        self.config
            .rules
            .iter()
            .find(|rule| rule.when.matches(geometry))
            .map_or(ComponentType::Box, |rule| rule.component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;

    fn classify(w: f32, h: f32) -> ComponentType {
        Classifier::default().classify(&ShapeGeometry::from(&BBox::new(0.0, 0.0, w, h)))
    }

    #[test]
    fn test_small_square_is_checkbox() {
        assert_eq!(classify(40.0, 40.0), ComponentType::Checkbox);
    }

    #[test]
    fn test_wide_short_is_input() {
        assert_eq!(classify(220.0, 40.0), ComponentType::Input);
    }

    #[test]
    fn test_large_is_container() {
        assert_eq!(classify(300.0, 300.0), ComponentType::Container);
    }

    #[test]
    fn test_noise_sized_falls_back_to_box() {
        assert_eq!(classify(13.0, 13.0), ComponentType::Box);
    }

    #[test]
    fn test_button() {
        // ratio 2.0, h 50, area 5000
        assert_eq!(classify(100.0, 50.0), ComponentType::Button);
        // ratio 3.0 but h 70 is too tall for an input
        assert_eq!(classify(210.0, 70.0), ComponentType::Button);
    }

    #[test]
    fn test_checkbox_checked_before_button() {
        // 40x35: area 1400, ratio ~1.14, would also fail button (ratio < 1.5)
        assert_eq!(classify(40.0, 35.0), ComponentType::Checkbox);
    }

    #[test]
    fn test_input_checked_before_button() {
        // ratio 3.0, h 40, area 4800: both input and button match
        assert_eq!(classify(120.0, 40.0), ComponentType::Input);
    }

    #[test]
    fn test_mid_sized_square_is_box() {
        // area 10000, ratio 1.0: nothing matches
        assert_eq!(classify(100.0, 100.0), ComponentType::Box);
    }

    #[test]
    fn test_bounds_are_exclusive() {
        // area exactly 40000
        assert_eq!(classify(200.0, 200.0), ComponentType::Box);
    }

    #[test]
    fn test_custom_rule_table() {
        let config = ClassifierConfig {
            rules: vec![ClassificationRule {
                component: ComponentType::Label,
                when: ShapePredicate {
                    height: Range::below(20.0),
                    ..ShapePredicate::default()
                },
            }],
        };
        let classifier = Classifier::new(config);
        let geometry = ShapeGeometry::from(&BBox::new(0.0, 0.0, 80.0, 12.0));
        assert_eq!(classifier.classify(&geometry), ComponentType::Label);
        assert_eq!(classifier.rules().len(), 1);
    }

    #[test]
    fn test_empty_rule_table_always_box() {
        let classifier = Classifier::new(ClassifierConfig { rules: vec![] });
        let geometry = ShapeGeometry::from(&BBox::new(0.0, 0.0, 40.0, 40.0));
        assert_eq!(classifier.classify(&geometry), ComponentType::Box);
    }

    #[test]
    fn test_rule_table_roundtrip_json() {
        let json = serde_json::to_string(&ClassifierConfig::default()).expect("should serialize");
        let parsed: ClassifierConfig = serde_json::from_str(&json).expect("should parse");
        assert_eq!(parsed, ClassifierConfig::default());
    }
}
