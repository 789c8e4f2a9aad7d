//! Design-tool payloads.
//!
//! Shapes drawn in a design tool arrive already typed and styled, so the
//! classifier is bypassed. Generic `rect` and `text` shapes are typed from
//! their geometry the same way the tool's own preview does it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::component::{ComponentId, ComponentStyle, ComponentType, UIComponent};
use crate::geometry::RawShape;
use crate::{SketchError, SketchResult};

/// Design intake parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignConfig {
    /// A `rect` wider than this ratio becomes an input, otherwise a button.
    pub input_aspect_ratio: f32,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            input_aspect_ratio: 2.5,
        }
    }
}

/// One shape from a design tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignShape {
    /// Id assigned by the tool, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Shape kind: a component type, `rect`, `text`, or anything else.
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Position and size.
    #[serde(default)]
    pub bbox: RawShape,
    /// Text typed into the shape.
    #[serde(default)]
    pub text: String,
    /// Visual style, decoded per shape so a bad value rejects only this shape.
    #[serde(default, alias = "styles", skip_serializing_if = "Option::is_none")]
    pub style: Option<serde_json::Value>,
}

impl DesignShape {
    /// Shape of the given kind and geometry.
    #[must_use]
    pub fn new(kind: impl Into<String>, bbox: RawShape) -> Self {
        Self {
            kind: Some(kind.into()),
            bbox,
            ..Self::default()
        }
    }

    /// Decode the style record.
    fn decode_style(&self, index: usize) -> SketchResult<Option<ComponentStyle>> {
        self.style
            .as_ref()
            .filter(|value| !value.is_null())
            .map(|value| {
                ComponentStyle::deserialize(value).map_err(|e| SketchError::MalformedShape {
                    index,
                    reason: format!("invalid style: {e}"),
                })
            })
            .transpose()
    }
}

/// Components admitted from a design payload.
#[derive(Debug, Default)]
pub struct DesignIntake {
    /// Typed components in payload order.
    pub components: Vec<UIComponent>,
    /// Shapes that could not be used.
    pub rejected: Vec<SketchError>,
}

/// Types design shapes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesignAdapter {
    config: DesignConfig,
}

impl DesignAdapter {
    /// Create an adapter.
    #[must_use]
    pub fn new(config: DesignConfig) -> Self {
        Self { config }
    }

    /// Convert shapes into components, rejecting malformed ones individually.
    #[must_use]
    pub fn admit(&self, shapes: &[DesignShape]) -> DesignIntake {
        let mut intake = DesignIntake::default();
        let supplied: HashSet<ComponentId> = shapes
            .iter()
            .filter_map(|shape| shape.id.as_deref().filter(|id| !id.is_empty()))
            .map(ComponentId::new)
            .collect();
        let mut seen: HashSet<ComponentId> = HashSet::with_capacity(shapes.len());

        for (index, shape) in shapes.iter().enumerate() {
            match self.admit_one(index, shape, &supplied, &mut seen) {
                Ok(component) => intake.components.push(component),
                Err(err) => {
                    tracing::warn!("Rejecting design shape: {}", err);
                    intake.rejected.push(err);
                }
            }
        }

        tracing::info!(
            "Design intake: {} shapes, {} admitted, {} rejected",
            shapes.len(),
            intake.components.len(),
            intake.rejected.len()
        );

        intake
    }

    fn admit_one(
        &self,
        index: usize,
        shape: &DesignShape,
        supplied: &HashSet<ComponentId>,
        seen: &mut HashSet<ComponentId>,
    ) -> SketchResult<UIComponent> {
        let observation = shape.bbox.validate(index)?;
        let kind = shape
            .kind
            .as_deref()
            .map(str::trim)
            .filter(|kind| !kind.is_empty())
            .ok_or_else(|| SketchError::MalformedShape {
                index,
                reason: "missing kind".to_string(),
            })?;
        let style = shape.decode_style(index)?;

        let id = match shape.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => ComponentId::new(id),
            None => generated_id(index, supplied, seen),
        };
        if !seen.insert(id.clone()) {
            return Err(SketchError::MalformedShape {
                index,
                reason: format!("duplicate id {id}"),
            });
        }

        let (typed, source_kind) = self.resolve_kind(kind, observation.bbox.aspect_ratio());
        if let Some(original) = &source_kind {
            tracing::debug!("Unknown design kind '{}' for {}, using box", original, id);
        }

        let mut component =
            UIComponent::new(id, typed, observation.bbox).with_text(shape.text.trim());
        component.style = style;
        component.source_kind = source_kind;
        Ok(component)
    }

    /// Map a design kind to a component type, keeping unknown kinds.
    fn resolve_kind(&self, kind: &str, aspect_ratio: f32) -> (ComponentType, Option<String>) {
        if kind.eq_ignore_ascii_case("rect") || kind.eq_ignore_ascii_case("rectangle") {
            let typed = if aspect_ratio > self.config.input_aspect_ratio {
                ComponentType::Input
            } else {
                ComponentType::Button
            };
            return (typed, None);
        }
        if kind.eq_ignore_ascii_case("text") {
            return (ComponentType::Label, None);
        }
        match kind.parse::<ComponentType>() {
            Ok(typed) => (typed, None),
            Err(_) => (ComponentType::Box, Some(kind.to_string())),
        }
    }
}

/// Index-derived id that collides with no supplied or already admitted id.
fn generated_id(
    index: usize,
    supplied: &HashSet<ComponentId>,
    seen: &HashSet<ComponentId>,
) -> ComponentId {
    let base = ComponentId::from_index(index);
    let taken = |id: &ComponentId| supplied.contains(id) || seen.contains(id);
    if !taken(&base) {
        return base;
    }
    let stem = base.to_string();
    (1..)
        .map(|n| ComponentId::new(format!("{stem}_{n}")))
        .find(|id| !taken(id))
        .unwrap_or(base)
}
