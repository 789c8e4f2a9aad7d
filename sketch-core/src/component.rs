//! UI components - the unit that flows through deduplication and layout.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::geometry::BBox;

/// Unique identifier for a component within one request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Id derived from the detection order, e.g. `comp_007`.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        Self(format!("comp_{index:03}"))
    }

    /// Wrap an id supplied by a design tool.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The closed set of component types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    /// Clickable button.
    Button,
    /// Single-line text entry.
    Input,
    /// Static text.
    Label,
    /// Toggle with a label.
    Checkbox,
    /// Large grouping card.
    Container,
    /// Unclassified fallback.
    Box,
}

impl ComponentType {
    /// All types, in declaration order.
    pub const ALL: [ComponentType; 6] = [
        ComponentType::Button,
        ComponentType::Input,
        ComponentType::Label,
        ComponentType::Checkbox,
        ComponentType::Container,
        ComponentType::Box,
    ];

    /// Lowercase name used on the wire and in markup comments.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ComponentType::Button => "button",
            ComponentType::Input => "input",
            ComponentType::Label => "label",
            ComponentType::Checkbox => "checkbox",
            ComponentType::Container => "container",
            ComponentType::Box => "box",
        }
    }

    /// Whether the text recognizer is consulted for this type.
    #[must_use]
    pub const fn takes_text(self) -> bool {
        matches!(
            self,
            ComponentType::Button
                | ComponentType::Input
                | ComponentType::Label
                | ComponentType::Checkbox
        )
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown component type: {s}"))
    }
}

/// Visual style carried by components that come from a design tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentStyle {
    /// Fill color (CSS color string).
    #[serde(default, alias = "fillColor", skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    /// Border color.
    #[serde(default, alias = "borderColor", skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    /// Border width in pixels.
    #[serde(
        default,
        alias = "borderWidth",
        deserialize_with = "pixels",
        skip_serializing_if = "Option::is_none"
    )]
    pub border_width: Option<f32>,
    /// Border radius in pixels.
    #[serde(
        default,
        alias = "borderRadius",
        deserialize_with = "pixels",
        skip_serializing_if = "Option::is_none"
    )]
    pub border_radius: Option<f32>,
    /// Font size in pixels.
    #[serde(
        default,
        alias = "fontSize",
        deserialize_with = "pixels",
        skip_serializing_if = "Option::is_none"
    )]
    pub font_size: Option<f32>,
    /// Text color.
    #[serde(default, alias = "fontColor", skip_serializing_if = "Option::is_none")]
    pub font_color: Option<String>,
}

/// Pixel length given as a number or as a string such as `"2px"`.
fn pixels<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f32>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Pixels {
        Number(f32),
        Text(String),
    }

    match Option::<Pixels>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Pixels::Number(value)) => Ok(Some(value)),
        Some(Pixels::Text(text)) => {
            let trimmed = text.trim();
            trimmed
                .strip_suffix("px")
                .unwrap_or(trimmed)
                .trim()
                .parse::<f32>()
                .map(Some)
                .map_err(|_| de::Error::custom(format!("invalid pixel length: {text}")))
        }
    }
}

/// A classified UI component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UIComponent {
    /// Unique identifier within the request.
    pub id: ComponentId,
    /// Component type.
    #[serde(rename = "type")]
    pub kind: ComponentType,
    /// Position and size.
    pub bbox: BBox,
    /// Display text, empty until filled.
    #[serde(default)]
    pub text: String,
    /// Style record for pre-styled design-tool components.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<ComponentStyle>,
    /// Original type name when it fell outside the closed set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_kind: Option<String>,
}

impl UIComponent {
    /// Create a new component with empty text and no style.
    #[must_use]
    pub fn new(id: ComponentId, kind: ComponentType, bbox: BBox) -> Self {
        Self {
            id,
            kind,
            bbox,
            text: String::new(),
            style: None,
            source_kind: None,
        }
    }

    /// Set the text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the style.
    #[must_use]
    pub fn with_style(mut self, style: ComponentStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Bounding box area.
    #[must_use]
    pub fn area(&self) -> f32 {
        self.bbox.area()
    }

    /// Type name for placeholder metadata: the original kind if one was kept.
    #[must_use]
    pub fn type_label(&self) -> &str {
        self.source_kind.as_deref().unwrap_or(self.kind.as_str())
    }
}
