//! Display text for components.
//!
//! Text comes from an external recognizer and is attached to eligible
//! components after deduplication. Empty results are replaced by a per-type
//! fallback string.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::component::{ComponentId, ComponentType, UIComponent};
use crate::SketchResult;

/// Characters kept by [`normalize_text`] besides alphanumerics and whitespace.
const KEPT_PUNCTUATION: &[char] = &['-', '_', '.', ',', '!', '?'];
/// Characters trimmed from both ends by [`normalize_text`].
const EDGE_PUNCTUATION: &[char] = &['.', ',', '!', '?', '-', '_'];

/// Text policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    /// Fallback text per component type.
    pub fallbacks: BTreeMap<ComponentType, String>,
    /// Whether recognized text is cleaned before use.
    pub normalize: bool,
}

impl Default for TextConfig {
    fn default() -> Self {
        let fallbacks = [
            (ComponentType::Button, "Button"),
            (ComponentType::Input, "Enter text"),
            (ComponentType::Label, "Label"),
            (ComponentType::Checkbox, "Option"),
        ]
        .into_iter()
        .map(|(kind, text)| (kind, text.to_string()))
        .collect();

        Self {
            fallbacks,
            normalize: true,
        }
    }
}

impl TextConfig {
    /// Fallback for `kind`, or `""` if none is configured.
    #[must_use]
    pub fn fallback(&self, kind: ComponentType) -> &str {
        self.fallbacks.get(&kind).map_or("", String::as_str)
    }

    /// `text` if non-empty, else the fallback for `kind`.
    #[must_use]
    pub fn or_fallback<'a>(&'a self, kind: ComponentType, text: &'a str) -> &'a str {
        if text.is_empty() {
            self.fallback(kind)
        } else {
            text
        }
    }
}

/// External text recognition collaborator.
pub trait TextRecognizer {
    /// Best-effort text for one component; empty when nothing was read.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SketchError::Recognition`] when the recognizer is
    /// unavailable. The whole request fails in that case.
    fn recognize(&self, component: &UIComponent) -> SketchResult<String>;
}

/// Recognizer that never reads anything; every component gets its fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRecognizer;

impl TextRecognizer for NoRecognizer {
    fn recognize(&self, _component: &UIComponent) -> SketchResult<String> {
        Ok(String::new())
    }
}

/// Text guesses already attached by the upstream detector, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct PresetText {
    texts: HashMap<ComponentId, String>,
}

impl PresetText {
    /// Create an empty preset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the guess for one component.
    pub fn insert(&mut self, id: ComponentId, text: impl Into<String>) {
        self.texts.insert(id, text.into());
    }

    /// Number of guesses held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Whether no guesses are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }
}

impl FromIterator<(ComponentId, String)> for PresetText {
    fn from_iter<I: IntoIterator<Item = (ComponentId, String)>>(iter: I) -> Self {
        Self {
            texts: iter.into_iter().collect(),
        }
    }
}

impl TextRecognizer for PresetText {
    fn recognize(&self, component: &UIComponent) -> SketchResult<String> {
        Ok(self.texts.get(&component.id).cloned().unwrap_or_default())
    }
}

/// Clean OCR output.
///
/// Collapses whitespace, drops stray symbols, trims edge punctuation and
/// upper-cases a leading letter.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let filtered: String = collapsed
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || KEPT_PUNCTUATION.contains(c))
        .collect();

    let trimmed = filtered.trim_matches(EDGE_PUNCTUATION).trim();

    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() => first.to_uppercase().chain(chars).collect(),
        _ => trimmed.to_string(),
    }
}

/// Attach display text to every eligible component.
///
/// Components that take no text are left untouched.
///
/// # Errors
///
/// Propagates the first recognizer failure.
pub fn fill_text(
    components: &mut [UIComponent],
    recognizer: &dyn TextRecognizer,
    config: &TextConfig,
) -> SketchResult<()> {
    for component in components.iter_mut().filter(|c| c.kind.takes_text()) {
        let raw = recognizer.recognize(component)?;
        let text = if config.normalize {
            normalize_text(&raw)
        } else {
            raw
        };

        if text.is_empty() {
            component.text = config.fallback(component.kind).to_string();
            tracing::debug!(
                "Using fallback text for {}: '{}'",
                component.id,
                component.text
            );
        } else {
            component.text = text;
        }
        tracing::info!(
            "Text for {} ({}): '{}'",
            component.id,
            component.kind,
            component.text
        );
    }
    Ok(())
}

/// Replace empty text on eligible components with the fallback.
///
/// Used for design-tool payloads where text arrives with the shape.
pub fn apply_fallbacks(components: &mut [UIComponent], config: &TextConfig) {
    for component in components.iter_mut().filter(|c| c.kind.takes_text()) {
        if component.text.is_empty() {
            component.text = config.fallback(component.kind).to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BBox;
    use crate::SketchError;

    struct Failing;

    impl TextRecognizer for Failing {
        fn recognize(&self, _component: &UIComponent) -> SketchResult<String> {
            Err(SketchError::Recognition("engine offline".to_string()))
        }
    }

    fn comp(index: usize, kind: ComponentType) -> UIComponent {
        UIComponent::new(
            ComponentId::from_index(index),
            kind,
            BBox::new(0.0, 0.0, 10.0, 10.0),
        )
    }

    #[test]
    fn test_normalize_collapses_and_capitalizes() {
        assert_eq!(normalize_text("  submit   form \n"), "Submit form");
    }

    #[test]
    fn test_normalize_strips_artifacts() {
        assert_eq!(normalize_text("|login|"), "Login");
        assert_eq!(normalize_text("...ok!"), "Ok");
        assert_eq!(normalize_text("~~~"), "");
    }

    #[test]
    fn test_normalize_keeps_leading_digit() {
        assert_eq!(normalize_text("2 items"), "2 items");
    }

    #[test]
    fn test_default_fallbacks() {
        let config = TextConfig::default();
        assert_eq!(config.fallback(ComponentType::Button), "Button");
        assert_eq!(config.fallback(ComponentType::Input), "Enter text");
        assert_eq!(config.fallback(ComponentType::Label), "Label");
        assert_eq!(config.fallback(ComponentType::Checkbox), "Option");
        assert_eq!(config.fallback(ComponentType::Container), "");
    }

    #[test]
    fn test_fill_text_uses_preset_and_fallback() {
        let mut components = vec![
            comp(0, ComponentType::Button),
            comp(1, ComponentType::Input),
            comp(2, ComponentType::Container),
        ];
        let preset: PresetText = [(ComponentId::from_index(0), "sign in".to_string())]
            .into_iter()
            .collect();

        fill_text(&mut components, &preset, &TextConfig::default()).expect("should fill");

        assert_eq!(components[0].text, "Sign in");
        assert_eq!(components[1].text, "Enter text");
        assert_eq!(components[2].text, "");
    }

    #[test]
    fn test_fill_text_without_normalization() {
        let mut components = vec![comp(0, ComponentType::Label)];
        let mut preset = PresetText::new();
        preset.insert(ComponentId::from_index(0), "name:");
        let config = TextConfig {
            normalize: false,
            ..TextConfig::default()
        };

        fill_text(&mut components, &preset, &config).expect("should fill");

        assert_eq!(components[0].text, "name:");
    }

    #[test]
    fn test_fill_text_propagates_failure() {
        let mut components = vec![comp(0, ComponentType::Button)];
        let err = fill_text(&mut components, &Failing, &TextConfig::default())
            .expect_err("should fail");
        assert!(matches!(err, SketchError::Recognition(_)));
    }

    #[test]
    fn test_fill_text_skips_ineligible_without_calling_recognizer() {
        let mut components = vec![comp(0, ComponentType::Box), comp(1, ComponentType::Container)];
        fill_text(&mut components, &Failing, &TextConfig::default()).expect("nothing to read");
    }

    #[test]
    fn test_apply_fallbacks_keeps_existing_text() {
        let mut components = vec![
            comp(0, ComponentType::Button).with_text("Go"),
            comp(1, ComponentType::Checkbox),
        ];
        apply_fallbacks(&mut components, &TextConfig::default());
        assert_eq!(components[0].text, "Go");
        assert_eq!(components[1].text, "Option");
    }

    #[test]
    fn test_fallbacks_from_json() {
        let config: TextConfig =
            serde_json::from_str(r#"{"fallbacks": {"button": "Click"}}"#).expect("should parse");
        assert_eq!(config.fallback(ComponentType::Button), "Click");
        assert_eq!(config.fallback(ComponentType::Input), "");
        assert!(config.normalize);
    }
}
