//! End-to-end conversion.
//!
//! ```text
//! RawShape[] ─▶ intake ─▶ classify ─▶ dedup ─▶ text ─▶ layout ─▶ emit
//! DesignShape[] ─▶ design intake ────▶ dedup ─▶ text ─▶ layout ─▶ emit
//! ```
//!
//! Every stage is a pure function of its input and the configuration, so a
//! pipeline can be shared between concurrent requests.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::classifier::Classifier;
use crate::component::{ComponentId, ComponentType, UIComponent};
use crate::config::PipelineConfig;
use crate::dedup::{Duplicate, DuplicateResolver};
use crate::design::{DesignAdapter, DesignShape};
use crate::error::IntegrityError;
use crate::geometry::{RawShape, ShapeObservation};
use crate::layout::{LayoutNode, LayoutSynthesizer};
use crate::markup::{Markup, MarkupEmitter, StyleMode};
use crate::text::{self, TextRecognizer};
use crate::SketchResult;

/// Counts and diagnostics for one conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConversionReport {
    /// Shapes in the request.
    pub observed: usize,
    /// Shapes rejected as malformed.
    pub rejected: Vec<String>,
    /// Shapes dropped under the noise floor.
    pub noise_filtered: usize,
    /// Components removed as duplicates.
    pub duplicates: Vec<Duplicate>,
    /// Components placed in the layout tree.
    pub placed: usize,
    /// Surviving component count per type.
    pub types: BTreeMap<ComponentType, usize>,
    /// Conservation violations.
    pub integrity_errors: Vec<IntegrityError>,
    /// Recoverable oddities worth surfacing to the caller.
    pub warnings: Vec<String>,
}

/// Result of a conversion.
#[derive(Debug, Clone, Serialize)]
pub struct Conversion {
    /// HTML and CSS.
    pub markup: Markup,
    /// Deduplicated, typed, text-filled components, largest first.
    pub components: Vec<UIComponent>,
    /// Layout tree the markup was rendered from.
    pub tree: LayoutNode,
    /// Diagnostics.
    pub report: ConversionReport,
}

/// The full conversion pipeline.
#[derive(Debug, Clone, Default)]
pub struct SketchPipeline {
    config: PipelineConfig,
    classifier: Classifier,
    resolver: DuplicateResolver,
    synthesizer: LayoutSynthesizer,
    design: DesignAdapter,
}

impl SketchPipeline {
    /// Build the stages from a configuration.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            classifier: Classifier::new(config.classifier.clone()),
            resolver: DuplicateResolver::new(config.dedup),
            synthesizer: LayoutSynthesizer::new(config.layout),
            design: DesignAdapter::new(config.design),
            config,
        }
    }

    /// The configuration the stages were built from.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Convert detector output.
    ///
    /// Malformed shapes are rejected one by one and reported; they never fail
    /// the request.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SketchError::Recognition`] if the text recognizer fails.
    pub fn convert_shapes(
        &self,
        shapes: &[RawShape],
        recognizer: &dyn TextRecognizer,
        mode: StyleMode,
    ) -> SketchResult<Conversion> {
        let mut report = ConversionReport {
            observed: shapes.len(),
            ..ConversionReport::default()
        };
        tracing::info!("Converting {} raw shapes", shapes.len());

        let observations = self.admit(shapes, &mut report);
        let classified: Vec<UIComponent> = observations
            .iter()
            .map(|observation| self.classify(observation))
            .collect();
        tracing::info!(
            "Detection pass: {} components, {} noise filtered, {} rejected",
            classified.len(),
            report.noise_filtered,
            report.rejected.len()
        );

        let resolution = self.resolver.resolve(classified);
        report.duplicates = resolution.duplicates;
        let mut components = resolution.kept;

        text::fill_text(&mut components, recognizer, &self.config.text)?;

        Ok(self.finish(components, mode, report))
    }

    /// Convert a design-tool payload. The classifier is bypassed.
    ///
    /// # Errors
    ///
    /// Currently infallible; the signature matches
    /// [`SketchPipeline::convert_shapes`] so callers can treat both alike.
    pub fn convert_design(
        &self,
        shapes: &[DesignShape],
        mode: StyleMode,
    ) -> SketchResult<Conversion> {
        let mut report = ConversionReport {
            observed: shapes.len(),
            ..ConversionReport::default()
        };
        tracing::info!("Converting {} design shapes", shapes.len());

        let intake = self.design.admit(shapes);
        report.rejected = intake.rejected.iter().map(ToString::to_string).collect();

        let resolution = self.resolver.resolve(intake.components);
        report.duplicates = resolution.duplicates;
        let mut components = resolution.kept;

        text::apply_fallbacks(&mut components, &self.config.text);

        Ok(self.finish(components, mode, report))
    }

    /// Validate shapes and drop noise.
    fn admit(&self, shapes: &[RawShape], report: &mut ConversionReport) -> Vec<ShapeObservation> {
        let mut observations = Vec::with_capacity(shapes.len());
        for (index, raw) in shapes.iter().enumerate() {
            match raw.validate(index) {
                Ok(observation) if observation.bbox.area() < self.config.intake.min_area => {
                    tracing::debug!(
                        "Shape {} below noise floor (area {:.0})",
                        index,
                        observation.bbox.area()
                    );
                    report.noise_filtered += 1;
                }
                Ok(observation) => observations.push(observation),
                Err(err) => {
                    tracing::warn!("Rejecting shape: {}", err);
                    report.rejected.push(err.to_string());
                }
            }
        }
        observations
    }

    fn classify(&self, observation: &ShapeObservation) -> UIComponent {
        let kind = self.classifier.classify(&observation.geometry());
        UIComponent::new(
            ComponentId::from_index(observation.index),
            kind,
            observation.bbox,
        )
    }

    /// Layout, emission and the final consistency checks shared by both paths.
    fn finish(
        &self,
        components: Vec<UIComponent>,
        mode: StyleMode,
        mut report: ConversionReport,
    ) -> Conversion {
        for component in &components {
            *report.types.entry(component.kind).or_default() += 1;
        }
        tracing::info!("Component types: {:?}", report.types);

        let layout = self.synthesizer.synthesize(&components);
        report.placed = layout.root.leaves().len();
        report.integrity_errors = layout.integrity_errors;

        if components.len() != report.observed {
            let message = format!(
                "{} of {} observations became components ({} rejected, {} noise, {} duplicates)",
                components.len(),
                report.observed,
                report.rejected.len(),
                report.noise_filtered,
                report.duplicates.len()
            );
            tracing::warn!("{}", message);
            report.warnings.push(message);
        }

        let markup = MarkupEmitter::new(&self.config.text).emit(&layout.root, mode);

        Conversion {
            markup,
            components,
            tree: layout.root,
            report,
        }
    }
}
