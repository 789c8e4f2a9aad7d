//! # Saorsa Sketch Core
//!
//! Turns shapes detected in a hand-drawn UI sketch, or shapes exported from a
//! design tool, into an HTML fragment and stylesheet.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                sketch-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Intake           │  Shape Classifier       │
//! │  - Validation     │  - Ordered rule table   │
//! │  - Noise floor    │  - Box fallback         │
//! ├─────────────────────────────────────────────┤
//! │  Duplicate        │  Layout Synthesizer     │
//! │  Resolver         │  - Row grouping         │
//! │  - IoU            │  - Conservation check   │
//! │  - Containment    │                         │
//! ├─────────────────────────────────────────────┤
//! │  Text             │  Markup Emitter         │
//! │  - Recognizer     │  - Per-type templates   │
//! │  - Fallbacks      │  - Classes / inline     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! [`SketchPipeline`] wires the stages together.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classifier;
pub mod component;
pub mod config;
pub mod dedup;
pub mod design;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod markup;
pub mod pipeline;
pub mod text;

pub use classifier::{ClassificationRule, Classifier, ClassifierConfig, Range, ShapePredicate};
pub use component::{ComponentId, ComponentStyle, ComponentType, UIComponent};
pub use config::{IntakeConfig, PipelineConfig};
pub use dedup::{DedupConfig, Duplicate, DuplicateReason, DuplicateResolver, Resolution};
pub use design::{DesignAdapter, DesignConfig, DesignIntake, DesignShape};
pub use error::{IntegrityError, SketchError, SketchResult};
pub use geometry::{BBox, RawShape, ShapeGeometry, ShapeObservation};
pub use layout::{verify_conservation, Layout, LayoutConfig, LayoutNode, LayoutSynthesizer};
pub use markup::{escape_html, Markup, MarkupEmitter, StyleMode};
pub use pipeline::{Conversion, ConversionReport, SketchPipeline};
pub use text::{normalize_text, NoRecognizer, PresetText, TextConfig, TextRecognizer};

/// Sketch core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
