//! # Duplicate Resolver
//!
//! Thick-bordered shapes produce two nested contours (outer and inner) for a
//! single visual element. This stage collapses them.
//!
//! Components are visited largest first; each is compared against the
//! components already kept:
//!
//! 1. IoU above `iou_threshold` means the same element was detected twice.
//! 2. Otherwise, if at least `containment_ratio` of the candidate lies inside a
//!    kept component it is a duplicate when the size ratio exceeds
//!    `same_type_size_ratio` (same type) or `cross_type_size_ratio`
//!    (different types, which usually means deliberate nesting).

use serde::{Deserialize, Serialize};

use crate::component::{ComponentId, UIComponent};

/// Thresholds for duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// IoU above which two boxes are the same detection.
    pub iou_threshold: f32,
    /// Fraction of the candidate that must lie inside a kept box.
    pub containment_ratio: f32,
    /// Size ratio above which a contained box of the same type is dropped.
    pub same_type_size_ratio: f32,
    /// Size ratio above which a contained box of another type is dropped.
    pub cross_type_size_ratio: f32,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            iou_threshold: 0.75,
            containment_ratio: 0.80,
            same_type_size_ratio: 0.4,
            cross_type_size_ratio: 0.85,
        }
    }
}

/// Why a component was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum DuplicateReason {
    /// Overlap test.
    Overlap {
        /// Intersection over union.
        iou: f32,
    },
    /// Containment test.
    Contained {
        /// Candidate area over kept area.
        size_ratio: f32,
        /// Whether both components had the same type.
        same_type: bool,
    },
}

/// A discarded component and the kept one it duplicated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Duplicate {
    /// Discarded component.
    pub removed: ComponentId,
    /// Kept component it collided with.
    pub kept: ComponentId,
    /// Which test fired.
    #[serde(flatten)]
    pub reason: DuplicateReason,
}

/// Output of [`DuplicateResolver::resolve`].
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Surviving components, largest first.
    pub kept: Vec<UIComponent>,
    /// Discarded components.
    pub duplicates: Vec<Duplicate>,
}

/// Removes redundant detections.
#[derive(Debug, Clone, Default)]
pub struct DuplicateResolver {
    config: DedupConfig,
}

impl DuplicateResolver {
    /// Create a resolver with the given thresholds.
    #[must_use]
    pub fn new(config: DedupConfig) -> Self {
        Self { config }
    }

    /// Filter duplicates. Never fails; worst case everything is kept.
    ///
    /// The result is ordered by descending area, ties in input order.
    #[must_use]
    pub fn resolve(&self, components: Vec<UIComponent>) -> Resolution {
        let before = components.len();
        let mut sorted = components;
        // stable: equal areas stay in detection order
        sorted.sort_by(|a, b| b.area().total_cmp(&a.area()));

        let mut resolution = Resolution {
            kept: Vec::with_capacity(sorted.len()),
            duplicates: Vec::new(),
        };

        for candidate in sorted {
            let hit = resolution
                .kept
                .iter()
                .find_map(|kept| self.duplicate_of(&candidate, kept).map(|r| (kept, r)));

            match hit {
                Some((kept, reason)) => {
                    tracing::debug!(
                        "Filtering {} as duplicate of {} ({:?})",
                        candidate.id,
                        kept.id,
                        reason
                    );
                    resolution.duplicates.push(Duplicate {
                        removed: candidate.id.clone(),
                        kept: kept.id.clone(),
                        reason,
                    });
                }
                None => resolution.kept.push(candidate),
            }
        }

        tracing::info!(
            "Duplicate filtering: {} in, {} kept, {} removed",
            before,
            resolution.kept.len(),
            resolution.duplicates.len()
        );

        resolution
    }

    /// Test `candidate` against one kept component.
    fn duplicate_of(&self, candidate: &UIComponent, kept: &UIComponent) -> Option<DuplicateReason> {
        let c_area = candidate.area();
        let k_area = kept.area();
        let intersection = candidate.bbox.intersection_area(&kept.bbox);

        let union = c_area + k_area - intersection;
        let iou = if union > 0.0 { intersection / union } else { 0.0 };
        if iou > self.config.iou_threshold {
            return Some(DuplicateReason::Overlap { iou });
        }

        if intersection >= self.config.containment_ratio * c_area {
            let size_ratio = if k_area > 0.0 { c_area / k_area } else { 0.0 };
            let same_type = candidate.kind == kept.kind;
            let limit = if same_type {
                self.config.same_type_size_ratio
            } else {
                self.config.cross_type_size_ratio
            };
            if size_ratio > limit {
                return Some(DuplicateReason::Contained {
                    size_ratio,
                    same_type,
                });
            }
        }

        None
    }
}
