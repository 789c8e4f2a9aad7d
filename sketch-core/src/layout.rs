//! # Layout Synthesizer
//!
//! Groups deduplicated components into rows in reading order.
//!
//! ```text
//! Root
//! ├── Row ── Leaf(A) Leaf(B)     A and B share a vertical band
//! └── Leaf(C)                    C is alone in its band
//! ```
//!
//! Two components share a row when their vertical centres are closer than
//! `row_coefficient` times their average height, measured against the first
//! member of the row.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::component::{ComponentId, UIComponent};
use crate::error::IntegrityError;

/// Row grouping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Fraction of the average height within which centres share a row.
    pub row_coefficient: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_coefficient: 0.6,
        }
    }
}

/// A node of the layout tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum LayoutNode {
    /// Tree entry point; children top to bottom.
    Root {
        /// Rows and single leaves.
        children: Vec<LayoutNode>,
    },
    /// Horizontal group; children left to right.
    Row {
        /// Leaves of the row.
        children: Vec<LayoutNode>,
    },
    /// Exactly one component.
    Leaf {
        /// The wrapped component.
        component: UIComponent,
    },
}

impl LayoutNode {
    /// An empty root.
    #[must_use]
    pub fn empty() -> Self {
        LayoutNode::Root {
            children: Vec::new(),
        }
    }

    /// Child nodes; empty for a leaf.
    #[must_use]
    pub fn children(&self) -> &[LayoutNode] {
        match self {
            LayoutNode::Root { children } | LayoutNode::Row { children } => children,
            LayoutNode::Leaf { .. } => &[],
        }
    }

    /// Components in leaf order (depth first).
    #[must_use]
    pub fn leaves(&self) -> Vec<&UIComponent> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a UIComponent>) {
        match self {
            LayoutNode::Leaf { component } => out.push(component),
            LayoutNode::Root { children } | LayoutNode::Row { children } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// Number of rows (multi-member or single) directly under the root.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.children().len()
    }
}

/// Output of [`LayoutSynthesizer::synthesize`].
#[derive(Debug, Clone)]
pub struct Layout {
    /// The `Root` node.
    pub root: LayoutNode,
    /// Conservation violations found after construction.
    pub integrity_errors: Vec<IntegrityError>,
}

/// Builds the row/leaf tree.
#[derive(Debug, Clone, Default)]
pub struct LayoutSynthesizer {
    config: LayoutConfig,
}

/// Ids placed so far, scoped to one synthesis call.
struct Placement {
    used: HashSet<ComponentId>,
    skipped: Vec<IntegrityError>,
}

impl Placement {
    fn leaf(&mut self, component: &UIComponent) -> Option<LayoutNode> {
        if self.used.insert(component.id.clone()) {
            Some(LayoutNode::Leaf {
                component: component.clone(),
            })
        } else {
            tracing::warn!(
                "Component {} already used, skipping to prevent duplicate",
                component.id
            );
            self.skipped
                .push(IntegrityError::DuplicatePlacement(component.id.clone()));
            None
        }
    }
}

impl LayoutSynthesizer {
    /// Create a synthesizer with the given row coefficient.
    #[must_use]
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    /// Build the tree. Total: an empty slice yields an empty root.
    #[must_use]
    pub fn synthesize(&self, components: &[UIComponent]) -> Layout {
        if components.is_empty() {
            tracing::info!("No components to layout");
            return Layout {
                root: LayoutNode::empty(),
                integrity_errors: Vec::new(),
            };
        }

        tracing::info!("Building layout tree from {} components", components.len());

        let rows = self.group_rows(components);
        tracing::info!("Grouped components into {} rows", rows.len());

        let mut placement = Placement {
            used: HashSet::with_capacity(components.len()),
            skipped: Vec::new(),
        };
        let mut children = Vec::with_capacity(rows.len());

        for (row_idx, mut row) in rows.into_iter().enumerate() {
            if let [single] = row.as_slice() {
                if let Some(leaf) = placement.leaf(single) {
                    tracing::debug!("Added single component {} ({})", single.id, single.kind);
                    children.push(leaf);
                }
                continue;
            }

            row.sort_by(|a, b| a.bbox.x.total_cmp(&b.bbox.x));
            let leaves: Vec<LayoutNode> = row
                .iter()
                .filter_map(|component| {
                    let leaf = placement.leaf(component)?;
                    tracing::debug!(
                        "Added component {} ({}) to row {}",
                        component.id,
                        component.kind,
                        row_idx
                    );
                    Some(leaf)
                })
                .collect();

            if !leaves.is_empty() {
                children.push(LayoutNode::Row { children: leaves });
            }
        }

        let root = LayoutNode::Root { children };
        let mut integrity_errors = placement.skipped;
        for error in verify_conservation(&root, components) {
            if !integrity_errors.contains(&error) {
                integrity_errors.push(error);
            }
        }

        if integrity_errors.is_empty() {
            tracing::info!(
                "Layout tree built: {} components, {} rows",
                placement.used.len(),
                root.row_count()
            );
        } else {
            for error in &integrity_errors {
                tracing::error!("Layout integrity violation: {}", error);
            }
        }

        Layout {
            root,
            integrity_errors,
        }
    }

    /// Partition components, sorted by `(y, x)`, into rows.
    fn group_rows<'a>(&self, components: &'a [UIComponent]) -> Vec<Vec<&'a UIComponent>> {
        let mut sorted: Vec<&UIComponent> = components.iter().collect();
        sorted.sort_by(|a, b| {
            a.bbox
                .y
                .total_cmp(&b.bbox.y)
                .then_with(|| a.bbox.x.total_cmp(&b.bbox.x))
        });

        let mut rows: Vec<Vec<&UIComponent>> = Vec::new();
        let mut current: Vec<&UIComponent> = Vec::new();

        for candidate in sorted {
            let Some(reference) = current.first() else {
                current.push(candidate);
                continue;
            };

            let vertical_distance = (candidate.bbox.center_y() - reference.bbox.center_y()).abs();
            let avg_height = (candidate.bbox.h + reference.bbox.h) / 2.0;

            if vertical_distance < self.config.row_coefficient * avg_height {
                tracing::debug!(
                    "Added component {} to current row (vertical distance: {:.1})",
                    candidate.id,
                    vertical_distance
                );
                current.push(candidate);
            } else {
                tracing::debug!("Created row with {} components", current.len());
                rows.push(std::mem::take(&mut current));
                current.push(candidate);
            }
        }

        if !current.is_empty() {
            rows.push(current);
        }

        rows
    }
}

/// Compare the multiset of leaf ids with the input multiset.
///
/// Every input id must appear in exactly one leaf and no leaf may hold an id
/// that was not in the input.
#[must_use]
pub fn verify_conservation(root: &LayoutNode, input: &[UIComponent]) -> Vec<IntegrityError> {
    let mut expected: BTreeMap<&ComponentId, usize> = BTreeMap::new();
    for component in input {
        *expected.entry(&component.id).or_default() += 1;
    }

    let mut placed: BTreeMap<&ComponentId, usize> = BTreeMap::new();
    for component in root.leaves() {
        *placed.entry(&component.id).or_default() += 1;
    }

    let mut errors = Vec::new();
    for (id, &want) in &expected {
        let got = placed.get(id).copied().unwrap_or(0);
        if got > 1 {
            errors.push(IntegrityError::DuplicatePlacement((*id).clone()));
        }
        if got < want {
            errors.push(IntegrityError::MissingComponent((*id).clone()));
        }
    }
    for id in placed.keys() {
        if !expected.contains_key(id) {
            errors.push(IntegrityError::UnexpectedComponent((*id).clone()));
        }
    }
    errors
}
