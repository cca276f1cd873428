//! Screen placement of every node, computed from the forest shape alone

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::mode::TreeMode;
use crate::domain::node::{Node, NodeId};

/// Bounding box of the drawing area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    /// Client width used to center the first root.
    pub width: f64,
}

impl Viewport {
    /// Viewport anchored at the origin.
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            right: width,
            bottom: height,
            width,
        }
    }
}

/// Spacing constants of the layout pass, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    pub initial_offset_width: f64,
    pub initial_offset_height: f64,
    pub scaling_factor: f64,
    pub node_size: f64,
    pub root_top: f64,
    pub root_spacing: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            initial_offset_width: 200.0,
            initial_offset_height: 80.0,
            scaling_factor: 2.0,
            node_size: 25.0,
            root_top: 40.0,
            root_spacing: 80.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub id: NodeId,
    pub top: f64,
    pub left: f64,
}

/// `value` constrained to `[min, max]`; `min` wins when the range is empty.
pub fn dimension_clamp(value: f64, min: f64, max: f64) -> f64 {
    min.max(value.min(max))
}

struct Pass<'a> {
    mode: TreeMode,
    viewport: &'a Viewport,
    params: &'a LayoutParams,
    placements: Vec<Placement>,
}

impl Pass<'_> {
    fn clamp_left(&self, left: f64) -> f64 {
        dimension_clamp(
            left,
            self.viewport.left,
            self.viewport.right - self.params.node_size * 2.0,
        )
    }

    fn clamp_top(&self, top: f64) -> f64 {
        dimension_clamp(
            top,
            self.viewport.top - self.params.node_size,
            self.viewport.bottom - self.params.node_size * 2.0,
        )
    }

    fn place<P>(&mut self, node: &Node<P>, top: f64, left: f64, depth: i32) {
        self.placements.push(Placement {
            id: node.id,
            top,
            left,
        });

        let offset = self.params.initial_offset_width / self.params.scaling_factor.powi(depth);
        let child_top = self.clamp_top(top + self.params.initial_offset_height);
        for (index, child) in node.children.iter().enumerate() {
            let shift = match (index, node.children.len()) {
                (0, 1) if self.mode.is_ordered() && child.value > node.value => offset,
                (0, _) => -offset,
                (k, _) => offset * k as f64,
            };
            let child_left = self.clamp_left(left + shift);
            self.place(child, child_top, child_left, depth + 1);
        }
    }
}

/// Pre-order placements for every node of the forest.
///
/// The first root is centered at `params.root_top`; each further root sits
/// `params.root_spacing` right of the previous one.
#[instrument(level = "debug", skip(roots, params))]
pub fn layout_forest<P>(
    roots: &[Node<P>],
    mode: TreeMode,
    viewport: &Viewport,
    params: &LayoutParams,
) -> Vec<Placement> {
    let mut pass = Pass {
        mode,
        viewport,
        params,
        placements: Vec::new(),
    };
    let top = pass.clamp_top(params.root_top);
    let mut left = (viewport.width - params.node_size) / 2.0;
    for root in roots {
        let root_left = pass.clamp_left(left);
        pass.place(root, top, root_left, 0);
        left += params.root_spacing;
    }
    pass.placements
}
