// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic fill assignment over a rollup tree.

use alloc::vec::Vec;
use core::hash::Hash;

use canopy_rollup::{NodeId, RollupTree};

use crate::contrast::fill_text_color;
use crate::rgba::Rgba;

/// A source of categorical fills for top-level branches.
pub trait FillPalette {
    /// The fill for the branch at the given sibling sort position.
    ///
    /// Implementations must be pure: the same index always yields the same
    /// color, so layouts recolor identically across rebuilds.
    fn fill(&self, index: usize) -> Rgba;
}

/// A fixed list of fills, cycled by index.
#[derive(Clone, Debug)]
pub struct DiscretePalette {
    colors: Vec<Rgba>,
}

impl DiscretePalette {
    /// A palette over the given colors.
    ///
    /// Empty palettes are replaced by the default categorical set.
    pub fn new(colors: Vec<Rgba>) -> Self {
        if colors.is_empty() {
            return Self::default();
        }
        Self { colors }
    }
}

impl Default for DiscretePalette {
    /// The ten-hue categorical palette.
    fn default() -> Self {
        Self {
            colors: alloc::vec![
                Rgba::opaque(0x1f, 0x77, 0xb4),
                Rgba::opaque(0xff, 0x7f, 0x0e),
                Rgba::opaque(0x2c, 0xa0, 0x2c),
                Rgba::opaque(0xd6, 0x27, 0x28),
                Rgba::opaque(0x94, 0x67, 0xbd),
                Rgba::opaque(0x8c, 0x56, 0x4b),
                Rgba::opaque(0xe3, 0x77, 0xc2),
                Rgba::opaque(0x7f, 0x7f, 0x7f),
                Rgba::opaque(0xbc, 0xbd, 0x22),
                Rgba::opaque(0x17, 0xbe, 0xcf),
            ],
        }
    }
}

impl FillPalette for DiscretePalette {
    fn fill(&self, index: usize) -> Rgba {
        self.colors[index % self.colors.len()]
    }
}

/// Options for [`assign_colors`].
#[derive(Copy, Clone, Debug)]
pub struct AssignOptions {
    /// The chart container's background, used both as the root's fill and as
    /// the fallback backdrop for text contrast.
    pub container_background: Rgba,
    /// Lightness added per depth level below the first. Descendants of a
    /// branch stay in its hue family, progressively lighter (or darker for a
    /// negative step).
    pub lighten_step: f64,
}

impl Default for AssignOptions {
    fn default() -> Self {
        Self {
            container_background: Rgba::WHITE,
            lighten_step: 0.1,
        }
    }
}

/// The fill for one node, given only its position in the hierarchy.
///
/// Depth-1 nodes index the palette by `sort_index`; the root gets the
/// container background; any deeper node shifts its parent's fill by the
/// lightness step, keeping the hue. Pure in its arguments, so a node's fill
/// cannot be disturbed by unrelated sibling subtrees.
pub fn assign_fill(
    depth: usize,
    sort_index: usize,
    parent_fill: Rgba,
    palette: &dyn FillPalette,
    options: &AssignOptions,
) -> Rgba {
    match depth {
        0 => options.container_background,
        1 => palette.fill(sort_index),
        _ => parent_fill.shift_lightness(options.lighten_step),
    }
}

/// The colors assigned to one node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NodeColors {
    /// Fill for the node's region.
    pub fill: Rgba,
    /// Readable text color for labels drawn on that fill.
    pub text: Rgba,
}

/// Assign a fill and text color to every node, densely indexed by
/// [`NodeId`].
///
/// Depth-1 nodes index the palette by their sibling sort position, so a
/// branch keeps its hue when unrelated siblings appear or disappear across
/// rebuilds. Deeper nodes take their parent's fill shifted by
/// [`AssignOptions::lighten_step`] per level. The root gets the container
/// background. Text colors come from
/// [`fill_text_color`](crate::fill_text_color) against the container.
pub fn assign_colors<K: Clone + Eq + Hash>(
    tree: &RollupTree<K>,
    palette: &dyn FillPalette,
    options: &AssignOptions,
) -> Vec<NodeColors> {
    let mut out: Vec<NodeColors> = Vec::with_capacity(tree.len());
    for idx in 0..tree.len() {
        let id = NodeId::from_index(idx);
        let node = tree.get(id);
        // Parents precede children in the arena, so their entry exists.
        let parent_fill = tree
            .parent_of(id)
            .map(|p| out[p.index()].fill)
            .unwrap_or(options.container_background);
        let fill = assign_fill(node.depth, node.sort_index, parent_fill, palette, options);
        let text = fill_text_color(options.container_background, None, fill);
        out.push(NodeColors { fill, text });
    }
    out
}
