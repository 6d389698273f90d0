// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Treemap layout: nested rectangles, squarified or slice-and-dice.

use alloc::vec::Vec;
use core::hash::Hash;

use kurbo::Rect;

use canopy_rollup::{NodeId, RollupTree};

use crate::types::{GeomFlags, LayoutError, Mode, NodeGeometry, PartitionLayout};

/// Subdivision strategy for [`treemap`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TreemapStrategy {
    /// Squarified rows after Bruls et al.: tiles are appended to the current
    /// strip while that improves the strip's worst aspect ratio, then the
    /// strip is laid along the shorter side of the remaining region. Ties
    /// (equal sides) strip horizontally.
    #[default]
    Squarified,
    /// Slice-and-dice: the split axis alternates by depth parity — children
    /// at odd depths split their parent along x, at even depths along y.
    SliceDice,
}

/// Options for [`treemap`].
#[derive(Copy, Clone, Debug, Default)]
pub struct TreemapOptions {
    /// Padding subtracted from a parent's rect on all sides before its
    /// children are laid out. Children tile the padded interior exactly.
    pub padding: f64,
    /// Subdivision strategy.
    pub strategy: TreemapStrategy,
    /// Drop zero-value nodes from
    /// [`PartitionLayout::iter_visible`]. Off by default.
    pub collapse_zero: bool,
}

/// Compute a treemap layout over the given rectangle.
///
/// The area assigned to each child is proportional to its share of the
/// parent's aggregate value, computed against the parent's padded interior.
/// Within each strip the last tile absorbs the floating-point remainder, and
/// the final strip absorbs the remaining thickness, so the union of a node's
/// children equals its padded interior exactly. Zero-value nodes receive a
/// zero-area tile at the interior's origin and are flagged
/// [`GeomFlags::ZERO_SPAN`].
///
/// Fails with [`LayoutError::InvalidRect`] for a non-positive or non-finite
/// region.
pub fn treemap<K: Clone + Eq + Hash>(
    tree: &RollupTree<K>,
    rect: Rect,
    options: &TreemapOptions,
) -> Result<PartitionLayout, LayoutError> {
    validate_rect(rect)?;
    let mut layout = tile_layout(tree, Mode::Treemap);
    layout.collapse_zero = options.collapse_zero;
    layout.geoms[tree.root().index()] = NodeGeometry::Tile(rect);

    for id in tree.iter() {
        let children = tree.children_of(id);
        if children.is_empty() {
            continue;
        }
        let NodeGeometry::Tile(node_rect) = layout.geoms[id.index()] else {
            unreachable!("treemap layouts only contain tiles");
        };
        let interior = shrink(node_rect, options.padding);
        let parent_value = tree.get(id).value;

        match options.strategy {
            TreemapStrategy::Squarified => {
                squarify_into(tree, children, parent_value, interior, &mut layout);
            }
            TreemapStrategy::SliceDice => {
                let along_x = tree.get(id).depth % 2 == 0;
                slice_into(tree, children, parent_value, interior, along_x, &mut layout);
            }
        }
    }

    Ok(layout)
}

pub(crate) fn validate_rect(rect: Rect) -> Result<(), LayoutError> {
    let (width, height) = (rect.width(), rect.height());
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(LayoutError::InvalidRect { width, height });
    }
    Ok(())
}

/// Dense tile layout skeleton with flags filled in and every geometry set to
/// a zero tile; the mode-specific walk overwrites the geometries.
pub(crate) fn tile_layout<K: Clone + Eq + Hash>(
    tree: &RollupTree<K>,
    mode: Mode,
) -> PartitionLayout {
    let mut layout = PartitionLayout::with_capacity(mode, tree.len());
    for idx in 0..tree.len() {
        let node = tree.get(NodeId::from_index(idx));
        let mut flags = GeomFlags::empty();
        if node.is_leaf() {
            flags |= GeomFlags::LEAF;
        }
        if node.value <= 0.0 {
            flags |= GeomFlags::ZERO_SPAN;
        }
        if node.depth > 0 && node.key.is_none() {
            flags |= GeomFlags::NULL_KEY;
        }
        layout.flags.push(flags);
        layout.geoms.push(NodeGeometry::Tile(Rect::ZERO));
    }
    layout
}

/// Shrink a rect by `pad` on all sides, collapsing to its center point when
/// the padding exceeds the extent.
pub(crate) fn shrink(rect: Rect, pad: f64) -> Rect {
    if pad <= 0.0 {
        return rect;
    }
    let cx = (rect.x0 + rect.x1) / 2.0;
    let cy = (rect.y0 + rect.y1) / 2.0;
    let x0 = (rect.x0 + pad).min(cx);
    let x1 = (rect.x1 - pad).max(cx);
    let y0 = (rect.y0 + pad).min(cy);
    let y1 = (rect.y1 - pad).max(cy);
    Rect::new(x0, y0, x1, y1)
}

/// Value-proportional contiguous slices along one axis; shared by the
/// slice-and-dice strategy and the icicle layout.
pub(crate) fn slice_into<K: Clone + Eq + Hash>(
    tree: &RollupTree<K>,
    children: &[NodeId],
    parent_value: f64,
    interior: Rect,
    along_x: bool,
    layout: &mut PartitionLayout,
) {
    let (start, extent) = if along_x {
        (interior.x0, interior.width())
    } else {
        (interior.y0, interior.height())
    };
    let last_positive = children.iter().rposition(|&c| tree.get(c).value > 0.0);

    let mut cursor = start;
    for (i, &child_id) in children.iter().enumerate() {
        let child = tree.get(child_id);
        let end = if Some(i) == last_positive {
            start + extent
        } else if parent_value > 0.0 {
            cursor + child.value / parent_value * extent
        } else {
            cursor
        };
        let rect = if along_x {
            Rect::new(cursor, interior.y0, end, interior.y1)
        } else {
            Rect::new(interior.x0, cursor, interior.x1, end)
        };
        layout.geoms[child_id.index()] = NodeGeometry::Tile(rect);
        cursor = end;
    }
}

/// Squarified strips after Bruls et al., writing each child's tile into the
/// layout. Children are processed in descending area order (the ordering the
/// aspect-ratio heuristic assumes) regardless of sibling sort order; tiles
/// still land at the right [`NodeId`].
fn squarify_into<K: Clone + Eq + Hash>(
    tree: &RollupTree<K>,
    children: &[NodeId],
    parent_value: f64,
    interior: Rect,
    layout: &mut PartitionLayout,
) {
    let total_area = interior.width() * interior.height();

    // Zero-share children collapse at the interior origin.
    let mut items: Vec<(NodeId, f64)> = Vec::with_capacity(children.len());
    for &child_id in children {
        let value = tree.get(child_id).value;
        if parent_value > 0.0 && value > 0.0 {
            items.push((child_id, value / parent_value * total_area));
        } else {
            layout.geoms[child_id.index()] =
                NodeGeometry::Tile(Rect::new(interior.x0, interior.y0, interior.x0, interior.y0));
        }
    }
    if items.is_empty() {
        return;
    }
    items.sort_by(|a, b| b.1.total_cmp(&a.1));

    let (mut x, mut y) = (interior.x0, interior.y0);
    let (mut w, mut h) = (interior.width(), interior.height());

    let mut row_start = 0_usize;
    let mut row_sum = 0.0;
    let mut row_min = f64::INFINITY;
    let mut row_max = 0.0;
    let mut idx = 0_usize;

    while idx < items.len() {
        let area = items[idx].1;
        let side = w.min(h);
        let current = worst_aspect(row_min, row_max, row_sum, side);
        let next = worst_aspect(
            row_min.min(area),
            row_max.max(area),
            row_sum + area,
            side,
        );

        // Keep growing the strip while its worst aspect ratio improves.
        if row_sum <= 0.0 || next <= current {
            row_sum += area;
            row_min = row_min.min(area);
            row_max = row_max.max(area);
            idx += 1;
            continue;
        }

        lay_strip(
            &items[row_start..idx],
            row_sum,
            false,
            &mut x,
            &mut y,
            &mut w,
            &mut h,
            layout,
        );
        row_start = idx;
        row_sum = 0.0;
        row_min = f64::INFINITY;
        row_max = 0.0;
    }

    if row_start < items.len() {
        // Final strip absorbs whatever thickness is left so the union of the
        // children equals the interior exactly.
        lay_strip(
            &items[row_start..],
            row_sum,
            true,
            &mut x,
            &mut y,
            &mut w,
            &mut h,
            layout,
        );
    }
}

/// Lay one strip along the shorter side of the remaining region. The last
/// tile in the strip absorbs the rounding remainder along the strip; when
/// `is_final` the strip's thickness is the whole remaining cross extent.
fn lay_strip(
    strip: &[(NodeId, f64)],
    strip_sum: f64,
    is_final: bool,
    x: &mut f64,
    y: &mut f64,
    w: &mut f64,
    h: &mut f64,
    layout: &mut PartitionLayout,
) {
    if strip.is_empty() || strip_sum <= 0.0 {
        return;
    }
    // Strip runs along the shorter side; ties strip horizontally.
    let horizontal = *w <= *h;
    let short = if horizontal { *w } else { *h };
    if short <= 0.0 {
        for &(id, _) in strip {
            layout.geoms[id.index()] = NodeGeometry::Tile(Rect::new(*x, *y, *x, *y));
        }
        return;
    }
    let thickness = if is_final {
        if horizontal { *h } else { *w }
    } else {
        strip_sum / short
    };

    let mut offset = 0.0;
    for (i, &(id, area)) in strip.iter().enumerate() {
        let length = if i == strip.len() - 1 {
            short - offset
        } else {
            area / strip_sum * short
        };
        let rect = if horizontal {
            Rect::new(*x + offset, *y, *x + offset + length, *y + thickness)
        } else {
            Rect::new(*x, *y + offset, *x + thickness, *y + offset + length)
        };
        layout.geoms[id.index()] = NodeGeometry::Tile(rect);
        offset += length;
    }

    if horizontal {
        *y += thickness;
        *h = (*h - thickness).max(0.0);
    } else {
        *x += thickness;
        *w = (*w - thickness).max(0.0);
    }
}

/// Worst aspect ratio of a strip with the given area stats against a side.
fn worst_aspect(min_area: f64, max_area: f64, sum: f64, side: f64) -> f64 {
    if sum <= 0.0 || side <= 0.0 || min_area <= 0.0 || max_area <= 0.0 {
        return f64::MAX;
    }
    let side_sq = side * side;
    let sum_sq = sum * sum;
    let a = (side_sq * max_area) / sum_sq;
    let b = sum_sq / (side_sq * min_area);
    if a > b { a } else { b }
}
