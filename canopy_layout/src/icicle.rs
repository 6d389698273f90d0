// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Icicle layout: depth bands of fixed thickness, value-proportional spans.

use core::hash::Hash;

use kurbo::Rect;

use canopy_rollup::RollupTree;

use crate::treemap::{tile_layout, validate_rect};
use crate::types::{LayoutError, Mode, NodeGeometry, PartitionLayout};

/// Direction the hierarchy grows in.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Root band at the top, children growing downward. Siblings span
    /// horizontally.
    #[default]
    TopDown,
    /// Root band at the left, children growing rightward. Siblings span
    /// vertically.
    LeftToRight,
}

/// Options for [`icicle`].
#[derive(Copy, Clone, Debug, Default)]
pub struct IcicleOptions {
    /// Which way depth grows.
    pub orientation: Orientation,
    /// Visual gap between adjacent siblings along the main axis. Each
    /// interior sibling edge is pulled in by half the gap; outer edges stay
    /// flush with the parent so depth bands keep a common silhouette.
    pub gap: f64,
    /// Drop zero-value nodes from
    /// [`PartitionLayout::iter_visible`]. Off by default.
    pub collapse_zero: bool,
}

/// Compute an icicle layout over the given rectangle.
///
/// Depth bands have a fixed thickness of `cross_extent / (max_depth + 1)`;
/// the root occupies band zero across the full main-axis extent. Children
/// subdivide their parent's main-axis range in proportion to value share,
/// with the last positive-share sibling absorbing the floating-point
/// remainder so the range is covered exactly. Zero-value nodes collapse to a
/// zero-width span at the running cursor and are flagged
/// [`GeomFlags::ZERO_SPAN`](crate::GeomFlags::ZERO_SPAN).
///
/// Fails with [`LayoutError::InvalidRect`] for a non-positive or non-finite
/// region.
pub fn icicle<K: Clone + Eq + Hash>(
    tree: &RollupTree<K>,
    rect: Rect,
    options: &IcicleOptions,
) -> Result<PartitionLayout, LayoutError> {
    validate_rect(rect)?;
    let mut layout = tile_layout(tree, Mode::Icicle);
    layout.collapse_zero = options.collapse_zero;

    let top_down = options.orientation == Orientation::TopDown;
    let cross_extent = if top_down { rect.height() } else { rect.width() };
    let band = cross_extent / (tree.max_depth() + 1) as f64;
    let gap = options.gap.max(0.0);

    let (main_start, main_extent) = if top_down {
        (rect.x0, rect.width())
    } else {
        (rect.y0, rect.height())
    };
    layout.geoms[tree.root().index()] =
        NodeGeometry::Tile(banded(rect, top_down, band, 0, main_start, main_start + main_extent));

    for id in tree.iter() {
        let children = tree.children_of(id);
        if children.is_empty() {
            continue;
        }
        let NodeGeometry::Tile(parent_rect) = layout.geoms[id.index()] else {
            unreachable!("icicle layouts only contain tiles");
        };
        let (start, end) = if top_down {
            (parent_rect.x0, parent_rect.x1)
        } else {
            (parent_rect.y0, parent_rect.y1)
        };
        let extent = end - start;
        let parent_value = tree.get(id).value;
        let depth = tree.get(id).depth + 1;
        let last_positive = children.iter().rposition(|&c| tree.get(c).value > 0.0);

        let mut cursor = start;
        for (i, &child_id) in children.iter().enumerate() {
            let child = tree.get(child_id);
            let span_end = if Some(i) == last_positive {
                end
            } else if parent_value > 0.0 {
                cursor + child.value / parent_value * extent
            } else {
                cursor
            };
            // Interior edges retreat by half the gap; clamp so narrow spans
            // never invert.
            let mut lo = cursor;
            let mut hi = span_end;
            if gap > 0.0 && span_end > cursor {
                let mid = (cursor + span_end) / 2.0;
                if i > 0 {
                    lo = (cursor + gap / 2.0).min(mid);
                }
                if i < children.len() - 1 {
                    hi = (span_end - gap / 2.0).max(mid);
                }
            }
            layout.geoms[child_id.index()] =
                NodeGeometry::Tile(banded(rect, top_down, band, depth, lo, hi));
            cursor = span_end;
        }
    }

    Ok(layout)
}

/// Rect for the band at `depth` spanning `lo..hi` along the main axis.
fn banded(rect: Rect, top_down: bool, band: f64, depth: usize, lo: f64, hi: f64) -> Rect {
    let cross_lo = depth as f64 * band;
    if top_down {
        Rect::new(lo, rect.y0 + cross_lo, hi, rect.y0 + cross_lo + band)
    } else {
        Rect::new(rect.x0 + cross_lo, lo, rect.x0 + cross_lo + band, hi)
    }
}
