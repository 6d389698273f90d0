// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sunburst layout: angular sectors in fixed per-depth radius bands.

use core::f64::consts::TAU;
use core::hash::Hash;

use canopy_rollup::{NodeId, RollupTree};

use crate::types::{GeomFlags, LayoutError, Mode, NodeGeometry, PartitionLayout, Sector};

/// Options for [`sunburst`].
#[derive(Copy, Clone, Debug)]
pub struct SunburstOptions {
    /// Angle (radians) at which the root's span begins.
    pub start_angle: f64,
    /// Total angular span available. Defaults to a full circle.
    pub sweep: f64,
    /// Fraction of the radius reserved for the center hole, in `[0, 1)`.
    /// Values outside that range are clamped. The root occupies the hole
    /// disc; depth bands split the remaining radius evenly.
    pub hole_ratio: f64,
    /// Drop zero-value nodes from [`PartitionLayout::iter_visible`].
    ///
    /// Off by default: zero-span nodes are still enumerated so legends and
    /// labels stay complete. Geometry is dense either way.
    pub collapse_zero: bool,
}

impl Default for SunburstOptions {
    fn default() -> Self {
        Self {
            start_angle: 0.0,
            sweep: TAU,
            hole_ratio: 0.0,
            collapse_zero: false,
        }
    }
}

/// Compute a sunburst layout over a circle (or arc) of the given radius.
///
/// Each depth occupies a fixed radius band:
/// `inner(depth) = hole + (depth - 1) * band` with
/// `band = (radius - hole) / max_depth`. Within a parent, children split the
/// parent's angular span proportionally to their value share, in sibling
/// order; the last positive-share sibling absorbs the floating-point
/// remainder so spans sum exactly to the parent span. Zero-value nodes get a
/// zero-span sector at the running cursor and are flagged
/// [`GeomFlags::ZERO_SPAN`].
///
/// Fails with [`LayoutError::InvalidRadius`] / [`LayoutError::InvalidSweep`]
/// before touching the tree.
pub fn sunburst<K: Clone + Eq + Hash>(
    tree: &RollupTree<K>,
    radius: f64,
    options: &SunburstOptions,
) -> Result<PartitionLayout, LayoutError> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(LayoutError::InvalidRadius(radius));
    }
    if !(options.sweep.is_finite() && options.sweep > 0.0) {
        return Err(LayoutError::InvalidSweep(options.sweep));
    }

    let hole_ratio = options.hole_ratio.clamp(0.0, 1.0);
    let hole = hole_ratio * radius;
    let depth_count = tree.max_depth().max(1);
    let band = (radius - hole) / depth_count as f64;

    let mut layout = PartitionLayout::with_capacity(Mode::Sunburst, tree.len());
    layout.collapse_zero = options.collapse_zero;
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
        // Placeholder; overwritten during the preorder walk below.
        layout
            .geoms
            .push(NodeGeometry::Sector(Sector::collapsed(0.0, 0.0)));
    }

    // Root occupies the hole disc over the full span.
    layout.geoms[tree.root().index()] = NodeGeometry::Sector(Sector {
        start_angle: options.start_angle,
        end_angle: options.start_angle + options.sweep,
        inner_radius: 0.0,
        outer_radius: hole,
    });

    // Preorder guarantees a parent's sector is final before its children are
    // placed.
    for id in tree.iter() {
        let NodeGeometry::Sector(parent_sector) = layout.geoms[id.index()] else {
            unreachable!("sunburst layouts only contain sectors");
        };
        let parent = tree.get(id);
        let children = tree.children_of(id);
        if children.is_empty() {
            continue;
        }

        let last_positive = children
            .iter()
            .rposition(|&c| tree.get(c).value > 0.0);

        let mut cursor = parent_sector.start_angle;
        for (i, &child_id) in children.iter().enumerate() {
            let child = tree.get(child_id);
            let inner = hole + (child.depth - 1) as f64 * band;
            let end = if Some(i) == last_positive {
                // Absorb accumulated rounding into the final positive share.
                parent_sector.end_angle
            } else if parent.value > 0.0 {
                cursor + child.value / parent.value * parent_sector.sweep()
            } else {
                cursor
            };
            layout.geoms[child_id.index()] = NodeGeometry::Sector(Sector {
                start_angle: cursor,
                end_angle: end,
                inner_radius: inner,
                outer_radius: inner + band,
            });
            cursor = end;
        }
    }

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_rollup::{BuildConfig, build};

    fn tree_of(rows: &[(&'static str, f64)]) -> RollupTree<&'static str> {
        let group = |r: &(&'static str, f64)| Some(r.0);
        build(rows, &[&group], &|r| r.1, &BuildConfig::default()).unwrap()
    }

    fn sector(layout: &PartitionLayout, id: canopy_rollup::NodeId) -> Sector {
        match layout.geometry(id) {
            NodeGeometry::Sector(s) => *s,
            NodeGeometry::Tile(_) => panic!("expected a sector"),
        }
    }

    #[test]
    fn shares_match_value_ratio() {
        let tree = tree_of(&[("A", 10.0), ("A", 5.0), ("B", 20.0)]);
        let layout = sunburst(&tree, 100.0, &SunburstOptions::default()).unwrap();
        let children = tree.children_of(tree.root());

        // B (20/35) first, then A (15/35).
        let b = sector(&layout, children[0]);
        let a = sector(&layout, children[1]);
        assert!((b.sweep() - 20.0 / 35.0 * TAU).abs() < 1e-12);
        assert!((a.sweep() - 15.0 / 35.0 * TAU).abs() < 1e-12);
        // Contiguous, and together they cover the full circle exactly.
        assert_eq!(b.end_angle, a.start_angle);
        assert_eq!(a.end_angle, TAU);
    }

    #[test]
    fn last_sibling_absorbs_remainder_across_many_children() {
        // 360 equal children; naive per-child rounding would drift.
        let rows: alloc::vec::Vec<(&'static str, f64)> = (0..360)
            .map(|i| {
                // Leak is fine in tests; keys only need to be distinct.
                let key: &'static str =
                    alloc::boxed::Box::leak(alloc::format!("k{i}").into_boxed_str());
                (key, 1.0 / 3.0)
            })
            .collect();
        let tree = tree_of(&rows);
        let layout = sunburst(&tree, 50.0, &SunburstOptions::default()).unwrap();
        let children = tree.children_of(tree.root());
        let last = sector(&layout, *children.last().unwrap());
        assert_eq!(
            last.end_angle, TAU,
            "final sibling must end exactly at the parent's end angle"
        );
        // And adjacency holds all the way around.
        for pair in children.windows(2) {
            let prev = sector(&layout, pair[0]);
            let next = sector(&layout, pair[1]);
            assert_eq!(prev.end_angle, next.start_angle);
        }
    }

    #[test]
    fn zero_value_nodes_get_zero_span_but_are_emitted() {
        let tree = tree_of(&[("A", 10.0), ("Z", 0.0)]);
        let layout = sunburst(&tree, 10.0, &SunburstOptions::default()).unwrap();
        let children = tree.children_of(tree.root());
        let z = children[1];
        assert!(layout.flags(z).contains(GeomFlags::ZERO_SPAN));
        assert_eq!(sector(&layout, z).sweep(), 0.0);
        // By default zero-span nodes stay enumerable everywhere.
        assert_eq!(layout.iter().count(), tree.len());
        assert!(layout.iter_visible().any(|(id, _, _)| id == z));
    }

    #[test]
    fn collapse_zero_drops_zero_span_nodes_from_visible_iteration() {
        let tree = tree_of(&[("A", 10.0), ("Z", 0.0)]);
        let options = SunburstOptions {
            collapse_zero: true,
            ..SunburstOptions::default()
        };
        let layout = sunburst(&tree, 10.0, &options).unwrap();
        let z = tree.children_of(tree.root())[1];
        assert!(layout.iter_visible().all(|(id, _, _)| id != z));
        // The dense geometry invariant is unaffected.
        assert_eq!(layout.iter().count(), tree.len());
        assert_eq!(sector(&layout, z).sweep(), 0.0);
    }

    #[test]
    fn depth_bands_are_fixed_per_depth() {
        let rows = [("A", 1.0), ("B", 3.0)];
        let g0 = |r: &(&'static str, f64)| Some(r.0);
        let g1 = |r: &(&'static str, f64)| Some(if r.1 > 2.0 { "big" } else { "small" });
        let tree = build(&rows, &[&g0, &g1], &|r| r.1, &BuildConfig::default()).unwrap();
        let layout = sunburst(&tree, 100.0, &SunburstOptions::default()).unwrap();

        for id in tree.iter() {
            let depth = tree.get(id).depth;
            let s = sector(&layout, id);
            if depth > 0 {
                assert_eq!(s.inner_radius, (depth - 1) as f64 * 50.0);
                assert_eq!(s.outer_radius, depth as f64 * 50.0);
            }
        }
    }

    #[test]
    fn hole_ratio_reserves_center_disc() {
        let tree = tree_of(&[("A", 1.0)]);
        let options = SunburstOptions {
            hole_ratio: 0.3,
            ..SunburstOptions::default()
        };
        let layout = sunburst(&tree, 100.0, &options).unwrap();
        let root = sector(&layout, tree.root());
        assert_eq!(root.inner_radius, 0.0);
        assert_eq!(root.outer_radius, 30.0);
        let child = sector(&layout, tree.children_of(tree.root())[0]);
        assert_eq!(child.inner_radius, 30.0);
        assert_eq!(child.outer_radius, 100.0);
    }

    #[test]
    fn partial_sweep_and_start_angle() {
        let tree = tree_of(&[("A", 1.0), ("B", 1.0)]);
        let options = SunburstOptions {
            start_angle: 1.0,
            sweep: 2.0,
            ..SunburstOptions::default()
        };
        let layout = sunburst(&tree, 10.0, &options).unwrap();
        let children = tree.children_of(tree.root());
        let first = sector(&layout, children[0]);
        let second = sector(&layout, children[1]);
        assert_eq!(first.start_angle, 1.0);
        assert_eq!(second.end_angle, 3.0);
    }

    #[test]
    fn invalid_region_is_rejected() {
        let tree = tree_of(&[("A", 1.0)]);
        assert_eq!(
            sunburst(&tree, 0.0, &SunburstOptions::default()),
            Err(LayoutError::InvalidRadius(0.0))
        );
        assert_eq!(
            sunburst(&tree, -4.0, &SunburstOptions::default()),
            Err(LayoutError::InvalidRadius(-4.0))
        );
        let options = SunburstOptions {
            sweep: 0.0,
            ..SunburstOptions::default()
        };
        assert_eq!(
            sunburst(&tree, 10.0, &options),
            Err(LayoutError::InvalidSweep(0.0))
        );
    }

    #[test]
    fn all_zero_children_sit_at_parent_start() {
        let tree = tree_of(&[("A", 0.0), ("B", 0.0)]);
        let layout = sunburst(&tree, 10.0, &SunburstOptions::default()).unwrap();
        for &c in tree.children_of(tree.root()) {
            let s = sector(&layout, c);
            assert_eq!(s.start_angle, 0.0);
            assert_eq!(s.sweep(), 0.0);
        }
    }
}
