// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Anim: keyframe capture and interpolation of partition geometry.
//!
//! A [`GeometryFrame`] snapshots a layout keyed by each node's *key path*
//! rather than its arena id, so a node keeps its identity across rebuilds
//! even when unrelated siblings shift every [`NodeId`](canopy_rollup::NodeId)
//! underneath it. [`interpolate`] blends two frames at a parameter `t`:
//!
//! - Nodes present in both frames get per-field linear interpolation, exact
//!   at the endpoints (`t == 0.0` reproduces the source geometry bit for
//!   bit, `t == 1.0` the target).
//! - Nodes present only in the target grow out of a collapsed copy of their
//!   nearest surviving ancestor's source geometry; nodes present only in the
//!   source shrink into their nearest ancestor in the target.
//! - Frames of different layout modes do not blend shape families; the
//!   output snaps from source to target at `t == 0.5`.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use core::hash::Hash;

use hashbrown::HashMap;
use kurbo::{Point, Rect};

use canopy_layout::{Mode, NodeGeometry, PartitionLayout, Sector};
use canopy_rollup::{KeyPath, RollupTree};

/// A snapshot of one layout's geometry, keyed by node key path.
#[derive(Clone, Debug)]
pub struct GeometryFrame<K> {
    mode: Mode,
    map: HashMap<KeyPath<K>, NodeGeometry>,
}

impl<K: Clone + Eq + Hash> GeometryFrame<K> {
    /// Snapshot `layout`, keying each geometry by the node's path in `tree`.
    ///
    /// The tree must be the one the layout was computed from; the two are
    /// iterated in lockstep by node id.
    pub fn capture(tree: &RollupTree<K>, layout: &PartitionLayout) -> Self {
        let mut map = HashMap::with_capacity(tree.len());
        for id in tree.iter() {
            map.insert(tree.path_to(id), *layout.geometry(id));
        }
        Self {
            mode: layout.mode(),
            map,
        }
    }

    /// The layout mode this frame was captured from.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Number of captured nodes.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the frame is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The captured geometry for a key path, if that node existed.
    pub fn geometry(&self, path: &[Option<K>]) -> Option<&NodeGeometry> {
        self.map.get(path)
    }

    /// All captured (path, geometry) pairs, in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&KeyPath<K>, &NodeGeometry)> + '_ {
        self.map.iter()
    }

    /// The collapsed form of the nearest ancestor of `path` present in this
    /// frame. Falls back to a collapsed copy of `like` when even the root is
    /// missing (an empty frame).
    fn collapsed_at_ancestor(&self, path: &KeyPath<K>, like: &NodeGeometry) -> NodeGeometry {
        let mut prefix = path.clone();
        while !prefix.is_empty() {
            prefix.pop();
            if let Some(geom) = self.map.get(&prefix) {
                return collapsed(geom);
            }
        }
        collapsed(like)
    }
}

/// Blend two frames at parameter `t`, clamped to `0.0..=1.0`.
///
/// The output contains the union of both frames' key paths. Its mode is the
/// source's below `t == 0.5` and the target's from there on; when the modes
/// differ the geometries snap wholesale at that same point instead of
/// blending across shape families.
pub fn interpolate<K: Clone + Eq + Hash>(
    from: &GeometryFrame<K>,
    to: &GeometryFrame<K>,
    t: f64,
) -> GeometryFrame<K> {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    if from.mode != to.mode {
        return if t < 0.5 { from.clone() } else { to.clone() };
    }

    let mut map = HashMap::with_capacity(from.len().max(to.len()));
    for (path, target) in to.iter() {
        let source = match from.map.get(path) {
            Some(geom) => *geom,
            None => from.collapsed_at_ancestor(path, target),
        };
        map.insert(path.clone(), lerp_geometry(&source, target, t));
    }
    for (path, source) in from.iter() {
        if to.map.contains_key(path) {
            continue;
        }
        let target = to.collapsed_at_ancestor(path, source);
        map.insert(path.clone(), lerp_geometry(source, &target, t));
    }

    GeometryFrame {
        mode: if t < 0.5 { from.mode } else { to.mode },
        map,
    }
}

/// Linear interpolation, exact at both endpoints.
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

fn lerp_geometry(a: &NodeGeometry, b: &NodeGeometry, t: f64) -> NodeGeometry {
    match (a, b) {
        (NodeGeometry::Sector(s0), NodeGeometry::Sector(s1)) => NodeGeometry::Sector(Sector {
            start_angle: lerp(s0.start_angle, s1.start_angle, t),
            end_angle: lerp(s0.end_angle, s1.end_angle, t),
            inner_radius: lerp(s0.inner_radius, s1.inner_radius, t),
            outer_radius: lerp(s0.outer_radius, s1.outer_radius, t),
        }),
        (NodeGeometry::Tile(r0), NodeGeometry::Tile(r1)) => NodeGeometry::Tile(Rect::new(
            lerp(r0.x0, r1.x0, t),
            lerp(r0.y0, r1.y0, t),
            lerp(r0.x1, r1.x1, t),
            lerp(r0.y1, r1.y1, t),
        )),
        // Shape families never blend; pick a side.
        _ => {
            if t < 0.5 {
                *a
            } else {
                *b
            }
        }
    }
}

/// Zero-size geometry at the center of `geom`.
fn collapsed(geom: &NodeGeometry) -> NodeGeometry {
    match geom {
        NodeGeometry::Sector(s) => {
            NodeGeometry::Sector(Sector::collapsed(s.mid_angle(), s.mid_radius()))
        }
        NodeGeometry::Tile(rect) => {
            let Point { x, y } = rect.center();
            NodeGeometry::Tile(Rect::new(x, y, x, y))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_layout::{
        IcicleOptions, SunburstOptions, TreemapOptions, icicle, sunburst, treemap,
    };
    use canopy_rollup::{BuildConfig, NodeId, build};

    fn tree_of(rows: &[(&'static str, f64)]) -> RollupTree<&'static str> {
        let group = |r: &(&'static str, f64)| Some(r.0);
        build(rows, &[&group], &|r| r.1, &BuildConfig::default()).unwrap()
    }

    fn sunburst_frame(rows: &[(&'static str, f64)]) -> GeometryFrame<&'static str> {
        let tree = tree_of(rows);
        let layout = sunburst(&tree, 100.0, &SunburstOptions::default()).unwrap();
        GeometryFrame::capture(&tree, &layout)
    }

    #[test]
    fn endpoints_are_bit_exact_for_shared_nodes() {
        let from = sunburst_frame(&[("A", 10.0), ("B", 20.0)]);
        let to = sunburst_frame(&[("A", 25.0), ("B", 5.0)]);
        let path = [Some("A")];

        let at0 = interpolate(&from, &to, 0.0);
        assert_eq!(at0.geometry(&path), from.geometry(&path));
        let at1 = interpolate(&from, &to, 1.0);
        assert_eq!(at1.geometry(&path), to.geometry(&path));
    }

    #[test]
    fn midpoint_blends_each_field() {
        let from = sunburst_frame(&[("A", 10.0), ("B", 30.0)]);
        let to = sunburst_frame(&[("A", 30.0), ("B", 10.0)]);
        let path = [Some("A")];
        let NodeGeometry::Sector(s0) = from.geometry(&path).unwrap() else {
            panic!("expected sector");
        };
        let NodeGeometry::Sector(s1) = to.geometry(&path).unwrap() else {
            panic!("expected sector");
        };
        let mid = interpolate(&from, &to, 0.5);
        let NodeGeometry::Sector(m) = mid.geometry(&path).unwrap() else {
            panic!("expected sector");
        };
        assert_eq!(m.start_angle, (s0.start_angle + s1.start_angle) / 2.0);
        assert_eq!(m.end_angle, (s0.end_angle + s1.end_angle) / 2.0);
    }

    #[test]
    fn appearing_node_grows_from_its_ancestor() {
        let from = sunburst_frame(&[("A", 10.0)]);
        let to = sunburst_frame(&[("A", 10.0), ("B", 10.0)]);
        let path = [Some("B")];
        // "B" is absent from the source frame, so at t = 0 it sits collapsed
        // at the root's midpoint.
        let at0 = interpolate(&from, &to, 0.0);
        let NodeGeometry::Sector(s) = at0.geometry(&path).unwrap() else {
            panic!("expected sector");
        };
        assert_eq!(s.sweep(), 0.0);
        assert_eq!(s.thickness(), 0.0);
        // And at t = 1 it has its full target geometry.
        let at1 = interpolate(&from, &to, 1.0);
        assert_eq!(at1.geometry(&path), to.geometry(&path));
    }

    #[test]
    fn removed_node_shrinks_into_its_ancestor() {
        let from = sunburst_frame(&[("A", 10.0), ("B", 10.0)]);
        let to = sunburst_frame(&[("A", 10.0)]);
        let path = [Some("B")];
        let at0 = interpolate(&from, &to, 0.0);
        assert_eq!(at0.geometry(&path), from.geometry(&path));
        let at1 = interpolate(&from, &to, 1.0);
        let NodeGeometry::Sector(s) = at1.geometry(&path).unwrap() else {
            panic!("expected sector");
        };
        assert_eq!(s.sweep(), 0.0);
        assert_eq!(s.thickness(), 0.0);
    }

    #[test]
    fn parameter_is_clamped() {
        let from = sunburst_frame(&[("A", 10.0), ("B", 20.0)]);
        let to = sunburst_frame(&[("A", 20.0), ("B", 10.0)]);
        let path = [Some("A")];
        let below = interpolate(&from, &to, -3.0);
        assert_eq!(below.geometry(&path), from.geometry(&path));
        let above = interpolate(&from, &to, 7.5);
        assert_eq!(above.geometry(&path), to.geometry(&path));
    }

    #[test]
    fn mode_mismatch_snaps_at_the_midpoint() {
        let tree = tree_of(&[("A", 10.0), ("B", 20.0)]);
        let sun = sunburst(&tree, 100.0, &SunburstOptions::default()).unwrap();
        let map = treemap(
            &tree,
            Rect::new(0.0, 0.0, 100.0, 100.0),
            &TreemapOptions::default(),
        )
        .unwrap();
        let from = GeometryFrame::capture(&tree, &sun);
        let to = GeometryFrame::capture(&tree, &map);
        let path = [Some("A")];

        let early = interpolate(&from, &to, 0.49);
        assert_eq!(early.mode(), Mode::Sunburst);
        assert_eq!(early.geometry(&path), from.geometry(&path));
        let late = interpolate(&from, &to, 0.5);
        assert_eq!(late.mode(), Mode::Treemap);
        assert_eq!(late.geometry(&path), to.geometry(&path));
    }

    #[test]
    fn capture_keys_survive_arena_reindexing() {
        // Insert a sibling that sorts first; "A" moves to a different NodeId
        // but keeps its key path.
        let before = tree_of(&[("A", 10.0)]);
        let after = tree_of(&[("Z", 50.0), ("A", 10.0)]);
        let a_before = before.node_at_path(&[Some("A")]).unwrap();
        let a_after = after.node_at_path(&[Some("A")]).unwrap();
        assert_ne!(NodeId::index(a_before), NodeId::index(a_after));

        let f0 = {
            let layout = icicle(
                &before,
                Rect::new(0.0, 0.0, 100.0, 40.0),
                &IcicleOptions::default(),
            )
            .unwrap();
            GeometryFrame::capture(&before, &layout)
        };
        let f1 = {
            let layout = icicle(
                &after,
                Rect::new(0.0, 0.0, 100.0, 40.0),
                &IcicleOptions::default(),
            )
            .unwrap();
            GeometryFrame::capture(&after, &layout)
        };
        // Both frames address "A" by the same path.
        assert!(f0.geometry(&[Some("A")]).is_some());
        assert!(f1.geometry(&[Some("A")]).is_some());
        let blend = interpolate(&f0, &f1, 0.25);
        assert!(blend.geometry(&[Some("A")]).is_some());
    }
}
