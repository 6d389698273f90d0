// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types shared by the layout modes: geometry, flags, and errors.

use alloc::vec::Vec;
use kurbo::Rect;

use canopy_rollup::NodeId;

/// Which partition layout produced a [`PartitionLayout`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Angular sectors in per-depth radius bands.
    Sunburst,
    /// Nested rectangles.
    Treemap,
    /// Stacked value-proportional bands.
    Icicle,
}

/// An annular sector: the sunburst geometry for one node.
///
/// Angles are in radians, growing counter-clockwise from the configured start
/// angle. The sector covers `start_angle..end_angle` angularly and
/// `inner_radius..outer_radius` radially; the chart center is the origin.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sector {
    /// Angle at which the sector begins.
    pub start_angle: f64,
    /// Angle at which the sector ends. `end_angle >= start_angle`.
    pub end_angle: f64,
    /// Inner edge of the radius band.
    pub inner_radius: f64,
    /// Outer edge of the radius band.
    pub outer_radius: f64,
}

impl Sector {
    /// Angular span covered by this sector.
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Radial thickness of this sector's band.
    pub fn thickness(&self) -> f64 {
        self.outer_radius - self.inner_radius
    }

    /// Angular midpoint.
    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }

    /// Radial midpoint.
    pub fn mid_radius(&self) -> f64 {
        (self.inner_radius + self.outer_radius) / 2.0
    }

    /// A zero-sized sector anchored at the given angle and radius.
    pub const fn collapsed(angle: f64, radius: f64) -> Self {
        Self {
            start_angle: angle,
            end_angle: angle,
            inner_radius: radius,
            outer_radius: radius,
        }
    }
}

/// The geometric region assigned to one node.
///
/// Degenerate nodes (zero aggregate value) still receive a geometry — a
/// zero-span sector or zero-area tile — never a hole in the layout, so
/// downstream consumers can index uniformly.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum NodeGeometry {
    /// Sunburst sector.
    Sector(Sector),
    /// Treemap or icicle rectangle.
    Tile(Rect),
}

bitflags::bitflags! {
    /// Per-node layout flags for renderers.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct GeomFlags: u8 {
        /// Node has no children.
        const LEAF = 0b0000_0001;
        /// Node's aggregate value is zero; its geometry is zero-sized.
        const ZERO_SPAN = 0b0000_0010;
        /// Node is a null-key ("other") bucket.
        const NULL_KEY = 0b0000_0100;
    }
}

/// Layout output: one geometry and flag set per node, densely indexed by
/// [`NodeId`], in the same order as the tree's arena.
#[derive(Clone, Debug, PartialEq)]
pub struct PartitionLayout {
    pub(crate) mode: Mode,
    pub(crate) geoms: Vec<NodeGeometry>,
    pub(crate) flags: Vec<GeomFlags>,
    pub(crate) collapse_zero: bool,
}

impl PartitionLayout {
    pub(crate) fn with_capacity(mode: Mode, len: usize) -> Self {
        Self {
            mode,
            geoms: Vec::with_capacity(len),
            flags: Vec::with_capacity(len),
            collapse_zero: false,
        }
    }

    /// The layout mode that produced this layout.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Number of nodes covered. Equals the length of the source tree.
    pub fn len(&self) -> usize {
        self.geoms.len()
    }

    /// Returns `true` if the layout covers no nodes.
    pub fn is_empty(&self) -> bool {
        self.geoms.is_empty()
    }

    /// The geometry assigned to a node.
    ///
    /// # Panics
    ///
    /// Panics if `id` did not come from the tree this layout was computed for.
    pub fn geometry(&self, id: NodeId) -> &NodeGeometry {
        &self.geoms[id.index()]
    }

    /// The flags assigned to a node.
    pub fn flags(&self, id: NodeId) -> GeomFlags {
        self.flags[id.index()]
    }

    /// Iterate `(id, geometry, flags)` for every node.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeGeometry, GeomFlags)> + '_ {
        self.geoms
            .iter()
            .zip(self.flags.iter())
            .enumerate()
            .map(|(i, (g, f))| (NodeId::from_index(i), g, *f))
    }

    /// Iterate the nodes a renderer would actually paint.
    ///
    /// Zero-span nodes are included by default — their geometry is
    /// zero-sized, but legends and label passes still enumerate them. A
    /// layout computed with its options' `collapse_zero` set drops them
    /// here instead; [`Self::iter`] always yields every node either way.
    pub fn iter_visible(&self) -> impl Iterator<Item = (NodeId, &NodeGeometry, GeomFlags)> + '_ {
        let collapse = self.collapse_zero;
        self.iter()
            .filter(move |(_, _, f)| !(collapse && f.contains(GeomFlags::ZERO_SPAN)))
    }
}

/// Errors from the layout entry points. All variants are the "invalid region"
/// class: the bounded region handed to the partitioner cannot host a layout.
/// No partial layout is ever returned.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LayoutError {
    /// Radius was zero, negative, or non-finite.
    InvalidRadius(f64),
    /// Angular sweep was zero, negative, or non-finite.
    InvalidSweep(f64),
    /// Rectangle had a non-positive or non-finite width or height.
    InvalidRect {
        /// Width of the rejected rectangle.
        width: f64,
        /// Height of the rejected rectangle.
        height: f64,
    },
}

impl core::fmt::Display for LayoutError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidRadius(r) => write!(f, "layout radius must be positive, got {r}"),
            Self::InvalidSweep(s) => write!(f, "angular sweep must be positive, got {s}"),
            Self::InvalidRect { width, height } => write!(
                f,
                "layout rect must have positive extents, got {width} x {height}"
            ),
        }
    }
}

impl core::error::Error for LayoutError {}
