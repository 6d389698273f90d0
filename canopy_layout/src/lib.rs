// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Layout: proportional spatial partitioning of rollup trees.
//!
//! Given a [`RollupTree`](canopy_rollup::RollupTree) and a bounded region,
//! this crate assigns every node a geometric region proportional to its share
//! of its parent's aggregate value:
//!
//! - [`sunburst`]: angular sectors in fixed per-depth radius bands.
//! - [`treemap`]: nested rectangles, squarified ([Bruls et al.]) or
//!   slice-and-dice.
//! - [`icicle`]: value-proportional bands stacked along one axis, with depth
//!   advancing along the other.
//!
//! The output is a [`PartitionLayout`]: one [`NodeGeometry`] plus
//! [`GeomFlags`] per node, densely indexed by
//! [`NodeId`](canopy_rollup::NodeId). Zero-value nodes receive zero-sized
//! geometry (flagged [`GeomFlags::ZERO_SPAN`]) rather than being omitted, so
//! consumers can iterate the tree and the layout in lockstep.
//!
//! ## Numeric policy
//!
//! Proportional shares are accumulated along a cursor and the last sibling
//! with a positive share absorbs the floating-point remainder
//! (`parent_end - cursor`) instead of receiving an independently rounded
//! share. Child spans therefore sum *exactly* to the parent's span, no matter
//! how many siblings there are.
//!
//! ## Example
//!
//! ```rust
//! use canopy_layout::{NodeGeometry, SunburstOptions, sunburst};
//! use canopy_rollup::{BuildConfig, build};
//!
//! let rows = [("A", 10.0), ("A", 5.0), ("B", 20.0)];
//! let group = |r: &(&'static str, f64)| Some(r.0);
//! let tree = build(&rows, &[&group], &|r| r.1, &BuildConfig::default()).unwrap();
//!
//! let layout = sunburst(&tree, 100.0, &SunburstOptions::default()).unwrap();
//! let children = tree.children_of(tree.root());
//! let NodeGeometry::Sector(b) = layout.geometry(children[0]) else {
//!     unreachable!()
//! };
//! // "B" holds 20/35 of the full circle.
//! let expected = 20.0 / 35.0 * core::f64::consts::TAU;
//! assert!((b.sweep() - expected).abs() < 1e-12);
//! ```
//!
//! [Bruls et al.]: https://www.win.tue.nl/~vanwijk/stm.pdf
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod icicle;
mod sunburst;
mod treemap;
mod types;

pub use icicle::{IcicleOptions, Orientation, icicle};
pub use sunburst::{SunburstOptions, sunburst};
pub use treemap::{TreemapOptions, TreemapStrategy, treemap};
pub use types::{GeomFlags, LayoutError, Mode, NodeGeometry, PartitionLayout, Sector};
