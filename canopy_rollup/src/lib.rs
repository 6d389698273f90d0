// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Rollup: aggregation trees for partition charts.
//!
//! This crate builds a typed tree of aggregate nodes ([`RollupTree`]) from a flat
//! slice of records and an ordered list of grouping accessors. Each grouper adds
//! one level of depth: depth 1 groups all records by the first accessor, depth 2
//! subdivides each depth-1 group by the second accessor, and so on. Every node
//! carries the sum of the values of the records below it, so
//! `value(parent) == sum(value(child))` holds for every internal node.
//!
//! The tree is immutable once built. A data or configuration change produces a
//! *new* tree rather than mutating the previous one in place; the previous tree
//! stays valid for as long as the caller holds it, which is what makes safe
//! interpolation between "previous" and "current" layouts possible downstream.
//!
//! Nodes are addressed two ways:
//! - by [`NodeId`], a dense index into the tree's arena, and
//! - by [`KeyPath`], the root-to-node sequence of grouping keys. Key paths are
//!   stable across rebuilds (they do not depend on allocation order), so they
//!   are the identity used for animation and highlight tracking.
//!
//! ## Example
//!
//! ```rust
//! use canopy_rollup::{BuildConfig, build};
//!
//! struct Row {
//!     group: &'static str,
//!     value: f64,
//! }
//!
//! let rows = [
//!     Row { group: "A", value: 10.0 },
//!     Row { group: "A", value: 5.0 },
//!     Row { group: "B", value: 20.0 },
//! ];
//!
//! let group = |r: &Row| Some(r.group);
//! let tree = build(
//!     &rows,
//!     &[&group],
//!     &|r| r.value,
//!     &BuildConfig::default(),
//! )
//! .unwrap();
//!
//! let root = tree.get(tree.root());
//! assert_eq!(root.value, 35.0);
//!
//! // Default sibling order is descending by aggregate value: B (20) before A (15).
//! let children = tree.children_of(tree.root());
//! assert_eq!(tree.get(children[0]).key, Some("B"));
//! assert_eq!(tree.get(children[1]).key, Some("A"));
//! ```
//!
//! Records whose key accessor returns `None` at some depth land in a designated
//! null-key bucket at that depth (see [`NullKeyPolicy`]), so no value silently
//! disappears from the chart. Negative record values are rejected with
//! [`BuildError::NegativeValue`]; zero-value leaves are retained so legends stay
//! complete.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod build;
mod tree;

pub use build::{BuildConfig, BuildError, NullKeyPolicy, SiblingSort, build};
pub use tree::{KeyPath, NodeId, RollupNode, RollupTree};
