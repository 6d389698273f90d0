// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Interact: hover and selection state for partition charts.
//!
//! [`InteractionState`] is a small state machine over three phases — idle,
//! hovering, and selected — driven by pointer events that the embedder has
//! already hit-tested to a [`NodeId`]. Highlighted nodes are remembered by
//! *key path*, not arena id, so a selection survives a data rebuild; after a
//! rebuild, [`InteractionState::revalidate`] drops state whose path no
//! longer resolves.
//!
//! Selection is sticky: while a node is selected, pointer enter and leave
//! events are ignored and only [`InteractionState::click`] or
//! [`InteractionState::clear`] change the phase. Every observable transition
//! bumps a version counter, which embedders can compare to decide whether to
//! re-render.
//!
//! ```rust
//! use canopy_interact::{Highlight, InteractionState};
//! use canopy_rollup::{BuildConfig, build};
//!
//! let rows = [("A", 10.0), ("B", 20.0)];
//! let group = |r: &(&'static str, f64)| Some(r.0);
//! let tree = build(&rows, &[&group], &|r| r.1, &BuildConfig::default()).unwrap();
//! let b = tree.children_of(tree.root())[0];
//!
//! let mut state = InteractionState::default();
//! state.pointer_enter(&tree, b);
//! assert!(matches!(state.phase(), Highlight::Hovering(_)));
//! state.click(&tree, b);
//! state.pointer_leave();
//! assert!(matches!(state.phase(), Highlight::Selected(_)));
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashSet;

use canopy_rollup::{KeyPath, NodeId, RollupTree};

/// The current highlight phase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Highlight<K> {
    /// Nothing hovered or selected.
    #[default]
    Idle,
    /// The pointer is over the node at this path.
    Hovering(KeyPath<K>),
    /// The node at this path is selected. Sticky: pointer enter and leave
    /// are ignored until the selection is replaced or cleared.
    Selected(KeyPath<K>),
}

impl<K> Highlight<K> {
    /// The highlighted path, if any.
    pub fn path(&self) -> Option<&KeyPath<K>> {
        match self {
            Self::Idle => None,
            Self::Hovering(path) | Self::Selected(path) => Some(path),
        }
    }
}

/// Which nodes count as highlighted for a given phase.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum HighlightStrategy {
    /// The highlighted node and its ancestors up to the root.
    #[default]
    Path,
    /// The path plus the highlighted node's whole descendant subtree.
    Branch,
}

/// One row of the legend breadcrumb for a highlighted node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegendEntry<K> {
    /// Depth of this path element, starting at 1.
    pub depth: usize,
    /// The grouping key at that depth; `None` is the null-key bucket.
    pub key: Option<K>,
}

/// Hover and selection state machine.
#[derive(Clone, Debug)]
pub struct InteractionState<K> {
    phase: Highlight<K>,
    strategy: HighlightStrategy,
    version: u64,
}

impl<K: Clone + Eq + Hash> Default for InteractionState<K> {
    fn default() -> Self {
        Self::new(HighlightStrategy::default())
    }
}

impl<K: Clone + Eq + Hash> InteractionState<K> {
    /// An idle state with the given highlight strategy.
    pub fn new(strategy: HighlightStrategy) -> Self {
        Self {
            phase: Highlight::Idle,
            strategy,
            version: 0,
        }
    }

    /// The current phase.
    pub fn phase(&self) -> &Highlight<K> {
        &self.phase
    }

    /// The highlight strategy.
    pub fn strategy(&self) -> HighlightStrategy {
        self.strategy
    }

    /// A counter that increases on every observable transition.
    ///
    /// Two equal readings straddling any number of events mean nothing the
    /// embedder can see has changed.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The pointer moved onto `id`. Returns whether the phase changed.
    ///
    /// Ignored while a selection is active; re-entering the node already
    /// hovered is not a transition.
    pub fn pointer_enter(&mut self, tree: &RollupTree<K>, id: NodeId) -> bool {
        if matches!(self.phase, Highlight::Selected(_)) {
            return false;
        }
        let path = tree.path_to(id);
        if self.phase == Highlight::Hovering(path.clone()) {
            return false;
        }
        self.transition(Highlight::Hovering(path))
    }

    /// The pointer left the chart. Returns whether the phase changed.
    pub fn pointer_leave(&mut self) -> bool {
        if matches!(self.phase, Highlight::Hovering(_)) {
            return self.transition(Highlight::Idle);
        }
        false
    }

    /// Select `id`, replacing any previous selection. Returns whether the
    /// phase changed; clicking the node already selected is not a
    /// transition.
    pub fn click(&mut self, tree: &RollupTree<K>, id: NodeId) -> bool {
        let path = tree.path_to(id);
        if self.phase == Highlight::Selected(path.clone()) {
            return false;
        }
        self.transition(Highlight::Selected(path))
    }

    /// Drop any hover or selection. Returns whether the phase changed.
    pub fn clear(&mut self) -> bool {
        if self.phase == Highlight::Idle {
            return false;
        }
        self.transition(Highlight::Idle)
    }

    /// Reconcile with a rebuilt tree: if the highlighted path no longer
    /// resolves, fall back to idle. Returns whether the phase changed.
    pub fn revalidate(&mut self, tree: &RollupTree<K>) -> bool {
        let stale = match self.phase.path() {
            Some(path) => tree.node_at_path(path).is_none(),
            None => false,
        };
        if stale {
            return self.transition(Highlight::Idle);
        }
        false
    }

    /// The set of node ids to render highlighted against `tree`.
    ///
    /// Empty when idle, or when the remembered path does not resolve in this
    /// tree (stale state between a rebuild and [`Self::revalidate`]). With
    /// [`HighlightStrategy::Path`] this is the node and its ancestors
    /// including the root; [`HighlightStrategy::Branch`] adds the node's
    /// descendant subtree.
    pub fn highlighted_set(&self, tree: &RollupTree<K>) -> HashSet<NodeId> {
        let mut set = HashSet::new();
        let Some(path) = self.phase.path() else {
            return set;
        };
        let Some(node) = tree.node_at_path(path) else {
            return set;
        };
        let mut cursor = Some(node);
        while let Some(id) = cursor {
            set.insert(id);
            cursor = tree.parent_of(id);
        }
        if self.strategy == HighlightStrategy::Branch {
            let mut stack: Vec<NodeId> = tree.children_of(node).into();
            while let Some(id) = stack.pop() {
                set.insert(id);
                stack.extend_from_slice(tree.children_of(id));
            }
        }
        set
    }

    /// The breadcrumb of keys from the root down to the highlighted node.
    ///
    /// Empty when idle. The root itself has no key and contributes no entry.
    pub fn legend_path(&self) -> Vec<LegendEntry<K>> {
        match self.phase.path() {
            None => Vec::new(),
            Some(path) => path
                .iter()
                .enumerate()
                .map(|(i, key)| LegendEntry {
                    depth: i + 1,
                    key: key.clone(),
                })
                .collect(),
        }
    }

    fn transition(&mut self, phase: Highlight<K>) -> bool {
        self.phase = phase;
        self.version += 1;
        true
    }
}
