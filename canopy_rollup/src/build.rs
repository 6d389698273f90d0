// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree construction: grouping, aggregation, and sibling ordering.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use crate::tree::{KeyPath, NodeId, RollupNode, RollupTree};

/// How siblings are ordered within their parent.
///
/// Whatever the policy, ties are broken by first-seen record order, so the
/// resulting order is total and `sort_index` is deterministic across rebuilds
/// from identical input.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SiblingSort {
    /// Largest aggregate first. The conventional partition-chart order.
    #[default]
    ValueDescending,
    /// Smallest aggregate first.
    ValueAscending,
    /// Keep groups in the order their first record appeared.
    InputOrder,
}

/// What to do with records whose grouper returns `None` at some depth.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum NullKeyPolicy {
    /// Collect them under a designated null-key ("other") bucket at that
    /// depth, so their value stays visible in the chart.
    #[default]
    Bucket,
    /// Drop them from that depth downward. Ancestor aggregates then count
    /// only the records that survived.
    Drop,
}

/// Configuration for [`build`].
#[derive(Copy, Clone, Debug, Default)]
pub struct BuildConfig {
    /// Sibling ordering policy.
    pub sort: SiblingSort,
    /// Null-key handling policy.
    pub null_keys: NullKeyPolicy,
}

/// Errors from [`build`]. A failed build returns no tree at all; the caller
/// keeps whatever tree it was previously holding.
#[derive(Clone, Debug, PartialEq)]
pub enum BuildError {
    /// The value accessor produced a negative value. Partition charts divide
    /// space proportionally, so negative contributions are meaningless.
    NegativeValue {
        /// Index of the offending record in the input slice.
        record: usize,
        /// The value the accessor returned.
        value: f64,
    },
    /// The value accessor produced NaN or an infinity.
    NonFiniteValue {
        /// Index of the offending record in the input slice.
        record: usize,
    },
}

impl core::fmt::Display for BuildError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NegativeValue { record, value } => write!(
                f,
                "record {record} has negative value {value}; partition values must be >= 0"
            ),
            Self::NonFiniteValue { record } => {
                write!(f, "record {record} has a non-finite value")
            }
        }
    }
}

impl core::error::Error for BuildError {}

/// Build a [`RollupTree`] from flat records.
///
/// `groupers` are applied in order, one tree depth per accessor; `value`
/// supplies each record's contribution. The function is pure: identical
/// inputs produce an identical tree, including `sort_index` assignments.
///
/// Zero-value records are retained as zero-value leaves rather than removed,
/// so legend and label enumeration stays complete. Negative and non-finite
/// values abort the build with a [`BuildError`].
///
/// With an empty `groupers` slice the tree is a single root leaf holding all
/// records.
pub fn build<R, K>(
    records: &[R],
    groupers: &[&dyn Fn(&R) -> Option<K>],
    value: &dyn Fn(&R) -> f64,
    config: &BuildConfig,
) -> Result<RollupTree<K>, BuildError>
where
    K: Clone + Eq + Hash,
{
    // Evaluate and validate every record value up front; no partial tree is
    // built when any record is rejected.
    let mut values = Vec::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let v = value(record);
        if !v.is_finite() {
            return Err(BuildError::NonFiniteValue { record: i });
        }
        if v < 0.0 {
            return Err(BuildError::NegativeValue { record: i, value: v });
        }
        values.push(v);
    }

    let mut tree = RollupTree {
        nodes: Vec::new(),
        by_path: HashMap::new(),
        max_depth: 0,
    };
    tree.nodes.push(RollupNode {
        depth: 0,
        key: None,
        value: 0.0,
        sort_index: 0,
        parent: None,
        children: Vec::new(),
        records: Vec::new(),
    });

    let members: Vec<usize> = (0..records.len()).collect();
    let mut path = KeyPath::new();
    let total = subdivide(
        &mut tree,
        NodeId::from_index(0),
        &mut path,
        members,
        records,
        groupers,
        &values,
        config,
    );
    tree.nodes[0].value = total;
    Ok(tree)
}

/// Group `members` by the grouper at this node's depth, attach one child per
/// group, and recurse. Returns the aggregate value of the subtree, which is
/// the sum of the surviving members' values.
fn subdivide<R, K>(
    tree: &mut RollupTree<K>,
    parent: NodeId,
    path: &mut KeyPath<K>,
    members: Vec<usize>,
    records: &[R],
    groupers: &[&dyn Fn(&R) -> Option<K>],
    values: &[f64],
    config: &BuildConfig,
) -> f64
where
    K: Clone + Eq + Hash,
{
    let depth = tree.nodes[parent.index()].depth;
    if depth > tree.max_depth {
        tree.max_depth = depth;
    }

    let Some(grouper) = groupers.get(depth) else {
        // Leaf: keep the contributing records and sum them.
        let sum: f64 = members.iter().map(|&ri| values[ri]).sum();
        tree.nodes[parent.index()].records = members;
        return sum;
    };

    // Bucket members by key, preserving first-seen group order so ties sort
    // deterministically.
    let mut order: Vec<Option<K>> = Vec::new();
    let mut buckets: HashMap<Option<K>, Vec<usize>> = HashMap::new();
    for &ri in &members {
        let key = grouper(&records[ri]);
        if key.is_none() && config.null_keys == NullKeyPolicy::Drop {
            continue;
        }
        match buckets.entry(key) {
            Entry::Occupied(mut e) => e.get_mut().push(ri),
            Entry::Vacant(e) => {
                order.push(e.key().clone());
                e.insert(alloc::vec![ri]);
            }
        }
    }

    // Sort groups by the configured policy; stable sort keeps the first-seen
    // tiebreak intact.
    let mut groups: Vec<(Option<K>, Vec<usize>, f64)> = order
        .into_iter()
        .map(|key| {
            let group_members = buckets.remove(&key).expect("key came from this map");
            let sum: f64 = group_members.iter().map(|&ri| values[ri]).sum();
            (key, group_members, sum)
        })
        .collect();
    match config.sort {
        SiblingSort::ValueDescending => groups.sort_by(|a, b| b.2.total_cmp(&a.2)),
        SiblingSort::ValueAscending => groups.sort_by(|a, b| a.2.total_cmp(&b.2)),
        SiblingSort::InputOrder => {}
    }

    let mut aggregate = 0.0;
    for (sort_index, (key, group_members, _)) in groups.into_iter().enumerate() {
        let id = NodeId::from_index(tree.nodes.len());
        tree.nodes.push(RollupNode {
            depth: depth + 1,
            key: key.clone(),
            value: 0.0,
            sort_index,
            parent: Some(parent),
            children: Vec::new(),
            records: Vec::new(),
        });
        tree.nodes[parent.index()].children.push(id);

        path.push(key);
        tree.by_path.insert(path.clone(), id);
        let sum = subdivide(
            tree,
            id,
            path,
            group_members,
            records,
            groupers,
            values,
            config,
        );
        path.pop();

        tree.nodes[id.index()].value = sum;
        aggregate += sum;
    }
    aggregate
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[derive(Clone)]
    struct Row {
        g: Option<&'static str>,
        h: Option<&'static str>,
        v: f64,
    }

    fn row(g: &'static str, v: f64) -> Row {
        Row {
            g: Some(g),
            h: None,
            v,
        }
    }

    fn by_g(r: &Row) -> Option<&'static str> {
        r.g
    }

    fn by_h(r: &Row) -> Option<&'static str> {
        r.h
    }

    #[test]
    fn aggregate_scenario_from_three_records() {
        // [{g:"A",v:10},{g:"A",v:5},{g:"B",v:20}] -> root 35, B (20) before A (15).
        let rows = [row("A", 10.0), row("A", 5.0), row("B", 20.0)];
        let tree = build(&rows, &[&by_g], &|r| r.v, &BuildConfig::default()).unwrap();

        assert_eq!(tree.get(tree.root()).value, 35.0);
        let children = tree.children_of(tree.root());
        assert_eq!(children.len(), 2);
        let b = tree.get(children[0]);
        let a = tree.get(children[1]);
        assert_eq!(b.key, Some("B"));
        assert_eq!(b.value, 20.0);
        assert_eq!(b.sort_index, 0);
        assert_eq!(a.key, Some("A"));
        assert_eq!(a.value, 15.0);
        assert_eq!(a.sort_index, 1);
    }

    #[test]
    fn aggregate_equals_sum_of_children_recursively() {
        let rows = [
            Row { g: Some("A"), h: Some("x"), v: 1.0 },
            Row { g: Some("A"), h: Some("y"), v: 2.0 },
            Row { g: Some("B"), h: Some("x"), v: 4.0 },
            Row { g: Some("B"), h: Some("y"), v: 8.0 },
            Row { g: Some("B"), h: Some("y"), v: 16.0 },
        ];
        let tree = build(&rows, &[&by_g, &by_h], &|r| r.v, &BuildConfig::default()).unwrap();

        for id in tree.iter() {
            let node = tree.get(id);
            if !node.is_leaf() {
                let child_sum: f64 = tree
                    .children_of(id)
                    .iter()
                    .map(|&c| tree.get(c).value)
                    .sum();
                assert_eq!(
                    node.value, child_sum,
                    "internal node value must equal the sum of its children"
                );
            }
        }
        assert_eq!(tree.get(tree.root()).value, 31.0);
    }

    #[test]
    fn negative_value_rejected() {
        let rows = [row("A", 10.0), row("B", -1.0)];
        let err = build(&rows, &[&by_g], &|r| r.v, &BuildConfig::default()).unwrap_err();
        assert_eq!(err, BuildError::NegativeValue { record: 1, value: -1.0 });
    }

    #[test]
    fn non_finite_value_rejected() {
        let rows = [row("A", f64::NAN)];
        let err = build(&rows, &[&by_g], &|r| r.v, &BuildConfig::default()).unwrap_err();
        assert_eq!(err, BuildError::NonFiniteValue { record: 0 });
    }

    #[test]
    fn zero_value_leaves_are_retained() {
        let rows = [row("A", 0.0), row("B", 5.0)];
        let tree = build(&rows, &[&by_g], &|r| r.v, &BuildConfig::default()).unwrap();
        let children = tree.children_of(tree.root());
        assert_eq!(children.len(), 2, "zero-value groups must not be dropped");
        assert_eq!(tree.get(children[1]).key, Some("A"));
        assert_eq!(tree.get(children[1]).value, 0.0);
    }

    #[test]
    fn null_keys_bucket_by_default() {
        let rows = [
            row("A", 10.0),
            Row { g: None, h: None, v: 7.0 },
        ];
        let tree = build(&rows, &[&by_g], &|r| r.v, &BuildConfig::default()).unwrap();
        assert_eq!(tree.get(tree.root()).value, 17.0);
        let children = tree.children_of(tree.root());
        assert_eq!(children.len(), 2);
        let bucket = children
            .iter()
            .find(|&&c| tree.get(c).key.is_none())
            .expect("null bucket should exist");
        assert_eq!(tree.get(*bucket).value, 7.0);
    }

    #[test]
    fn null_keys_dropped_when_configured() {
        let rows = [
            row("A", 10.0),
            Row { g: None, h: None, v: 7.0 },
        ];
        let config = BuildConfig {
            null_keys: NullKeyPolicy::Drop,
            ..BuildConfig::default()
        };
        let tree = build(&rows, &[&by_g], &|r| r.v, &config).unwrap();
        assert_eq!(tree.children_of(tree.root()).len(), 1);
        assert_eq!(
            tree.get(tree.root()).value,
            10.0,
            "dropped records must not count toward ancestors"
        );
    }

    #[test]
    fn equal_values_keep_first_seen_order() {
        let rows = [row("B", 5.0), row("A", 5.0), row("C", 5.0)];
        let tree = build(&rows, &[&by_g], &|r| r.v, &BuildConfig::default()).unwrap();
        let keys: vec::Vec<_> = tree
            .children_of(tree.root())
            .iter()
            .map(|&c| tree.get(c).key)
            .collect();
        assert_eq!(keys, vec![Some("B"), Some("A"), Some("C")]);
    }

    #[test]
    fn rebuild_is_deterministic() {
        let rows = [
            row("C", 3.0),
            row("A", 3.0),
            row("B", 9.0),
            row("A", 1.0),
        ];
        let first = build(&rows, &[&by_g], &|r| r.v, &BuildConfig::default()).unwrap();
        let second = build(&rows, &[&by_g], &|r| r.v, &BuildConfig::default()).unwrap();
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(first.get(a).key, second.get(b).key);
            assert_eq!(first.get(a).sort_index, second.get(b).sort_index);
            assert_eq!(first.get(a).value, second.get(b).value);
        }
    }

    #[test]
    fn input_order_policy_preserves_appearance_order() {
        let rows = [row("C", 1.0), row("A", 100.0), row("B", 10.0)];
        let config = BuildConfig {
            sort: SiblingSort::InputOrder,
            ..BuildConfig::default()
        };
        let tree = build(&rows, &[&by_g], &|r| r.v, &config).unwrap();
        let keys: vec::Vec<_> = tree
            .children_of(tree.root())
            .iter()
            .map(|&c| tree.get(c).key)
            .collect();
        assert_eq!(keys, vec![Some("C"), Some("A"), Some("B")]);
    }

    #[test]
    fn no_groupers_yields_single_leaf_root() {
        let rows = [row("A", 1.0), row("B", 2.0)];
        let groupers: [&dyn Fn(&Row) -> Option<&'static str>; 0] = [];
        let tree = build(&rows, &groupers, &|r| r.v, &BuildConfig::default()).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(tree.root()).value, 3.0);
        assert_eq!(tree.leaf_records(tree.root()), &[0, 1]);
    }

    #[test]
    fn leaf_records_point_back_at_input() {
        let rows = [row("A", 10.0), row("B", 20.0), row("A", 5.0)];
        let tree = build(&rows, &[&by_g], &|r| r.v, &BuildConfig::default()).unwrap();
        let children = tree.children_of(tree.root());
        // A (15) sorts after B (20).
        assert_eq!(tree.leaf_records(children[0]), &[1]);
        assert_eq!(tree.leaf_records(children[1]), &[0, 2]);
    }
}
