// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Arena-allocated tree nodes and their split/merge lifecycle.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::types::{Aabb, Category, Scalar};

/// Stored data for one item.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct Entry<T, const N: usize> {
    pub(crate) aabb: Aabb<T, N>,
    pub(crate) category: Category,
    /// Monotonic insertion stamp, used to order equidistant ray hits.
    pub(crate) seq: u64,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct NodeIdx(usize);

impl NodeIdx {
    const fn new(i: usize) -> Self {
        Self(i)
    }

    const fn get(self) -> usize {
        self.0
    }
}

/// Child handles of an internal node. Always exactly `1 << N` long.
pub(crate) type Children = SmallVec<[NodeIdx; 8]>;

/// A quadrant (2D) or octant (3D).
///
/// A node is a leaf while `children` is `None`. Items stored on an internal
/// node straddle the boundaries between its children.
#[derive(Clone, Debug)]
pub(crate) struct Node<K, T, const N: usize> {
    pub(crate) aabb: Aabb<T, N>,
    /// Non-owning back reference, used to walk upward when pruning.
    pub(crate) parent: Option<NodeIdx>,
    pub(crate) children: Option<Children>,
    pub(crate) items: HashMap<K, Entry<T, N>>,
}

impl<K, T, const N: usize> Node<K, T, N> {
    fn leaf(aabb: Aabb<T, N>, parent: Option<NodeIdx>) -> Self {
        Self {
            aabb,
            parent,
            children: None,
            items: HashMap::new(),
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Child handles, empty for a leaf.
    #[inline]
    pub(crate) fn children(&self) -> &[NodeIdx] {
        self.children.as_deref().unwrap_or(&[])
    }
}

/// Whether a leaf covering `aabb` may split under the given minimum span.
///
/// Every axis must keep halves at least `minimum_span` wide, and never
/// narrower than one unit.
pub(crate) fn can_split<T: Scalar, const N: usize>(
    aabb: &Aabb<T, N>,
    minimum_span: &[T; N],
) -> bool {
    (0..N).all(|a| {
        let half = T::half_span(aabb.min[a], aabb.max[a]);
        half >= minimum_span[a] && half >= T::one()
    })
}

/// The `1 << N` child boxes of `aabb`.
///
/// Child `c` takes the upper half on axis `a` iff bit `a` of `c` is set.
pub(crate) fn child_boxes<T: Scalar, const N: usize>(aabb: &Aabb<T, N>) -> SmallVec<[Aabb<T, N>; 8]> {
    let halves: [[(T, T); 2]; N] = core::array::from_fn(|a| T::split(aabb.min[a], aabb.max[a]));
    (0..1_usize << N)
        .map(|c| {
            let pick = |a: usize| halves[a][(c >> a) & 1];
            Aabb::new(
                core::array::from_fn(|a| pick(a).0),
                core::array::from_fn(|a| pick(a).1),
            )
        })
        .collect()
}

/// Slot arena owning every node of a tree.
#[derive(Clone, Debug)]
pub(crate) struct Arena<K, T, const N: usize> {
    slots: Vec<Option<Node<K, T, N>>>,
    free_list: Vec<usize>,
}

impl<K, T, const N: usize> Arena<K, T, N> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    pub(crate) fn get(&self, idx: NodeIdx) -> &Node<K, T, N> {
        self.slots[idx.get()]
            .as_ref()
            .expect("orthtree invariant violated: dangling node index")
    }

    pub(crate) fn get_mut(&mut self, idx: NodeIdx) -> &mut Node<K, T, N> {
        self.slots[idx.get()]
            .as_mut()
            .expect("orthtree invariant violated: dangling node index")
    }

    /// Allocate a fresh leaf.
    pub(crate) fn alloc_leaf(&mut self, aabb: Aabb<T, N>, parent: Option<NodeIdx>) -> NodeIdx {
        let node = Node::leaf(aabb, parent);
        if let Some(i) = self.free_list.pop() {
            self.slots[i] = Some(node);
            NodeIdx::new(i)
        } else {
            self.slots.push(Some(node));
            NodeIdx::new(self.slots.len() - 1)
        }
    }

    fn free(&mut self, idx: NodeIdx) {
        self.slots[idx.get()] = None;
        self.free_list.push(idx.get());
    }

    /// Drop every node.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
    }

    /// Whether an internal node can revert to a leaf: it holds no items and all
    /// of its children are empty leaves.
    pub(crate) fn is_collapsible(&self, idx: NodeIdx) -> bool {
        let node = self.get(idx);
        let Some(children) = &node.children else {
            return false;
        };
        node.items.is_empty()
            && children.iter().all(|&c| {
                let child = self.get(c);
                child.is_leaf() && child.items.is_empty()
            })
    }

    /// Collapse `idx` into a leaf if [`Arena::is_collapsible`]. Returns whether it merged.
    pub(crate) fn try_merge(&mut self, idx: NodeIdx) -> bool {
        if !self.is_collapsible(idx) {
            return false;
        }
        let Some(children) = self.get_mut(idx).children.take() else {
            return false;
        };
        for c in children {
            self.free(c);
        }
        log::trace!("merged node {}", idx.get());
        true
    }

    /// Rebuild the arena with every item key transformed, keeping node indices.
    pub(crate) fn map_keys<U, F>(&self, mut key: F) -> Arena<U, T, N>
    where
        T: Copy,
        U: Eq + Hash,
        F: FnMut(&K) -> U,
    {
        let slots = self
            .slots
            .iter()
            .map(|slot| {
                slot.as_ref().map(|node| Node {
                    aabb: node.aabb,
                    parent: node.parent,
                    children: node.children.clone(),
                    items: node.items.iter().map(|(k, e)| (key(k), *e)).collect(),
                })
            })
            .collect();
        Arena {
            slots,
            free_list: self.free_list.clone(),
        }
    }
}

impl<K: Eq + Hash, T: Scalar, const N: usize> Arena<K, T, N> {
    /// Turn the leaf `idx` into an internal node with `1 << N` empty leaf children.
    ///
    /// Items already on the leaf stay where they are.
    pub(crate) fn split(&mut self, idx: NodeIdx) {
        debug_assert!(self.get(idx).is_leaf(), "only leaves can split");
        let boxes = child_boxes(&self.get(idx).aabb);
        let children: Children = boxes
            .into_iter()
            .map(|aabb| self.alloc_leaf(aabb, Some(idx)))
            .collect();
        self.get_mut(idx).children = Some(children);
        log::trace!("split node {}", idx.get());
    }
}
