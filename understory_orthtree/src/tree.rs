// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, insertion, removal, pruning.

use core::fmt;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::config::Config;
use crate::node::{Arena, Entry, NodeIdx, can_split};
use crate::types::{Aabb, Category, Scalar};

/// A spatial tree of axis-aligned boxes in `N` dimensions.
///
/// Each node covers a box. A leaf splits into `1 << N` equal children the
/// first time an insertion passes through it, as long as the halves stay at
/// least [`Config::minimum_span`] wide. An item is stored on the deepest
/// node whose box fully contains the item's box; items straddling a split
/// boundary stay on the internal node above it.
///
/// The tree also keeps a global item index, so membership tests, box lookups,
/// and duplicate detection are O(1).
///
/// Use [`Quadtree`] and [`Octree`] for the 2D and 3D cases.
///
/// ## Example
///
/// ```rust
/// use understory_orthtree::{Aabb, Config, Octree, QueryFilter};
///
/// let mut tree: Octree<&str, i64> =
///     Octree::new(Config::with_bounds(Aabb::new([0, 0, 0], [100, 100, 100])));
///
/// assert!(tree.insert("crate", Aabb::new([1, 1, 1], [2, 2, 2])));
/// // Does not fit in the root box.
/// assert!(!tree.insert("moon", Aabb::new([-100, -100, -100], [200, 200, 200])));
/// assert_eq!(tree.len(), 1);
///
/// let near_origin = Aabb::new([0, 0, 0], [10, 10, 10]);
/// assert_eq!(tree.query_contained_by(&near_origin, QueryFilter::new()), ["crate"]);
/// ```
#[derive(Clone)]
pub struct Orthtree<K, T, const N: usize> {
    config: Config<T, N>,
    nodes: Arena<K, T, N>,
    root: NodeIdx,
    index: HashMap<K, Entry<T, N>>,
    next_seq: u64,
}

/// Two-dimensional [`Orthtree`].
pub type Quadtree<K, T> = Orthtree<K, T, 2>;

/// Three-dimensional [`Orthtree`].
pub type Octree<K, T> = Orthtree<K, T, 3>;

impl<K, T: Scalar, const N: usize> fmt::Debug for Orthtree<K, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orthtree")
            .field("bounds", self.config.bounds())
            .field("items", &self.index.len())
            .field("nodes", &self.nodes.len())
            .field("trim_on_remove", &self.config.trim_on_remove())
            .finish_non_exhaustive()
    }
}

impl<K, T, const N: usize> Orthtree<K, T, N>
where
    K: Eq + Hash + Clone,
    T: Scalar,
{
    /// Create an empty tree with a single root leaf covering `config.bounds()`.
    pub fn new(config: Config<T, N>) -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc_leaf(*config.bounds(), None);
        Self {
            config,
            nodes,
            root,
            index: HashMap::new(),
            next_seq: 0,
        }
    }

    /// The configuration this tree was created with.
    #[inline]
    pub fn config(&self) -> &Config<T, N> {
        &self.config
    }

    /// The root box.
    #[inline]
    pub fn bounds(&self) -> &Aabb<T, N> {
        self.config.bounds()
    }

    /// Number of stored items.
    #[inline]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no items are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of live nodes, including the root.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether `item` is stored.
    #[inline]
    pub fn contains(&self, item: &K) -> bool {
        self.index.contains_key(item)
    }

    /// The box `item` was stored with, or `None` if it is not stored.
    #[inline]
    pub fn bounds_of(&self, item: &K) -> Option<Aabb<T, N>> {
        self.index.get(item).map(|e| e.aabb)
    }

    /// The category `item` was stored with, or `None` if it is not stored.
    #[inline]
    pub fn category_of(&self, item: &K) -> Option<Category> {
        self.index.get(item).map(|e| e.category)
    }

    /// Iterate all stored items with their boxes, in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Aabb<T, N>)> + '_ {
        self.index.iter().map(|(k, e)| (k, &e.aabb))
    }

    /// Insert `item` with the default category ([`Category::DYNAMIC`]).
    ///
    /// See [`Orthtree::insert_with_category`].
    ///
    /// # Panics
    ///
    /// Panics if `aabb` is malformed.
    #[inline]
    pub fn insert(&mut self, item: K, aabb: Aabb<T, N>) -> bool {
        self.insert_with_category(item, aabb, Category::default())
    }

    /// Insert `item` as [`Category::STATIC`].
    ///
    /// # Panics
    ///
    /// Panics if `aabb` is malformed.
    #[inline]
    pub fn insert_static(&mut self, item: K, aabb: Aabb<T, N>) -> bool {
        self.insert_with_category(item, aabb, Category::STATIC)
    }

    /// Insert `item` with box `aabb` and the given category.
    ///
    /// Returns `false`, leaving the tree untouched, if `aabb` is not fully
    /// inside the root box. If `item` is already stored it is moved to the new
    /// box (and category) rather than duplicated.
    ///
    /// # Panics
    ///
    /// Panics if `aabb` is malformed or `category` is not exactly one flag.
    pub fn insert_with_category(&mut self, item: K, aabb: Aabb<T, N>, category: Category) -> bool {
        assert!(aabb.is_well_formed(), "malformed box: {aabb:?}");
        assert!(
            category.bits().count_ones() == 1,
            "an item has exactly one category, got {category:?}"
        );
        if !self.config.bounds().contains(&aabb) {
            log::debug!("rejected box outside root bounds: {aabb:?}");
            return false;
        }
        if self.index.contains_key(&item) {
            self.remove(&item);
        }

        let entry = Entry {
            aabb,
            category,
            seq: self.next_seq,
        };
        self.next_seq += 1;

        let holder = self.place(&aabb);
        self.nodes.get_mut(holder).items.insert(item.clone(), entry);
        self.index.insert(item, entry);
        true
    }

    /// Walk down from the root, splitting eligible leaves on the way, and
    /// return the node that should hold a box.
    fn place(&mut self, aabb: &Aabb<T, N>) -> NodeIdx {
        let mut idx = self.root;
        loop {
            let node = self.nodes.get(idx);
            if node.is_leaf() {
                if !can_split(&node.aabb, self.config.minimum_span()) {
                    return idx;
                }
                self.nodes.split(idx);
            }
            match self.child_containing(idx, aabb) {
                Some(child) => idx = child,
                None => return idx,
            }
        }
    }

    /// First child of `idx`, in child order, whose box contains `aabb`.
    fn child_containing(&self, idx: NodeIdx, aabb: &Aabb<T, N>) -> Option<NodeIdx> {
        self.nodes
            .get(idx)
            .children()
            .iter()
            .copied()
            .find(|&c| self.nodes.get(c).aabb.contains(aabb))
    }

    /// Find the node holding `item`, following the same descent as insertion.
    fn locate(&self, item: &K, aabb: &Aabb<T, N>) -> NodeIdx {
        let mut idx = self.root;
        loop {
            if self.nodes.get(idx).items.contains_key(item) {
                return idx;
            }
            match self.child_containing(idx, aabb) {
                Some(child) => idx = child,
                None => unreachable!(
                    "orthtree invariant violated: indexed item with box {aabb:?} is held by no node"
                ),
            }
        }
    }

    /// Remove `item`. Returns `false` if it was not stored.
    ///
    /// With [`Config::trim_on_remove`] set, empty subtrees above the item's
    /// node are collapsed.
    pub fn remove(&mut self, item: &K) -> bool {
        let Some(entry) = self.index.remove(item) else {
            return false;
        };
        let holder = self.locate(item, &entry.aabb);
        self.nodes.get_mut(holder).items.remove(item);
        if self.config.trim_on_remove() {
            self.prune_upward(holder);
        }
        true
    }

    /// Collapse nodes from `idx` toward the root, stopping at the first one
    /// that cannot collapse.
    fn prune_upward(&mut self, idx: NodeIdx) {
        let node = self.nodes.get(idx);
        let mut current = if node.is_leaf() { node.parent } else { Some(idx) };
        while let Some(idx) = current {
            if !self.nodes.try_merge(idx) {
                break;
            }
            current = self.nodes.get(idx).parent;
        }
    }

    /// Collapse every empty subtree, bottom-up.
    ///
    /// This works whether or not [`Config::trim_on_remove`] is set.
    pub fn trim(&mut self) {
        let before = self.nodes.len();
        self.trim_subtree(self.root);
        log::debug!("trim released {} nodes", before - self.nodes.len());
    }

    fn trim_subtree(&mut self, idx: NodeIdx) {
        let Some(children) = self.nodes.get(idx).children.clone() else {
            return;
        };
        for child in children {
            self.trim_subtree(child);
        }
        self.nodes.try_merge(idx);
    }

    /// Remove every item and reset to a single root leaf.
    pub fn clear(&mut self) {
        log::debug!(
            "clearing {} items across {} nodes",
            self.index.len(),
            self.nodes.len()
        );
        self.index.clear();
        self.nodes.clear();
        self.root = self.nodes.alloc_leaf(*self.config.bounds(), None);
    }

    /// Build a tree of the same shape with every item replaced by `transform(item, box)`.
    ///
    /// Node boxes, splits, item boxes, and categories are carried over as-is.
    ///
    /// # Panics
    ///
    /// Panics if `transform` maps two distinct items to equal values.
    pub fn map<U, F>(&self, mut transform: F) -> Orthtree<U, T, N>
    where
        U: Eq + Hash + Clone,
        F: FnMut(&K, &Aabb<T, N>) -> U,
    {
        let mapped: HashMap<&K, U> = self
            .index
            .iter()
            .map(|(k, e)| (k, transform(k, &e.aabb)))
            .collect();
        let index: HashMap<U, Entry<T, N>> = mapped
            .iter()
            .map(|(k, u)| (u.clone(), self.index[*k]))
            .collect();
        assert_eq!(
            index.len(),
            self.index.len(),
            "map transform must not merge distinct items"
        );
        let nodes = self.nodes.map_keys(|k| mapped[&k].clone());
        Orthtree {
            config: self.config,
            nodes,
            root: self.root,
            index,
            next_seq: self.next_seq,
        }
    }

    pub(crate) fn root(&self) -> NodeIdx {
        self.root
    }

    pub(crate) fn nodes(&self) -> &Arena<K, T, N> {
        &self.nodes
    }
}

#[cfg(test)]
impl<K, T, const N: usize> Orthtree<K, T, N>
where
    K: Eq + Hash + Clone + fmt::Debug,
    T: Scalar,
{
    /// Check that the global index and the node maps agree, and that the node
    /// graph is well linked.
    pub(crate) fn assert_consistent(&self) {
        let mut seen = 0;
        let mut reachable = 0;
        let mut stack = alloc::vec![(self.root, None)];
        while let Some((idx, parent)) = stack.pop() {
            reachable += 1;
            let node = self.nodes.get(idx);
            assert_eq!(node.parent, parent, "parent link of node {idx:?}");
            for (k, e) in &node.items {
                assert_eq!(self.index.get(k), Some(e), "index entry for {k:?}");
                assert!(node.aabb.contains(&e.aabb), "{k:?} escapes its node");
                assert!(
                    self.child_containing(idx, &e.aabb).is_none(),
                    "{k:?} should live deeper"
                );
                seen += 1;
            }
            if let Some(children) = &node.children {
                assert_eq!(children.len(), 1 << N, "partial sibling set");
                for &c in children {
                    assert!(node.aabb.contains(&self.nodes.get(c).aabb), "child escapes");
                    stack.push((c, Some(idx)));
                }
            }
        }
        assert_eq!(seen, self.index.len(), "node maps and index disagree");
        assert_eq!(reachable, self.nodes.len(), "unreachable live nodes");
    }
}
