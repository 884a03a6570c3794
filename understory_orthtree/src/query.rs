// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spatial queries: containment, overlap, point, and ray casts.

use alloc::vec::Vec;
use core::hash::Hash;

use crate::node::{Entry, NodeIdx};
use crate::ray::{Ray, RayHit};
use crate::tree::Orthtree;
use crate::types::{Aabb, Category, Scalar};

/// Filters applied during queries.
///
/// Used by every `query_*`, `visit_*`, and [`Orthtree::raycast`] call to
/// restrict which item categories participate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueryFilter {
    /// Categories to include. An item is yielded if its category is in this set.
    pub categories: Category,
}

impl Default for QueryFilter {
    fn default() -> Self {
        Self {
            categories: Category::all(),
        }
    }
}

impl QueryFilter {
    /// Create a filter that includes every item.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter to only static items.
    pub fn statics(mut self) -> Self {
        self.categories = Category::STATIC;
        self
    }

    /// Filter to only dynamic items.
    pub fn dynamics(mut self) -> Self {
        self.categories = Category::DYNAMIC;
        self
    }

    /// Check if an item's category satisfies this filter.
    pub fn matches(&self, category: Category) -> bool {
        self.categories.intersects(category)
    }
}

impl<K, T, const N: usize> Orthtree<K, T, N>
where
    K: Eq + Hash + Clone,
    T: Scalar,
{
    /// Call `f` for every item whose box lies entirely inside `query` (edges inclusive).
    ///
    /// Items are visited in node pre-order; order within a node is unspecified.
    ///
    /// # Panics
    ///
    /// Panics if `query` is malformed.
    pub fn visit_contained_by<F>(&self, query: &Aabb<T, N>, filter: QueryFilter, mut f: F)
    where
        F: FnMut(&K, &Aabb<T, N>),
    {
        assert!(query.is_well_formed(), "malformed query box: {query:?}");
        self.contained_by_rec(self.root(), query, filter, &mut f);
    }

    fn contained_by_rec<F>(&self, idx: NodeIdx, query: &Aabb<T, N>, filter: QueryFilter, f: &mut F)
    where
        F: FnMut(&K, &Aabb<T, N>),
    {
        let node = self.nodes().get(idx);
        if query.contains(&node.aabb) {
            self.visit_subtree(idx, filter, f);
            return;
        }
        for (k, e) in &node.items {
            if filter.matches(e.category) && query.contains(&e.aabb) {
                f(k, &e.aabb);
            }
        }
        for &child in node.children() {
            self.contained_by_rec(child, query, filter, f);
        }
    }

    /// Every item in the subtree rooted at `idx`, no geometry checks.
    fn visit_subtree<F>(&self, idx: NodeIdx, filter: QueryFilter, f: &mut F)
    where
        F: FnMut(&K, &Aabb<T, N>),
    {
        let node = self.nodes().get(idx);
        for (k, e) in &node.items {
            if filter.matches(e.category) {
                f(k, &e.aabb);
            }
        }
        for &child in node.children() {
            self.visit_subtree(child, filter, f);
        }
    }

    /// Items whose box lies entirely inside `query` (edges inclusive).
    ///
    /// # Panics
    ///
    /// Panics if `query` is malformed.
    pub fn query_contained_by(&self, query: &Aabb<T, N>, filter: QueryFilter) -> Vec<K> {
        let mut out = Vec::new();
        self.visit_contained_by(query, filter, |k, _| out.push(k.clone()));
        out
    }

    /// Call `f` for every item whose box strictly overlaps `query`.
    ///
    /// Subtrees whose box does not overlap `query` are skipped.
    ///
    /// # Panics
    ///
    /// Panics if `query` is malformed.
    pub fn visit_overlapped_by<F>(&self, query: &Aabb<T, N>, filter: QueryFilter, mut f: F)
    where
        F: FnMut(&K, &Aabb<T, N>),
    {
        assert!(query.is_well_formed(), "malformed query box: {query:?}");
        self.overlapped_by_rec(self.root(), query, filter, &mut f);
    }

    fn overlapped_by_rec<F>(&self, idx: NodeIdx, query: &Aabb<T, N>, filter: QueryFilter, f: &mut F)
    where
        F: FnMut(&K, &Aabb<T, N>),
    {
        let node = self.nodes().get(idx);
        if !query.overlaps(&node.aabb) {
            return;
        }
        for (k, e) in &node.items {
            if filter.matches(e.category) && query.overlaps(&e.aabb) {
                f(k, &e.aabb);
            }
        }
        for &child in node.children() {
            self.overlapped_by_rec(child, query, filter, f);
        }
    }

    /// Items whose box strictly overlaps `query`.
    ///
    /// Touching along a face, edge, or corner is not an overlap.
    ///
    /// # Panics
    ///
    /// Panics if `query` is malformed.
    pub fn query_overlapped_by(&self, query: &Aabb<T, N>, filter: QueryFilter) -> Vec<K> {
        let mut out = Vec::new();
        self.visit_overlapped_by(query, filter, |k, _| out.push(k.clone()));
        out
    }

    /// Call `f` for every item whose box contains `point` (edges inclusive).
    pub fn visit_point<F>(&self, point: &[T; N], filter: QueryFilter, mut f: F)
    where
        F: FnMut(&K, &Aabb<T, N>),
    {
        let mut stack = alloc::vec![self.root()];
        while let Some(idx) = stack.pop() {
            let node = self.nodes().get(idx);
            if !node.aabb.contains_point(point) {
                continue;
            }
            for (k, e) in &node.items {
                if filter.matches(e.category) && e.aabb.contains_point(point) {
                    f(k, &e.aabb);
                }
            }
            stack.extend(node.children().iter().rev());
        }
    }

    /// Items whose box contains `point` (edges inclusive).
    pub fn query_point(&self, point: &[T; N], filter: QueryFilter) -> Vec<K> {
        let mut out = Vec::new();
        self.visit_point(point, filter, |k, _| out.push(k.clone()));
        out
    }

    /// Items whose box the ray hits, nearest first.
    ///
    /// Hits are ordered by [`RayHit::distance`], the distance from the ray
    /// origin to the lower corner of the item's box. Items at equal distance
    /// are all returned, in insertion order (a re-inserted item counts as new).
    ///
    /// ## Example
    ///
    /// ```rust
    /// use understory_orthtree::{Aabb, Config, Quadtree, QueryFilter, Ray};
    ///
    /// let mut tree: Quadtree<&str, f64> =
    ///     Quadtree::new(Config::with_bounds(Aabb::new([0.0, 0.0], [64.0, 64.0])));
    /// tree.insert("far", Aabb::new([40.0, 40.0], [41.0, 41.0]));
    /// tree.insert("near", Aabb::new([4.0, 4.0], [5.0, 5.0]));
    /// tree.insert("off", Aabb::new([40.0, 0.0], [41.0, 1.0]));
    ///
    /// let ray = Ray::new([0.0, 0.0], [1.0, 1.0]);
    /// let hits: Vec<&str> = tree
    ///     .raycast(&ray, QueryFilter::new())
    ///     .into_iter()
    ///     .map(|hit| hit.item)
    ///     .collect();
    /// assert_eq!(hits, ["near", "far"]);
    /// ```
    pub fn raycast(&self, ray: &Ray<N>, filter: QueryFilter) -> Vec<RayHit<K, T, N>> {
        let mut hits: Vec<(f64, u64, &K, &Entry<T, N>)> = Vec::new();
        let mut stack = alloc::vec![self.root()];
        while let Some(idx) = stack.pop() {
            let node = self.nodes().get(idx);
            if !ray.intersects(&node.aabb) {
                continue;
            }
            for (k, e) in &node.items {
                if filter.matches(e.category) && ray.intersects(&e.aabb) {
                    hits.push((ray.hit_distance(&e.aabb), e.seq, k, e));
                }
            }
            stack.extend(node.children().iter().rev());
        }
        hits.sort_unstable_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        hits.into_iter()
            .map(|(distance, _, k, e)| RayHit {
                item: k.clone(),
                aabb: e.aabb,
                distance,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::tree::{Octree, Quadtree};

    fn sorted<K: Ord>(mut v: Vec<K>) -> Vec<K> {
        v.sort_unstable();
        v
    }

    fn grid() -> Quadtree<u32, i64> {
        let mut tree = Quadtree::new(Config::with_bounds(Aabb::new([0, 0], [99, 99])));
        // 10 x 10 grid of 5-wide cells spaced 10 apart.
        for y in 0..10 {
            for x in 0..10 {
                let min = [i64::from(x) * 10, i64::from(y) * 10];
                tree.insert(y * 10 + x, Aabb::new(min, [min[0] + 4, min[1] + 4]));
            }
        }
        tree
    }

    #[test]
    fn contained_by_is_inclusive() {
        let tree = grid();
        let q = Aabb::new([10, 10], [24, 24]);
        assert_eq!(sorted(tree.query_contained_by(&q, QueryFilter::new())), [11, 12, 21, 22]);
        // Cutting a cell in half excludes it.
        let q = Aabb::new([10, 10], [23, 24]);
        assert_eq!(sorted(tree.query_contained_by(&q, QueryFilter::new())), [11, 21]);
    }

    #[test]
    fn contained_by_root_returns_everything() {
        let tree = grid();
        let all = tree.query_contained_by(tree.bounds(), QueryFilter::new());
        assert_eq!(all.len(), 100);
    }

    #[test]
    fn overlap_is_a_superset_of_containment() {
        let tree = grid();
        let q = Aabb::new([12, 12], [32, 32]);
        let contained = sorted(tree.query_contained_by(&q, QueryFilter::new()));
        let overlapped = sorted(tree.query_overlapped_by(&q, QueryFilter::new()));
        assert_eq!(contained, [22]);
        assert_eq!(overlapped, [11, 12, 13, 21, 22, 23, 31, 32, 33]);
        for k in &contained {
            assert!(overlapped.contains(k));
        }
    }

    #[test]
    fn touching_does_not_overlap() {
        let tree = grid();
        // Shares only the right edge of cell 0.
        let q = Aabb::new([4, 0], [6, 4]);
        assert!(tree.query_overlapped_by(&q, QueryFilter::new()).is_empty());
    }

    #[test]
    fn point_query_includes_edges() {
        let tree = grid();
        assert_eq!(tree.query_point(&[14, 14], QueryFilter::new()), [11]);
        assert!(tree.query_point(&[15, 15], QueryFilter::new()).is_empty());
        let mut hits = 0;
        tree.visit_point(&[0, 0], QueryFilter::new(), |k, b| {
            assert_eq!(*k, 0);
            assert_eq!(b.min, [0, 0]);
            hits += 1;
        });
        assert_eq!(hits, 1);
    }

    #[test]
    fn filters_select_categories() {
        let mut tree: Octree<u8, f64> =
            Octree::new(Config::with_bounds(Aabb::new([0.0; 3], [8.0; 3])));
        tree.insert_static(1, Aabb::new([1.0; 3], [2.0; 3]));
        tree.insert(2, Aabb::new([1.5; 3], [2.5; 3]));
        let q = Aabb::new([0.0; 3], [4.0; 3]);
        assert_eq!(sorted(tree.query_contained_by(&q, QueryFilter::new())), [1, 2]);
        assert_eq!(tree.query_contained_by(&q, QueryFilter::new().statics()), [1]);
        assert_eq!(tree.query_overlapped_by(&q, QueryFilter::new().dynamics()), [2]);
        assert_eq!(tree.query_point(&[1.0; 3], QueryFilter::new().dynamics()), Vec::<u8>::new());
    }

    #[test]
    fn raycast_orders_by_distance() {
        let mut tree: Octree<&str, i64> =
            Octree::new(Config::with_bounds(Aabb::new([0; 3], [100; 3])));
        // Inserted out of order on purpose.
        tree.insert("c", Aabb::new([70; 3], [72; 3]));
        tree.insert("a", Aabb::new([10; 3], [12; 3]));
        tree.insert("b", Aabb::new([40; 3], [45; 3]));
        tree.insert("miss", Aabb::new([80, 0, 0], [90, 5, 5]));

        let hits = tree.raycast(&Ray::new([0.0; 3], [1.0; 3]), QueryFilter::new());
        let items: Vec<&str> = hits.iter().map(|h| h.item).collect();
        assert_eq!(items, ["a", "b", "c"]);
        assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
        assert_eq!(hits[1].aabb, Aabb::new([40; 3], [45; 3]));
    }

    #[test]
    fn raycast_keeps_equidistant_hits() {
        let mut tree: Quadtree<u32, f64> =
            Quadtree::new(Config::with_bounds(Aabb::new([0.0; 2], [32.0; 2])));
        // Same lower corner, different boxes.
        tree.insert(7, Aabb::new([4.0, 4.0], [6.0, 6.0]));
        tree.insert(3, Aabb::new([4.0, 4.0], [5.0, 5.0]));
        tree.insert(5, Aabb::new([4.0, 4.0], [8.0, 8.0]));
        let hits = tree.raycast(&Ray::new([0.0, 0.0], [1.0, 1.0]), QueryFilter::new());
        let items: Vec<u32> = hits.iter().map(|h| h.item).collect();
        assert_eq!(items, [7, 3, 5]);

        // Re-inserting moves an item to the back of its tie group.
        tree.insert(7, Aabb::new([4.0, 4.0], [7.0, 7.0]));
        let hits = tree.raycast(&Ray::new([0.0, 0.0], [1.0, 1.0]), QueryFilter::new());
        let items: Vec<u32> = hits.iter().map(|h| h.item).collect();
        assert_eq!(items, [3, 5, 7]);
    }

    #[test]
    fn raycast_agrees_with_ray_intersects() {
        let mut tree: Quadtree<u32, i64> =
            Quadtree::new(Config::with_bounds(Aabb::new([0, 0], [99, 99])));
        tree.insert(1, Aabb::new([10, 20], [49, 49]));
        // Flat, lying on the y = 49 face of the lower children.
        tree.insert(2, Aabb::new([10, 49], [40, 49]));
        tree.insert(3, Aabb::new([60, 30], [70, 60]));
        tree.insert(4, Aabb::new([5, 5], [6, 6]));
        tree.assert_consistent();

        let rays = [
            Ray::new([0.0, 49.0], [1.0, 0.0]),
            Ray::new([0.0, 48.5], [1.0, 0.0]),
            Ray::new([0.0, 50.0], [1.0, 0.0]),
            Ray::new([49.0, 0.0], [0.0, 1.0]),
            Ray::new([65.0, 99.0], [0.0, -1.0]),
            Ray::new([0.0, 0.0], [1.0, 1.0]),
        ];
        for ray in &rays {
            let expected = sorted(
                tree.iter()
                    .filter(|(_, b)| ray.intersects(*b))
                    .map(|(k, _)| *k)
                    .collect(),
            );
            let hits = sorted(
                tree.raycast(ray, QueryFilter::new())
                    .into_iter()
                    .map(|h| h.item)
                    .collect(),
            );
            assert_eq!(hits, expected, "{ray:?}");
        }

        // Running along the top face of 1 and through flat 2 misses both.
        let hits: Vec<u32> = tree
            .raycast(&rays[0], QueryFilter::new())
            .into_iter()
            .map(|h| h.item)
            .collect();
        assert_eq!(hits, [3]);
        let hits: Vec<u32> = tree
            .raycast(&rays[1], QueryFilter::new())
            .into_iter()
            .map(|h| h.item)
            .collect();
        assert_eq!(hits, [1, 3]);
    }

    #[test]
    fn raycast_from_outside_root() {
        let tree = grid();
        let ray = Ray::new([-10.0, 2.0], [1.0, 0.0]);
        let items: Vec<u32> = tree
            .raycast(&ray, QueryFilter::new())
            .into_iter()
            .map(|h| h.item)
            .collect();
        assert_eq!(items, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        // Pointing away from the root box.
        let ray = Ray::new([-10.0, 2.0], [-1.0, 0.0]);
        assert!(tree.raycast(&ray, QueryFilter::new()).is_empty());
    }

    #[test]
    #[should_panic(expected = "malformed query box")]
    fn malformed_query_panics() {
        let tree = grid();
        let _ = tree.query_overlapped_by(&Aabb::new([5, 5], [4, 4]), QueryFilter::new());
    }
}
