// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rays and ray/box intersection.

use crate::types::{Aabb, Scalar};
use crate::util;

/// A half-line in `N` dimensions, in `f64` coordinates regardless of the tree's scalar.
///
/// The reciprocal of the direction is cached for the slab test. Components of
/// the direction that are exactly zero yield signed infinities, which is how
/// axis-parallel rays are handled. An axis-parallel ray lying exactly in one of
/// a box's planes misses that box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray<const N: usize> {
    origin: [f64; N],
    direction: [f64; N],
    inv_direction: [f64; N],
}

impl<const N: usize> Ray<N> {
    /// Create a ray from an origin and a direction.
    ///
    /// The direction does not need to be normalized.
    ///
    /// # Panics
    ///
    /// Panics if the origin is not finite, or if the direction is all zeros or
    /// has a NaN component.
    pub fn new(origin: [f64; N], direction: [f64; N]) -> Self {
        assert!(
            origin.iter().all(|o| o.is_finite()),
            "ray origin must be finite, got {origin:?}"
        );
        assert!(
            direction.iter().all(|d| !d.is_nan()) && direction.iter().any(|&d| d != 0.0),
            "ray direction must be non-zero and free of NaN, got {direction:?}"
        );
        Self {
            origin,
            direction,
            inv_direction: core::array::from_fn(|a| 1.0 / direction[a]),
        }
    }

    /// Origin of the ray.
    #[inline]
    pub fn origin(&self) -> &[f64; N] {
        &self.origin
    }

    /// Direction of the ray, as given to [`Ray::new`].
    #[inline]
    pub fn direction(&self) -> &[f64; N] {
        &self.direction
    }

    /// Component-wise reciprocal of the direction.
    #[inline]
    pub fn inv_direction(&self) -> &[f64; N] {
        &self.inv_direction
    }

    /// Whether the ray hits the box (at or after its origin).
    ///
    /// # Examples
    ///
    /// ```
    /// use understory_orthtree::{Aabb, Ray};
    ///
    /// let ray = Ray::new([0.0, 5.0], [1.0, 0.0]);
    /// assert!(ray.intersects(&Aabb::new([10, 0], [20, 10])));
    /// // Behind the origin.
    /// assert!(!ray.intersects(&Aabb::new([-20, 0], [-10, 10])));
    /// ```
    #[inline]
    pub fn intersects<T: Scalar>(&self, aabb: &Aabb<T, N>) -> bool {
        self.intersects_f64(&aabb.min_f64(), &aabb.max_f64())
    }

    /// Slab test.
    ///
    /// A ray parallel to an axis whose origin lies on one of the box's planes
    /// for that axis yields a `0 * inf = NaN` plane term. NaN poisons the
    /// interval, so it is a miss for every box, whatever its thickness.
    /// `f64::min`/`f64::max` would drop the NaN instead.
    pub(crate) fn intersects_f64(&self, min: &[f64; N], max: &[f64; N]) -> bool {
        let mut tmin = f64::NEG_INFINITY;
        let mut tmax = f64::INFINITY;
        for axis in 0..N {
            let t0 = (min[axis] - self.origin[axis]) * self.inv_direction[axis];
            let t1 = (max[axis] - self.origin[axis]) * self.inv_direction[axis];
            if t0.is_nan() || t1.is_nan() {
                return false;
            }
            tmin = tmin.max(t0.min(t1));
            tmax = tmax.min(t0.max(t1));
        }
        tmax >= tmin.max(0.0) && tmin < f64::INFINITY
    }

    /// Distance used to order hits: from the origin to the box's lower corner.
    ///
    /// This is not the distance to the entry point, but it is cheap and orders
    /// boxes strung out along a ray as expected.
    #[inline]
    pub(crate) fn hit_distance<T: Scalar>(&self, aabb: &Aabb<T, N>) -> f64 {
        util::distance(&self.origin, &aabb.min_f64())
    }
}

/// A single ray cast result, see [`Orthtree::raycast`](crate::Orthtree::raycast).
#[derive(Clone, Debug, PartialEq)]
pub struct RayHit<K, T, const N: usize> {
    /// The item that was hit.
    pub item: K,
    /// The item's box.
    pub aabb: Aabb<T, N>,
    /// Distance from the ray origin to the lower corner of `aabb`.
    pub distance: f64,
}
