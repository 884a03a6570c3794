// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::fmt::Debug;

/// Axis-aligned bounding box in `N` dimensions.
///
/// Both corners are inclusive. A box is *well-formed* when `min[a] <= max[a]`
/// on every axis `a`; the tree rejects malformed boxes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Aabb<T, const N: usize> {
    /// Lower corner.
    pub min: [T; N],
    /// Upper corner.
    pub max: [T; N],
}

/// Axis-aligned rectangle (2D box).
pub type Area<T> = Aabb<T, 2>;

/// Axis-aligned rectangular prism (3D box).
pub type Volume<T> = Aabb<T, 3>;

impl<T, const N: usize> Aabb<T, N> {
    /// Create a new box from lower/upper corners.
    ///
    /// The corners are not validated; see [`Aabb::try_new`].
    #[inline(always)]
    pub const fn new(min: [T; N], max: [T; N]) -> Self {
        Self { min, max }
    }
}

impl<T: Copy + PartialOrd, const N: usize> Aabb<T, N> {
    /// Create a new box, or `None` if it would be malformed.
    #[inline]
    pub fn try_new(min: [T; N], max: [T; N]) -> Option<Self> {
        let aabb = Self { min, max };
        aabb.is_well_formed().then_some(aabb)
    }

    /// Whether `min <= max` on every axis.
    ///
    /// Comparisons involving NaN are false, so a box with a NaN coordinate is malformed.
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        (0..N).all(|a| self.min[a] <= self.max[a])
    }

    /// Whether `other` lies entirely within this box.
    ///
    /// Both ends are inclusive: a box contains itself.
    ///
    /// # Examples
    ///
    /// ```
    /// use understory_orthtree::Aabb;
    ///
    /// let outer = Aabb::new([0, 0], [10, 10]);
    /// assert!(outer.contains(&Aabb::new([0, 2], [10, 3])));
    /// assert!(!outer.contains(&Aabb::new([5, 5], [11, 6])));
    /// ```
    #[inline]
    pub fn contains(&self, other: &Self) -> bool {
        (0..N).all(|a| self.min[a] <= other.min[a] && other.max[a] <= self.max[a])
    }

    /// Determines whether this box strictly overlaps another.
    ///
    /// Unlike containment, overlap is strict: boxes that merely touch along a face,
    /// edge, or corner do not overlap.
    ///
    /// # Examples
    ///
    /// ```
    /// use understory_orthtree::Aabb;
    ///
    /// let a = Aabb::new([0.0, 0.0], [10.0, 10.0]);
    /// assert!(a.overlaps(&Aabb::new([5.0, 5.0], [15.0, 15.0])));
    ///
    /// // Sharing an edge is not an overlap.
    /// assert!(!a.overlaps(&Aabb::new([10.0, 0.0], [20.0, 10.0])));
    /// ```
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        (0..N).all(|a| self.min[a] < other.max[a] && self.max[a] > other.min[a])
    }

    /// Whether the point lies in this box (edges included).
    #[inline]
    pub fn contains_point(&self, point: &[T; N]) -> bool {
        (0..N).all(|a| self.min[a] <= point[a] && point[a] <= self.max[a])
    }
}

impl<T: Scalar, const N: usize> Aabb<T, N> {
    /// Create a box from its lower corner and its extent along each axis.
    ///
    /// # Panics
    ///
    /// Panics if `origin + size` overflows the scalar on some axis.
    #[inline]
    pub fn from_origin_size(origin: [T; N], size: [T; N]) -> Self {
        match Self::try_from_origin_size(origin, size) {
            Some(aabb) => aabb,
            None => panic!("box size overflows the coordinate range: {origin:?} + {size:?}"),
        }
    }

    /// Create a box from its lower corner and its extent along each axis, or
    /// `None` if `origin + size` overflows the scalar on some axis.
    pub fn try_from_origin_size(origin: [T; N], size: [T; N]) -> Option<Self> {
        let mut max = origin;
        for a in 0..N {
            max[a] = T::checked_add(origin[a], size[a])?;
        }
        Some(Self { min: origin, max })
    }

    /// Lower corner converted to `f64`, used for ray math.
    #[inline]
    pub(crate) fn min_f64(&self) -> [f64; N] {
        core::array::from_fn(|a| self.min[a].to_f64())
    }

    /// Upper corner converted to `f64`, used for ray math.
    #[inline]
    pub(crate) fn max_f64(&self) -> [f64; N] {
        core::array::from_fn(|a| self.max[a].to_f64())
    }
}

/// Numeric scalar abstraction for box coordinates.
///
/// Integer scalars treat a range `[low, high]` as the inclusive set of cells
/// `low..=high`; float scalars treat it as a continuous interval. The two
/// differ in how a node's extent is halved when it splits, see
/// [`Scalar::split`].
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Minimum node span used when a [`ConfigBuilder`](crate::ConfigBuilder)
    /// is not given one explicitly.
    const DEFAULT_MIN_SPAN: Self;

    /// Zero value for the scalar type.
    fn zero() -> Self;

    /// One unit; the smallest half span a node may split into.
    fn one() -> Self;

    /// Add two scalar values, or `None` on overflow.
    fn checked_add(a: Self, b: Self) -> Option<Self>;

    /// Extent of each half that [`Scalar::split`] would produce for `[low, high]`.
    ///
    /// For integers with an odd cell count this is the smaller (lower) half.
    fn half_span(low: Self, high: Self) -> Self;

    /// Split `[low, high]` into a lower and an upper half.
    ///
    /// Integers: with `span = high - low + 1`, the halves are
    /// `[low, low + span / 2 - 1]` and `[low + span / 2, high]`.
    /// Floats: the halves meet at the midpoint, `[low, mid]` and `[mid, high]`.
    fn split(low: Self, high: Self) -> [(Self, Self); 2];

    /// Convert to `f64` for ray intersection and distance math.
    fn to_f64(self) -> f64;
}

impl Scalar for f32 {
    const DEFAULT_MIN_SPAN: Self = 2.0;

    #[inline(always)]
    fn zero() -> Self {
        0.0
    }

    #[inline(always)]
    fn one() -> Self {
        1.0
    }

    #[inline]
    fn checked_add(a: Self, b: Self) -> Option<Self> {
        Some(a + b)
    }

    #[inline]
    fn half_span(low: Self, high: Self) -> Self {
        0.5 * (high - low)
    }

    #[inline]
    fn split(low: Self, high: Self) -> [(Self, Self); 2] {
        let mid = 0.5 * (low + high);
        [(low, mid), (mid, high)]
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Scalar for f64 {
    const DEFAULT_MIN_SPAN: Self = 2.0;

    #[inline(always)]
    fn zero() -> Self {
        0.0
    }

    #[inline(always)]
    fn one() -> Self {
        1.0
    }

    #[inline]
    fn checked_add(a: Self, b: Self) -> Option<Self> {
        Some(a + b)
    }

    #[inline]
    fn half_span(low: Self, high: Self) -> Self {
        0.5 * (high - low)
    }

    #[inline]
    fn split(low: Self, high: Self) -> [(Self, Self); 2] {
        let mid = 0.5 * (low + high);
        [(low, mid), (mid, high)]
    }

    #[inline(always)]
    fn to_f64(self) -> f64 {
        self
    }
}

impl Scalar for i64 {
    const DEFAULT_MIN_SPAN: Self = 2;

    #[inline(always)]
    fn zero() -> Self {
        0
    }

    #[inline(always)]
    fn one() -> Self {
        1
    }

    #[inline]
    fn checked_add(a: Self, b: Self) -> Option<Self> {
        a.checked_add(b)
    }

    /// Saturates at `i64::MAX` for the full `i64` range, whose half is `2^63` cells.
    #[inline]
    fn half_span(low: Self, high: Self) -> Self {
        // Widen so the full `i64` range does not overflow the cell count.
        let span = i128::from(high) - i128::from(low) + 1;
        Self::try_from(span / 2).unwrap_or(Self::MAX)
    }

    #[inline]
    fn split(low: Self, high: Self) -> [(Self, Self); 2] {
        let span = i128::from(high) - i128::from(low) + 1;
        debug_assert!(span >= 2, "cannot split a single-cell range");
        // `low <= upper_low <= high`, so narrowing back cannot fail.
        let upper_low = Self::try_from(i128::from(low) + span / 2).unwrap_or(high);
        [(low, upper_low - 1), (upper_low, high)]
    }

    #[allow(
        clippy::cast_precision_loss,
        reason = "Ray math is done in f64; coordinates beyond 2^53 lose precision by design."
    )]
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

bitflags::bitflags! {
    /// Category of a stored item.
    ///
    /// Every item carries exactly one category. Queries select categories with a
    /// [`QueryFilter`](crate::QueryFilter), which lets one tree hold both
    /// long-lived (static) and frequently moving (dynamic) items.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Category: u8 {
        /// Item rarely or never moves.
        const STATIC  = 0b0000_0001;
        /// Item moves often.
        const DYNAMIC = 0b0000_0010;
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::DYNAMIC
    }
}
