// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("understory_orthtree requires either the `std` or `libm` feature");

/// Square root of a non-negative `f64`.
#[cfg(feature = "std")]
#[inline]
pub(crate) fn sqrt(v: f64) -> f64 {
    v.sqrt()
}

/// Square root of a non-negative `f64`.
#[cfg(all(not(feature = "std"), feature = "libm"))]
#[inline]
pub(crate) fn sqrt(v: f64) -> f64 {
    libm::sqrt(v)
}

/// Euclidean distance between two points.
#[inline]
pub(crate) fn distance<const N: usize>(a: &[f64; N], b: &[f64; N]) -> f64 {
    let mut sum = 0.0;
    for axis in 0..N {
        let d = b[axis] - a[axis];
        sum += d * d;
    }
    sqrt(sum)
}
