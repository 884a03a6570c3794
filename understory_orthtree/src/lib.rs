// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Orthtree: quadtrees and octrees of axis-aligned boxes.
//!
//! An [`Orthtree`] recursively partitions a fixed root box into `2^N` equal
//! children and stores each item on the deepest node whose box fully contains
//! the item's box. It is meant for scenes where items are inserted, moved, and
//! removed often and queried by region or by ray, such as block worlds, editors,
//! and game levels.
//!
//! - One engine for any dimension; [`Quadtree`] and [`Octree`] are aliases.
//! - Integer (`i64`) or float (`f32`, `f64`) coordinates via [`Scalar`].
//! - Queries by containment, strict overlap, point, and ray, each filtered by
//!   item [`Category`].
//! - Depth-first traversal with early termination via [`Orthtree::iterate`].
//!
//! Nodes split lazily as items pass through them, down to a configurable
//! [minimum span](Config::minimum_span). Empty subtrees can be collapsed on
//! every removal ([`ConfigBuilder::set_trim_on_remove`]) or on demand with
//! [`Orthtree::trim`].
//!
//! ## API overview
//!
//! - [`Aabb`] (aliases [`Area`], [`Volume`]): inclusive boxes with
//!   [`contains`](Aabb::contains) and strict [`overlaps`](Aabb::overlaps).
//! - [`Config`] / [`ConfigBuilder`]: root box, minimum span, trimming policy.
//! - [`Orthtree`]: [`insert`](Orthtree::insert), [`remove`](Orthtree::remove),
//!   [`bounds_of`](Orthtree::bounds_of), [`clear`](Orthtree::clear),
//!   [`trim`](Orthtree::trim), [`map`](Orthtree::map).
//! - Queries: [`query_contained_by`](Orthtree::query_contained_by),
//!   [`query_overlapped_by`](Orthtree::query_overlapped_by),
//!   [`query_point`](Orthtree::query_point), [`raycast`](Orthtree::raycast),
//!   each with a [`QueryFilter`]. The `visit_*` forms call a closure instead
//!   of allocating.
//! - [`Ray`] / [`RayHit`]: ray casts, nearest hit first.
//!
//! # Example
//!
//! ```rust
//! use understory_orthtree::{Aabb, Config, Octree, QueryFilter, Ray};
//!
//! let config = Config::builder()
//!     .set_bounds(Aabb::new([0, 0, 0], [100, 100, 100]))
//!     .set_trim_on_remove(true)
//!     .build()
//!     .unwrap();
//! let mut tree: Octree<u32, i64> = Octree::new(config);
//!
//! tree.insert(1, Aabb::new([1, 1, 1], [2, 2, 2]));
//! tree.insert(2, Aabb::new([40, 40, 40], [60, 60, 60]));
//! tree.insert_static(3, Aabb::new([90, 0, 0], [99, 9, 9]));
//!
//! let region = Aabb::new([0, 0, 0], [50, 50, 50]);
//! let mut inside = tree.query_contained_by(&region, QueryFilter::new());
//! inside.sort();
//! assert_eq!(inside, [1]);
//!
//! let mut touching = tree.query_overlapped_by(&region, QueryFilter::new());
//! touching.sort();
//! assert_eq!(touching, [1, 2]);
//!
//! let statics = tree.query_overlapped_by(tree.bounds(), QueryFilter::new().statics());
//! assert_eq!(statics, [3]);
//!
//! let hits = tree.raycast(&Ray::new([0.0; 3], [1.0; 3]), QueryFilter::new());
//! assert_eq!(hits.iter().map(|h| h.item).collect::<Vec<_>>(), [1, 2]);
//!
//! // Removing the last item collapses the tree back to its root.
//! for item in [1, 2, 3] {
//!     tree.remove(&item);
//! }
//! assert_eq!(tree.node_count(), 1);
//! ```
//!
//! ## Features
//!
//! - `std` *(default)*: use `std` for float math.
//! - `libm`: use `libm` for float math in `no_std` builds. One of `std` or
//!   `libm` is required.
//! - `kurbo`: conversions between `kurbo::Rect` and [`Area<f64>`], and
//!   [`Ray::from_kurbo`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod config;
#[cfg(feature = "kurbo")]
mod kurbo_adapter;
mod node;
mod query;
mod ray;
mod traverse;
mod tree;
mod types;
mod util;

pub use config::{Config, ConfigBuilder, ConfigError};
pub use query::QueryFilter;
pub use ray::{Ray, RayHit};
pub use traverse::{NodeView, Walk};
pub use tree::{Octree, Orthtree, Quadtree};
pub use types::{Aabb, Area, Category, Scalar, Volume};
