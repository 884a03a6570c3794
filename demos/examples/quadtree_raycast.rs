// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadtree ray casting with Kurbo geometry.
//!
//! Place static walls and dynamic actors in a 2D level, cast a ray through
//! them, and restrict hits by category.
//!
//! Run:
//! - `RUST_LOG=trace cargo run -p understory_demos --example quadtree_raycast`

use kurbo::{Point, Rect, Vec2};
use understory_orthtree::{Area, Config, Quadtree, QueryFilter, Ray};

fn main() {
    env_logger::init();

    let bounds: Area<f64> = Rect::new(0.0, 0.0, 512.0, 512.0).into();
    let config = Config::builder()
        .set_bounds(bounds)
        .set_uniform_minimum_span(8.0)
        .set_trim_on_remove(true)
        .build()
        .unwrap();
    let mut level: Quadtree<&str, f64> = Quadtree::new(config);

    level.insert_static("wall_a", Rect::new(100.0, 80.0, 110.0, 200.0).into());
    level.insert_static("wall_b", Rect::new(300.0, 150.0, 310.0, 400.0).into());
    level.insert("player", Rect::new(40.0, 40.0, 56.0, 56.0).into());
    level.insert("enemy", Rect::new(200.0, 160.0, 216.0, 176.0).into());

    let ray = Ray::from_kurbo(Point::new(0.0, 0.0), Vec2::new(1.0, 0.8));
    for hit in level.raycast(&ray, QueryFilter::new()) {
        let rect: Rect = hit.aabb.into();
        println!("{:>8} at {:7.2}: {rect:?}", hit.item, hit.distance);
    }

    let walls: Vec<_> = level
        .raycast(&ray, QueryFilter::new().statics())
        .into_iter()
        .map(|hit| hit.item)
        .collect();
    println!("walls on the ray: {walls:?}");

    // Move the enemy off the ray.
    level.insert("enemy", Rect::new(400.0, 20.0, 416.0, 36.0).into());
    let actors: Vec<_> = level
        .raycast(&ray, QueryFilter::new().dynamics())
        .into_iter()
        .map(|hit| hit.item)
        .collect();
    println!("actors on the ray after the move: {actors:?}");
    assert_eq!(actors, ["player"]);
    println!("{level:?}");
}
