// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Octree basics.
//!
//! Fill a 100^3 block world with one large block and eight corner blocks,
//! then remove the corners one by one and trim, watching the node count fall.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_demos --example octree_blocks`

use understory_orthtree::{Aabb, Config, Octree, QueryFilter, Walk};

fn main() {
    env_logger::init();

    let config = Config::builder()
        .set_bounds(Aabb::new([0, 0, 0], [100, 100, 100]))
        .build()
        .unwrap();
    let mut world: Octree<&str, i64> = Octree::new(config);

    // Straddles the root center, so it stays on the root.
    world.insert("core", Aabb::new([40, 40, 40], [60, 60, 60]));
    let corners = ["c0", "c1", "c2", "c3", "c4", "c5", "c6", "c7"];
    for (c, name) in corners.into_iter().enumerate() {
        let pick = |axis: usize| if (c >> axis) & 1 == 0 { (1, 2) } else { (96, 97) };
        let (x, y, z) = (pick(0), pick(1), pick(2));
        world.insert(name, Aabb::new([x.0, y.0, z.0], [x.1, y.1, z.1]));
    }
    println!("{world:?}");
    println!("nodes: {}, depth: {}", world.node_count(), world.max_depth());
    assert_eq!(world.node_count(), 265);

    // Occupancy per depth.
    let mut per_depth = [0_usize; 8];
    world.iterate(&mut per_depth, |per_depth, node, depth| {
        per_depth[depth] += node.len();
        Walk::Continue
    });
    println!("items per depth: {per_depth:?}");

    let lower = Aabb::new([0, 0, 0], [50, 100, 100]);
    let mut left = world.query_contained_by(&lower, QueryFilter::new());
    left.sort_unstable();
    println!("contained in the lower x half: {left:?}");

    for name in corners {
        world.remove(&name);
        let before = world.node_count();
        world.trim();
        println!("removed {name}: {before} -> {} nodes", world.node_count());
    }
    world.remove(&"core");
    world.trim();
    assert_eq!(world.node_count(), 1);
}
