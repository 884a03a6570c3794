// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use understory_orthtree::{Aabb, Config, Octree, Quadtree, QueryFilter, Ray};

const WORLD: i64 = 1024;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
    fn below(&mut self, n: i64) -> i64 {
        (self.next_u64() % n as u64) as i64
    }
}

/// `n^3` unit-ish blocks on a regular lattice, like a block world.
fn gen_lattice_blocks(n: i64) -> Vec<Aabb<i64, 3>> {
    let step = WORLD / n;
    let mut out = Vec::with_capacity((n * n * n) as usize);
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                let min = [x * step, y * step, z * step];
                out.push(Aabb::from_origin_size(min, [step / 2; 3]));
            }
        }
    }
    out
}

fn gen_random_blocks(count: usize, max_size: i64) -> Vec<Aabb<i64, 3>> {
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    (0..count)
        .map(|_| {
            let size = [
                1 + rng.below(max_size),
                1 + rng.below(max_size),
                1 + rng.below(max_size),
            ];
            let min = [
                rng.below(WORLD - size[0]),
                rng.below(WORLD - size[1]),
                rng.below(WORLD - size[2]),
            ];
            Aabb::from_origin_size(min, size)
        })
        .collect()
}

fn gen_random_rects(count: usize, extent: f64, rect: f64) -> Vec<Aabb<f64, 2>> {
    let mut rng = Rng::new(0xBADC_F00D_1234_5678);
    (0..count)
        .map(|_| {
            let x0 = rng.next_f64() * (extent - rect);
            let y0 = rng.next_f64() * (extent - rect);
            Aabb::from_origin_size([x0, y0], [rect, rect])
        })
        .collect()
}

fn octree(trim_on_remove: bool) -> Octree<u32, i64> {
    let config = Config::builder()
        .set_bounds(Aabb::new([0; 3], [WORLD - 1; 3]))
        .set_trim_on_remove(trim_on_remove)
        .build()
        .unwrap();
    Octree::new(config)
}

fn filled_octree(blocks: &[Aabb<i64, 3>]) -> Octree<u32, i64> {
    let mut tree = octree(false);
    for (i, b) in blocks.iter().enumerate() {
        tree.insert(i as u32, *b);
    }
    tree
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    for &n in &[8_i64, 16, 32] {
        let blocks = gen_lattice_blocks(n);
        group.throughput(Throughput::Elements(blocks.len() as u64));
        group.bench_function(format!("lattice_n{n}"), |b| {
            b.iter_batched(
                || octree(false),
                |mut tree| {
                    for (i, r) in blocks.iter().copied().enumerate() {
                        tree.insert(i as u32, r);
                    }
                    black_box(tree.node_count());
                },
                BatchSize::SmallInput,
            );
        });
    }
    let blocks = gen_random_blocks(10_000, 24);
    group.throughput(Throughput::Elements(blocks.len() as u64));
    group.bench_function("random_10k", |b| {
        b.iter_batched(
            || octree(false),
            |mut tree| {
                for (i, r) in blocks.iter().copied().enumerate() {
                    tree.insert(i as u32, r);
                }
                black_box(tree.len());
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn bench_move(c: &mut Criterion) {
    let mut group = c.benchmark_group("move");
    let blocks = gen_random_blocks(10_000, 24);
    let moved = gen_random_blocks(1_000, 24);
    for trim in [false, true] {
        group.bench_function(format!("relocate_1k_trim_{trim}"), |b| {
            b.iter_batched(
                || {
                    let mut tree = octree(trim);
                    for (i, r) in blocks.iter().copied().enumerate() {
                        tree.insert(i as u32, r);
                    }
                    tree
                },
                |mut tree| {
                    for (i, r) in moved.iter().copied().enumerate() {
                        tree.insert(i as u32, r);
                    }
                    black_box(tree.node_count());
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    let tree = filled_octree(&gen_random_blocks(10_000, 24));
    let region = Aabb::new([256; 3], [511; 3]);
    group.bench_function("contained_by_quarter", |b| {
        b.iter(|| black_box(tree.query_contained_by(&region, QueryFilter::new()).len()));
    });
    group.bench_function("overlapped_by_quarter", |b| {
        b.iter(|| {
            let mut hits = 0_usize;
            tree.visit_overlapped_by(&region, QueryFilter::new(), |_, _| hits += 1);
            black_box(hits)
        });
    });
    group.bench_function("point", |b| {
        b.iter(|| black_box(tree.query_point(&[500, 500, 500], QueryFilter::new()).len()));
    });
    group.bench_function("raycast_diagonal", |b| {
        let ray = Ray::new([0.0; 3], [1.0, 0.9, 0.8]);
        b.iter(|| black_box(tree.raycast(&ray, QueryFilter::new()).len()));
    });

    let mut quad: Quadtree<u32, f64> =
        Quadtree::new(Config::with_bounds(Aabb::new([0.0; 2], [2048.0; 2])));
    for (i, r) in gen_random_rects(20_000, 2048.0, 16.0).into_iter().enumerate() {
        quad.insert(i as u32, r);
    }
    let view = Aabb::new([512.0, 512.0], [1024.0, 900.0]);
    group.bench_function("quadtree_f64_overlapped_by", |b| {
        b.iter(|| black_box(quad.query_overlapped_by(&view, QueryFilter::new()).len()));
    });
    group.finish();
}

fn bench_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("churn");
    let blocks = gen_random_blocks(10_000, 24);
    group.bench_function("remove_all_then_trim", |b| {
        b.iter_batched(
            || filled_octree(&blocks),
            |mut tree| {
                for i in 0..blocks.len() {
                    tree.remove(&(i as u32));
                }
                tree.trim();
                black_box(tree.node_count());
            },
            BatchSize::LargeInput,
        );
    });
    group.finish();
}

criterion_group!(benches, bench_insert, bench_move, bench_queries, bench_churn);
criterion_main!(benches);
