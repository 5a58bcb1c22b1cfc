use criterion::{criterion_group, criterion_main, Criterion};
use mazes::{
    generators::{self, CorridorBias, GrowingTree, GrowingTreeConfig},
    grid::Grid,
    units::{Height, Width},
};

fn config(bias: f64) -> GrowingTreeConfig {
    GrowingTreeConfig {
        seed: Some(1),
        corridor_bias: CorridorBias::new(bias).unwrap(),
    }
}

fn bench_growing_tree_32(c: &mut Criterion) {
    let mut g = Some(Grid::new(Width(32), Height(32)).unwrap());

    c.bench_function("growing_tree_32", move |b| {
        b.iter(|| {
            let grid = g.take().unwrap();
            g = Some(generators::growing_tree(grid, config(CorridorBias::DEFAULT)));
        })
    });
}

fn bench_growing_tree_newest_only_128(c: &mut Criterion) {
    let mut g = Some(Grid::new(Width(128), Height(128)).unwrap());

    c.bench_function("growing_tree_newest_only_128", move |b| {
        b.iter(|| {
            let grid = g.take().unwrap();
            g = Some(generators::growing_tree(grid, config(1.0)));
        })
    });
}

fn bench_growing_tree_random_only_128(c: &mut Criterion) {
    let mut g = Some(Grid::new(Width(128), Height(128)).unwrap());

    c.bench_function("growing_tree_random_only_128", move |b| {
        b.iter(|| {
            let grid = g.take().unwrap();
            g = Some(generators::growing_tree(grid, config(0.0)));
        })
    });
}

fn bench_growing_tree_first_steps(c: &mut Criterion) {
    c.bench_function("growing_tree_first_100_steps_256", |b| {
        b.iter(|| {
            let grid = Grid::new(Width(256), Height(256)).unwrap();
            GrowingTree::new(grid, config(CorridorBias::DEFAULT)).take(100).count()
        })
    });
}

fn bench_block_passages(c: &mut Criterion) {
    let maze = generators::growing_tree(Grid::new(Width(64), Height(64)).unwrap(), config(0.5));

    c.bench_function("block_passages_64", move |b| {
        b.iter(|| {
            let mut g = maze.clone();
            generators::block_random_passages(&mut g, 100, Some(3))
        })
    });
}

criterion_group!(
    benches,
    bench_growing_tree_32,
    bench_growing_tree_newest_only_128,
    bench_growing_tree_random_only_128,
    bench_growing_tree_first_steps,
    bench_block_passages
);
criterion_main!(benches);
