use cmouse::{find_path, generate_maze};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const SIZE: usize = 101;

pub fn generate(c: &mut Criterion) {
    c.bench_function("generate_101", |b| {
        b.iter(|| generate_maze(black_box(SIZE), black_box(SIZE), Some(0)).unwrap())
    });
}

pub fn solve(c: &mut Criterion) {
    let maze = generate_maze(SIZE, SIZE, Some(0)).unwrap();

    c.bench_function("astar_101", |b| {
        b.iter(|| find_path(black_box(&maze.grid), maze.start, &maze.goals).unwrap())
    });
}

criterion_group! {name = benches; config = Criterion::default().sample_size(20); targets = generate, solve}
criterion_main!(benches);
