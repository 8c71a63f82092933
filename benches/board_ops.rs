use criterion::{black_box, criterion_group, criterion_main, Criterion};
use blast_grid::core::{
    blast, collapse, find_all_groups, find_group, group_at, refill, resolve, Board, LevelConfig,
    SimpleRng,
};
use blast_grid::types::Pos;

fn dealt(seed: u32) -> Board {
    Board::generate(&LevelConfig::new(8, 8, 5, 30), &mut SimpleRng::new(seed))
}

fn bench_find_group(c: &mut Criterion) {
    let board = Board::from_columns(1, &vec![vec![0; 8]; 8]).unwrap();

    c.bench_function("find_group_8x8_uniform", |b| {
        b.iter(|| find_group(black_box(&board), black_box(Pos::new(3, 3))))
    });
}

fn bench_find_all_groups(c: &mut Criterion) {
    let board = dealt(12345);

    c.bench_function("find_all_groups_8x8", |b| {
        b.iter(|| find_all_groups(black_box(&board)))
    });
}

fn bench_blast_cycle(c: &mut Criterion) {
    let start = dealt(12345);
    let group = find_all_groups(&start)
        .into_iter()
        .max_by_key(|g| g.len())
        .unwrap();

    c.bench_function("blast_collapse_refill_8x8", |b| {
        b.iter(|| {
            let mut board = start.clone();
            let mut rng = SimpleRng::new(7);
            blast(&mut board, &group).unwrap();
            collapse(&mut board).unwrap();
            refill(&mut board, &mut rng).unwrap();
            board
        })
    });
}

fn bench_resolve_checkerboard(c: &mut Criterion) {
    let columns: Vec<Vec<u8>> = (0..8)
        .map(|x| (0..8).map(|y| ((x + y) % 2) as u8).collect())
        .collect();
    let start = Board::from_columns(2, &columns).unwrap();

    c.bench_function("resolve_checkerboard_8x8", |b| {
        b.iter(|| {
            let mut board = start.clone();
            resolve(&mut board, &mut SimpleRng::new(99), 100).unwrap()
        })
    });
}

fn bench_group_at(c: &mut Criterion) {
    let board = dealt(42);

    c.bench_function("group_at_every_cell", |b| {
        b.iter(|| {
            board
                .positions()
                .filter_map(|pos| group_at(&board, pos))
                .filter(|g| g.is_blastable())
                .count()
        })
    });
}

criterion_group!(
    benches,
    bench_find_group,
    bench_find_all_groups,
    bench_blast_cycle,
    bench_resolve_checkerboard,
    bench_group_at
);
criterion_main!(benches);
