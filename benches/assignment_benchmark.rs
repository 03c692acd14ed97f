use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::DMatrix;
use std::hint::black_box;
use structure_mapping::mapping::{k_best_assignments, solve_assignment};

/// Benchmark the assignment solver and the k-best enumerator on dense cost
/// matrices of the sizes that show up in supercell searches.
fn bench_assignment_solvers(c: &mut Criterion) {
    let mut group = c.benchmark_group("assignment");

    let infinity = 1e20;
    let tol = 1e-9;

    // deterministic pseudo-random dense cost matrix
    let dense = |n: usize| -> DMatrix<f64> {
        DMatrix::from_fn(n, n, |row, col| {
            let x = (row * 31 + col * 17 + 7) % 97;
            x as f64 / 97.0
        })
    };

    for n in [8usize, 16, 32] {
        let cost = dense(n);
        group.bench_function(format!("hungarian_{n}x{n}"), |b| {
            b.iter(|| solve_assignment(black_box(&cost), black_box(infinity), black_box(tol)))
        });
    }

    let cost = dense(16);
    group.bench_function("murty_k16_16x16", |b| {
        b.iter(|| {
            k_best_assignments(
                black_box(&cost),
                black_box(infinity),
                black_box(f64::INFINITY),
                black_box(tol),
                black_box(16),
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_assignment_solvers);
criterion_main!(benches);
