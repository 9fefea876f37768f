use std::hint::black_box;

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use ndarray::Array1;
use ndarray::Array2;
use quantfolio::QuadraticProgram;
use quantfolio::Solver;
use quantfolio::optimization::ExactSolver;
use quantfolio::optimization::VariationalConfig;
use quantfolio::optimization::VariationalSolver;

fn problem(n: usize) -> QuadraticProgram {
  let mu = Array1::from_shape_fn(n, |i| 0.001 * (i as f64 + 1.0));
  let sigma = Array2::from_shape_fn((n, n), |(i, j)| {
    if i == j {
      0.0004 + 0.0001 * i as f64
    } else {
      0.00005
    }
  });
  let tickers = (0..n).map(|i| format!("T{i}")).collect();
  QuadraticProgram::new(tickers, mu, sigma, 0.5, n / 2).unwrap()
}

fn bench_exact(c: &mut Criterion) {
  let mut group = c.benchmark_group("Exact");
  for n in [8, 12, 16] {
    let qp = problem(n);
    group.bench_with_input(BenchmarkId::from_parameter(n), &qp, |b, qp| {
      b.iter(|| black_box(ExactSolver.solve(qp).unwrap()))
    });
  }
  group.finish();
}

fn bench_variational(c: &mut Criterion) {
  let mut group = c.benchmark_group("Variational");
  group.sample_size(10);
  for n in [4, 6, 8] {
    let qp = problem(n);
    let solver = VariationalSolver::new(VariationalConfig {
      max_iters: 50,
      seed: Some(42),
      ..Default::default()
    });
    group.bench_with_input(BenchmarkId::from_parameter(n), &qp, |b, qp| {
      b.iter(|| black_box(solver.solve(qp).unwrap()))
    });
  }
  group.finish();
}

criterion_group!(benches, bench_exact, bench_variational);
criterion_main!(benches);
