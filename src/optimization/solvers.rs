//! # Selection Solvers
//!
//! $$
//! x^\* = \arg\min_{x \in \{0,1\}^n,\ \sum x = B} f(x)
//! $$
//!
//! The solver seam, the shared result record and the three backends: exhaustive
//! search, a hardware-efficient variational circuit, and an alternating-operator
//! circuit.

use rand::Rng;
use rand::SeedableRng;
use rand::distributions::WeightedIndex;
use rand::rngs::StdRng;
use rand_distr::Distribution;

use super::objective::QuadraticProgram;
use super::optimizer::AnsatzOptimizer;
use super::selection::Selection;
use super::statevector::Ansatz;
use super::statevector::AnsatzCost;
use crate::error::PortfolioError;
use crate::error::Result;

pub mod alternating;
pub mod exact;
pub mod variational;

pub use alternating::AlternatingLayerConfig;
pub use alternating::AlternatingLayerSolver;
pub use exact::ExactSolver;
pub use variational::VariationalConfig;
pub use variational::VariationalSolver;

/// Largest asset count any backend accepts; the state space is `2ⁿ`.
pub const MAX_ASSETS: usize = 20;

/// Solves a [`QuadraticProgram`] under its budget constraint.
pub trait Solver {
  fn name(&self) -> &'static str;

  fn solve(&self, problem: &QuadraticProgram) -> Result<SolverResult>;
}

/// Best selection plus the probability of every basis state.
#[derive(Clone, Debug)]
pub struct SolverResult {
  pub selection: Selection,
  /// Unpenalized objective of `selection`.
  pub objective_value: f64,
  /// One entry per basis state, indexed as in [`Selection::from_index`].
  pub distribution: Vec<f64>,
  /// Whether `selection` meets the budget. Always true for the exact backend.
  pub feasible: bool,
  pub solver: &'static str,
  pub iterations: u64,
}

impl SolverResult {
  pub fn probability(&self, index: usize) -> f64 {
    self.distribution.get(index).copied().unwrap_or(0.0)
  }

  /// `(index, probability)` sorted by descending probability, ties by ascending index.
  pub fn ranked(&self) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = self.distribution.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
  }
}

/// Backend choice.
#[derive(Clone, Debug)]
pub enum SolverBackend {
  Exact(ExactSolver),
  Variational(VariationalSolver),
  AlternatingLayer(AlternatingLayerSolver),
}

impl Default for SolverBackend {
  fn default() -> Self {
    Self::Exact(ExactSolver)
  }
}

impl Solver for SolverBackend {
  fn name(&self) -> &'static str {
    match self {
      SolverBackend::Exact(s) => s.name(),
      SolverBackend::Variational(s) => s.name(),
      SolverBackend::AlternatingLayer(s) => s.name(),
    }
  }

  fn solve(&self, problem: &QuadraticProgram) -> Result<SolverResult> {
    match self {
      SolverBackend::Exact(s) => s.solve(problem),
      SolverBackend::Variational(s) => s.solve(problem),
      SolverBackend::AlternatingLayer(s) => s.solve(problem),
    }
  }
}

pub(crate) fn check_size(problem: &QuadraticProgram) -> Result<()> {
  let n = problem.num_assets();
  if n == 0 {
    return Err(PortfolioError::empty_portfolio());
  }
  if n > MAX_ASSETS {
    return Err(PortfolioError::Validation(format!(
      "{n} assets exceed the solver limit of {MAX_ASSETS}"
    )));
  }
  Ok(())
}

/// Parameters shared by the circuit-based backends.
pub(crate) struct AnsatzRun<'a, O> {
  pub ansatz: Ansatz,
  pub optimizer: &'a O,
  pub max_iters: u64,
  pub shots: Option<usize>,
  pub seed: Option<u64>,
  pub name: &'static str,
}

/// Optimize the circuit, read out its distribution and keep the lowest-energy
/// observed state.
pub(crate) fn run_ansatz<O: AnsatzOptimizer>(
  problem: &QuadraticProgram,
  run: AnsatzRun<'_, O>,
) -> Result<SolverResult> {
  check_size(problem)?;
  if run.ansatz.num_params() == 0 {
    return Err(PortfolioError::Validation(format!(
      "{} circuit has no parameters, its depth must be positive",
      run.name
    )));
  }

  let energies = problem.qubo_energies();
  let cost = AnsatzCost::new(run.ansatz, energies.clone());
  let mut rng = match run.seed {
    Some(seed) => StdRng::seed_from_u64(seed),
    None => StdRng::from_entropy(),
  };
  let x0: Vec<f64> = (0..cost.num_params())
    .map(|_| rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI))
    .collect();

  let outcome = run.optimizer.minimize(cost.clone(), x0, run.max_iters);
  let exact = cost.probabilities(&outcome.params);
  let distribution = match run.shots {
    Some(shots) => sample_counts(&exact, shots, &mut rng)?,
    None => exact,
  };

  let result = best_observed(problem, &energies, distribution, run.name, outcome.iterations)?;
  tracing::info!(
    solver = run.name,
    energy = outcome.cost,
    iterations = outcome.iterations,
    selection = %result.selection,
    feasible = result.feasible,
    "variational solve finished"
  );
  if !result.feasible {
    tracing::warn!(solver = run.name, "no observed state satisfies the budget");
  }
  Ok(result)
}

/// Empirical frequencies of `shots` draws from `probabilities`.
pub(crate) fn sample_counts<R: Rng>(
  probabilities: &[f64],
  shots: usize,
  rng: &mut R,
) -> Result<Vec<f64>> {
  if shots == 0 {
    return Err(PortfolioError::Validation("shots must be positive".into()));
  }
  let dist = WeightedIndex::new(probabilities)
    .map_err(|e| PortfolioError::Validation(format!("cannot sample distribution: {e}")))?;
  let mut counts = vec![0usize; probabilities.len()];
  for _ in 0..shots {
    counts[dist.sample(rng)] += 1;
  }
  Ok(counts.into_iter().map(|c| c as f64 / shots as f64).collect())
}

/// Among states with non-zero probability, the one of lowest penalized energy.
fn best_observed(
  problem: &QuadraticProgram,
  energies: &[f64],
  distribution: Vec<f64>,
  solver: &'static str,
  iterations: u64,
) -> Result<SolverResult> {
  let best = distribution
    .iter()
    .enumerate()
    .filter(|(_, &p)| p > 0.0)
    .min_by(|a, b| {
      energies[a.0]
        .total_cmp(&energies[b.0])
        .then(b.1.total_cmp(a.1))
    })
    .map(|(i, _)| i)
    .ok_or_else(|| PortfolioError::Validation("empty output distribution".into()))?;

  let selection = Selection::from_index(best, problem.num_assets());
  Ok(SolverResult {
    objective_value: problem.evaluate(&selection),
    feasible: problem.is_feasible(&selection),
    selection,
    distribution,
    solver,
    iterations,
  })
}

#[cfg(test)]
pub(crate) mod fixtures {
  use ndarray::array;

  use super::*;

  /// Three assets where picking the first and last is clearly best for budget 2.
  pub fn three_assets(risk_factor: f64, budget: usize) -> QuadraticProgram {
    QuadraticProgram::new(
      vec!["AAA".into(), "BBB".into(), "CCC".into()],
      array![0.012, 0.001, 0.010],
      array![
        [0.0004, 0.0001, 0.0000],
        [0.0001, 0.0009, 0.0002],
        [0.0000, 0.0002, 0.0005]
      ],
      risk_factor,
      budget,
    )
    .unwrap()
  }
}
