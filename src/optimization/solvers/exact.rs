use rayon::prelude::*;

use super::Solver;
use super::SolverResult;
use super::check_size;
use crate::error::PortfolioError;
use crate::error::Result;
use crate::optimization::objective::QuadraticProgram;
use crate::optimization::selection::Selection;

/// Exhaustive search over every selection of exactly `budget` assets.
///
/// The reported distribution puts all mass on the optimum. Ties go to the lowest index.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExactSolver;

impl Solver for ExactSolver {
  fn name(&self) -> &'static str {
    "exact"
  }

  fn solve(&self, problem: &QuadraticProgram) -> Result<SolverResult> {
    check_size(problem)?;
    let n = problem.num_assets();
    let budget = problem.budget() as u32;

    let (best, value) = (0..1usize << n)
      .into_par_iter()
      .filter(|i| i.count_ones() == budget)
      .map(|i| (i, problem.evaluate_index(i)))
      .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
      .ok_or_else(|| PortfolioError::Constraint(format!("no selection of {budget} among {n} assets")))?;

    let mut distribution = vec![0.0; 1 << n];
    distribution[best] = 1.0;
    let selection = Selection::from_index(best, n);
    tracing::debug!(%selection, value, "exact optimum");

    Ok(SolverResult {
      selection,
      objective_value: value,
      distribution,
      feasible: true,
      solver: self.name(),
      iterations: 0,
    })
  }
}
