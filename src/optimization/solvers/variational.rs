use super::AnsatzRun;
use super::Solver;
use super::SolverResult;
use super::run_ansatz;
use crate::error::Result;
use crate::optimization::objective::QuadraticProgram;
use crate::optimization::optimizer::AnsatzOptimizer;
use crate::optimization::optimizer::OptimizerStrategy;
use crate::optimization::statevector::Ansatz;

/// Runtime configuration for [`VariationalSolver`].
#[derive(Clone, Debug)]
pub struct VariationalConfig {
  /// Optimizer iteration cap.
  pub max_iters: u64,
  /// Entangling blocks of the RY + CZ circuit.
  pub reps: usize,
  /// Sample this many measurements instead of reading exact probabilities.
  pub shots: Option<usize>,
  /// Seed of the initial parameters and of the sampler.
  pub seed: Option<u64>,
}

impl Default for VariationalConfig {
  fn default() -> Self {
    Self {
      max_iters: 200,
      reps: 3,
      shots: None,
      seed: None,
    }
  }
}

/// Hardware-efficient variational eigensolver over the penalized objective.
///
/// Heuristic: the returned selection can violate the budget, see
/// [`SolverResult::feasible`].
#[derive(Clone, Debug)]
pub struct VariationalSolver<O = OptimizerStrategy> {
  config: VariationalConfig,
  optimizer: O,
}

impl VariationalSolver {
  pub fn new(config: VariationalConfig) -> Self {
    Self {
      config,
      optimizer: OptimizerStrategy::default(),
    }
  }
}

impl Default for VariationalSolver {
  fn default() -> Self {
    Self::new(VariationalConfig::default())
  }
}

impl<O: AnsatzOptimizer> VariationalSolver<O> {
  /// Swap the classical optimizer.
  pub fn with_optimizer<P: AnsatzOptimizer>(self, optimizer: P) -> VariationalSolver<P> {
    VariationalSolver {
      config: self.config,
      optimizer,
    }
  }

  pub fn config(&self) -> &VariationalConfig {
    &self.config
  }
}

impl<O: AnsatzOptimizer> Solver for VariationalSolver<O> {
  fn name(&self) -> &'static str {
    "variational"
  }

  fn solve(&self, problem: &QuadraticProgram) -> Result<SolverResult> {
    run_ansatz(
      problem,
      AnsatzRun {
        ansatz: Ansatz::HardwareEfficient {
          num_qubits: problem.num_assets(),
          reps: self.config.reps,
        },
        optimizer: &self.optimizer,
        max_iters: self.config.max_iters,
        shots: self.config.shots,
        seed: self.config.seed,
        name: self.name(),
      },
    )
  }
}
