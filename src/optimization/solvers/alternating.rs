use super::AnsatzRun;
use super::Solver;
use super::SolverResult;
use super::run_ansatz;
use crate::error::Result;
use crate::optimization::objective::QuadraticProgram;
use crate::optimization::optimizer::AnsatzOptimizer;
use crate::optimization::optimizer::OptimizerStrategy;
use crate::optimization::statevector::Ansatz;

/// Runtime configuration for [`AlternatingLayerSolver`].
#[derive(Clone, Debug)]
pub struct AlternatingLayerConfig {
  pub max_iters: u64,
  /// Number of cost/mixer layer pairs.
  pub reps: usize,
  pub shots: Option<usize>,
  pub seed: Option<u64>,
}

impl Default for AlternatingLayerConfig {
  fn default() -> Self {
    Self {
      max_iters: 200,
      reps: 3,
      shots: None,
      seed: None,
    }
  }
}

/// Alternating-operator ansatz: cost phase `e^{-iγH}` then mixer `e^{-iβΣX}`, `reps` times,
/// starting from the uniform superposition.
#[derive(Clone, Debug)]
pub struct AlternatingLayerSolver<O = OptimizerStrategy> {
  config: AlternatingLayerConfig,
  optimizer: O,
}

impl AlternatingLayerSolver {
  pub fn new(config: AlternatingLayerConfig) -> Self {
    Self {
      config,
      optimizer: OptimizerStrategy::default(),
    }
  }
}

impl Default for AlternatingLayerSolver {
  fn default() -> Self {
    Self::new(AlternatingLayerConfig::default())
  }
}

impl<O: AnsatzOptimizer> AlternatingLayerSolver<O> {
  pub fn with_optimizer<P: AnsatzOptimizer>(self, optimizer: P) -> AlternatingLayerSolver<P> {
    AlternatingLayerSolver {
      config: self.config,
      optimizer,
    }
  }

  pub fn config(&self) -> &AlternatingLayerConfig {
    &self.config
  }
}

impl<O: AnsatzOptimizer> Solver for AlternatingLayerSolver<O> {
  fn name(&self) -> &'static str {
    "alternating-layer"
  }

  fn solve(&self, problem: &QuadraticProgram) -> Result<SolverResult> {
    run_ansatz(
      problem,
      AnsatzRun {
        ansatz: Ansatz::Alternating {
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
