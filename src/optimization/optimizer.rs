//! # Classical Optimizers
//!
//! $$
//! \theta^\* = \arg\min_\theta \langle \psi(\theta) | \hat H | \psi(\theta) \rangle
//! $$
//!
//! Gradient-free minimizers driving the ansatz parameters, built on argmin.

use std::sync::Arc;
use std::sync::Mutex;

use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::core::State;
use argmin::solver::neldermead::NelderMead;
use argmin::solver::simulatedannealing::Anneal;
use argmin::solver::simulatedannealing::SATempFunc;
use argmin::solver::simulatedannealing::SimulatedAnnealing;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::Distribution;
use rand_distr::Normal;

use super::statevector::AnsatzCost;

/// Best parameters found, their cost and the iterations spent.
#[derive(Clone, Debug)]
pub struct OptimizerOutcome {
  pub params: Vec<f64>,
  pub cost: f64,
  pub iterations: u64,
}

/// Minimizes an ansatz energy from a starting point.
///
/// Implementations never fail: when the underlying solver errors, or there is nothing to
/// tune, they fall back to `x0`.
pub trait AnsatzOptimizer {
  fn minimize(&self, cost: AnsatzCost, x0: Vec<f64>, max_iters: u64) -> OptimizerOutcome;
}

/// Downhill simplex.
#[derive(Clone, Debug)]
pub struct NelderMeadOptimizer {
  /// Stop once the simplex cost standard deviation drops below this.
  pub sd_tolerance: f64,
  /// Edge length of the initial simplex around `x0`.
  pub initial_step: f64,
}

impl Default for NelderMeadOptimizer {
  fn default() -> Self {
    Self {
      sd_tolerance: 1e-8,
      initial_step: 1.0,
    }
  }
}

impl AnsatzOptimizer for NelderMeadOptimizer {
  fn minimize(&self, cost: AnsatzCost, x0: Vec<f64>, max_iters: u64) -> OptimizerOutcome {
    let fallback = fallback(&cost, &x0);
    if x0.is_empty() {
      return fallback;
    }

    let mut simplex = Vec::with_capacity(x0.len() + 1);
    simplex.push(x0.clone());
    for i in 0..x0.len() {
      let mut point = x0.clone();
      point[i] += self.initial_step;
      simplex.push(point);
    }

    match NelderMead::new(simplex).with_sd_tolerance(self.sd_tolerance) {
      Ok(solver) => {
        match Executor::new(cost.clone(), solver)
          .configure(|state| state.max_iters(max_iters))
          .run()
        {
          Ok(res) => {
            let iterations = res.state.get_iter();
            let params = res.state.best_param.unwrap_or(x0);
            OptimizerOutcome {
              cost: cost.expectation(&params),
              params,
              iterations,
            }
          }
          Err(err) => {
            tracing::warn!(%err, "nelder-mead failed, keeping initial parameters");
            fallback
          }
        }
      }
      Err(err) => {
        tracing::warn!(%err, "invalid nelder-mead setup, keeping initial parameters");
        fallback
      }
    }
  }
}

/// Simulated annealing with Gaussian moves on one parameter at a time.
#[derive(Clone, Debug)]
pub struct AnnealingOptimizer {
  pub initial_temperature: f64,
  /// Standard deviation of a single move.
  pub step_size: f64,
  /// Seed of the move generator; entropy when `None`.
  pub seed: Option<u64>,
}

impl Default for AnnealingOptimizer {
  fn default() -> Self {
    Self {
      initial_temperature: 10.0,
      step_size: 0.3,
      seed: None,
    }
  }
}

struct AnnealedAnsatz {
  cost: AnsatzCost,
  step: Normal<f64>,
  rng: Arc<Mutex<StdRng>>,
}

impl CostFunction for AnnealedAnsatz {
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
    Ok(self.cost.expectation(x))
  }
}

impl Anneal for AnnealedAnsatz {
  type Param = Vec<f64>;
  type Output = Vec<f64>;
  type Float = f64;

  fn anneal(&self, param: &Vec<f64>, _temp: f64) -> Result<Vec<f64>, argmin::core::Error> {
    let mut next = param.clone();
    if next.is_empty() {
      return Ok(next);
    }
    let mut rng = self
      .rng
      .lock()
      .map_err(|_| anyhow::anyhow!("annealing rng lock poisoned"))?;
    let idx = rng.gen_range(0..next.len());
    next[idx] += self.step.sample(&mut *rng);
    Ok(next)
  }
}

impl AnsatzOptimizer for AnnealingOptimizer {
  fn minimize(&self, cost: AnsatzCost, x0: Vec<f64>, max_iters: u64) -> OptimizerOutcome {
    let fallback = fallback(&cost, &x0);
    if x0.is_empty() {
      return fallback;
    }

    let step = match Normal::new(0.0, self.step_size) {
      Ok(step) => step,
      Err(err) => {
        tracing::warn!(%err, "invalid annealing step size, keeping initial parameters");
        return fallback;
      }
    };
    let rng = match self.seed {
      Some(seed) => StdRng::seed_from_u64(seed),
      None => StdRng::from_entropy(),
    };
    let problem = AnnealedAnsatz {
      cost: cost.clone(),
      step,
      rng: Arc::new(Mutex::new(rng)),
    };

    let solver = match SimulatedAnnealing::new(self.initial_temperature) {
      Ok(solver) => solver
        .with_temp_func(SATempFunc::Boltzmann)
        .with_stall_best(max_iters / 4 + 1),
      Err(err) => {
        tracing::warn!(%err, "invalid annealing temperature, keeping initial parameters");
        return fallback;
      }
    };

    match Executor::new(problem, solver)
      .configure(|state| state.param(x0.clone()).max_iters(max_iters))
      .run()
    {
      Ok(res) => {
        let iterations = res.state.get_iter();
        let params = res.state.best_param.unwrap_or(x0);
        OptimizerOutcome {
          cost: cost.expectation(&params),
          params,
          iterations,
        }
      }
      Err(err) => {
        tracing::warn!(%err, "simulated annealing failed, keeping initial parameters");
        fallback
      }
    }
  }
}

fn fallback(cost: &AnsatzCost, x0: &[f64]) -> OptimizerOutcome {
  OptimizerOutcome {
    params: x0.to_vec(),
    cost: cost.expectation(x0),
    iterations: 0,
  }
}

/// Optimizer choice for the heuristic solvers.
#[derive(Clone, Debug)]
pub enum OptimizerStrategy {
  NelderMead(NelderMeadOptimizer),
  SimulatedAnnealing(AnnealingOptimizer),
}

impl Default for OptimizerStrategy {
  fn default() -> Self {
    Self::NelderMead(NelderMeadOptimizer::default())
  }
}

impl AnsatzOptimizer for OptimizerStrategy {
  fn minimize(&self, cost: AnsatzCost, x0: Vec<f64>, max_iters: u64) -> OptimizerOutcome {
    match self {
      OptimizerStrategy::NelderMead(o) => o.minimize(cost, x0, max_iters),
      OptimizerStrategy::SimulatedAnnealing(o) => o.minimize(cost, x0, max_iters),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::optimization::statevector::Ansatz;

  fn cost() -> AnsatzCost {
    // Minimum at basis state 0b10.
    AnsatzCost::new(
      Ansatz::HardwareEfficient { num_qubits: 2, reps: 1 },
      vec![1.0, 2.0, -3.0, 0.5],
    )
  }

  #[test]
  fn nelder_mead_never_increases_energy() {
    let x0 = vec![0.1; 4];
    let start = cost().expectation(&x0);
    let out = NelderMeadOptimizer::default().minimize(cost(), x0, 300);
    assert_eq!(out.params.len(), 4);
    assert!(out.cost < start);
  }

  #[test]
  fn annealing_keeps_best_seen() {
    let x0 = vec![0.1; 4];
    let start = cost().expectation(&x0);
    let opt = OptimizerStrategy::SimulatedAnnealing(AnnealingOptimizer {
      seed: Some(7),
      ..Default::default()
    });
    let out = opt.minimize(cost(), x0, 200);
    assert_eq!(out.params.len(), 4);
    assert!(out.cost <= start + 1e-12);
  }

  #[test]
  fn parameterless_circuits_keep_the_start() {
    let flat = AnsatzCost::new(
      Ansatz::Alternating { num_qubits: 2, reps: 0 },
      vec![1.0, 2.0, -3.0, 0.5],
    );
    let uniform = flat.expectation(&[]);
    for opt in [
      OptimizerStrategy::default(),
      OptimizerStrategy::SimulatedAnnealing(AnnealingOptimizer {
        seed: Some(1),
        ..Default::default()
      }),
    ] {
      let out = opt.minimize(flat.clone(), Vec::new(), 50);
      assert!(out.params.is_empty());
      assert_eq!(out.iterations, 0);
      assert_eq!(out.cost, uniform);
    }
  }
}
