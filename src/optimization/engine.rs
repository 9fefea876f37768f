//! # Selection Engine
//!
//! $$
//! x^\* = \operatorname{Solve}\big(\mu(\mathcal D), \Sigma(\mathcal D), q, B\big)
//! $$
//!
//! High-level orchestration: fetch the price window, build the objective, dispatch it
//! to the configured backend and rank the outcome.

use super::objective::QuadraticProgram;
use super::objective::build_objective;
use super::solvers::Solver;
use super::solvers::SolverBackend;
use super::solvers::SolverResult;
use crate::error::Result;
use crate::market::DateWindow;
use crate::market::FetchRequest;
use crate::market::MarketData;
use crate::portfolio::Asset;
use crate::report::SelectionReport;
use crate::report::rank_selections;
use crate::returns::ReturnAggregator;

/// Runtime configuration for [`SelectionEngine`].
#[derive(Clone, Debug, Default)]
pub struct SelectionEngineConfig {
  /// Backend used by [`SelectionEngine::solve`] and [`SelectionEngine::optimize`].
  pub backend: SolverBackend,
}

/// Single entry point for asset-selection workflows.
#[derive(Clone, Debug, Default)]
pub struct SelectionEngine {
  config: SelectionEngineConfig,
}

impl SelectionEngine {
  pub fn new(config: SelectionEngineConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &SelectionEngineConfig {
    &self.config
  }

  /// Solve an already built program with the configured backend.
  pub fn solve(&self, problem: &QuadraticProgram) -> Result<SolverResult> {
    tracing::debug!(
      solver = self.config.backend.name(),
      assets = problem.num_assets(),
      budget = problem.budget(),
      "solving selection problem"
    );
    self.config.backend.solve(problem)
  }

  /// Estimate the program from the adjusted closes of `holdings` over `window`.
  pub fn build_problem<M: MarketData>(
    &self,
    aggregator: &ReturnAggregator<M>,
    holdings: &[Asset],
    window: DateWindow,
    risk_factor: f64,
    budget: usize,
  ) -> Result<QuadraticProgram> {
    let tickers: Vec<&str> = holdings.iter().map(|a| a.ticker()).collect();
    let series = aggregator.fetch(&tickers, &FetchRequest::Window(window))?;
    build_objective(&tickers, &series, risk_factor, budget)
  }

  /// Fetch, build, solve and rank. `Ok(None)` for an empty portfolio.
  pub fn optimize<M: MarketData>(
    &self,
    aggregator: &ReturnAggregator<M>,
    holdings: &[Asset],
    window: DateWindow,
    risk_factor: f64,
    budget: usize,
  ) -> Result<Option<SelectionReport>> {
    if holdings.is_empty() {
      tracing::info!("empty portfolio, nothing to optimize");
      return Ok(None);
    }

    let problem = self.build_problem(aggregator, holdings, window, risk_factor, budget)?;
    let result = self.solve(&problem)?;
    let report = rank_selections(&problem, &result)?;

    tracing::info!(
      solver = report.solver,
      selection = %report.optimal,
      value = report.optimal_value,
      "portfolio selection finished"
    );
    Ok(Some(report))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::PortfolioError;
  use crate::market::InMemoryMarketData;
  use crate::market::fixtures::bars;
  use crate::market::fixtures::date;
  use crate::optimization::solvers::VariationalConfig;
  use crate::optimization::solvers::VariationalSolver;

  fn source() -> InMemoryMarketData {
    let steady: Vec<f64> = (0..30).map(|i| 100.0 * 1.004f64.powi(i)).collect();
    let choppy: Vec<f64> = (0..30)
      .map(|i| if i % 2 == 0 { 50.0 } else { 54.0 } + 0.05 * i as f64)
      .collect();
    let flat: Vec<f64> = (0..30).map(|i| 20.0 + 0.001 * i as f64).collect();
    InMemoryMarketData::new(date("2024-03-01"))
      .with_series("UP", bars("2024-01-01", &steady))
      .with_series("CHOP", bars("2024-01-01", &choppy))
      .with_series("FLAT", bars("2024-01-01", &flat))
  }

  fn holdings() -> Vec<Asset> {
    ["UP", "CHOP", "FLAT"]
      .iter()
      .map(|t| Asset::new(*t, *t, "stocks", 1.0).unwrap())
      .collect()
  }

  fn window() -> DateWindow {
    DateWindow {
      start: date("2024-01-01"),
      end: date("2024-02-01"),
    }
  }

  #[test]
  fn exact_pipeline_meets_budget_for_several_risk_factors() {
    let source = source();
    let aggregator = ReturnAggregator::with_today(&source, date("2024-03-01"));
    let engine = SelectionEngine::default();

    for q in [0.0, 0.5, 5.0, 1_000.0] {
      let report = engine
        .optimize(&aggregator, &holdings(), window(), q, 2)
        .unwrap()
        .unwrap();
      assert_eq!(report.optimal.count(), 2);
      assert!(report.feasible);
      assert_eq!(report.entries.len(), 8);
    }
  }

  #[test]
  fn empty_portfolio_is_a_soft_no_op() {
    let source = source();
    let aggregator = ReturnAggregator::with_today(&source, date("2024-03-01"));
    let out = SelectionEngine::default().optimize(&aggregator, &[], window(), 1.0, 1);
    assert!(out.unwrap().is_none());
  }

  #[test]
  fn unsatisfiable_budget_is_a_constraint_error() {
    let source = source();
    let aggregator = ReturnAggregator::with_today(&source, date("2024-03-01"));
    let two = &holdings()[..2];
    let err = SelectionEngine::default()
      .optimize(&aggregator, two, window(), 1.0, 3)
      .unwrap_err();
    assert!(matches!(err, PortfolioError::Constraint(_)));
  }

  #[test]
  fn heuristic_backend_reports_a_consistent_shape() {
    let source = source();
    let aggregator = ReturnAggregator::with_today(&source, date("2024-03-01"));
    let engine = SelectionEngine::new(SelectionEngineConfig {
      backend: SolverBackend::Variational(VariationalSolver::new(VariationalConfig {
        max_iters: 100,
        seed: Some(1),
        ..Default::default()
      })),
    });
    let report = engine
      .optimize(&aggregator, &holdings(), window(), 0.5, 1)
      .unwrap()
      .unwrap();
    assert_eq!(report.solver, "variational");
    assert_eq!(report.entries.len(), 8);
    assert_eq!(report.feasible, report.optimal.count() == 1);
  }
}
