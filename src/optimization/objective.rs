//! # Mean-Variance Selection Objective
//!
//! $$
//! f(x) = q\,x^\top \Sigma x - \mu^\top x,\qquad
//! E(x) = f(x) + P\Big(\sum_k x_k - B\Big)^2
//! $$
//!
//! Binary quadratic program over asset inclusion, its penalized unconstrained (QUBO)
//! form, and the estimation of $\mu$ and $\Sigma$ from daily adjusted closes.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;
use ndarray_stats::CorrelationExt;
use rayon::prelude::*;

use super::selection::Selection;
use super::selection::index_bit;
use crate::error::PortfolioError;
use crate::error::Result;
use crate::market::SeriesMap;
use crate::market::adjusted_closes;
use crate::market::align_tails;

/// Fewest aligned bars needed for a sample covariance (two returns).
pub const MIN_ALIGNED_BARS: usize = 3;

/// Minimize `q·xᵀΣx − μᵀx` over `x ∈ {0,1}ⁿ` subject to `Σx = budget`.
#[derive(Clone, Debug)]
pub struct QuadraticProgram {
  tickers: Vec<String>,
  mu: Array1<f64>,
  sigma: Array2<f64>,
  risk_factor: f64,
  budget: usize,
}

impl QuadraticProgram {
  pub fn new(
    tickers: Vec<String>,
    mu: Array1<f64>,
    sigma: Array2<f64>,
    risk_factor: f64,
    budget: usize,
  ) -> Result<Self> {
    let n = tickers.len();
    if n == 0 {
      return Err(PortfolioError::empty_portfolio());
    }
    if mu.len() != n || sigma.dim() != (n, n) {
      return Err(PortfolioError::Validation(format!(
        "expected {n} expected returns and a {n}x{n} covariance, got {} and {:?}",
        mu.len(),
        sigma.dim()
      )));
    }
    if mu.iter().chain(sigma.iter()).any(|v| !v.is_finite()) {
      return Err(PortfolioError::Validation(
        "expected returns and covariance must be finite".into(),
      ));
    }
    validate_risk_factor(risk_factor)?;
    validate_budget(budget, n)?;

    Ok(Self {
      tickers,
      mu,
      sigma,
      risk_factor,
      budget,
    })
  }

  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  pub fn mu(&self) -> &Array1<f64> {
    &self.mu
  }

  pub fn sigma(&self) -> &Array2<f64> {
    &self.sigma
  }

  pub fn risk_factor(&self) -> f64 {
    self.risk_factor
  }

  pub fn budget(&self) -> usize {
    self.budget
  }

  pub fn num_assets(&self) -> usize {
    self.tickers.len()
  }

  /// Unpenalized objective `f(x)`. Bits past the asset count are ignored.
  pub fn evaluate(&self, selection: &Selection) -> f64 {
    self.value_of(|k| selection.is_selected(k))
  }

  /// `f(x)` for a basis-state index. Assets past the index width count as unselected.
  pub fn evaluate_index(&self, index: usize) -> f64 {
    self.value_of(|k| index_bit(index, k))
  }

  pub fn is_feasible(&self, selection: &Selection) -> bool {
    selection.count() == self.budget
  }

  /// Penalty weight of the budget constraint.
  ///
  /// One plus the total absolute coefficient mass of `f`, which exceeds the spread of
  /// `f` over all binary vectors, so every infeasible vector has a higher penalized
  /// value than every feasible one.
  pub fn penalty(&self) -> f64 {
    let linear: f64 = self.mu.iter().map(|v| v.abs()).sum();
    let quadratic: f64 = self.sigma.iter().map(|v| v.abs()).sum();
    1.0 + linear + self.risk_factor * quadratic
  }

  /// Penalized value `E(x)`.
  pub fn qubo_value(&self, selection: &Selection) -> f64 {
    let violation = selection.count() as f64 - self.budget as f64;
    self.evaluate(selection) + self.penalty() * violation * violation
  }

  /// `E(x)` for a basis-state index.
  pub fn qubo_value_index(&self, index: usize) -> f64 {
    let violation = index.count_ones() as f64 - self.budget as f64;
    self.evaluate_index(index) + self.penalty() * violation * violation
  }

  /// `E` over the whole `2ⁿ` basis, indexed by basis state.
  pub(crate) fn qubo_energies(&self) -> Vec<f64> {
    let dim = 1usize << self.num_assets();
    let penalty = self.penalty();
    let budget = self.budget as f64;
    (0..dim)
      .into_par_iter()
      .map(|i| {
        let violation = i.count_ones() as f64 - budget;
        self.evaluate_index(i) + penalty * violation * violation
      })
      .collect()
  }

  fn value_of(&self, selected: impl Fn(usize) -> bool) -> f64 {
    let picked: Vec<usize> = (0..self.num_assets()).filter(|&k| selected(k)).collect();
    let mut risk = 0.0;
    for &i in &picked {
      for &j in &picked {
        risk += self.sigma[[i, j]];
      }
    }
    let gain: f64 = picked.iter().map(|&i| self.mu[i]).sum();
    self.risk_factor * risk - gain
  }
}

fn validate_risk_factor(risk_factor: f64) -> Result<()> {
  if risk_factor.is_finite() && risk_factor >= 0.0 {
    Ok(())
  } else {
    Err(PortfolioError::Validation(format!(
      "risk factor must be a non-negative number, got {risk_factor}"
    )))
  }
}

fn validate_budget(budget: usize, num_assets: usize) -> Result<()> {
  if budget == 0 || budget > num_assets {
    Err(PortfolioError::Constraint(format!(
      "budget {budget} must lie in 1..={num_assets}"
    )))
  } else {
    Ok(())
  }
}

/// Daily simple returns `p_t / p_{t-1} - 1`.
pub fn simple_returns(ticker: &str, closes: &[f64]) -> Result<Vec<f64>> {
  closes
    .windows(2)
    .map(|w| {
      if w[0] == 0.0 {
        Err(PortfolioError::Division(format!(
          "zero adjusted close in the history of {ticker}"
        )))
      } else {
        Ok(w[1] / w[0] - 1.0)
      }
    })
    .collect()
}

/// Estimate `μ` and `Σ` from the adjusted closes of `tickers` and build the program.
///
/// Series are aligned on their common tail; `Σ` is the sample covariance (ddof 1).
pub fn build_objective(
  tickers: &[&str],
  series_by_asset: &SeriesMap,
  risk_factor: f64,
  budget: usize,
) -> Result<QuadraticProgram> {
  if tickers.is_empty() {
    return Err(PortfolioError::empty_portfolio());
  }
  validate_risk_factor(risk_factor)?;
  validate_budget(budget, tickers.len())?;

  let closes = tickers
    .iter()
    .map(|&t| {
      series_by_asset
        .get(t)
        .map(|bars| adjusted_closes(bars))
        .ok_or_else(|| PortfolioError::Validation(format!("no price history for {t}")))
    })
    .collect::<Result<Vec<_>>>()?;

  let aligned = align_tails(&closes);
  let bars = aligned.first().map_or(0, Vec::len);
  if bars < MIN_ALIGNED_BARS {
    return Err(PortfolioError::Validation(format!(
      "need at least {MIN_ALIGNED_BARS} aligned bars to estimate covariance, got {bars}"
    )));
  }

  let returns = tickers
    .iter()
    .zip(&aligned)
    .map(|(t, c)| simple_returns(t, c))
    .collect::<Result<Vec<_>>>()?;
  let obs = bars - 1;
  let flat: Vec<f64> = returns.into_iter().flatten().collect();
  let data = Array2::from_shape_vec((tickers.len(), obs), flat)
    .map_err(|e| PortfolioError::Validation(e.to_string()))?;

  let mu = data
    .mean_axis(Axis(1))
    .ok_or_else(|| PortfolioError::Validation("no return observations".into()))?;
  let sigma = data
    .cov(1.0)
    .map_err(|e| PortfolioError::Validation(e.to_string()))?;

  tracing::debug!(assets = tickers.len(), obs, "estimated return moments");

  QuadraticProgram::new(
    tickers.iter().map(|t| t.to_string()).collect(),
    mu,
    sigma,
    risk_factor,
    budget,
  )
}
