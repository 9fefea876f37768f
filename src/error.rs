//! Error types shared by every portfolio operation.

use thiserror::Error;

/// Failure kinds raised synchronously where they are detected.
#[derive(Error, Debug)]
pub enum PortfolioError {
  /// Wrong shape or value of an input.
  #[error("invalid input: {0}")]
  Validation(String),

  /// Date string not in `YYYY-MM-DD` form.
  #[error("wrong date format `{0}`, expected YYYY-MM-DD")]
  Format(String),

  /// Start date on or after the end date (or today).
  #[error("invalid date ordering: {0}")]
  Ordering(String),

  /// Symbolic period outside the supported enumeration.
  #[error("unsupported time period `{0}`")]
  UnsupportedPeriod(String),

  /// Zero valuation in a return denominator.
  #[error("division by zero valuation: {0}")]
  Division(String),

  /// No binary selection can satisfy the budget.
  #[error("infeasible constraint: {0}")]
  Constraint(String),

  /// The portfolio is not set up for the requested operation.
  #[error("{0}")]
  Configuration(ConfigurationError),

  /// The market-data collaborator failed (network, unknown ticker, ...).
  #[error("market data request failed")]
  UpstreamData(#[source] anyhow::Error),

  /// Table could not be written or read.
  #[error("table persistence failed: {0}")]
  Persistence(String),
}

/// Portfolio setup problems.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationError {
  /// At least one asset is required.
  #[error("empty portfolio")]
  EmptyPortfolio,
}

impl PortfolioError {
  pub(crate) fn empty_portfolio() -> Self {
    Self::Configuration(ConfigurationError::EmptyPortfolio)
  }

  /// True for the "empty portfolio" configuration error, which callers may treat as a no-op.
  pub fn is_empty_portfolio(&self) -> bool {
    matches!(self, Self::Configuration(ConfigurationError::EmptyPortfolio))
  }
}

/// Result alias for portfolio operations.
pub type Result<T> = std::result::Result<T, PortfolioError>;
