//! # quantfolio
//!
//! $$
//! \min_{x\in\{0,1\}^n} \ q\,x^\top \Sigma x - \mu^\top x \quad \text{s.t.} \quad \sum_i x_i = B
//! $$
//!
//! Personal portfolio analytics: multi-period return aggregation over adjusted-close
//! series and budget-constrained binary mean-variance selection, solved exactly or with
//! simulated variational / alternating-layer ansätze.
//!
//! Market data enters through the [`market::MarketData`] trait. An in-memory provider is
//! always available; the Yahoo Finance provider lives behind the `yahoo` feature.

pub mod error;
pub mod market;
pub mod optimization;
pub mod portfolio;
pub mod report;
pub mod returns;
pub mod visualization;

pub use error::ConfigurationError;
pub use error::PortfolioError;
pub use error::Result;
pub use market::Bar;
pub use market::FetchRequest;
pub use market::MarketData;
pub use market::SeriesMap;
pub use market::period::Period;
pub use optimization::QuadraticProgram;
pub use optimization::SelectionEngine;
pub use optimization::Solver;
pub use optimization::SolverResult;
pub use portfolio::Asset;
pub use portfolio::AssetCategory;
pub use portfolio::Portfolio;
pub use returns::PeriodReturns;
pub use returns::ReturnAggregator;
