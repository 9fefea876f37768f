//! # Portfolio
//!
//! $$
//! V_t = \sum_{a \in \mathcal A} h_a\, C^{adj}_{a,t}
//! $$
//!
//! Assets, their categories, and the ordered portfolio container with its cached
//! per-period returns.

use std::fmt::Display;

use crate::error::PortfolioError;
use crate::error::Result;
use crate::market::MarketData;
use crate::returns::PeriodReturns;
use crate::returns::ReturnAggregator;

/// Asset class. Unrecognized labels map to [`AssetCategory::Other`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AssetCategory {
  Stocks,
  Etf,
  Reits,
  Currency,
  Cryptocurrency,
  Funds,
  #[default]
  Other,
}

impl AssetCategory {
  pub const ALL: [AssetCategory; 7] = [
    AssetCategory::Stocks,
    AssetCategory::Etf,
    AssetCategory::Reits,
    AssetCategory::Currency,
    AssetCategory::Cryptocurrency,
    AssetCategory::Funds,
    AssetCategory::Other,
  ];

  /// Markets that never close, so no weekend adjustment applies.
  pub fn is_always_open(&self) -> bool {
    matches!(self, AssetCategory::Cryptocurrency)
  }
}

impl From<&str> for AssetCategory {
  fn from(s: &str) -> Self {
    match s.trim().to_lowercase().as_str() {
      "stocks" => Self::Stocks,
      "etf" => Self::Etf,
      "reits" => Self::Reits,
      "currency" => Self::Currency,
      "cryptocurrency" => Self::Cryptocurrency,
      "funds" => Self::Funds,
      _ => Self::Other,
    }
  }
}

impl Display for AssetCategory {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let label = match self {
      AssetCategory::Stocks => "stocks",
      AssetCategory::Etf => "etf",
      AssetCategory::Reits => "reits",
      AssetCategory::Currency => "currency",
      AssetCategory::Cryptocurrency => "cryptocurrency",
      AssetCategory::Funds => "funds",
      AssetCategory::Other => "Other",
    };
    f.write_str(label)
  }
}

/// A holding: fixed identity, adjustable category and amount.
#[derive(Clone, Debug, PartialEq)]
pub struct Asset {
  name: String,
  ticker: String,
  /// Asset class.
  pub category: AssetCategory,
  amount: f64,
}

impl Asset {
  pub fn new(
    name: impl Into<String>,
    ticker: impl Into<String>,
    category: impl Into<AssetCategory>,
    amount: f64,
  ) -> Result<Self> {
    let ticker = ticker.into();
    if ticker.trim().is_empty() {
      return Err(PortfolioError::Validation("asset ticker must not be empty".into()));
    }
    validate_amount(amount)?;

    Ok(Self {
      name: name.into(),
      ticker,
      category: category.into(),
      amount,
    })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn ticker(&self) -> &str {
    &self.ticker
  }

  /// Quantity held.
  pub fn amount(&self) -> f64 {
    self.amount
  }

  pub fn set_amount(&mut self, amount: f64) -> Result<()> {
    validate_amount(amount)?;
    self.amount = amount;
    Ok(())
  }
}

fn validate_amount(amount: f64) -> Result<()> {
  if amount.is_finite() && amount >= 0.0 {
    Ok(())
  } else {
    Err(PortfolioError::Validation(format!(
      "asset amount must be a non-negative number, got {amount}"
    )))
  }
}

/// Holdings per category in [`AssetCategory::ALL`] order, zero counts dropped.
pub fn category_counts(assets: &[Asset]) -> Vec<(AssetCategory, usize)> {
  AssetCategory::ALL
    .into_iter()
    .map(|c| (c, assets.iter().filter(|a| a.category == c).count()))
    .filter(|(_, n)| *n > 0)
    .collect()
}

/// Ordered asset list plus the last computed return of every period.
///
/// Assets are matched by name on removal and the first match wins, so duplicate names
/// are best avoided.
#[derive(Clone, Debug, Default)]
pub struct Portfolio {
  assets: Vec<Asset>,
  returns: PeriodReturns,
}

impl Portfolio {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_assets(assets: Vec<Asset>) -> Self {
    Self {
      assets,
      returns: PeriodReturns::default(),
    }
  }

  pub fn add_asset(&mut self, asset: Asset) {
    self.assets.push(asset);
  }

  /// Remove the first asset called `name`. `None` when the list is empty or no asset matches.
  pub fn remove_asset(&mut self, name: &str) -> Option<Asset> {
    if self.assets.is_empty() {
      tracing::info!("cannot remove {name}: the asset list is empty");
      return None;
    }

    match self.assets.iter().position(|a| a.name == name) {
      Some(idx) => Some(self.assets.remove(idx)),
      None => {
        tracing::info!("asset {name} is not part of this portfolio");
        None
      }
    }
  }

  pub fn assets(&self) -> &[Asset] {
    &self.assets
  }

  pub fn find(&self, name: &str) -> Option<&Asset> {
    self.assets.iter().find(|a| a.name == name)
  }

  pub fn find_mut(&mut self, name: &str) -> Option<&mut Asset> {
    self.assets.iter_mut().find(|a| a.name == name)
  }

  pub fn tickers(&self) -> Vec<&str> {
    self.assets.iter().map(|a| a.ticker()).collect()
  }

  pub fn len(&self) -> usize {
    self.assets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.assets.is_empty()
  }

  /// Last computed returns; all zero until the first successful refresh.
  pub fn returns(&self) -> &PeriodReturns {
    &self.returns
  }

  /// Recompute every period and replace the cache in one step.
  ///
  /// On error the previous cache is left untouched. `Ok(None)` for an empty portfolio.
  pub fn refresh_returns<M: MarketData>(
    &mut self,
    aggregator: &ReturnAggregator<M>,
  ) -> Result<Option<&PeriodReturns>> {
    match aggregator.compute_all_period_returns(&self.assets)? {
      Some(fresh) => {
        self.returns = fresh;
        Ok(Some(&self.returns))
      }
      None => Ok(None),
    }
  }
}
