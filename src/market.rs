//! # Market Data
//!
//! $$
//! \text{fetch}:\ (\text{tickers}, [t_0, t_1)) \mapsto \{(t, O, H, L, C, C^{adj}, V)\}
//! $$
//!
//! Bars, fetch requests and the provider seam. The adjusted close is the valuation
//! field used by every return and optimization routine.

use std::collections::HashMap;
use std::fmt::Display;

use chrono::NaiveDate;
use impl_new_derive::ImplNew;

pub mod calendar;
pub mod memory;
pub mod period;
#[cfg(feature = "yahoo")]
pub mod yahoo;

pub use calendar::DateWindow;
pub use memory::InMemoryMarketData;
pub use period::Period;

/// One trading day of a single asset.
#[derive(ImplNew, Clone, Debug, PartialEq)]
pub struct Bar {
  pub date: NaiveDate,
  pub open: f64,
  pub high: f64,
  pub low: f64,
  pub close: f64,
  /// Close adjusted for splits and dividends.
  pub adj_close: f64,
  pub volume: u64,
}

impl Bar {
  /// Bar with OHLC and adjusted close rounded to cents, volume untouched.
  pub fn rounded(&self) -> Self {
    Self {
      date: self.date,
      open: round2(self.open),
      high: round2(self.high),
      low: round2(self.low),
      close: round2(self.close),
      adj_close: round2(self.adj_close),
      volume: self.volume,
    }
  }
}

/// Ordered bars per ticker.
pub type SeriesMap = HashMap<String, Vec<Bar>>;

/// What to ask the provider for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchRequest {
  /// Explicit `[start, end)` window.
  Window(DateWindow),
  /// Provider-side symbolic lookback ending today.
  Period(Period),
}

impl Display for FetchRequest {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      FetchRequest::Window(w) => write!(f, "{w}"),
      FetchRequest::Period(p) => write!(f, "period {p}"),
    }
  }
}

/// Historical market-data provider.
///
/// Implementations must return one ordered (oldest first) bar series per requested
/// ticker. Failures are surfaced, never retried.
pub trait MarketData {
  fn fetch(&self, tickers: &[&str], request: &FetchRequest) -> anyhow::Result<SeriesMap>;
}

impl<T: MarketData + ?Sized> MarketData for &T {
  fn fetch(&self, tickers: &[&str], request: &FetchRequest) -> anyhow::Result<SeriesMap> {
    (**self).fetch(tickers, request)
  }
}

/// Adjusted-close column of a bar series.
pub fn adjusted_closes(bars: &[Bar]) -> Vec<f64> {
  bars.iter().map(|b| b.adj_close).collect()
}

/// Trim every series to the length of the shortest one, keeping the most recent values.
pub fn align_tails(series: &[Vec<f64>]) -> Vec<Vec<f64>> {
  let min_len = series.iter().map(|s| s.len()).min().unwrap_or(0);
  series
    .iter()
    .map(|s| s[s.len() - min_len..].to_vec())
    .collect()
}

pub(crate) fn round2(x: f64) -> f64 {
  (x * 100.0).round() / 100.0
}
