//! # Portfolio Returns
//!
//! $$
//! R = \frac{V_{last} - V_{first}}{V_{first}} \times 100,\qquad
//! V_t = \sum_a h_a\, C^{adj}_{a,t}
//! $$
//!
//! Holdings-weighted valuation of adjusted-close series and percentage returns over
//! every supported period, plus per-asset, benchmark, valuation and correlation views.
//!
//! Read-only views return `Ok(None)` for an empty portfolio instead of failing.

use std::collections::BTreeMap;

use chrono::Days;
use chrono::NaiveDate;
use ndarray::Array2;
use ndarray_stats::CorrelationExt;

use crate::error::PortfolioError;
use crate::error::Result;
use crate::market::Bar;
use crate::market::DateWindow;
use crate::market::FetchRequest;
use crate::market::MarketData;
use crate::market::Period;
use crate::market::SeriesMap;
use crate::market::adjusted_closes;
use crate::market::align_tails;
use crate::market::calendar::parse_date;
use crate::market::calendar::resolve_period;
use crate::market::calendar::resolve_range;
use crate::market::round2;
use crate::portfolio::Asset;
use crate::report::MetricTable;

/// Benchmarks tracked alongside portfolios: (name, ticker).
pub const MARKET_BENCHMARKS: [(&str, &str); 4] = [
  ("S&P 500", "^GSPC"),
  ("Dow Jones Industrial Average", "^DJI"),
  ("NASDAQ 100", "^NDX"),
  ("Gold", "GC=F"),
];

/// Percentage return per period. Always holds exactly one entry per [`Period`].
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodReturns(BTreeMap<Period, f64>);

impl Default for PeriodReturns {
  fn default() -> Self {
    Self(Period::ALL.into_iter().map(|p| (p, 0.0)).collect())
  }
}

impl PeriodReturns {
  pub fn get(&self, period: Period) -> Option<f64> {
    self.0.get(&period).copied()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Entries in period order.
  pub fn iter(&self) -> impl Iterator<Item = (Period, f64)> + '_ {
    self.0.iter().map(|(p, r)| (*p, *r))
  }

  /// Single-row table, one `Return (%) - <period>` column per period.
  pub fn to_table(&self) -> MetricTable {
    let mut table = MetricTable::new(Period::ALL.iter().map(Period::return_column));
    table.push_unchecked(self.iter().map(|(_, r)| format!("{r:.2}")).collect());
    table
  }
}

/// Pearson correlation of adjusted closes.
#[derive(Clone, Debug)]
pub struct Correlation {
  pub tickers: Vec<String>,
  pub matrix: Array2<f64>,
}

impl Correlation {
  pub fn to_table(&self) -> MetricTable {
    let mut table = MetricTable::new(std::iter::once(String::new()).chain(self.tickers.iter().cloned()));
    for (i, ticker) in self.tickers.iter().enumerate() {
      let mut row = vec![ticker.clone()];
      row.extend(self.matrix.row(i).iter().map(|v| format!("{v:.4}")));
      table.push_unchecked(row);
    }
    table
  }
}

/// Traded volume per asset on one day.
#[derive(Clone, Debug, PartialEq)]
pub struct Liquidity {
  pub date: NaiveDate,
  pub tickers: Vec<String>,
  pub volumes: Vec<u64>,
}

/// Columns of [`ReturnAggregator::today_asset_info`].
pub const ASSET_INFO_COLUMNS: [&str; 8] = [
  "Asset",
  "Return (%)",
  "Open",
  "High",
  "Low",
  "Close",
  "Adj Close",
  "Volume",
];

/// Percentage change between the first and last valuation of the holdings.
///
/// Every holding must have a non-empty series in `series_by_asset`. `Ok(None)` when
/// `holdings` is empty. The result is rounded to two decimals.
pub fn portfolio_return(holdings: &[Asset], series_by_asset: &SeriesMap) -> Result<Option<f64>> {
  if holdings.is_empty() {
    return Ok(None);
  }

  let mut first_valuation = 0.0;
  let mut last_valuation = 0.0;

  for asset in holdings {
    let (first, last) = first_and_last(asset.ticker(), series_by_asset)?;
    first_valuation += asset.amount() * first.adj_close;
    last_valuation += asset.amount() * last.adj_close;
  }

  percent_change(first_valuation, last_valuation).map(Some)
}

/// Percentage change between the first and last adjusted close of one series.
pub fn series_return(ticker: &str, bars: &[Bar]) -> Result<f64> {
  match (bars.first(), bars.last()) {
    (Some(first), Some(last)) => percent_change(first.adj_close, last.adj_close),
    _ => Err(PortfolioError::Validation(format!("empty price series for {ticker}"))),
  }
}

fn first_and_last<'a>(ticker: &str, series_by_asset: &'a SeriesMap) -> Result<(&'a Bar, &'a Bar)> {
  let bars = series_by_asset
    .get(ticker)
    .ok_or_else(|| PortfolioError::Validation(format!("no price series for {ticker}")))?;

  match (bars.first(), bars.last()) {
    (Some(first), Some(last)) => Ok((first, last)),
    _ => Err(PortfolioError::Validation(format!("empty price series for {ticker}"))),
  }
}

fn percent_change(first: f64, last: f64) -> Result<f64> {
  if first == 0.0 {
    return Err(PortfolioError::Division(
      "first valuation of the window is zero".to_string(),
    ));
  }
  Ok(round2((last - first) / first * 100.0))
}

/// Fetches windows from a [`MarketData`] provider and aggregates them.
pub struct ReturnAggregator<M> {
  source: M,
  today: NaiveDate,
}

impl<M: MarketData> ReturnAggregator<M> {
  /// Aggregator anchored on the local calendar date.
  pub fn new(source: M) -> Self {
    Self::with_today(source, chrono::Local::now().date_naive())
  }

  pub fn with_today(source: M, today: NaiveDate) -> Self {
    Self { source, today }
  }

  pub fn today(&self) -> NaiveDate {
    self.today
  }

  pub fn source(&self) -> &M {
    &self.source
  }

  pub(crate) fn fetch(&self, tickers: &[&str], request: &FetchRequest) -> Result<SeriesMap> {
    tracing::debug!(?tickers, %request, "fetching market data");
    self
      .source
      .fetch(tickers, request)
      .map_err(PortfolioError::UpstreamData)
  }

  /// Portfolio return over one symbolic period ending today.
  pub fn compute_portfolio_return(&self, holdings: &[Asset], period: Period) -> Result<Option<f64>> {
    if holdings.is_empty() {
      return Ok(None);
    }

    let tickers: Vec<&str> = holdings.iter().map(|a| a.ticker()).collect();
    let request = resolve_period(period, self.today, false);
    let series = self.fetch(&tickers, &request)?;

    portfolio_return(holdings, &series)
  }

  /// Portfolio return for every period.
  ///
  /// All periods are computed before anything is returned, so a failure on one period
  /// yields an error and no partial mapping.
  pub fn compute_all_period_returns(&self, holdings: &[Asset]) -> Result<Option<PeriodReturns>> {
    if holdings.is_empty() {
      return Ok(None);
    }

    let mut out = BTreeMap::new();
    for period in Period::ALL {
      let r = self
        .compute_portfolio_return(holdings, period)?
        .ok_or_else(PortfolioError::empty_portfolio)?;
      out.insert(period, r);
    }

    tracing::info!(assets = holdings.len(), "computed portfolio returns for all periods");
    Ok(Some(PeriodReturns(out)))
  }

  /// Return of a single asset. "1d" honours the always-open rule of its category.
  pub fn asset_period_return(&self, asset: &Asset, period: Period) -> Result<f64> {
    let request = resolve_period(period, self.today, asset.category.is_always_open());
    let series = self.fetch(&[asset.ticker()], &request)?;
    let bars = series.get(asset.ticker()).map(Vec::as_slice).unwrap_or_default();
    series_return(asset.ticker(), bars)
  }

  /// Table with one row per asset and one return column per requested period.
  pub fn asset_returns(&self, assets: &[Asset], periods: &[Period]) -> Result<Option<MetricTable>> {
    if assets.is_empty() {
      return Ok(None);
    }

    let mut table =
      MetricTable::new(std::iter::once("Asset".to_string()).chain(periods.iter().map(Period::return_column)));
    for asset in assets {
      let mut row = vec![asset.name().to_string()];
      for &period in periods {
        row.push(format!("{:.2}", self.asset_period_return(asset, period)?));
      }
      table.push_unchecked(row);
    }

    Ok(Some(table))
  }

  /// Returns of [`MARKET_BENCHMARKS`] over every period.
  pub fn benchmark_returns(&self) -> Result<MetricTable> {
    let mut table = MetricTable::new(
      ["Name".to_string(), "Ticker".to_string()]
        .into_iter()
        .chain(Period::ALL.iter().map(Period::return_column)),
    );

    for (name, ticker) in MARKET_BENCHMARKS {
      let mut row = vec![name.to_string(), ticker.to_string()];
      for period in Period::ALL {
        let request = resolve_period(period, self.today, false);
        let series = self.fetch(&[ticker], &request)?;
        let bars = series.get(ticker).map(Vec::as_slice).unwrap_or_default();
        row.push(format!("{:.2}", series_return(ticker, bars)?));
      }
      table.push_unchecked(row);
    }

    Ok(table)
  }

  /// Current value of the holdings at the latest adjusted close, each position rounded to cents.
  pub fn current_valuation(&self, holdings: &[Asset]) -> Result<Option<f64>> {
    let Some(positions) = self.position_values(holdings)? else {
      return Ok(None);
    };

    let total: f64 = positions.iter().map(|(_, v)| v).sum();
    tracing::info!(valuation = total, "current portfolio valuation");
    Ok(Some(total))
  }

  /// `(name, amount × latest adjusted close)` per holding, rounded to cents.
  pub fn position_values(&self, holdings: &[Asset]) -> Result<Option<Vec<(String, f64)>>> {
    if holdings.is_empty() {
      return Ok(None);
    }

    let mut positions = Vec::with_capacity(holdings.len());
    for asset in holdings {
      let series = self.fetch(&[asset.ticker()], &FetchRequest::Period(Period::OneDay))?;
      let (_, last) = first_and_last(asset.ticker(), &series)?;
      positions.push((asset.name().to_string(), round2(asset.amount() * last.adj_close)));
    }
    Ok(Some(positions))
  }

  /// Latest session of each asset over the two days before today.
  ///
  /// One row per asset: its return across the window, then the first bar's prices
  /// rounded to cents and its volume.
  pub fn today_asset_info(&self, assets: &[Asset]) -> Result<Option<MetricTable>> {
    if assets.is_empty() {
      return Ok(None);
    }

    let request = FetchRequest::Window(DateWindow {
      start: self.today - Days::new(2),
      end: self.today,
    });
    let mut table = MetricTable::new(ASSET_INFO_COLUMNS.map(String::from));
    for asset in assets {
      let series = self.fetch(&[asset.ticker()], &request)?;
      let (first, last) = first_and_last(asset.ticker(), &series)?;
      let change = percent_change(first.adj_close, last.adj_close)?;
      let bar = first.rounded();
      table.push_unchecked(vec![
        asset.name().to_string(),
        format!("{change:.2}"),
        format!("{:.2}", bar.open),
        format!("{:.2}", bar.high),
        format!("{:.2}", bar.low),
        format!("{:.2}", bar.close),
        format!("{:.2}", bar.adj_close),
        bar.volume.to_string(),
      ]);
    }

    Ok(Some(table))
  }

  /// Volume of every asset in the session before `on` (today when omitted).
  pub fn liquidity(&self, assets: &[Asset], on: Option<&str>) -> Result<Option<Liquidity>> {
    if assets.is_empty() {
      return Ok(None);
    }

    let date = match on {
      Some(s) => parse_date(s)?,
      None => self.today,
    };
    if date > self.today {
      return Err(PortfolioError::Ordering(format!(
        "liquidity date {date} is after today {}",
        self.today
      )));
    }

    let tickers: Vec<&str> = assets.iter().map(|a| a.ticker()).collect();
    let request = FetchRequest::Window(DateWindow {
      start: date - Days::new(1),
      end: date,
    });
    let series = self.fetch(&tickers, &request)?;
    let volumes = tickers
      .iter()
      .map(|t| first_and_last(t, &series).map(|(first, _)| first.volume))
      .collect::<Result<Vec<_>>>()?;

    Ok(Some(Liquidity {
      date,
      tickers: tickers.into_iter().map(str::to_string).collect(),
      volumes,
    }))
  }

  /// Correlation of the assets' adjusted closes over `period`, aligned on the common tail.
  pub fn correlation_between_assets(&self, holdings: &[Asset], period: Period) -> Result<Option<Correlation>> {
    if holdings.is_empty() {
      return Ok(None);
    }

    let tickers: Vec<&str> = holdings.iter().map(|a| a.ticker()).collect();
    let series = self.fetch(&tickers, &FetchRequest::Period(period))?;
    let closes = tickers
      .iter()
      .map(|t| {
        series
          .get(*t)
          .map(|bars| adjusted_closes(bars))
          .ok_or_else(|| PortfolioError::Validation(format!("no price series for {t}")))
      })
      .collect::<Result<Vec<_>>>()?;

    let aligned = align_tails(&closes);
    let n_obs = aligned.first().map_or(0, Vec::len);
    if n_obs < 2 {
      return Err(PortfolioError::Validation(format!(
        "correlation needs at least two common observations, got {n_obs}"
      )));
    }

    let flat: Vec<f64> = aligned.into_iter().flatten().collect();
    let data = Array2::from_shape_vec((tickers.len(), n_obs), flat)
      .map_err(|e| PortfolioError::Validation(e.to_string()))?;
    let matrix = data
      .pearson_correlation()
      .map_err(|e| PortfolioError::Validation(e.to_string()))?;

    Ok(Some(Correlation {
      tickers: tickers.into_iter().map(str::to_string).collect(),
      matrix,
    }))
  }

  /// Bars of `asset` between `start` and `end` (today when omitted), prices rounded to cents.
  pub fn asset_history(&self, asset: &Asset, start: &str, end: Option<&str>) -> Result<Vec<Bar>> {
    let window = resolve_range(start, end, self.today, asset.category.is_always_open())?;
    self.history(asset, &FetchRequest::Window(window))
  }

  /// Bars of `asset` over a symbolic period, prices rounded to cents.
  pub fn asset_history_for_period(&self, asset: &Asset, period: Period) -> Result<Vec<Bar>> {
    self.history(asset, &FetchRequest::Period(period))
  }

  fn history(&self, asset: &Asset, request: &FetchRequest) -> Result<Vec<Bar>> {
    let mut series = self.fetch(&[asset.ticker()], request)?;
    let bars = series.remove(asset.ticker()).unwrap_or_default();
    Ok(bars.iter().map(Bar::rounded).collect())
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use tracing_test::traced_test;

  use super::*;
  use crate::market::InMemoryMarketData;
  use crate::market::fixtures::bars;
  use crate::market::fixtures::date;

  fn stock(name: &str, ticker: &str, amount: f64) -> Asset {
    Asset::new(name, ticker, "stocks", amount).unwrap()
  }

  fn two_asset_series() -> SeriesMap {
    let mut series = SeriesMap::new();
    series.insert("A".into(), bars("2024-01-02", &[100.0, 110.0]));
    series.insert("B".into(), bars("2024-01-02", &[50.0, 45.0]));
    series
  }

  fn trending(start: &str, n: usize, p0: f64, step: f64) -> Vec<Bar> {
    let prices: Vec<f64> = (0..n).map(|i| p0 + step * i as f64).collect();
    bars(start, &prices)
  }

  #[test]
  fn weighted_return_matches_hand_computation() {
    let holdings = vec![stock("A", "A", 10.0), stock("B", "B", 5.0)];
    let r = portfolio_return(&holdings, &two_asset_series()).unwrap();
    assert_eq!(r, Some(6.0));
  }

  #[test]
  fn empty_portfolio_is_vacuous() {
    assert_eq!(portfolio_return(&[], &SeriesMap::new()).unwrap(), None);

    let source = InMemoryMarketData::new(date("2024-06-03"));
    let agg = ReturnAggregator::with_today(&source, date("2024-06-03"));
    assert_eq!(agg.compute_portfolio_return(&[], Period::OneYear).unwrap(), None);
    assert_eq!(agg.compute_all_period_returns(&[]).unwrap(), None);
    assert_eq!(agg.current_valuation(&[]).unwrap(), None);
    assert!(agg.correlation_between_assets(&[], Period::OneYear).unwrap().is_none());
  }

  #[test]
  fn missing_series_is_fatal() {
    let holdings = vec![stock("A", "A", 10.0), stock("C", "C", 1.0)];
    let err = portfolio_return(&holdings, &two_asset_series()).unwrap_err();
    assert!(matches!(err, PortfolioError::Validation(ref m) if m.contains('C')));
  }

  #[test]
  fn zero_first_valuation_is_a_division_error() {
    let holdings = vec![stock("A", "A", 0.0), stock("B", "B", 0.0)];
    let err = portfolio_return(&holdings, &two_asset_series()).unwrap_err();
    assert!(matches!(err, PortfolioError::Division(_)));
  }

  #[test]
  fn rounds_to_two_decimals() {
    let mut series = SeriesMap::new();
    series.insert("X".into(), bars("2024-01-02", &[3.0, 3.1, 3.2]));
    let r = portfolio_return(&[stock("X", "X", 1.0)], &series).unwrap().unwrap();
    assert_abs_diff_eq!(r, 6.67, epsilon = 1e-12);
  }

  #[test]
  #[traced_test]
  fn all_periods_have_exactly_the_supported_keys() {
    let today = date("2024-06-14");
    let source = InMemoryMarketData::new(today)
      .with_series("AAA", trending("2012-01-01", 4_600, 10.0, 0.01))
      .with_series("BBB", trending("2012-01-01", 4_600, 50.0, -0.005));
    let agg = ReturnAggregator::with_today(&source, today);
    let holdings = vec![stock("Alpha", "AAA", 3.0), stock("Beta", "BBB", 2.0)];

    let returns = agg.compute_all_period_returns(&holdings).unwrap().unwrap();
    let keys: Vec<Period> = returns.iter().map(|(p, _)| p).collect();
    assert_eq!(keys, Period::ALL.to_vec());
    assert!(logs_contain("computed portfolio returns for all periods"));
  }

  #[test]
  fn one_day_uses_the_previous_trading_window() {
    // Monday: the window starts on Thursday and excludes today.
    let today = date("2024-06-10");
    let mut prices = vec![100.0; 10];
    prices[6] = 80.0; // 2024-06-07, Friday
    prices[3] = 200.0; // 2024-06-04, before the window
    let source = InMemoryMarketData::new(today).with_series("AAA", bars("2024-06-01", &prices));
    let agg = ReturnAggregator::with_today(&source, today);

    let r = agg
      .compute_portfolio_return(&[stock("A", "AAA", 1.0)], Period::OneDay)
      .unwrap();
    // 2024-06-06..2024-06-09: 100 -> 100 (last bar is Sunday 06-09).
    assert_eq!(r, Some(0.0));

    let ytd = agg
      .compute_portfolio_return(&[stock("A", "AAA", 1.0)], Period::YearToDate)
      .unwrap();
    assert_eq!(ytd, Some(0.0));
  }

  #[test]
  fn upstream_failures_are_surfaced() {
    let today = date("2024-06-10");
    let source = InMemoryMarketData::new(today);
    let agg = ReturnAggregator::with_today(&source, today);
    let err = agg
      .compute_portfolio_return(&[stock("A", "NOPE", 1.0)], Period::OneYear)
      .unwrap_err();
    assert!(matches!(err, PortfolioError::UpstreamData(_)));
  }

  #[test]
  fn crypto_one_day_return_looks_back_one_calendar_day() {
    let today = date("2024-06-10");
    let prices = [1.0, 2.0, 4.0, 8.0, 10.0, 20.0, 40.0, 50.0, 60.0, 66.0];
    let source = InMemoryMarketData::new(today).with_series("BTC-USD", bars("2024-06-01", &prices));
    let agg = ReturnAggregator::with_today(&source, today);
    let btc = Asset::new("Bitcoin", "BTC-USD", "cryptocurrency", 0.5).unwrap();
    // Window is 2024-06-09..2024-06-10, a single bar.
    assert_eq!(agg.asset_period_return(&btc, Period::OneDay).unwrap(), 0.0);

    let equity = Asset::new("Bitcoin ETF", "BTC-USD", "etf", 0.5).unwrap();
    // Window is 2024-06-06..2024-06-10: 20 -> 60.
    assert_eq!(agg.asset_period_return(&equity, Period::OneDay).unwrap(), 200.0);
  }

  #[test]
  fn benchmark_table_has_one_row_per_benchmark() {
    let today = date("2024-06-14");
    let mut source = InMemoryMarketData::new(today);
    for (_, ticker) in MARKET_BENCHMARKS {
      source.insert(ticker, trending("2013-01-01", 4_200, 100.0, 0.1));
    }
    let agg = ReturnAggregator::with_today(&source, today);

    let table = agg.benchmark_returns().unwrap();
    assert_eq!(table.columns().len(), 2 + Period::ALL.len());
    assert_eq!(table.rows().len(), MARKET_BENCHMARKS.len());
    assert_eq!(table.rows()[1][1], "^DJI");
  }

  #[test]
  fn valuation_and_history_round_to_cents() {
    let today = date("2024-06-14");
    let prices = [10.0, 10.004, 10.333, 10.3349, 10.25];
    let source = InMemoryMarketData::new(today).with_series("AAA", bars("2024-06-10", &prices));
    let agg = ReturnAggregator::with_today(&source, today);
    let a = stock("A", "AAA", 3.0);

    assert_eq!(agg.current_valuation(&[a.clone()]).unwrap(), Some(30.75));

    let hist = agg.asset_history(&a, "2024-06-09", None).unwrap();
    // Sunday start shifts to Friday 06-07; today is excluded.
    assert_eq!(hist.len(), 4);
    assert_eq!(hist[1].adj_close, 10.0);
    assert_eq!(hist[3].adj_close, 10.33);

    let err = agg.asset_history(&a, "2024-06-14", None).unwrap_err();
    assert!(matches!(err, PortfolioError::Ordering(_)));
  }

  #[test]
  fn correlation_detects_opposite_trends() {
    let today = date("2024-06-14");
    let source = InMemoryMarketData::new(today)
      .with_series("UP", trending("2024-05-01", 45, 10.0, 1.0))
      .with_series("DOWN", trending("2024-05-20", 26, 100.0, -2.0));
    let agg = ReturnAggregator::with_today(&source, today);
    let holdings = vec![stock("Up", "UP", 1.0), stock("Down", "DOWN", 1.0)];

    let corr = agg
      .correlation_between_assets(&holdings, Period::ThreeMonths)
      .unwrap()
      .unwrap();
    assert_abs_diff_eq!(corr.matrix[[0, 0]], 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(corr.matrix[[0, 1]], -1.0, epsilon = 1e-9);
    assert_eq!(corr.to_table().rows().len(), 2);
  }

  #[test]
  fn asset_info_reads_the_previous_two_days() {
    let today = date("2024-06-14");
    let source = InMemoryMarketData::new(today)
      .with_series("AAA", bars("2024-06-10", &[9.0, 9.5, 10.004, 10.5, 11.0]))
      .with_series("BBB", bars("2024-06-12", &[20.0, 19.0]));
    let agg = ReturnAggregator::with_today(&source, today);
    let assets = vec![stock("Alpha", "AAA", 1.0), stock("Beta", "BBB", 2.0)];

    let table = agg.today_asset_info(&assets).unwrap().unwrap();
    assert_eq!(table.columns(), ASSET_INFO_COLUMNS.map(String::from).as_slice());
    assert_eq!(table.rows().len(), 2);
    // Window 06-12..06-14 holds 10.004 and 10.5.
    assert_eq!(table.rows()[0][0], "Alpha");
    assert_eq!(table.rows()[0][1], "4.96");
    assert_eq!(table.column("Adj Close"), Some(vec!["10.00", "20.00"]));
    assert_eq!(table.column("Return (%)").unwrap()[1], "-5.00");
    assert_eq!(table.column("Volume"), Some(vec!["1000", "1000"]));

    assert!(agg.today_asset_info(&[]).unwrap().is_none());
  }

  #[test]
  fn asset_info_needs_recent_bars() {
    let today = date("2024-06-14");
    let source = InMemoryMarketData::new(today).with_series("OLD", bars("2024-05-01", &[1.0, 2.0]));
    let agg = ReturnAggregator::with_today(&source, today);
    assert!(matches!(
      agg.today_asset_info(&[stock("Old", "OLD", 1.0)]),
      Err(PortfolioError::Validation(_))
    ));
  }

  #[test]
  fn position_values_sum_to_the_valuation() {
    let today = date("2024-06-14");
    let source = InMemoryMarketData::new(today)
      .with_series("AAA", bars("2024-06-13", &[10.0, 12.5]))
      .with_series("BBB", bars("2024-06-13", &[3.0, 4.0]));
    let agg = ReturnAggregator::with_today(&source, today);
    let holdings = vec![stock("Alpha", "AAA", 2.0), stock("Beta", "BBB", 5.0)];

    let positions = agg.position_values(&holdings).unwrap().unwrap();
    assert_eq!(positions, vec![("Alpha".to_string(), 25.0), ("Beta".to_string(), 20.0)]);
    assert_eq!(agg.current_valuation(&holdings).unwrap(), Some(45.0));
    assert!(agg.position_values(&[]).unwrap().is_none());
  }

  #[test]
  fn liquidity_reads_the_session_before_the_date() {
    let today = date("2024-06-14");
    let mut volume = bars("2024-06-10", &[10.0, 11.0, 12.0]);
    volume[1].volume = 5_000;
    let source = InMemoryMarketData::new(today)
      .with_series("AAA", volume)
      .with_series("BBB", bars("2024-06-10", &[1.0, 1.0, 1.0]));
    let agg = ReturnAggregator::with_today(&source, today);
    let assets = vec![stock("Alpha", "AAA", 1.0), stock("Beta", "BBB", 1.0)];

    let liq = agg.liquidity(&assets, Some("2024-06-12")).unwrap().unwrap();
    assert_eq!(liq.date, date("2024-06-12"));
    assert_eq!(liq.tickers, vec!["AAA", "BBB"]);
    assert_eq!(liq.volumes, vec![5_000, 1_000]);

    assert!(matches!(
      agg.liquidity(&assets, Some("2024-06-20")),
      Err(PortfolioError::Ordering(_))
    ));
    assert!(matches!(
      agg.liquidity(&assets, Some("12/06/2024")),
      Err(PortfolioError::Format(_))
    ));
    assert!(agg.liquidity(&[], None).unwrap().is_none());
  }
}
