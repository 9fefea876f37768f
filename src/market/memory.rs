use anyhow::bail;
use chrono::NaiveDate;

use super::Bar;
use super::FetchRequest;
use super::MarketData;
use super::SeriesMap;

/// Provider backed by series already held in memory (loaded from disk, generated, ...).
///
/// Windows are half-open like the remote provider; symbolic periods end on `today`
/// inclusive.
#[derive(Clone, Debug)]
pub struct InMemoryMarketData {
  series: SeriesMap,
  today: NaiveDate,
}

impl InMemoryMarketData {
  pub fn new(today: NaiveDate) -> Self {
    Self {
      series: SeriesMap::new(),
      today,
    }
  }

  /// Store (or replace) the full history of `ticker`. Bars are kept sorted by date.
  pub fn insert(&mut self, ticker: impl Into<String>, mut bars: Vec<Bar>) {
    bars.sort_by_key(|b| b.date);
    self.series.insert(ticker.into(), bars);
  }

  pub fn with_series(mut self, ticker: impl Into<String>, bars: Vec<Bar>) -> Self {
    self.insert(ticker, bars);
    self
  }

  pub fn today(&self) -> NaiveDate {
    self.today
  }
}

impl MarketData for InMemoryMarketData {
  fn fetch(&self, tickers: &[&str], request: &FetchRequest) -> anyhow::Result<SeriesMap> {
    let mut out = SeriesMap::with_capacity(tickers.len());

    for &ticker in tickers {
      let Some(bars) = self.series.get(ticker) else {
        bail!("no market data for ticker `{ticker}`");
      };

      let selected: Vec<Bar> = match request {
        FetchRequest::Window(w) => bars.iter().filter(|b| w.contains(b.date)).cloned().collect(),
        FetchRequest::Period(p) => {
          let start = p.lookback_start(self.today);
          bars
            .iter()
            .filter(|b| b.date <= self.today && start.map_or(true, |s| b.date >= s))
            .cloned()
            .collect()
        }
      };

      out.insert(ticker.to_string(), selected);
    }

    Ok(out)
  }
}
