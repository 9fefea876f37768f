//! Yahoo Finance provider.
//!
//! The connector is asynchronous; every request is driven to completion on the calling
//! thread so the rest of the crate stays synchronous.

use anyhow::Context;
use anyhow::Result;
use chrono::DateTime;
use chrono::NaiveDate;
use time::OffsetDateTime;
use yahoo_finance_api::YahooConnector;

use super::Bar;
use super::FetchRequest;
use super::MarketData;
use super::SeriesMap;

const DAILY: &str = "1d";

/// Daily bars from Yahoo Finance, one request per ticker.
pub struct YahooMarketData {
  connector: YahooConnector,
}

impl YahooMarketData {
  pub fn new() -> Result<Self> {
    let connector = YahooConnector::new().context("failed to build Yahoo Finance connector")?;
    Ok(Self { connector })
  }

  fn fetch_one(&self, ticker: &str, request: &FetchRequest) -> Result<Vec<Bar>> {
    let response = match request {
      FetchRequest::Window(w) => tokio_test::block_on(self.connector.get_quote_history(
        ticker,
        to_offset(w.start)?,
        to_offset(w.end)?,
      )),
      FetchRequest::Period(p) => {
        tokio_test::block_on(self.connector.get_quote_range(ticker, DAILY, p.as_str()))
      }
    }
    .with_context(|| format!("request for {ticker} ({request}) failed"))?;

    let quotes = response
      .quotes()
      .with_context(|| format!("no quotes for {ticker} ({request})"))?;

    let mut bars = Vec::with_capacity(quotes.len());
    for q in quotes {
      let date = DateTime::from_timestamp(q.timestamp as i64, 0)
        .with_context(|| format!("bad timestamp {} for {ticker}", q.timestamp))?
        .date_naive();
      bars.push(Bar {
        date,
        open: q.open,
        high: q.high,
        low: q.low,
        close: q.close,
        adj_close: q.adjclose,
        volume: q.volume,
      });
    }
    bars.sort_by_key(|b| b.date);

    tracing::debug!(ticker, bars = bars.len(), %request, "fetched yahoo quotes");
    Ok(bars)
  }
}

impl MarketData for YahooMarketData {
  fn fetch(&self, tickers: &[&str], request: &FetchRequest) -> Result<SeriesMap> {
    tickers
      .iter()
      .map(|&t| Ok((t.to_string(), self.fetch_one(t, request)?)))
      .collect()
  }
}

fn to_offset(date: NaiveDate) -> Result<OffsetDateTime> {
  let ts = date
    .and_hms_opt(0, 0, 0)
    .context("invalid midnight")?
    .and_utc()
    .timestamp();
  OffsetDateTime::from_unix_timestamp(ts).context("date out of range")
}
