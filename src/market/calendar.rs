//! # Trading Calendar
//!
//! $$
//! t_{start} = \operatorname{prev\_trading}(t_{today}),\qquad [t_{start}, t_{today})
//! $$
//!
//! Turns a symbolic period or an explicit date pair into the window sent to the
//! provider. Weekends are skipped with fixed calendar offsets; exchange holidays are
//! not modelled, so a window may still land on a closed day.

use std::fmt::Display;

use chrono::Datelike;
use chrono::Days;
use chrono::NaiveDate;
use chrono::Weekday;

use super::FetchRequest;
use super::period::Period;
use crate::error::PortfolioError;
use crate::error::Result;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Half-open `[start, end)` query window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
  pub start: NaiveDate,
  pub end: NaiveDate,
}

impl DateWindow {
  pub fn start_str(&self) -> String {
    self.start.format(DATE_FORMAT).to_string()
  }

  pub fn end_str(&self) -> String {
    self.end.format(DATE_FORMAT).to_string()
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start <= date && date < self.end
  }
}

impl Display for DateWindow {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}..{}", self.start_str(), self.end_str())
  }
}

/// Start of the "1d" window: far enough back to include the previous trading day.
pub fn one_day_start(today: NaiveDate) -> NaiveDate {
  let back = |d: NaiveDate, n: u64| d - Days::new(n);

  match today.weekday() {
    Weekday::Mon => back(today, 4),
    Weekday::Sat => back(today, 2),
    Weekday::Sun => back(today, 3),
    _ => {
      let start = back(today, 2);
      match start.weekday() {
        Weekday::Sat => back(start, 1),
        Weekday::Sun => back(start, 2),
        _ => start,
      }
    }
  }
}

/// Move a Saturday or Sunday back to the preceding Friday.
pub fn shift_off_weekend(date: NaiveDate) -> NaiveDate {
  match date.weekday() {
    Weekday::Sat => date - Days::new(1),
    Weekday::Sun => date - Days::new(2),
    _ => date,
  }
}

/// Strict `YYYY-MM-DD` parsing.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
  let bytes = s.as_bytes();
  let shape_ok = bytes.len() == 10
    && bytes
      .iter()
      .enumerate()
      .all(|(i, b)| if i == 4 || i == 7 { *b == b'-' } else { b.is_ascii_digit() });

  if !shape_ok {
    return Err(PortfolioError::Format(s.to_string()));
  }

  NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| PortfolioError::Format(s.to_string()))
}

/// Resolve a symbolic period into a provider request.
///
/// Only "1d" becomes an explicit window: always-open markets (crypto) look back exactly
/// one calendar day, everything else uses [`one_day_start`]. Longer periods are left to
/// the provider.
pub fn resolve_period(period: Period, today: NaiveDate, always_open: bool) -> FetchRequest {
  match period {
    Period::OneDay => {
      let start = if always_open {
        today - Days::new(1)
      } else {
        one_day_start(today)
      };
      FetchRequest::Window(DateWindow { start, end: today })
    }
    other => FetchRequest::Period(other),
  }
}

/// Resolve an explicit `start` (and optional `end`, defaulting to today) into a window.
///
/// Ordering is checked on the dates as given; the weekend shift of the start date is
/// applied afterwards and skipped for always-open markets.
pub fn resolve_range(
  start: &str,
  end: Option<&str>,
  today: NaiveDate,
  always_open: bool,
) -> Result<DateWindow> {
  let start_date = parse_date(start)?;
  let end_date = match end {
    Some(e) => parse_date(e)?,
    None => today,
  };

  if start_date >= end_date {
    return Err(PortfolioError::Ordering(format!(
      "start date {start} is not before end date {}",
      end_date.format(DATE_FORMAT)
    )));
  }
  if start_date >= today {
    return Err(PortfolioError::Ordering(format!(
      "start date {start} is not before today {}",
      today.format(DATE_FORMAT)
    )));
  }

  let start_date = if always_open {
    start_date
  } else {
    shift_off_weekend(start_date)
  };

  tracing::debug!(start = %start_date, end = %end_date, "resolved explicit date range");

  Ok(DateWindow {
    start: start_date,
    end: end_date,
  })
}
