//! # Time Periods
//!
//! $$
//! \mathcal P = \{1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max\}
//! $$
//!
//! Closed enumeration of the symbolic lookback windows understood by the provider.

use std::fmt::Display;
use std::str::FromStr;

use chrono::Datelike;
use chrono::Days;
use chrono::Months;
use chrono::NaiveDate;

use crate::error::PortfolioError;

/// Named lookback window. Declaration order is display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
  OneDay,
  FiveDays,
  OneMonth,
  ThreeMonths,
  SixMonths,
  OneYear,
  TwoYears,
  FiveYears,
  TenYears,
  YearToDate,
  Max,
}

impl Period {
  /// Every supported period, in display order.
  pub const ALL: [Period; 11] = [
    Period::OneDay,
    Period::FiveDays,
    Period::OneMonth,
    Period::ThreeMonths,
    Period::SixMonths,
    Period::OneYear,
    Period::TwoYears,
    Period::FiveYears,
    Period::TenYears,
    Period::YearToDate,
    Period::Max,
  ];

  /// Provider label, e.g. `"3mo"`.
  pub fn as_str(&self) -> &'static str {
    match self {
      Period::OneDay => "1d",
      Period::FiveDays => "5d",
      Period::OneMonth => "1mo",
      Period::ThreeMonths => "3mo",
      Period::SixMonths => "6mo",
      Period::OneYear => "1y",
      Period::TwoYears => "2y",
      Period::FiveYears => "5y",
      Period::TenYears => "10y",
      Period::YearToDate => "ytd",
      Period::Max => "max",
    }
  }

  /// Calendar date the lookback starts from when it ends on `today`.
  ///
  /// `None` for [`Period::Max`], which spans the whole history.
  pub fn lookback_start(&self, today: NaiveDate) -> Option<NaiveDate> {
    match self {
      Period::OneDay => today.checked_sub_days(Days::new(1)),
      Period::FiveDays => today.checked_sub_days(Days::new(5)),
      Period::OneMonth => today.checked_sub_months(Months::new(1)),
      Period::ThreeMonths => today.checked_sub_months(Months::new(3)),
      Period::SixMonths => today.checked_sub_months(Months::new(6)),
      Period::OneYear => today.checked_sub_months(Months::new(12)),
      Period::TwoYears => today.checked_sub_months(Months::new(24)),
      Period::FiveYears => today.checked_sub_months(Months::new(60)),
      Period::TenYears => today.checked_sub_months(Months::new(120)),
      Period::YearToDate => NaiveDate::from_ymd_opt(today.year(), 1, 1),
      Period::Max => None,
    }
  }

  /// Column header used by return tables.
  pub fn return_column(&self) -> String {
    format!("Return (%) - {}", self.as_str())
  }
}

impl Display for Period {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Period {
  type Err = PortfolioError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Period::ALL
      .into_iter()
      .find(|p| p.as_str() == s)
      .ok_or_else(|| PortfolioError::UnsupportedPeriod(s.to_string()))
  }
}
