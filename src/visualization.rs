//! # Visualization
//!
//! $$
//! \{(t, C^{adj}_{a,t})\}_{a} \mapsto \text{price lines},\qquad
//! \{(p, R_p)\} \mapsto \text{return bars},\qquad
//! s_a = \frac{v_a}{\sum_b v_b} \mapsto \text{share bars}
//! $$
//!
//! Plotly charts of adjusted closes, period returns, holdings breakdowns, liquidity,
//! correlation and solver distributions. Nothing is rendered here; callers write or
//! show the returned [`Plot`].

use plotly::Bar as BarTrace;
use plotly::HeatMap;
use plotly::Layout;
use plotly::Plot;
use plotly::Scatter;
use plotly::common::Line;
use plotly::common::Mode;
use plotly::common::TextPosition;
use plotly::layout::Annotation;
use plotly::layout::Axis;
use plotly::layout::Margin;

use crate::market::Bar;
use crate::portfolio::Asset;
use crate::portfolio::category_counts;
use crate::report::SelectionReport;
use crate::returns::Correlation;
use crate::returns::Liquidity;
use crate::returns::PeriodReturns;

struct PriceSeries {
  label: String,
  dates: Vec<String>,
  values: Vec<f64>,
}

/// Adjusted-close lines, one per registered ticker, on a shared date axis.
pub struct PriceChart {
  series: Vec<PriceSeries>,
  line_width: f64,
  title: String,
}

impl PriceChart {
  pub fn new() -> Self {
    Self {
      series: Vec::new(),
      line_width: 1.5,
      title: "Adjusted close".to_string(),
    }
  }

  pub fn title(mut self, title: &str) -> Self {
    self.title = title.into();
    self
  }

  pub fn line_width(mut self, w: f64) -> Self {
    self.line_width = w;
    self
  }

  /// Add the adjusted closes of `bars`. Empty series are skipped.
  pub fn register(mut self, ticker: &str, bars: &[Bar]) -> Self {
    if bars.is_empty() {
      return self;
    }

    self.series.push(PriceSeries {
      label: ticker.to_string(),
      dates: bars.iter().map(|b| b.date.format("%Y-%m-%d").to_string()).collect(),
      values: bars.iter().map(|b| b.adj_close).collect(),
    });
    self
  }

  pub fn len(&self) -> usize {
    self.series.len()
  }

  pub fn is_empty(&self) -> bool {
    self.series.is_empty()
  }

  pub fn plot(self) -> Plot {
    let mut plot = Plot::new();
    plot.set_layout(
      Layout::new()
        .title(self.title.as_str())
        .auto_size(true)
        .margin(Margin::new().left(56).right(24).top(64).bottom(44)),
    );

    for s in self.series {
      let trace = Scatter::new(s.dates, s.values)
        .mode(Mode::Lines)
        .name(s.label.as_str())
        .line(Line::new().width(self.line_width));
      plot.add_trace(trace);
    }

    plot
  }
}

impl Default for PriceChart {
  fn default() -> Self {
    Self::new()
  }
}

/// One bar per period, labelled with the period code.
pub fn period_returns_chart(returns: &PeriodReturns, title: &str) -> Plot {
  let (labels, values): (Vec<String>, Vec<f64>) =
    returns.iter().map(|(p, r)| (p.to_string(), r)).unzip();

  let mut plot = Plot::new();
  plot.set_layout(Layout::new().title(title));
  plot.add_trace(BarTrace::new(labels, values).name("Return (%)"));
  plot
}

/// Allocation of the portfolio by position value, one percent-labelled bar per asset.
///
/// `positions` is `(name, value)` as produced by
/// [`ReturnAggregator::position_values`](crate::returns::ReturnAggregator::position_values).
/// `None` when there is nothing to split.
pub fn allocation_chart(positions: &[(String, f64)]) -> Option<Plot> {
  let total: f64 = positions.iter().map(|(_, v)| v).sum();
  if positions.is_empty() || total == 0.0 {
    return None;
  }

  let (labels, shares): (Vec<String>, Vec<f64>) = positions
    .iter()
    .map(|(name, v)| (name.clone(), v / total * 100.0))
    .unzip();
  let text: Vec<String> = shares.iter().map(|s| format!("{s:.1}%")).collect();

  Some(share_plot("Portfolio assets allocation", labels, shares, text))
}

/// Share of holdings per asset category. Categories without holdings are left out.
pub fn category_chart(assets: &[Asset]) -> Option<Plot> {
  if assets.is_empty() {
    return None;
  }

  let n = assets.len() as f64;
  let (labels, shares): (Vec<String>, Vec<f64>) = category_counts(assets)
    .into_iter()
    .map(|(category, count)| (category.to_string(), count as f64 / n * 100.0))
    .unzip();
  let text: Vec<String> = shares.iter().map(|s| format!("{s:.2}%")).collect();

  Some(share_plot("Portfolio assets category", labels, shares, text))
}

fn share_plot(title: &str, labels: Vec<String>, shares: Vec<f64>, text: Vec<String>) -> Plot {
  let mut plot = Plot::new();
  plot.set_layout(
    Layout::new()
      .title(title)
      .y_axis(Axis::new().title("Share (%)")),
  );
  plot.add_trace(
    BarTrace::new(labels, shares)
      .name("share")
      .text_array(text)
      .text_position(TextPosition::Auto),
  );
  plot
}

/// Traded volume per asset on the day of `liquidity`.
pub fn liquidity_chart(liquidity: &Liquidity) -> Plot {
  let mut plot = Plot::new();
  plot.set_layout(
    Layout::new()
      .title(format!("Assets liquidity in {}", liquidity.date.format("%Y-%m-%d")).as_str())
      .x_axis(Axis::new().title("Assets"))
      .y_axis(Axis::new().title("Transactions Volume ($USD)")),
  );
  plot.add_trace(
    BarTrace::new(liquidity.tickers.clone(), liquidity.volumes.clone()).name("volume"),
  );
  plot
}

/// Correlation matrix as a heatmap on `[-1, 1]`, each cell annotated with its value.
pub fn correlation_heatmap(correlation: &Correlation) -> Plot {
  let tickers = &correlation.tickers;
  let z: Vec<Vec<f64>> = correlation.matrix.rows().into_iter().map(|r| r.to_vec()).collect();

  let mut annotations = Vec::with_capacity(tickers.len() * tickers.len());
  for (i, y) in tickers.iter().enumerate() {
    for (j, x) in tickers.iter().enumerate() {
      annotations.push(
        Annotation::new()
          .x(x.as_str())
          .y(y.as_str())
          .text(format!("{:.2}", correlation.matrix[[i, j]]))
          .show_arrow(false),
      );
    }
  }

  let mut plot = Plot::new();
  plot.set_layout(
    Layout::new()
      .title("Assets correlation matrix")
      .annotations(annotations),
  );
  plot.add_trace(
    HeatMap::new(tickers.clone(), tickers.clone(), z)
      .zmin(-1.0)
      .zmax(1.0),
  );
  plot
}

/// Probability of the `top` most likely selections.
pub fn selection_probability_chart(report: &SelectionReport, top: usize) -> Plot {
  let (labels, probs): (Vec<String>, Vec<f64>) = report
    .top(top)
    .iter()
    .map(|e| (e.selection.to_string(), e.probability))
    .unzip();

  let mut plot = Plot::new();
  plot.set_layout(Layout::new().title(format!("Selections ({})", report.solver).as_str()));
  plot.add_trace(BarTrace::new(labels, probs).name("probability"));
  plot
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;
  use ndarray::array;

  use super::*;
  use crate::market::fixtures::bars;
  use crate::optimization::ExactSolver;
  use crate::optimization::Solver;
  use crate::optimization::solvers::fixtures::three_assets;
  use crate::report::rank_selections;

  #[test]
  fn one_line_per_non_empty_series() {
    let chart = PriceChart::new()
      .title("Holdings")
      .register("AAA", &bars("2024-01-01", &[1.0, 2.0, 3.0]))
      .register("EMPTY", &[])
      .register("BBB", &bars("2024-01-01", &[4.0, 5.0]));
    assert_eq!(chart.len(), 2);

    let json = chart.plot().to_json();
    assert!(json.contains("AAA"));
    assert!(json.contains("BBB"));
    assert!(!json.contains("EMPTY"));
    assert!(json.contains("2024-01-03"));
  }

  #[test]
  fn return_bars_are_labelled_by_period() {
    let json = period_returns_chart(&PeriodReturns::default(), "Portfolio").to_json();
    assert!(json.contains("\"ytd\""));
    assert!(json.contains("\"max\""));
    assert!(json.contains("Portfolio"));
  }

  #[test]
  fn selection_chart_lists_top_entries() {
    let qp = three_assets(0.5, 2);
    let report = rank_selections(&qp, &ExactSolver.solve(&qp).unwrap()).unwrap();
    let json = selection_probability_chart(&report, 2).to_json();
    assert!(json.contains("[1 0 1]"));
    assert!(json.contains("exact"));
  }

  #[test]
  fn allocation_splits_by_value() {
    let positions = vec![("Alpha".to_string(), 75.0), ("Beta".to_string(), 25.0)];
    let json = allocation_chart(&positions).unwrap().to_json();
    assert!(json.contains("Alpha"));
    assert!(json.contains("75.0%"));
    assert!(json.contains("25.0%"));
    assert!(json.contains("Portfolio assets allocation"));

    assert!(allocation_chart(&[]).is_none());
    assert!(allocation_chart(&[("Zero".to_string(), 0.0)]).is_none());
  }

  #[test]
  fn category_shares_skip_empty_categories() {
    let assets = vec![
      Asset::new("Apple", "AAPL", "stocks", 1.0).unwrap(),
      Asset::new("Tesla", "TSLA", "Stocks", 1.0).unwrap(),
      Asset::new("Bitcoin", "BTC-USD", "cryptocurrency", 1.0).unwrap(),
      Asset::new("Index", "SPY", "etf", 1.0).unwrap(),
    ];
    let json = category_chart(&assets).unwrap().to_json();
    assert!(json.contains("\"stocks\""));
    assert!(json.contains("50.00%"));
    assert!(json.contains("25.00%"));
    assert!(!json.contains("\"reits\""));
    assert!(category_chart(&[]).is_none());
  }

  #[test]
  fn liquidity_bars_carry_the_date() {
    let liquidity = Liquidity {
      date: NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
      tickers: vec!["AAA".into(), "BBB".into()],
      volumes: vec![5_000, 1_000],
    };
    let json = liquidity_chart(&liquidity).to_json();
    assert!(json.contains("Assets liquidity in 2024-06-12"));
    assert!(json.contains("5000"));
    assert!(json.contains("Transactions Volume"));
  }

  #[test]
  fn heatmap_annotates_every_cell() {
    let correlation = Correlation {
      tickers: vec!["UP".into(), "DOWN".into()],
      matrix: array![[1.0, -0.5], [-0.5, 1.0]],
    };
    let json = correlation_heatmap(&correlation).to_json();
    assert!(json.contains("heatmap"));
    assert!(json.contains("\"-0.50\""));
    assert_eq!(json.matches("\"1.00\"").count(), 2);
    assert!(json.contains("Assets correlation matrix"));
  }
}
