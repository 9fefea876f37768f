//! # Reporting
//!
//! $$
//! \big(x^{(i)},\ E(x^{(i)}),\ p_i\big)_{i\,:\,p_{i} \ge p_{i+1}}
//! $$
//!
//! Rectangular metric tables (terminal rendering and CSV persistence) and the ranked
//! listing of solver outcomes.

use std::fmt::Display;
use std::fs::File;
use std::path::Path;

use approx::abs_diff_eq;
use chrono::NaiveDate;
use prettytable::Cell;
use prettytable::Row;
use prettytable::Table;

use crate::error::PortfolioError;
use crate::error::Result;
use crate::optimization::QuadraticProgram;
use crate::optimization::Selection;
use crate::optimization::SolverResult;

/// Tolerance between a solver's reported value and the recomputed objective.
pub const VALUE_TOLERANCE: f64 = 1e-6;

/// Named columns over rows of preformatted cells.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricTable {
  columns: Vec<String>,
  rows: Vec<Vec<String>>,
}

impl MetricTable {
  pub fn new(columns: impl IntoIterator<Item = String>) -> Self {
    Self {
      columns: columns.into_iter().collect(),
      rows: Vec::new(),
    }
  }

  /// Append a row; its width must match the header.
  pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
    if row.len() != self.columns.len() {
      return Err(PortfolioError::Validation(format!(
        "row has {} cells, table has {} columns",
        row.len(),
        self.columns.len()
      )));
    }
    self.rows.push(row);
    Ok(())
  }

  pub(crate) fn push_unchecked(&mut self, row: Vec<String>) {
    debug_assert_eq!(row.len(), self.columns.len());
    self.rows.push(row);
  }

  pub fn columns(&self) -> &[String] {
    &self.columns
  }

  pub fn rows(&self) -> &[Vec<String>] {
    &self.rows
  }

  /// Cells of the column called `name`.
  pub fn column(&self, name: &str) -> Option<Vec<&str>> {
    let idx = self.columns.iter().position(|c| c == name)?;
    Some(self.rows.iter().map(|r| r[idx].as_str()).collect())
  }

  pub fn to_pretty(&self) -> Table {
    let mut table = Table::new();
    table.set_titles(to_row(&self.columns));
    for row in &self.rows {
      table.add_row(to_row(row));
    }
    table
  }

  pub fn render(&self) -> String {
    self.to_pretty().to_string()
  }

  /// Write the header and every row as CSV.
  pub fn store_csv(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    // Header as a plain first record, the same layout `load_csv` reads back.
    let mut table = Table::new();
    table.add_row(to_row(&self.columns));
    for row in &self.rows {
      table.add_row(to_row(row));
    }

    let file = File::create(path)
      .map_err(|e| PortfolioError::Persistence(format!("{}: {e}", path.display())))?;
    table
      .to_csv(file)
      .map_err(|e| PortfolioError::Persistence(format!("{}: {e}", path.display())))?;

    tracing::debug!(path = %path.display(), rows = self.rows.len(), "stored table");
    Ok(())
  }

  /// Read a table written by [`MetricTable::store_csv`]; the first record is the header.
  pub fn load_csv(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let table = Table::from_csv_file(path)
      .map_err(|e| PortfolioError::Persistence(format!("{}: {e}", path.display())))?;

    let mut records = table
      .row_iter()
      .map(|row| row.iter().map(|c| c.get_content()).collect::<Vec<String>>());
    let columns = records
      .next()
      .ok_or_else(|| PortfolioError::Persistence(format!("{}: no header", path.display())))?;

    let mut out = Self::new(columns);
    for row in records {
      out
        .push_row(row)
        .map_err(|e| PortfolioError::Persistence(format!("{}: {e}", path.display())))?;
    }
    Ok(out)
  }

  /// `asset_data_YYYY_MM_DD.csv`
  pub fn default_file_name(date: NaiveDate) -> String {
    format!("asset_data_{}.csv", date.format("%Y_%m_%d"))
  }
}

impl Display for MetricTable {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.render())
  }
}

fn to_row(cells: &[String]) -> Row {
  Row::new(cells.iter().map(|c| Cell::new(c)).collect())
}

/// One decoded basis state.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedSelection {
  pub index: usize,
  pub selection: Selection,
  /// Penalized objective recomputed from the program.
  pub value: f64,
  pub probability: f64,
}

/// Solver outcome decoded for display.
#[derive(Clone, Debug)]
pub struct SelectionReport {
  pub solver: &'static str,
  pub tickers: Vec<String>,
  pub optimal: Selection,
  /// Unpenalized objective of `optimal`.
  pub optimal_value: f64,
  pub feasible: bool,
  /// Every basis state by descending probability.
  pub entries: Vec<RankedSelection>,
}

impl SelectionReport {
  pub fn selected_tickers(&self) -> Vec<&str> {
    self.optimal.selected_tickers(&self.tickers)
  }

  /// First `k` entries.
  pub fn top(&self, k: usize) -> &[RankedSelection] {
    &self.entries[..k.min(self.entries.len())]
  }

  pub fn to_table(&self) -> MetricTable {
    let mut table = MetricTable::new(["selection", "value", "probability"].map(String::from));
    for e in &self.entries {
      table.push_unchecked(vec![
        e.selection.to_string(),
        format!("{:.4}", e.value),
        format!("{:.4}", e.probability),
      ]);
    }
    table
  }

  pub fn render(&self) -> String {
    format!("{self}\n{}", self.to_table().render())
  }
}

impl Display for SelectionReport {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(
      f,
      "Optimal: selection {}, value {:.4} ({})",
      self.optimal, self.optimal_value, self.solver
    )?;
    if !self.feasible {
      write!(f, " [budget violated]")?;
    }
    Ok(())
  }
}

/// Decode and rank every basis state of `result`.
///
/// Values are recomputed from `problem`; the solver's own value for its optimum is
/// cross-checked and a mismatch is logged.
pub fn rank_selections(problem: &QuadraticProgram, result: &SolverResult) -> Result<SelectionReport> {
  let n = problem.num_assets();
  let dim = u32::try_from(n)
    .ok()
    .and_then(|bits| 1usize.checked_shl(bits))
    .ok_or_else(|| {
      PortfolioError::Validation(format!(
        "{n} assets do not fit a {}-bit basis index",
        usize::BITS
      ))
    })?;
  if result.distribution.len() != dim {
    return Err(PortfolioError::Validation(format!(
      "distribution has {} entries, expected 2^{n}",
      result.distribution.len()
    )));
  }
  if result.selection.len() != n {
    return Err(PortfolioError::Validation(format!(
      "selection covers {} assets, expected {n}",
      result.selection.len()
    )));
  }

  let recomputed = problem.evaluate(&result.selection);
  if !abs_diff_eq!(recomputed, result.objective_value, epsilon = VALUE_TOLERANCE) {
    tracing::warn!(
      reported = result.objective_value,
      recomputed,
      solver = result.solver,
      "solver value disagrees with the objective"
    );
  }

  let entries = result
    .ranked()
    .into_iter()
    .map(|(index, probability)| {
      let selection = Selection::from_index(index, n);
      RankedSelection {
        index,
        value: problem.qubo_value(&selection),
        selection,
        probability,
      }
    })
    .collect();

  Ok(SelectionReport {
    solver: result.solver,
    tickers: problem.tickers().to_vec(),
    optimal: result.selection.clone(),
    optimal_value: recomputed,
    feasible: result.feasible,
    entries,
  })
}
