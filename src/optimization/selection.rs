//! # Selection Vectors
//!
//! $$
//! i = \sum_{k=0}^{n-1} x_k\, 2^k
//! $$
//!
//! Binary inclusion mask over assets. Bit `k` of a basis-state index is asset `k`
//! (least-significant bit = first asset), for encoding and decoding alike.

use std::fmt::Display;

use crate::error::PortfolioError;
use crate::error::Result;

/// One bit per asset, `true` when the asset is selected.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Selection(Vec<bool>);

impl Selection {
  /// Decode a basis-state index. Assets past the index width are unselected.
  pub fn from_index(index: usize, num_assets: usize) -> Self {
    Self((0..num_assets).map(|k| index_bit(index, k)).collect())
  }

  /// Encode back into a basis-state index.
  ///
  /// Fails when a selected asset lies past the width of `usize`.
  pub fn to_index(&self) -> Result<usize> {
    self.selected_indices().try_fold(0usize, |acc, k| {
      u32::try_from(k)
        .ok()
        .and_then(|k| 1usize.checked_shl(k))
        .map(|bit| acc | bit)
        .ok_or_else(|| {
          PortfolioError::Validation(format!(
            "asset {k} does not fit a {}-bit basis index",
            usize::BITS
          ))
        })
    })
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// Number of selected assets.
  pub fn count(&self) -> usize {
    self.0.iter().filter(|&&b| b).count()
  }

  pub fn is_selected(&self, asset: usize) -> bool {
    self.0.get(asset).copied().unwrap_or(false)
  }

  pub fn selected_indices(&self) -> impl Iterator<Item = usize> + '_ {
    self.0.iter().enumerate().filter(|(_, &b)| b).map(|(k, _)| k)
  }

  pub fn as_slice(&self) -> &[bool] {
    &self.0
  }

  /// Tickers of the selected assets, in asset order.
  pub fn selected_tickers<'a>(&self, tickers: &'a [String]) -> Vec<&'a str> {
    self
      .selected_indices()
      .filter_map(|k| tickers.get(k).map(String::as_str))
      .collect()
  }
}

/// Bit `k` of `index`, `false` past the width of `usize`.
pub(crate) fn index_bit(index: usize, k: usize) -> bool {
  u32::try_from(k)
    .ok()
    .and_then(|k| index.checked_shr(k))
    .is_some_and(|v| v & 1 == 1)
}

impl From<Vec<bool>> for Selection {
  fn from(bits: Vec<bool>) -> Self {
    Self(bits)
  }
}

impl Display for Selection {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let bits: Vec<&str> = self.0.iter().map(|&b| if b { "1" } else { "0" }).collect();
    write!(f, "[{}]", bits.join(" "))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn least_significant_bit_is_the_first_asset() {
    assert_eq!(Selection::from_index(1, 3), Selection::from(vec![true, false, false]));
    assert_eq!(Selection::from_index(0b110, 3), Selection::from(vec![false, true, true]));
    assert_eq!(Selection::from(vec![false, false, true, true]).to_index().unwrap(), 12);
  }

  #[test]
  fn index_round_trip_for_every_vector_up_to_six_assets() {
    for n in 1..=6 {
      for index in 0..(1usize << n) {
        let s = Selection::from_index(index, n);
        assert_eq!(s.len(), n);
        assert_eq!(s.to_index().unwrap(), index);
        assert_eq!(s.count(), index.count_ones() as usize);
        assert_eq!(Selection::from(s.as_slice().to_vec()), s);
      }
    }
  }

  #[test]
  fn display_and_tickers() {
    let s = Selection::from_index(0b101, 3);
    assert_eq!(s.to_string(), "[1 0 1]");
    let tickers = vec!["AAA".to_string(), "BBB".to_string(), "CCC".to_string()];
    assert_eq!(s.selected_tickers(&tickers), vec!["AAA", "CCC"]);
    assert!(!s.is_selected(7));
  }

  #[test]
  fn wide_vectors_do_not_overflow_the_index() {
    let s = Selection::from_index(1, 70);
    assert_eq!(s.len(), 70);
    assert_eq!(s.count(), 1);
    assert!(s.is_selected(0));
    assert_eq!(s.to_index().unwrap(), 1);

    assert!(matches!(
      Selection::from(vec![true; 70]).to_index(),
      Err(PortfolioError::Validation(_))
    ));
    let mut last_fitting = vec![false; 70];
    last_fitting[usize::BITS as usize - 1] = true;
    assert_eq!(Selection::from(last_fitting).to_index().unwrap(), 1 << (usize::BITS - 1));
  }
}
