//! # Asset Values
//!
//! Ordered ticker → scalar container. The ticker order is the index order of
//! every vector and matrix built from it, so alignment between equilibrium
//! returns, views, confidences and covariance columns goes through
//! [`AssetValues::aligned_to`] rather than through positional assumptions.

use std::collections::HashMap;

use crate::error::Error;
use crate::error::Result;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssetValues {
  tickers: Vec<String>,
  values: Vec<f64>,
}

impl AssetValues {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build from parallel ticker and value vectors.
  pub fn from_parts(tickers: Vec<String>, values: Vec<f64>) -> Result<Self> {
    if tickers.len() != values.len() {
      return Err(Error::DimensionMismatch {
        context: "asset values",
        expected: tickers.len(),
        got: values.len(),
      });
    }
    let mut out = Self::new();
    for (t, v) in tickers.into_iter().zip(values) {
      out.insert(t, v)?;
    }
    Ok(out)
  }

  /// Build from `(ticker, value)` pairs. Duplicate tickers are rejected.
  pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
  where
    I: IntoIterator<Item = (S, f64)>,
    S: Into<String>,
  {
    let mut out = Self::new();
    for (t, v) in pairs {
      out.insert(t, v)?;
    }
    Ok(out)
  }

  /// Append a ticker. Duplicate tickers are rejected.
  pub fn insert(&mut self, ticker: impl Into<String>, value: f64) -> Result<()> {
    let ticker = ticker.into();
    if self.tickers.contains(&ticker) {
      return Err(Error::InvalidInput(format!("duplicate ticker {ticker}")));
    }
    self.tickers.push(ticker);
    self.values.push(value);
    Ok(())
  }

  pub fn get(&self, ticker: &str) -> Option<f64> {
    self
      .tickers
      .iter()
      .position(|t| t == ticker)
      .map(|i| self.values[i])
  }

  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  pub fn values(&self) -> &[f64] {
    &self.values
  }

  pub fn len(&self) -> usize {
    self.tickers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tickers.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
    self
      .tickers
      .iter()
      .map(String::as_str)
      .zip(self.values.iter().copied())
  }

  /// Values reordered to follow `order`.
  ///
  /// Fails if a ticker of `order` is absent or if the sets differ in size.
  pub fn aligned_to(&self, order: &[String]) -> Result<Vec<f64>> {
    if order.len() != self.len() {
      return Err(Error::DimensionMismatch {
        context: "asset alignment",
        expected: order.len(),
        got: self.len(),
      });
    }
    let index: HashMap<&str, f64> = self.iter().collect();
    order
      .iter()
      .map(|t| {
        index
          .get(t.as_str())
          .copied()
          .ok_or_else(|| Error::MissingTicker(t.clone()))
      })
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn preserves_insertion_order() {
    let v = AssetValues::from_pairs([("MSFT", 2.0), ("AAPL", 1.0), ("GOOGL", 3.0)]).unwrap();

    assert_eq!(v.tickers(), &["MSFT", "AAPL", "GOOGL"]);
    assert_eq!(v.values(), &[2.0, 1.0, 3.0]);
    assert_eq!(v.get("AAPL"), Some(1.0));
  }

  #[test]
  fn aligned_to_reorders_by_ticker() {
    let v = AssetValues::from_pairs([("B", 2.0), ("A", 1.0)]).unwrap();
    let order = vec!["A".to_string(), "B".to_string()];

    assert_eq!(v.aligned_to(&order).unwrap(), vec![1.0, 2.0]);
  }

  #[test]
  fn aligned_to_reports_missing_ticker() {
    let v = AssetValues::from_pairs([("A", 1.0), ("C", 3.0)]).unwrap();
    let order = vec!["A".to_string(), "B".to_string()];

    assert_eq!(v.aligned_to(&order), Err(Error::MissingTicker("B".into())));
  }

  #[test]
  fn insert_rejects_duplicates() {
    let mut v = AssetValues::new();
    v.insert("A", 1.0).unwrap();
    assert!(v.insert("A", 2.0).is_err());
  }

  #[test]
  fn from_pairs_rejects_duplicates() {
    assert_eq!(
      AssetValues::from_pairs([("A", 1.0), ("B", 2.0), ("A", 3.0)]),
      Err(Error::InvalidInput("duplicate ticker A".into()))
    );
  }
}
