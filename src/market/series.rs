//! # Price Series
//!
//! $$
//! r_t = \frac{P_t}{P_{t-1}} - 1
//! $$
//!
//! Single-asset price/volume history and the multi-asset adjusted-close table
//! the Black-Litterman covariance is estimated from.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use impl_new_derive::ImplNew;
use nalgebra::DMatrix;
use ndarray::Array2;
use ndarray::Axis;

use crate::error::Error;
use crate::error::Result;
use crate::linalg;

/// One observation of an asset.
#[derive(ImplNew, Clone, Copy, Debug, PartialEq)]
pub struct PriceBar {
  pub date: NaiveDate,
  /// Dividend and split adjusted close.
  pub adj_close: f64,
  pub volume: f64,
}

/// Date-ascending history of one asset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriceSeries {
  bars: Vec<PriceBar>,
}

impl PriceSeries {
  /// Sorts by date; for repeated dates the last bar wins.
  pub fn new(mut bars: Vec<PriceBar>) -> Self {
    bars.sort_by_key(|b| b.date);
    let mut out: Vec<PriceBar> = Vec::with_capacity(bars.len());
    for bar in bars {
      match out.last_mut() {
        Some(last) if last.date == bar.date => *last = bar,
        _ => out.push(bar),
      }
    }
    Self { bars: out }
  }

  pub fn bars(&self) -> &[PriceBar] {
    &self.bars
  }

  pub fn len(&self) -> usize {
    self.bars.len()
  }

  pub fn is_empty(&self) -> bool {
    self.bars.is_empty()
  }

  pub fn dates(&self) -> Vec<NaiveDate> {
    self.bars.iter().map(|b| b.date).collect()
  }

  pub fn closes(&self) -> Vec<f64> {
    self.bars.iter().map(|b| b.adj_close).collect()
  }

  pub fn volumes(&self) -> Vec<f64> {
    self.bars.iter().map(|b| b.volume).collect()
  }

  /// Bars with `start <= date < end`.
  pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
    Self {
      bars: self
        .bars
        .iter()
        .filter(|b| b.date >= start && b.date < end)
        .copied()
        .collect(),
    }
  }
}

/// Adjusted closes of several assets on their common dates.
///
/// Rows are dates (ascending), columns follow `tickers`.
#[derive(Clone, Debug, PartialEq)]
pub struct PriceTable {
  tickers: Vec<String>,
  dates: Vec<NaiveDate>,
  closes: Array2<f64>,
}

impl PriceTable {
  /// Inner join of the given series on date.
  pub fn from_series<'a, I>(series: I) -> Result<Self>
  where
    I: IntoIterator<Item = (&'a str, &'a PriceSeries)>,
  {
    let series: Vec<(&str, &PriceSeries)> = series.into_iter().collect();
    if series.is_empty() {
      return Err(Error::InvalidInput("price table needs at least one asset".into()));
    }

    let mut tickers = Vec::with_capacity(series.len());
    let mut common: Option<BTreeSet<NaiveDate>> = None;
    for (ticker, s) in &series {
      if tickers.iter().any(|t: &String| t == ticker) {
        return Err(Error::InvalidInput(format!("duplicate ticker {ticker}")));
      }
      tickers.push(ticker.to_string());
      let dates: BTreeSet<NaiveDate> = s.bars().iter().map(|b| b.date).collect();
      common = Some(match common {
        None => dates,
        Some(c) => c.intersection(&dates).copied().collect(),
      });
    }
    let dates: Vec<NaiveDate> = common.unwrap_or_default().into_iter().collect();

    let mut closes = Array2::<f64>::zeros((dates.len(), series.len()));
    for (j, (_, s)) in series.iter().enumerate() {
      let mut k = 0;
      for bar in s.bars() {
        if k < dates.len() && bar.date == dates[k] {
          closes[[k, j]] = bar.adj_close;
          k += 1;
        }
      }
    }

    Ok(Self {
      tickers,
      dates,
      closes,
    })
  }

  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  pub fn closes(&self) -> &Array2<f64> {
    &self.closes
  }

  /// Columns reordered to follow `order`.
  pub fn aligned_to(&self, order: &[String]) -> Result<Self> {
    if order.len() != self.tickers.len() {
      return Err(Error::DimensionMismatch {
        context: "price table alignment",
        expected: order.len(),
        got: self.tickers.len(),
      });
    }
    let idx = order
      .iter()
      .map(|t| {
        self
          .tickers
          .iter()
          .position(|x| x == t)
          .ok_or_else(|| Error::MissingTicker(t.clone()))
      })
      .collect::<Result<Vec<usize>>>()?;

    Ok(Self {
      tickers: order.to_vec(),
      dates: self.dates.clone(),
      closes: self.closes.select(Axis(1), &idx),
    })
  }

  /// One-period percentage returns. The first row and any row with an
  /// undefined return are dropped.
  pub fn pct_returns(&self) -> Array2<f64> {
    let n_cols = self.closes.ncols();
    let mut flat = Vec::new();
    let mut rows = 0;
    for t in 1..self.closes.nrows() {
      let row: Vec<f64> = (0..n_cols)
        .map(|j| self.closes[[t, j]] / self.closes[[t - 1, j]] - 1.0)
        .collect();
      if row.iter().all(|r| r.is_finite()) {
        flat.extend(row);
        rows += 1;
      }
    }
    Array2::from_shape_vec((rows, n_cols), flat).unwrap_or_else(|_| Array2::zeros((0, n_cols)))
  }

  /// Sample covariance of [`PriceTable::pct_returns`].
  pub fn return_covariance(&self) -> Result<DMatrix<f64>> {
    linalg::covariance(&self.pct_returns())
  }
}
