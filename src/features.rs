//! # Feature Engine
//!
//! $$
//! r^{(5)}_t = \frac{P_t}{P_{t-5}} - 1,\qquad
//! \sigma_t = \operatorname{sd}\left(r^{(1)}_{t-19..t}\right),\qquad
//! y_t = r^{(5)}_{t+5}
//! $$
//!
//! Technical indicators per date plus the forward weekly return used as the
//! regression target. Rows touched by window warm-up or by the forward shift
//! are discarded, so every emitted row is fully realised.

use chrono::NaiveDate;
use ndarray::Array1;
use ndarray::Array2;

use crate::market::PriceSeries;

/// Regressor columns in the order of [`FeatureTable::feature_matrix`].
pub const FEATURE_COLUMNS: [&str; 6] = [
  "volatility",
  "price_vs_sma",
  "momentum",
  "volume_ratio",
  "sma_short",
  "sma_long",
];

/// Window lengths of the indicators.
#[derive(Clone, Debug)]
pub struct FeatureConfig {
  /// Horizon of the weekly return and momentum.
  pub return_horizon: usize,
  /// Window of the rolling volatility.
  pub volatility_window: usize,
  pub sma_short: usize,
  pub sma_long: usize,
  /// Window of the mean volume in the volume ratio.
  pub volume_window: usize,
  /// How far ahead the target is read.
  pub target_shift: usize,
}

impl Default for FeatureConfig {
  fn default() -> Self {
    Self {
      return_horizon: 5,
      volatility_window: 20,
      sma_short: 20,
      sma_long: 50,
      volume_window: 20,
      target_shift: 5,
    }
  }
}

impl FeatureConfig {
  /// Smallest series length that yields one row.
  pub fn min_observations(&self) -> usize {
    self.first_valid_index() + self.target_shift + 1
  }

  fn first_valid_index(&self) -> usize {
    self
      .return_horizon
      .max(self.volatility_window)
      .max(self.sma_short.saturating_sub(1))
      .max(self.sma_long.saturating_sub(1))
      .max(self.volume_window.saturating_sub(1))
  }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureRow {
  pub date: NaiveDate,
  pub adj_close: f64,
  pub volume: f64,
  pub weekly_return: f64,
  pub volatility: f64,
  pub sma_short: f64,
  pub sma_long: f64,
  pub price_vs_sma: f64,
  pub momentum: f64,
  pub volume_ratio: f64,
  /// Weekly return realised `target_shift` periods later. Read at input
  /// position `t + target_shift`, before incomplete rows are filtered out.
  pub target: f64,
}

impl FeatureRow {
  fn regressors(&self) -> [f64; 6] {
    [
      self.volatility,
      self.price_vs_sma,
      self.momentum,
      self.volume_ratio,
      self.sma_short,
      self.sma_long,
    ]
  }

  fn is_finite(&self) -> bool {
    self.regressors().iter().all(|v| v.is_finite())
      && self.weekly_return.is_finite()
      && self.target.is_finite()
  }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureTable {
  rows: Vec<FeatureRow>,
}

impl FeatureTable {
  pub fn rows(&self) -> &[FeatureRow] {
    &self.rows
  }

  pub fn len(&self) -> usize {
    self.rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.rows.is_empty()
  }

  pub fn dates(&self) -> Vec<NaiveDate> {
    self.rows.iter().map(|r| r.date).collect()
  }

  /// `len x 6` matrix with columns as in [`FEATURE_COLUMNS`].
  pub fn feature_matrix(&self) -> Array2<f64> {
    Array2::from_shape_fn((self.rows.len(), FEATURE_COLUMNS.len()), |(i, j)| {
      self.rows[i].regressors()[j]
    })
  }

  pub fn targets(&self) -> Array1<f64> {
    self.rows.iter().map(|r| r.target).collect()
  }
}

/// Build the feature table of a price series.
pub fn build_features(series: &PriceSeries, config: &FeatureConfig) -> FeatureTable {
  let n = series.len();
  let bars = series.bars();
  let closes = series.closes();
  let volumes = series.volumes();

  let weekly: Vec<Option<f64>> = (0..n)
    .map(|t| pct_change(&closes, t, config.return_horizon))
    .collect();
  let daily: Vec<Option<f64>> = (0..n).map(|t| pct_change(&closes, t, 1)).collect();

  let mut rows = Vec::new();
  for t in 0..n {
    let Some(target_idx) = t.checked_add(config.target_shift).filter(|&i| i < n) else {
      break;
    };

    let values = (|| {
      let weekly_return = weekly[t]?;
      let target = weekly[target_idx]?;
      let volatility = rolling_std(&daily, t, config.volatility_window)?;
      let sma_short = rolling_mean(&closes, t, config.sma_short)?;
      let sma_long = rolling_mean(&closes, t, config.sma_long)?;
      let mean_volume = rolling_mean(&volumes, t, config.volume_window)?;
      Some(FeatureRow {
        date: bars[t].date,
        adj_close: closes[t],
        volume: volumes[t],
        weekly_return,
        volatility,
        sma_short,
        sma_long,
        price_vs_sma: (closes[t] - sma_short) / sma_short,
        momentum: weekly_return,
        volume_ratio: volumes[t] / mean_volume,
        target,
      })
    })();

    if let Some(row) = values.filter(FeatureRow::is_finite) {
      rows.push(row);
    }
  }

  FeatureTable { rows }
}

fn pct_change(xs: &[f64], t: usize, lag: usize) -> Option<f64> {
  if lag == 0 || t < lag {
    return None;
  }
  Some(xs[t] / xs[t - lag] - 1.0)
}

fn rolling_mean(xs: &[f64], t: usize, window: usize) -> Option<f64> {
  if window == 0 || t + 1 < window {
    return None;
  }
  let slice = &xs[t + 1 - window..=t];
  Some(slice.iter().sum::<f64>() / window as f64)
}

fn rolling_std(xs: &[Option<f64>], t: usize, window: usize) -> Option<f64> {
  if window < 2 || t + 1 < window {
    return None;
  }
  let slice = xs[t + 1 - window..=t]
    .iter()
    .copied()
    .collect::<Option<Vec<f64>>>()?;
  let mean = slice.iter().sum::<f64>() / window as f64;
  let var = slice.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (window - 1) as f64;
  Some(var.sqrt())
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;
  use crate::market::PriceBar;

  fn series_from(closes: impl IntoIterator<Item = f64>) -> PriceSeries {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    PriceSeries::new(
      closes
        .into_iter()
        .enumerate()
        .map(|(i, p)| {
          PriceBar::new(
            start + chrono::Days::new(i as u64),
            p,
            1_000.0 + (i % 7) as f64 * 10.0,
          )
        })
        .collect(),
    )
  }

  #[test]
  fn short_series_gives_empty_table() {
    let cfg = FeatureConfig::default();
    assert_eq!(cfg.min_observations(), 55);

    let s = series_from((0..54).map(|i| 100.0 + i as f64));
    assert!(build_features(&s, &cfg).is_empty());

    let s = series_from((0..55).map(|i| 100.0 + i as f64));
    assert_eq!(build_features(&s, &cfg).len(), 1);
  }

  #[test]
  fn rows_are_finite_and_dates_are_a_subset() {
    let s = series_from((0..200).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1));
    let table = build_features(&s, &FeatureConfig::default());

    assert_eq!(table.len(), 200 - 54);
    let input_dates = s.dates();
    for row in table.rows() {
      assert!(row.is_finite());
      assert!(input_dates.contains(&row.date));
    }
    assert!(table.feature_matrix().iter().all(|v| v.is_finite()));
  }

  #[test]
  fn geometric_growth_has_constant_returns_and_zero_volatility() {
    let s = series_from((0..80).map(|i| 100.0 * 1.01_f64.powi(i)));
    let table = build_features(&s, &FeatureConfig::default());
    let expected = 1.01_f64.powi(5) - 1.0;

    for row in table.rows() {
      assert_abs_diff_eq!(row.weekly_return, expected, epsilon = 1e-10);
      assert_abs_diff_eq!(row.momentum, expected, epsilon = 1e-10);
      assert_abs_diff_eq!(row.target, expected, epsilon = 1e-10);
      assert_abs_diff_eq!(row.volatility, 0.0, epsilon = 1e-10);
      assert!(row.price_vs_sma > 0.0);
    }
  }

  #[test]
  fn first_row_matches_hand_computation() {
    let s = series_from((0..60).map(|i| 100.0 + i as f64));
    let table = build_features(&s, &FeatureConfig::default());
    let row = table.rows()[0];

    // first complete row sits at index 49
    let p = 149.0;
    assert_abs_diff_eq!(row.adj_close, p);
    assert_abs_diff_eq!(row.weekly_return, p / 144.0 - 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(row.sma_short, (130..150).sum::<i32>() as f64 / 20.0, epsilon = 1e-12);
    assert_abs_diff_eq!(row.sma_long, (100..150).sum::<i32>() as f64 / 50.0, epsilon = 1e-12);
    assert_abs_diff_eq!(row.target, 154.0 / 149.0 - 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(
      row.price_vs_sma,
      (p - row.sma_short) / row.sma_short,
      epsilon = 1e-12
    );
  }

  #[test]
  fn volatility_and_volume_ratio_match_hand_computation() {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let price = |i: usize| 100.0 + 5.0 * (i as f64 * 0.3).sin();
    let volume = |i: usize| 1_000.0 + ((i * 37) % 11) as f64 * 25.0;
    let s = PriceSeries::new(
      (0..60)
        .map(|i| PriceBar::new(start + chrono::Days::new(i as u64), price(i), volume(i)))
        .collect(),
    );
    let table = build_features(&s, &FeatureConfig::default());
    let row = table.rows()[0];
    assert_eq!(row.date, start + chrono::Days::new(49));

    // sample std of the 20 one-period returns ending at index 49
    let r: Vec<f64> = (30..=49).map(|i| price(i) / price(i - 1) - 1.0).collect();
    let mean = r.iter().sum::<f64>() / 20.0;
    let var = r.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 19.0;
    assert_abs_diff_eq!(row.volatility, var.sqrt(), epsilon = 1e-12);

    let mean_volume = (30..=49).map(volume).sum::<f64>() / 20.0;
    assert_abs_diff_eq!(row.volume_ratio, volume(49) / mean_volume, epsilon = 1e-12);
    assert_abs_diff_eq!(row.volume, volume(49));
  }

  #[test]
  fn zero_volume_rows_are_dropped() {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    let s = PriceSeries::new(
      (0..70)
        .map(|i| PriceBar::new(start + chrono::Days::new(i), 100.0 + i as f64, 0.0))
        .collect(),
    );
    assert!(build_features(&s, &FeatureConfig::default()).is_empty());
  }
}
