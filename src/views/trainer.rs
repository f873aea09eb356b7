//! # View Model Trainer
//!
//! $$
//! c = \min\left(1,\ \max\left(0.01,\ R^2_{\text{test}}\right)\right)
//! $$
//!
//! Split → impute → standardise → fit → score. Every statistic is learned on
//! the training split only.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;
use tracing::debug;

use super::types::TrainReport;
use crate::error::Error;
use crate::error::Result;
use crate::models::metrics::r2_score;
use crate::models::metrics::rmse;
use crate::models::preprocessing::train_test_split_indices;
use crate::models::MeanImputer;
use crate::models::ModelKind;
use crate::models::ModelParams;
use crate::models::Regressor;
use crate::models::StandardScaler;
use crate::models::ViewModel;

pub const MIN_CONFIDENCE: f64 = 0.01;
pub const MAX_CONFIDENCE: f64 = 1.0;

#[derive(Clone, Debug)]
pub struct TrainerConfig {
  pub test_ratio: f64,
  pub random_seed: u64,
  pub models: ModelParams,
}

impl Default for TrainerConfig {
  fn default() -> Self {
    Self {
      test_ratio: 0.3,
      random_seed: 42,
      models: ModelParams::default(),
    }
  }
}

/// Clamp an R² score into a usable view confidence. `NaN` maps to the floor.
pub fn clamp_confidence(r2: f64) -> f64 {
  if r2.is_nan() {
    MIN_CONFIDENCE
  } else {
    r2.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
  }
}

/// Train a fresh model of `kind` and score it on a held-out split.
pub fn train_view_model(
  x: &Array2<f64>,
  y: &Array1<f64>,
  kind: ModelKind,
  config: &TrainerConfig,
) -> Result<TrainReport> {
  if x.nrows() != y.len() {
    return Err(Error::DimensionMismatch {
      context: "train_view_model",
      expected: x.nrows(),
      got: y.len(),
    });
  }
  if !(0.0..1.0).contains(&config.test_ratio) || config.test_ratio == 0.0 {
    return Err(Error::InvalidInput(format!(
      "test_ratio must be in (0, 1), got {}",
      config.test_ratio
    )));
  }

  // rows without a realised target cannot be used at all
  let valid: Vec<usize> = (0..y.len()).filter(|&i| y[i].is_finite()).collect();
  if valid.len() < 2 {
    return Err(Error::Model(format!(
      "need at least 2 labelled rows, got {}",
      valid.len()
    )));
  }
  let x = x.select(Axis(0), &valid);
  let y = y.select(Axis(0), &valid);

  let (train_idx, test_idx) =
    train_test_split_indices(x.nrows(), config.test_ratio, config.random_seed);
  let x_train = x.select(Axis(0), &train_idx);
  let y_train = y.select(Axis(0), &train_idx);
  let x_test = x.select(Axis(0), &test_idx);
  let y_test = y.select(Axis(0), &test_idx);

  let imputer = MeanImputer::fit(&x_train)?;
  let x_train = imputer.transform(&x_train)?;
  let x_test = imputer.transform(&x_test)?;

  let scaler = StandardScaler::fit(&x_train)?;
  let x_train = scaler.transform(&x_train)?;
  let x_test = scaler.transform(&x_test)?;

  let mut model = ViewModel::new(kind, &config.models);
  model.fit(&x_train, &y_train)?;
  let pred = model.predict(&x_test)?;

  let r2 = r2_score(&y_test, &pred);
  let mean_prediction = pred.sum() / pred.len() as f64;
  if !mean_prediction.is_finite() {
    return Err(Error::Model(format!("{kind} produced a non-finite prediction")));
  }

  let report = TrainReport {
    model: kind,
    mean_prediction,
    r2,
    confidence: clamp_confidence(r2),
    test_rmse: rmse(&y_test, &pred),
    n_train: train_idx.len(),
    n_test: test_idx.len(),
  };
  debug!(?report, "view model trained");
  Ok(report)
}
