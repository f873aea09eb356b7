//! # Gradient Boosting
//!
//! $$
//! F_m(x) = F_{m-1}(x) + \nu\, h_m(x),\qquad h_m \approx y - F_{m-1}
//! $$
//!
//! Least-squares gradient boosting with stochastic row subsampling.

use ndarray::Array1;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use super::check_training_data;
use super::metrics::rmse;
use super::tree::RegressionTree;
use super::tree::TreeParams;
use super::Regressor;
use crate::error::Error;
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct GbmParams {
  /// Number of boosting stages.
  pub n_estimators: usize,
  pub max_depth: usize,
  /// Shrinkage applied to every stage.
  pub learning_rate: f64,
  pub min_samples_split: usize,
  pub min_samples_leaf: usize,
  /// Fraction of rows drawn without replacement per stage.
  pub subsample: f64,
  pub seed: u64,
}

impl Default for GbmParams {
  fn default() -> Self {
    Self {
      n_estimators: 100,
      max_depth: 5,
      learning_rate: 0.1,
      min_samples_split: 2,
      min_samples_leaf: 1,
      subsample: 0.8,
      seed: 42,
    }
  }
}

#[derive(Clone, Debug)]
pub struct GradientBoosting {
  params: GbmParams,
  init: f64,
  stages: Vec<RegressionTree>,
  n_features: usize,
}

impl GradientBoosting {
  pub fn new(params: GbmParams) -> Self {
    Self {
      params,
      init: 0.0,
      stages: Vec::new(),
      n_features: 0,
    }
  }

  pub fn n_stages(&self) -> usize {
    self.stages.len()
  }
}

impl Regressor for GradientBoosting {
  fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    check_training_data(x, y)?;
    let p = &self.params;
    if !(p.subsample > 0.0 && p.subsample <= 1.0) {
      return Err(Error::Model(format!(
        "subsample must be in (0, 1], got {}",
        p.subsample
      )));
    }
    if !(p.learning_rate > 0.0) {
      return Err(Error::Model("learning_rate must be positive".into()));
    }

    let n = x.nrows();
    let n_sub = ((n as f64 * p.subsample) as usize).clamp(1, n);
    let mut rng = StdRng::seed_from_u64(p.seed);

    let init = y.sum() / n as f64;
    let mut fitted = Array1::from_elem(n, init);
    let mut stages = Vec::with_capacity(p.n_estimators);

    for _ in 0..p.n_estimators {
      let residuals: Vec<f64> = y.iter().zip(fitted.iter()).map(|(t, f)| t - f).collect();
      let rows = if n_sub < n {
        rand::seq::index::sample(&mut rng, n, n_sub).into_vec()
      } else {
        (0..n).collect()
      };

      let mut tree = RegressionTree::new(TreeParams {
        max_depth: p.max_depth,
        min_samples_split: p.min_samples_split,
        min_samples_leaf: p.min_samples_leaf,
        max_features: None,
        seed: p.seed,
      });
      tree.fit_rows(x, &residuals, &rows, &mut rng)?;

      for (i, row) in x.rows().into_iter().enumerate() {
        fitted[i] += p.learning_rate * tree.predict_row(row);
      }
      stages.push(tree);
    }

    debug!(
      stages = stages.len(),
      train_rmse = rmse(y, &fitted),
      "gradient boosting fitted"
    );
    self.init = init;
    self.stages = stages;
    self.n_features = x.ncols();
    Ok(())
  }

  fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
    if self.n_features == 0 {
      return Err(Error::Model("gradient boosting model is not fitted".into()));
    }
    if x.ncols() != self.n_features {
      return Err(Error::DimensionMismatch {
        context: "GradientBoosting::predict",
        expected: self.n_features,
        got: x.ncols(),
      });
    }
    let lr = self.params.learning_rate;
    Ok(
      x.rows()
        .into_iter()
        .map(|row| {
          self.init
            + self
              .stages
              .iter()
              .map(|t| lr * t.predict_row(row))
              .sum::<f64>()
        })
        .collect(),
    )
  }
}
