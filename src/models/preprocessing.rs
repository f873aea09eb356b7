//! Train/test split, mean imputation and standardisation.
//!
//! Statistics are always fitted on the training split and then applied
//! unchanged to the test split.

use ndarray::Array2;
use ndarray::Axis;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::Error;
use crate::error::Result;

/// Shuffled split into `(train, test)` row indices.
///
/// The test side gets `ceil(n * test_ratio)` rows, kept within `[1, n - 1]`.
pub fn train_test_split_indices(n: usize, test_ratio: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
  let mut idx = (0..n).collect::<Vec<usize>>();
  let mut rng = StdRng::seed_from_u64(seed);
  idx.shuffle(&mut rng);

  let mut n_test = ((n as f64) * test_ratio).ceil() as usize;
  n_test = n_test.clamp(1, n.saturating_sub(1).max(1));
  let test = idx[..n_test.min(n)].to_vec();
  let train = idx[n_test.min(n)..].to_vec();
  (train, test)
}

/// Replaces non-finite entries with the training column mean.
#[derive(Clone, Debug)]
pub struct MeanImputer {
  means: Vec<f64>,
}

impl MeanImputer {
  pub fn fit(data: &Array2<f64>) -> Result<Self> {
    if data.nrows() == 0 || data.ncols() == 0 {
      return Err(Error::Model("cannot fit MeanImputer on empty matrix".into()));
    }
    let means = data
      .axis_iter(Axis(1))
      .map(|col| {
        let (sum, count) = col
          .iter()
          .filter(|v| v.is_finite())
          .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
        if count == 0 {
          0.0
        } else {
          sum / count as f64
        }
      })
      .collect();
    Ok(Self { means })
  }

  pub fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
    if data.ncols() != self.means.len() {
      return Err(Error::DimensionMismatch {
        context: "MeanImputer::transform",
        expected: self.means.len(),
        got: data.ncols(),
      });
    }
    let mut out = data.clone();
    for ((_, j), v) in out.indexed_iter_mut() {
      if !v.is_finite() {
        *v = self.means[j];
      }
    }
    Ok(out)
  }
}

/// Zero mean, unit variance scaling with population standard deviation.
#[derive(Clone, Debug)]
pub struct StandardScaler {
  mean: Vec<f64>,
  std: Vec<f64>,
}

impl StandardScaler {
  pub fn fit(data: &Array2<f64>) -> Result<Self> {
    if data.nrows() == 0 || data.ncols() == 0 {
      return Err(Error::Model("cannot fit StandardScaler on empty matrix".into()));
    }
    let rows = data.nrows() as f64;
    let mut mean = Vec::with_capacity(data.ncols());
    let mut std = Vec::with_capacity(data.ncols());

    for col in data.axis_iter(Axis(1)) {
      let m = col.sum() / rows;
      let var = col.iter().map(|v| (v - m).powi(2)).sum::<f64>() / rows;
      mean.push(m);
      // constant columns are only centred
      std.push(if var.sqrt() > 1e-12 { var.sqrt() } else { 1.0 });
    }

    Ok(Self { mean, std })
  }

  pub fn transform(&self, data: &Array2<f64>) -> Result<Array2<f64>> {
    if data.ncols() != self.mean.len() {
      return Err(Error::DimensionMismatch {
        context: "StandardScaler::transform",
        expected: self.mean.len(),
        got: data.ncols(),
      });
    }
    let mut out = data.clone();
    for ((_, j), v) in out.indexed_iter_mut() {
      *v = (*v - self.mean[j]) / self.std[j];
    }
    Ok(out)
  }

  pub fn mean(&self) -> &[f64] {
    &self.mean
  }

  pub fn std(&self) -> &[f64] {
    &self.std
  }
}
