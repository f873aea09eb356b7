//! # Linear Regression
//!
//! $$
//! \hat\beta = \arg\min_\beta \lVert (y-\bar y) - (X-\bar X)\beta \rVert_2^2,\qquad
//! \hat\beta_0 = \bar y - \bar X\hat\beta
//! $$
//!
//! Ordinary least squares with intercept, solved by SVD on centred data so
//! collinear features get the minimum-norm solution instead of failing.

use nalgebra::DMatrix;
use nalgebra::DVector;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::Axis;

use super::check_training_data;
use super::Regressor;
use crate::error::Error;
use crate::error::Result;

#[derive(Clone, Debug, Default)]
pub struct LinearRegression {
  coefficients: Option<Array1<f64>>,
  intercept: f64,
}

impl LinearRegression {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn coefficients(&self) -> Option<&Array1<f64>> {
    self.coefficients.as_ref()
  }

  pub fn intercept(&self) -> f64 {
    self.intercept
  }
}

impl Regressor for LinearRegression {
  fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    check_training_data(x, y)?;
    let x_mean = x
      .mean_axis(Axis(0))
      .ok_or_else(|| Error::Model("empty design matrix".into()))?;
    let y_mean = y.sum() / y.len() as f64;

    let xc = DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| x[[i, j]] - x_mean[j]);
    let yc = DVector::from_iterator(y.len(), y.iter().map(|v| v - y_mean));

    let beta = xc
      .svd(true, true)
      .solve(&yc, 1e-12)
      .map_err(|e| Error::Model(format!("least squares solve failed: {e}")))?;
    let beta: Array1<f64> = beta.iter().copied().collect();

    self.intercept = y_mean - x_mean.dot(&beta);
    self.coefficients = Some(beta);
    Ok(())
  }

  fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
    let beta = self
      .coefficients
      .as_ref()
      .ok_or_else(|| Error::Model("linear regression is not fitted".into()))?;
    if x.ncols() != beta.len() {
      return Err(Error::DimensionMismatch {
        context: "LinearRegression::predict",
        expected: beta.len(),
        got: x.ncols(),
      });
    }
    Ok(x.dot(beta) + self.intercept)
  }
}
