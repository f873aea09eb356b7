//! # Linear Algebra
//!
//! $$
//! A^{-1}A = I,\qquad \Sigma = \frac{1}{n-1}(R-\bar R)^\top(R-\bar R)
//! $$
//!
//! Dense matrix helpers on top of [`nalgebra::DMatrix`]. Inversion refuses
//! singular and numerically singular input instead of returning `NaN`s.

use nalgebra::DMatrix;
use nalgebra::DVector;
use ndarray::Array1;
use ndarray::Array2;
use ndarray_stats::CorrelationExt;

use crate::error::Error;
use crate::error::Result;

/// Smallest accepted ratio of the smallest to the largest singular value.
pub const MIN_RCOND: f64 = 1e-12;

/// Convert a row-major ndarray matrix into a nalgebra matrix.
pub fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
  DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

/// Convert a nalgebra matrix back into an ndarray matrix.
pub fn to_array2(m: &DMatrix<f64>) -> Array2<f64> {
  Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

pub fn to_dvector(v: &Array1<f64>) -> DVector<f64> {
  DVector::from_iterator(v.len(), v.iter().copied())
}

/// Diagonal matrix from a slice of entries.
pub fn diagonal(entries: &[f64]) -> DMatrix<f64> {
  DMatrix::from_diagonal(&DVector::from_column_slice(entries))
}

/// Matrix product with an explicit shape check.
pub fn multiply(a: &DMatrix<f64>, b: &DMatrix<f64>) -> Result<DMatrix<f64>> {
  if a.ncols() != b.nrows() {
    return Err(Error::DimensionMismatch {
      context: "matrix multiply",
      expected: a.ncols(),
      got: b.nrows(),
    });
  }
  Ok(a * b)
}

/// Invert a square matrix.
///
/// The matrix is treated as singular when its reciprocal condition number,
/// estimated from the singular values, falls below [`MIN_RCOND`].
/// `name` ends up in the error message.
pub fn invert(m: &DMatrix<f64>, name: &'static str) -> Result<DMatrix<f64>> {
  if !m.is_square() {
    return Err(Error::DimensionMismatch {
      context: "matrix inverse",
      expected: m.nrows(),
      got: m.ncols(),
    });
  }
  if m.is_empty() || m.iter().any(|v| !v.is_finite()) {
    return Err(Error::SingularMatrix(name));
  }

  let sv = m.singular_values();
  let max_sv = sv.max();
  let min_sv = sv.min();
  if max_sv <= 0.0 || min_sv <= max_sv * MIN_RCOND {
    return Err(Error::SingularMatrix(name));
  }

  let inv = m
    .clone()
    .try_inverse()
    .ok_or(Error::SingularMatrix(name))?;
  if inv.iter().any(|v| !v.is_finite()) {
    return Err(Error::SingularMatrix(name));
  }
  Ok(inv)
}

/// Sample covariance (ddof = 1) of the columns of `observations`.
///
/// Rows are observations, columns are variables.
pub fn covariance(observations: &Array2<f64>) -> Result<DMatrix<f64>> {
  if observations.nrows() < 2 {
    return Err(Error::InvalidInput(format!(
      "covariance needs at least 2 observations, got {}",
      observations.nrows()
    )));
  }
  if observations.ncols() == 0 {
    return Err(Error::InvalidInput("covariance needs at least one column".into()));
  }

  let cov = observations
    .t()
    .cov(1.0)
    .map_err(|e| Error::InvalidInput(e.to_string()))?;
  Ok(to_dmatrix(&cov))
}
