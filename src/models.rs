//! # Regression Models
//!
//! $$
//! \hat y = f_\theta(x),\qquad \theta = \operatorname{fit}(X, y)
//! $$
//!
//! The three view models share the [`Regressor`] capability and are picked
//! through [`ModelKind`].

use std::fmt::Display;
use std::str::FromStr;

use ndarray::Array1;
use ndarray::Array2;

use crate::error::Error;
use crate::error::Result;

pub mod forest;
pub mod gbm;
pub mod linear;
pub mod metrics;
pub mod preprocessing;
pub mod tree;

pub use forest::ForestParams;
pub use forest::RandomForest;
pub use gbm::GbmParams;
pub use gbm::GradientBoosting;
pub use linear::LinearRegression;
pub use preprocessing::MeanImputer;
pub use preprocessing::StandardScaler;
pub use tree::RegressionTree;
pub use tree::TreeParams;

/// Fit/predict contract of every view model.
pub trait Regressor {
  fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

  fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;
}

pub(crate) fn check_training_data(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
  if x.nrows() != y.len() {
    return Err(Error::DimensionMismatch {
      context: "training data",
      expected: x.nrows(),
      got: y.len(),
    });
  }
  if x.nrows() == 0 || x.ncols() == 0 {
    return Err(Error::Model("training data is empty".into()));
  }
  if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
    return Err(Error::Model("training data contains non-finite values".into()));
  }
  Ok(())
}

/// Supported view models.
#[derive(Default, Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum ModelKind {
  #[default]
  GradientBoosting,
  RandomForest,
  LinearRegression,
}

impl ModelKind {
  pub const ALL: [ModelKind; 3] = [
    ModelKind::GradientBoosting,
    ModelKind::RandomForest,
    ModelKind::LinearRegression,
  ];
}

impl Display for ModelKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      ModelKind::GradientBoosting => write!(f, "Gradient Boosting"),
      ModelKind::RandomForest => write!(f, "Random Forest"),
      ModelKind::LinearRegression => write!(f, "Linear Regression"),
    }
  }
}

impl FromStr for ModelKind {
  type Err = Error;

  /// Accepts the display names plus short aliases, case-insensitively.
  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_lowercase().as_str() {
      "gradient boosting" | "gradient-boosting" | "gbm" | "gb" => Ok(Self::GradientBoosting),
      "random forest" | "random-forest" | "rf" => Ok(Self::RandomForest),
      "linear regression" | "linear-regression" | "linear" | "ols" => Ok(Self::LinearRegression),
      _ => Err(Error::UnknownModel(s.to_string())),
    }
  }
}

/// Hyper-parameters of every model kind.
#[derive(Clone, Debug, Default)]
pub struct ModelParams {
  pub gbm: GbmParams,
  pub forest: ForestParams,
}

/// A fresh, unfitted model of the selected kind.
#[derive(Clone, Debug)]
pub enum ViewModel {
  GradientBoosting(GradientBoosting),
  RandomForest(RandomForest),
  LinearRegression(LinearRegression),
}

impl ViewModel {
  pub fn new(kind: ModelKind, params: &ModelParams) -> Self {
    match kind {
      ModelKind::GradientBoosting => Self::GradientBoosting(GradientBoosting::new(params.gbm.clone())),
      ModelKind::RandomForest => Self::RandomForest(RandomForest::new(params.forest.clone())),
      ModelKind::LinearRegression => Self::LinearRegression(LinearRegression::new()),
    }
  }

  pub fn kind(&self) -> ModelKind {
    match self {
      Self::GradientBoosting(_) => ModelKind::GradientBoosting,
      Self::RandomForest(_) => ModelKind::RandomForest,
      Self::LinearRegression(_) => ModelKind::LinearRegression,
    }
  }
}

impl Regressor for ViewModel {
  fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    match self {
      Self::GradientBoosting(m) => m.fit(x, y),
      Self::RandomForest(m) => m.fit(x, y),
      Self::LinearRegression(m) => m.fit(x, y),
    }
  }

  fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
    match self {
      Self::GradientBoosting(m) => m.predict(x),
      Self::RandomForest(m) => m.predict(x),
      Self::LinearRegression(m) => m.predict(x),
    }
  }
}

#[cfg(test)]
mod tests {
  use ndarray::array;

  use super::*;

  #[test]
  fn model_kind_parses_display_names() {
    for kind in ModelKind::ALL {
      assert_eq!(kind.to_string().parse::<ModelKind>().unwrap(), kind);
    }
    assert_eq!("rf".parse::<ModelKind>().unwrap(), ModelKind::RandomForest);
    assert_eq!(
      "xgboost".parse::<ModelKind>(),
      Err(Error::UnknownModel("xgboost".into()))
    );
  }

  #[test]
  fn view_model_dispatches_to_selected_kind() {
    let x = array![[0.0], [1.0], [2.0], [3.0]];
    let y = array![1.0, 3.0, 5.0, 7.0];
    let mut model = ViewModel::new(ModelKind::LinearRegression, &ModelParams::default());
    assert_eq!(model.kind(), ModelKind::LinearRegression);

    model.fit(&x, &y).unwrap();
    let pred = model.predict(&array![[4.0]]).unwrap();
    assert!((pred[0] - 9.0).abs() < 1e-9);
  }

  #[test]
  fn training_data_must_be_finite() {
    let x = array![[f64::NAN], [1.0]];
    let y = array![1.0, 2.0];
    assert!(check_training_data(&x, &y).is_err());
    assert!(check_training_data(&array![[1.0]], &y).is_err());
  }
}
