//! # Random Forest
//!
//! $$
//! \hat f(x) = \frac{1}{B}\sum_{b=1}^{B} T_b(x)
//! $$
//!
//! Bagged regression trees, fitted in parallel with one seeded generator per
//! tree so results do not depend on thread scheduling.

use ndarray::Array1;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::debug;

use super::check_training_data;
use super::tree::RegressionTree;
use super::tree::TreeParams;
use super::Regressor;
use crate::error::Error;
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct ForestParams {
  pub n_trees: usize,
  pub max_depth: usize,
  pub min_samples_split: usize,
  pub min_samples_leaf: usize,
  /// Features examined per split, all when `None`.
  pub max_features: Option<usize>,
  pub bootstrap: bool,
  pub seed: u64,
}

impl Default for ForestParams {
  fn default() -> Self {
    Self {
      n_trees: 100,
      max_depth: 10,
      min_samples_split: 2,
      min_samples_leaf: 1,
      max_features: None,
      bootstrap: true,
      seed: 42,
    }
  }
}

#[derive(Clone, Debug)]
pub struct RandomForest {
  params: ForestParams,
  trees: Vec<RegressionTree>,
  n_features: usize,
}

impl RandomForest {
  pub fn new(params: ForestParams) -> Self {
    Self {
      params,
      trees: Vec::new(),
      n_features: 0,
    }
  }

  pub fn n_trees(&self) -> usize {
    self.trees.len()
  }
}

impl Regressor for RandomForest {
  fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    check_training_data(x, y)?;
    if self.params.n_trees == 0 {
      return Err(Error::Model("random forest needs at least one tree".into()));
    }

    let n = x.nrows();
    let y = y.to_vec();
    let params = &self.params;

    let trees = (0..params.n_trees)
      .into_par_iter()
      .map(|b| {
        let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(b as u64));
        let rows: Vec<usize> = if params.bootstrap {
          (0..n).map(|_| rng.gen_range(0..n)).collect()
        } else {
          (0..n).collect()
        };
        let mut tree = RegressionTree::new(TreeParams {
          max_depth: params.max_depth,
          min_samples_split: params.min_samples_split,
          min_samples_leaf: params.min_samples_leaf,
          max_features: params.max_features,
          seed: params.seed.wrapping_add(b as u64),
        });
        tree.fit_rows(x, &y, &rows, &mut rng)?;
        Ok(tree)
      })
      .collect::<Result<Vec<RegressionTree>>>()?;

    debug!(trees = trees.len(), rows = n, "random forest fitted");
    self.trees = trees;
    self.n_features = x.ncols();
    Ok(())
  }

  fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
    if self.trees.is_empty() {
      return Err(Error::Model("random forest is not fitted".into()));
    }
    if x.ncols() != self.n_features {
      return Err(Error::DimensionMismatch {
        context: "RandomForest::predict",
        expected: self.n_features,
        got: x.ncols(),
      });
    }
    let n_trees = self.trees.len() as f64;
    Ok(
      x.rows()
        .into_iter()
        .map(|row| self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / n_trees)
        .collect(),
    )
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::metrics::r2_score;

  fn quadratic(n: usize) -> (Array2<f64>, Array1<f64>) {
    let x = Array2::from_shape_fn((n, 2), |(i, j)| {
      let t = i as f64 / n as f64;
      if j == 0 {
        t
      } else {
        (t * 13.0).sin()
      }
    });
    let y = x.rows().into_iter().map(|r| r[0] * r[0] + 0.1 * r[1]).collect();
    (x, y)
  }

  #[test]
  fn fits_smooth_target() {
    let (x, y) = quadratic(200);
    let mut forest = RandomForest::new(ForestParams {
      n_trees: 20,
      ..Default::default()
    });
    forest.fit(&x, &y).unwrap();

    assert_eq!(forest.n_trees(), 20);
    let pred = forest.predict(&x).unwrap();
    assert!(r2_score(&y, &pred) > 0.9);
  }

  #[test]
  fn seeded_fits_are_reproducible() {
    let (x, y) = quadratic(80);
    let params = ForestParams {
      n_trees: 10,
      ..Default::default()
    };
    let mut a = RandomForest::new(params.clone());
    let mut b = RandomForest::new(params);
    a.fit(&x, &y).unwrap();
    b.fit(&x, &y).unwrap();

    assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
  }

  #[test]
  fn predict_checks_width() {
    let (x, y) = quadratic(30);
    let mut forest = RandomForest::new(ForestParams {
      n_trees: 3,
      ..Default::default()
    });
    forest.fit(&x, &y).unwrap();

    assert!(forest.predict(&Array2::zeros((2, 3))).is_err());
  }
}
