//! # Regression Tree
//!
//! $$
//! (j^\*, s^\*) = \arg\min_{j,s}\ \sum_{x_{ij}\le s}(y_i-\bar y_L)^2 + \sum_{x_{ij}>s}(y_i-\bar y_R)^2
//! $$
//!
//! CART regression tree with squared-error splits. Building block of the
//! random forest and of gradient boosting.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::check_training_data;
use super::Regressor;
use crate::error::Error;
use crate::error::Result;

#[derive(Clone, Debug)]
pub struct TreeParams {
  pub max_depth: usize,
  pub min_samples_split: usize,
  pub min_samples_leaf: usize,
  /// Features examined per split, all when `None`.
  pub max_features: Option<usize>,
  pub seed: u64,
}

impl Default for TreeParams {
  fn default() -> Self {
    Self {
      max_depth: 5,
      min_samples_split: 2,
      min_samples_leaf: 1,
      max_features: None,
      seed: 42,
    }
  }
}

#[derive(Clone, Debug)]
enum Node {
  Leaf(f64),
  Split {
    feature: usize,
    threshold: f64,
    left: Box<Node>,
    right: Box<Node>,
  },
}

struct Split {
  feature: usize,
  threshold: f64,
  sse: f64,
}

#[derive(Clone, Debug)]
pub struct RegressionTree {
  params: TreeParams,
  root: Option<Node>,
  n_features: usize,
}

impl RegressionTree {
  pub fn new(params: TreeParams) -> Self {
    Self {
      params,
      root: None,
      n_features: 0,
    }
  }

  /// Fit on the rows listed in `indices`; repeated indices act as weights.
  pub fn fit_rows(
    &mut self,
    x: &Array2<f64>,
    y: &[f64],
    indices: &[usize],
    rng: &mut StdRng,
  ) -> Result<()> {
    if indices.is_empty() {
      return Err(Error::Model("cannot fit a tree on zero rows".into()));
    }
    self.n_features = x.ncols();
    let mut indices = indices.to_vec();
    self.root = Some(self.grow(x, y, &mut indices, 0, rng));
    Ok(())
  }

  pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
    let mut node = match &self.root {
      Some(n) => n,
      None => return f64::NAN,
    };
    loop {
      match node {
        Node::Leaf(v) => return *v,
        Node::Split {
          feature,
          threshold,
          left,
          right,
        } => {
          node = if row[*feature] <= *threshold {
            left
          } else {
            right
          };
        }
      }
    }
  }

  pub fn depth(&self) -> usize {
    fn walk(node: &Node) -> usize {
      match node {
        Node::Leaf(_) => 0,
        Node::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
      }
    }
    self.root.as_ref().map(walk).unwrap_or(0)
  }

  fn grow(
    &self,
    x: &Array2<f64>,
    y: &[f64],
    indices: &mut [usize],
    depth: usize,
    rng: &mut StdRng,
  ) -> Node {
    let n = indices.len();
    let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / n as f64;
    let sse: f64 = indices.iter().map(|&i| (y[i] - mean).powi(2)).sum();

    if depth >= self.params.max_depth
      || n < self.params.min_samples_split
      || n < 2 * self.params.min_samples_leaf
      || sse < 1e-14
    {
      return Node::Leaf(mean);
    }

    let split = match self.best_split(x, y, indices, rng) {
      Some(s) if s.sse < sse - 1e-14 => s,
      _ => return Node::Leaf(mean),
    };

    let (mut left, mut right): (Vec<usize>, Vec<usize>) = indices
      .iter()
      .copied()
      .partition(|&i| x[[i, split.feature]] <= split.threshold);

    Node::Split {
      feature: split.feature,
      threshold: split.threshold,
      left: Box::new(self.grow(x, y, &mut left, depth + 1, rng)),
      right: Box::new(self.grow(x, y, &mut right, depth + 1, rng)),
    }
  }

  fn candidate_features(&self, rng: &mut StdRng) -> Vec<usize> {
    match self.params.max_features {
      Some(k) if k < self.n_features => {
        rand::seq::index::sample(rng, self.n_features, k.max(1)).into_vec()
      }
      _ => (0..self.n_features).collect(),
    }
  }

  fn best_split(
    &self,
    x: &Array2<f64>,
    y: &[f64],
    indices: &mut [usize],
    rng: &mut StdRng,
  ) -> Option<Split> {
    let n = indices.len();
    if n < 2 {
      return None;
    }
    let min_leaf = self.params.min_samples_leaf.max(1);
    let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
    let mut best: Option<Split> = None;

    for feature in self.candidate_features(rng) {
      indices.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

      let mut left_sum = 0.0;
      let mut left_sq = 0.0;
      for k in 0..n - 1 {
        let yi = y[indices[k]];
        left_sum += yi;
        left_sq += yi * yi;

        let n_left = k + 1;
        let n_right = n - n_left;
        if n_left < min_leaf || n_right < min_leaf {
          continue;
        }
        let xv = x[[indices[k], feature]];
        let xn = x[[indices[k + 1], feature]];
        if xn <= xv {
          continue;
        }

        let right_sum = total_sum - left_sum;
        let right_sq = total_sq - left_sq;
        let sse = (left_sq - left_sum * left_sum / n_left as f64)
          + (right_sq - right_sum * right_sum / n_right as f64);

        if best.as_ref().map_or(true, |b| sse < b.sse) {
          best = Some(Split {
            feature,
            threshold: 0.5 * (xv + xn),
            sse,
          });
        }
      }
    }

    best
  }
}

impl Regressor for RegressionTree {
  fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    check_training_data(x, y)?;
    let mut rng = StdRng::seed_from_u64(self.params.seed);
    let indices: Vec<usize> = (0..x.nrows()).collect();
    let y = y.to_vec();
    self.fit_rows(x, &y, &indices, &mut rng)
  }

  fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
    if self.root.is_none() {
      return Err(Error::Model("regression tree is not fitted".into()));
    }
    if x.ncols() != self.n_features {
      return Err(Error::DimensionMismatch {
        context: "RegressionTree::predict",
        expected: self.n_features,
        got: x.ncols(),
      });
    }
    Ok(x.rows().into_iter().map(|r| self.predict_row(r)).collect())
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;

  #[test]
  fn learns_a_step_function() {
    let x = array![[0.0], [1.0], [2.0], [3.0], [4.0], [5.0]];
    let y = array![1.0, 1.0, 1.0, 5.0, 5.0, 5.0];
    let mut tree = RegressionTree::new(TreeParams::default());
    tree.fit(&x, &y).unwrap();

    assert_eq!(tree.depth(), 1);
    let pred = tree.predict(&array![[0.5], [4.5]]).unwrap();
    assert_abs_diff_eq!(pred[0], 1.0);
    assert_abs_diff_eq!(pred[1], 5.0);
  }

  #[test]
  fn depth_is_bounded() {
    let x = Array2::from_shape_fn((64, 1), |(i, _)| i as f64);
    let y = Array1::from_shape_fn(64, |i| (i as f64).sin());
    let mut tree = RegressionTree::new(TreeParams {
      max_depth: 3,
      ..Default::default()
    });
    tree.fit(&x, &y).unwrap();

    assert!(tree.depth() <= 3);
  }

  #[test]
  fn constant_target_is_a_single_leaf() {
    let x = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
    let y = array![2.0, 2.0, 2.0];
    let mut tree = RegressionTree::new(TreeParams::default());
    tree.fit(&x, &y).unwrap();

    assert_eq!(tree.depth(), 0);
    assert_abs_diff_eq!(tree.predict(&x).unwrap()[1], 2.0);
  }

  #[test]
  fn predict_before_fit_fails() {
    let tree = RegressionTree::new(TreeParams::default());
    assert!(tree.predict(&array![[1.0]]).is_err());
  }
}
