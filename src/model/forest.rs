//! Random forest regressor: bootstrap-sampled variance-reduction trees, averaged.

use crate::config::ModelConfig;
use crate::error::{Result, RiskError};
use ndarray::{Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Splits must reduce squared error by more than this share of the node's
/// sum of squared targets; smaller gains are cancellation error.
const REL_GAIN_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct RegressionTree {
    root: Node,
    /// Sum of squared-error decrease per feature, unnormalized
    gains: Vec<f64>,
    n_nodes: usize,
}

struct TreeBuilder<'a> {
    x: &'a Array2<f64>,
    y: &'a [f64],
    config: &'a ModelConfig,
    max_features: usize,
    gains: Vec<f64>,
    n_nodes: usize,
}

impl RegressionTree {
    /// Grow a tree over `samples` (row indices into `x`, repeats allowed).
    pub fn fit(
        x: &Array2<f64>,
        y: &[f64],
        samples: &[usize],
        config: &ModelConfig,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let n_features = x.ncols();
        let mut builder = TreeBuilder {
            x,
            y,
            config,
            max_features: config.max_features.unwrap_or(n_features).clamp(1, n_features.max(1)),
            gains: vec![0.0; n_features],
            n_nodes: 0,
        };
        let root = builder.build(samples.to_vec(), 0, rng);
        Self {
            root,
            gains: builder.gains,
            n_nodes: builder.n_nodes,
        }
    }

    pub fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    /// Importances normalized to sum to 1, or all zero for a single-leaf tree.
    pub fn feature_importances(&self) -> Vec<f64> {
        normalized(&self.gains)
    }

    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }
}

impl<'a> TreeBuilder<'a> {
    fn build(&mut self, samples: Vec<usize>, depth: usize, rng: &mut ChaCha8Rng) -> Node {
        self.n_nodes += 1;
        let n = samples.len();
        let (sum, sum_sq) = samples.iter().fold((0.0, 0.0), |(s, q), &i| {
            let v = self.y[i];
            (s + v, q + v * v)
        });
        let mean = if n > 0 { sum / n as f64 } else { 0.0 };
        let sse = (sum_sq - sum * sum / n.max(1) as f64).max(0.0);
        let tolerance = REL_GAIN_TOLERANCE * sum_sq;

        let pure = samples.iter().all(|&i| self.y[i] == self.y[samples[0]]);
        let depth_reached = self.config.max_depth.is_some_and(|d| depth >= d);
        if pure || depth_reached || n < self.config.min_samples_split || sse <= tolerance {
            return Node::Leaf { value: mean };
        }

        let Some(split) = self.best_split(&samples, sse, tolerance, rng) else {
            return Node::Leaf { value: mean };
        };

        self.gains[split.feature] += split.gain;
        let left = self.build(split.left, depth + 1, rng);
        let right = self.build(split.right, depth + 1, rng);
        Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Scan sorted values of each candidate feature with running sums.
    fn best_split(
        &self,
        samples: &[usize],
        parent_sse: f64,
        tolerance: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<BestSplit> {
        let n = samples.len();
        let min_leaf = self.config.min_samples_leaf;

        let mut features: Vec<usize> = (0..self.x.ncols()).collect();
        if self.max_features < features.len() {
            features.shuffle(rng);
            features.truncate(self.max_features);
        }

        let mut best: Option<(usize, f64, f64)> = None;
        let mut order: Vec<usize> = samples.to_vec();

        for &f in &features {
            order.sort_by(|&a, &b| self.x[[a, f]].total_cmp(&self.x[[b, f]]));

            let total: f64 = order.iter().map(|&i| self.y[i]).sum();
            let total_sq: f64 = order.iter().map(|&i| self.y[i] * self.y[i]).sum();
            let (mut left_sum, mut left_sq) = (0.0, 0.0);

            for k in 1..n {
                let prev = order[k - 1];
                left_sum += self.y[prev];
                left_sq += self.y[prev] * self.y[prev];

                let lo = self.x[[prev, f]];
                let hi = self.x[[order[k], f]];
                if lo >= hi || k < min_leaf || n - k < min_leaf {
                    continue;
                }

                let right_sum = total - left_sum;
                let right_sq = total_sq - left_sq;
                let left_sse = left_sq - left_sum * left_sum / k as f64;
                let right_sse = right_sq - right_sum * right_sum / (n - k) as f64;
                let gain = parent_sse - (left_sse + right_sse);

                if gain > tolerance && best.map_or(true, |(_, _, g)| gain > g) {
                    best = Some((f, (lo + hi) / 2.0, gain));
                }
            }
        }

        let (feature, threshold, gain) = best?;
        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .iter()
            .partition(|&&i| self.x[[i, feature]] <= threshold);
        Some(BestSplit {
            feature,
            threshold,
            gain,
            left,
            right,
        })
    }
}

#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    trees: Vec<RegressionTree>,
    importances: Vec<f64>,
    n_features: usize,
}

impl RandomForestRegressor {
    /// Tree `i` draws its bootstrap sample and feature subsets from a
    /// generator seeded with `config.seed + i`.
    pub fn fit(x: &Array2<f64>, y: &[f64], config: &ModelConfig) -> Result<Self> {
        config.validate()?;
        let n = x.nrows();
        if n == 0 {
            return Err(RiskError::InsufficientSamples { needed: 1, got: 0 });
        }
        if y.len() != n {
            return Err(RiskError::InvalidSchema(format!(
                "{} feature rows but {} targets",
                n,
                y.len()
            )));
        }

        let all: Vec<usize> = (0..n).collect();
        let trees: Vec<RegressionTree> = (0..config.n_estimators)
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(i as u64));
                let samples: Vec<usize> = if config.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    all.clone()
                };
                RegressionTree::fit(x, y, &samples, config, &mut rng)
            })
            .collect();

        // average over trees that split at least once, then renormalize
        let mut importances = vec![0.0; x.ncols()];
        let mut counted = 0usize;
        for tree in trees.iter().filter(|t| t.n_nodes() > 1) {
            for (acc, imp) in importances.iter_mut().zip(tree.feature_importances()) {
                *acc += imp;
            }
            counted += 1;
        }
        if counted > 0 {
            importances.iter_mut().for_each(|v| *v /= counted as f64);
        }

        Ok(Self {
            trees,
            importances: normalized(&importances),
            n_features: x.ncols(),
        })
    }

    /// Mean of the tree outputs per row.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        if x.ncols() != self.n_features {
            return Err(RiskError::InvalidSchema(format!(
                "forest fitted on {} features, got {}",
                self.n_features,
                x.ncols()
            )));
        }
        let n_trees = self.trees.len() as f64;
        Ok(x.rows()
            .into_iter()
            .map(|row| self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / n_trees)
            .collect())
    }

    /// Non-negative, sums to 1 unless no tree ever split.
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

fn normalized(values: &[f64]) -> Vec<f64> {
    let sum: f64 = values.iter().sum();
    if sum > 0.0 {
        values.iter().map(|v| v / sum).collect()
    } else {
        vec![0.0; values.len()]
    }
}
