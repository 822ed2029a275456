//! Random Forest - bagged CART trees
//!
//! Every tree is grown on a bootstrap sample with its own RNG. Per-tree seeds
//! are drawn up front from `random_state`, so the fitted forest does not
//! depend on how rayon schedules the work.

use ndarray::{Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::tree::{DecisionTree, TreeParams};
use super::{Classifier, ModelError, ModelResult};

// ============================================================================
// PARAMETERS
// ============================================================================

/// Features considered at each split
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxFeatures {
    #[default]
    Sqrt,
    Log2,
    #[serde(alias = "none")]
    All,
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let n = n_features as f64;
        let k = match self {
            MaxFeatures::Sqrt => n.sqrt().floor() as usize,
            MaxFeatures::Log2 => n.log2().floor() as usize,
            MaxFeatures::All => n_features,
        };
        k.clamp(1, n_features.max(1))
    }
}

impl std::fmt::Display for MaxFeatures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MaxFeatures::Sqrt => "sqrt",
            MaxFeatures::Log2 => "log2",
            MaxFeatures::All => "all",
        };
        f.write_str(name)
    }
}

/// Forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    /// Fixed seed for reproducible forests; fresh entropy when unset
    pub random_state: Option<u64>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            random_state: None,
        }
    }
}

impl ForestParams {
    /// Flat `name -> value` view for reports and experiment tracking
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let opt = |v: Option<String>| v.unwrap_or_else(|| "None".to_string());
        vec![
            ("n_estimators".into(), self.n_estimators.to_string()),
            ("max_depth".into(), opt(self.max_depth.map(|d| d.to_string()))),
            ("min_samples_split".into(), self.min_samples_split.to_string()),
            ("min_samples_leaf".into(), self.min_samples_leaf.to_string()),
            ("max_features".into(), self.max_features.to_string()),
            ("bootstrap".into(), self.bootstrap.to_string()),
            ("random_state".into(), opt(self.random_state.map(|s| s.to_string()))),
        ]
    }
}

// ============================================================================
// FOREST
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    n_features: usize,
    n_classes: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn fit(
        x: ArrayView2<f64>,
        y: &[usize],
        n_classes: usize,
        params: &ForestParams,
    ) -> ModelResult<Self> {
        let n = x.nrows();
        if n == 0 || n != y.len() {
            return Err(ModelError::InvalidInput(format!(
                "cannot fit forest on {} rows with {} targets",
                n,
                y.len()
            )));
        }
        if params.n_estimators == 0 {
            return Err(ModelError::InvalidInput("n_estimators must be at least 1".into()));
        }

        let mut rng = match params.random_state {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let seeds: Vec<u64> = (0..params.n_estimators).map(|_| rng.gen()).collect();

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            min_samples_leaf: params.min_samples_leaf,
            max_features: params.max_features.resolve(x.ncols()),
        };

        let started = std::time::Instant::now();
        let trees = seeds
            .par_iter()
            .map(|&seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                let sample: Vec<usize> = if params.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                DecisionTree::fit(x, y, n_classes, sample, &tree_params, &mut rng)
            })
            .collect::<ModelResult<Vec<_>>>()?;

        log::debug!(
            "Grew {} trees (max_features={}) in {:?}",
            trees.len(),
            tree_params.max_features,
            started.elapsed()
        );

        Ok(Self {
            params: params.clone(),
            n_features: x.ncols(),
            n_classes,
            trees,
        })
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub(crate) fn validate(&self) -> ModelResult<()> {
        if self.trees.is_empty() {
            return Err(ModelError::Corrupt("forest has no trees".into()));
        }
        for tree in &self.trees {
            if tree.n_features() != self.n_features || tree.n_classes() != self.n_classes {
                return Err(ModelError::Corrupt("tree shape differs from forest".into()));
            }
            tree.validate()?;
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Mean of the trees' leaf distributions
    fn predict_proba(&self, x: ArrayView2<f64>) -> ModelResult<Array2<f64>> {
        if x.ncols() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                actual: x.ncols(),
            });
        }

        let n_trees = self.trees.len() as f64;
        let mut proba = Array2::<f64>::zeros((x.nrows(), self.n_classes));
        for (row, mut out) in x.rows().into_iter().zip(proba.rows_mut()) {
            for tree in &self.trees {
                let dist = tree.predict_row(row)?;
                for (o, p) in out.iter_mut().zip(dist) {
                    *o += p;
                }
            }
            out.mapv_inplace(|v| v / n_trees);
        }
        Ok(proba)
    }
}

// ============================================================================
// TESTS
// ============================================================================
