//! Decision Tree - CART classifier with Gini impurity
//!
//! Nodes live in a flat vector and refer to their children by index, which
//! keeps the serialized form shallow no matter how deep the tree grows.
//! A sample goes left when `x[feature] <= threshold`.

use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::{ModelError, ModelResult};

/// Growth limits for one tree
#[derive(Debug, Clone, PartialEq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features examined per split (already resolved against the input width)
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Leaf {
        /// Class probabilities of the training samples that reached this leaf
        distribution: Vec<f64>,
        samples: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    n_features: usize,
    n_classes: usize,
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

// ============================================================================
// FITTING
// ============================================================================

impl DecisionTree {
    /// Grow a tree on the rows listed in `sample`
    ///
    /// `sample` may repeat rows (bootstrap draws); repeats count as extra weight.
    pub fn fit(
        x: ArrayView2<f64>,
        y: &[usize],
        n_classes: usize,
        sample: Vec<usize>,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> ModelResult<Self> {
        if sample.is_empty() {
            return Err(ModelError::InvalidInput("cannot grow a tree on zero samples".into()));
        }
        if x.nrows() != y.len() {
            return Err(ModelError::InvalidInput(format!(
                "{} rows but {} targets",
                x.nrows(),
                y.len()
            )));
        }
        if let Some(&bad) = y.iter().find(|&&c| c >= n_classes) {
            return Err(ModelError::InvalidInput(format!(
                "target {} outside {} classes",
                bad, n_classes
            )));
        }

        let mut builder = Builder {
            x,
            y,
            n_classes,
            params,
            nodes: Vec::new(),
        };
        let mut indices = sample;
        builder.grow(&mut indices, 0, rng);

        Ok(Self {
            n_features: x.ncols(),
            n_classes,
            nodes: builder.nodes,
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }

    /// Longest root-to-leaf path, in edges
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            match self.nodes.get(id) {
                Some(TreeNode::Split { left, right, .. }) => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
                Some(TreeNode::Leaf { .. }) => max_depth = max_depth.max(depth),
                None => {}
            }
        }
        max_depth
    }

    /// Leaf distribution for one row
    pub fn predict_row(&self, row: ArrayView1<f64>) -> ModelResult<&[f64]> {
        let mut id = 0;
        loop {
            match self.nodes.get(id) {
                Some(TreeNode::Leaf { distribution, .. }) => return Ok(distribution),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = row.get(*feature).ok_or(ModelError::ShapeMismatch {
                        expected: self.n_features,
                        actual: row.len(),
                    })?;
                    id = if *value <= *threshold { *left } else { *right };
                }
                None => return Err(ModelError::Corrupt(format!("tree node {} missing", id))),
            }
        }
    }

    /// Structural checks for trees read from disk
    pub(crate) fn validate(&self) -> ModelResult<()> {
        if self.nodes.is_empty() {
            return Err(ModelError::Corrupt("tree has no nodes".into()));
        }
        for (id, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Leaf { distribution, .. } if distribution.len() != self.n_classes => {
                    return Err(ModelError::Corrupt(format!(
                        "leaf {} has {} classes, expected {}",
                        id,
                        distribution.len(),
                        self.n_classes
                    )));
                }
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    // children are always pushed after their parent
                    if *feature >= self.n_features
                        || *left <= id
                        || *right <= id
                        || *left >= self.nodes.len()
                        || *right >= self.nodes.len()
                    {
                        return Err(ModelError::Corrupt(format!("split node {} is malformed", id)));
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }
}

struct Builder<'x, 'a> {
    x: ArrayView2<'x, f64>,
    y: &'a [usize],
    n_classes: usize,
    params: &'a TreeParams,
    nodes: Vec<TreeNode>,
}

impl Builder<'_, '_> {
    /// Returns the id of the node created for `indices`
    fn grow(&mut self, indices: &mut [usize], depth: usize, rng: &mut StdRng) -> usize {
        let counts = self.class_counts(indices);
        let node_id = self.nodes.len();
        self.nodes.push(leaf(&counts, indices.len()));

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let at_max_depth = self.params.max_depth.map_or(false, |max| depth >= max);
        if pure
            || at_max_depth
            || indices.len() < self.params.min_samples_split
            || indices.len() < 2 * self.params.min_samples_leaf
        {
            return node_id;
        }

        let Some(split) = self.best_split(indices, &counts, rng) else {
            return node_id;
        };

        self.sort_by_feature(indices, split.feature);
        let n_left = indices
            .iter()
            .take_while(|&&i| self.x[[i, split.feature]] <= split.threshold)
            .count();
        let (left_rows, right_rows) = indices.split_at_mut(n_left);

        let left = self.grow(left_rows, depth + 1, rng);
        let right = self.grow(right_rows, depth + 1, rng);
        self.nodes[node_id] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_id
    }

    /// Looks at `max_features` random features, and keeps going through the
    /// rest only while none of them allowed a valid split.
    fn best_split(
        &self,
        indices: &mut [usize],
        parent: &[usize],
        rng: &mut StdRng,
    ) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..self.x.ncols()).collect();
        features.shuffle(rng);

        let mut best: Option<SplitCandidate> = None;
        for (visited, &feature) in features.iter().enumerate() {
            if visited >= self.params.max_features && best.is_some() {
                break;
            }
            if let Some(candidate) = self.best_split_on(indices, feature, parent) {
                if best.map_or(true, |b| candidate.impurity < b.impurity) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    fn best_split_on(
        &self,
        indices: &mut [usize],
        feature: usize,
        parent: &[usize],
    ) -> Option<SplitCandidate> {
        self.sort_by_feature(indices, feature);

        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf;
        let mut left = vec![0usize; self.n_classes];
        let mut right = parent.to_vec();
        let mut best: Option<SplitCandidate> = None;

        for pos in 0..n - 1 {
            let class = self.y[indices[pos]];
            left[class] += 1;
            right[class] -= 1;

            let n_left = pos + 1;
            let n_right = n - n_left;
            if n_left < min_leaf || n_right < min_leaf {
                continue;
            }

            let value = self.x[[indices[pos], feature]];
            let next = self.x[[indices[pos + 1], feature]];
            if next <= value {
                continue;
            }

            let impurity = (n_left as f64 * gini(&left, n_left)
                + n_right as f64 * gini(&right, n_right))
                / n as f64;

            if best.map_or(true, |b| impurity < b.impurity) {
                let mut threshold = value + (next - value) / 2.0;
                if threshold >= next || !threshold.is_finite() {
                    threshold = value;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    impurity,
                });
            }
        }

        best
    }

    fn sort_by_feature(&self, indices: &mut [usize], feature: usize) {
        let x = self.x;
        indices.sort_unstable_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in indices {
            counts[self.y[i]] += 1;
        }
        counts
    }
}

fn leaf(counts: &[usize], samples: usize) -> TreeNode {
    let total = samples.max(1) as f64;
    TreeNode::Leaf {
        distribution: counts.iter().map(|&c| c as f64 / total).collect(),
        samples,
    }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::SeedableRng;

    fn params(max_depth: Option<usize>) -> TreeParams {
        TreeParams {
            max_depth,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: 2,
        }
    }

    #[test]
    fn test_gini() {
        assert_eq!(gini(&[4, 0], 4), 0.0);
        assert!((gini(&[2, 2], 4) - 0.5).abs() < 1e-12);
        assert_eq!(gini(&[0, 0], 0), 0.0);
    }

    #[test]
    fn test_separable_data_is_learned() {
        let x = array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0], [10.0, 0.0], [11.0, 0.0], [12.0, 0.0]];
        let y = vec![0, 0, 0, 1, 1, 1];
        let mut rng = StdRng::seed_from_u64(1);
        let tree = DecisionTree::fit(x.view(), &y, 2, (0..6).collect(), &params(None), &mut rng).unwrap();

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.n_leaves(), 2);
        for (row, &target) in x.rows().into_iter().zip(&y) {
            let dist = tree.predict_row(row).unwrap();
            assert_eq!(dist[target], 1.0);
        }

        // threshold sits halfway between 3 and 10
        let probe = array![6.5, 0.0];
        assert_eq!(tree.predict_row(probe.view()).unwrap(), &[1.0, 0.0]);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]];
        let y = vec![0, 1, 0, 1, 0, 1];
        let mut rng = StdRng::seed_from_u64(3);
        let tree = DecisionTree::fit(x.view(), &y, 2, (0..6).collect(), &params(Some(1)), &mut rng).unwrap();

        assert!(tree.depth() <= 1);
        for row in x.rows() {
            let dist = tree.predict_row(row).unwrap();
            assert!((dist.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_constant_features_give_single_leaf() {
        let x = array![[1.0, 1.0], [1.0, 1.0], [1.0, 1.0]];
        let y = vec![0, 1, 1];
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(x.view(), &y, 2, vec![0, 1, 2], &params(None), &mut rng).unwrap();

        assert_eq!(tree.node_count(), 1);
        let dist = tree.predict_row(x.row(0)).unwrap();
        assert!((dist[1] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = vec![0, 1, 1, 1];
        let p = TreeParams {
            min_samples_leaf: 2,
            ..params(None)
        };
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(x.view(), &y, 2, (0..4).collect(), &p, &mut rng).unwrap();

        for node in &tree.nodes {
            if let TreeNode::Leaf { samples, .. } = node {
                assert!(*samples >= 2);
            }
        }
    }

    #[test]
    fn test_repeated_samples_weigh_more() {
        let x = array![[0.0], [0.0]];
        let y = vec![0, 1];
        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(x.view(), &y, 2, vec![0, 0, 0, 1], &params(None), &mut rng).unwrap();
        assert_eq!(tree.predict_row(x.row(0)).unwrap(), &[0.75, 0.25]);
    }

    #[test]
    fn test_rejects_bad_targets() {
        let x = array![[0.0], [1.0]];
        let mut rng = StdRng::seed_from_u64(0);
        assert!(DecisionTree::fit(x.view(), &[0, 2], 2, vec![0, 1], &params(None), &mut rng).is_err());
        assert!(DecisionTree::fit(x.view(), &[0, 1], 2, vec![], &params(None), &mut rng).is_err());
    }

    #[test]
    fn test_validate_catches_bad_children() {
        let tree = DecisionTree {
            n_features: 1,
            n_classes: 2,
            nodes: vec![TreeNode::Split {
                feature: 0,
                threshold: 0.5,
                left: 0,
                right: 7,
            }],
        };
        assert!(matches!(tree.validate(), Err(ModelError::Corrupt(_))));
    }
}
