//! Random forest classifier over flattened decision trees.
//!
//! Each tree is stored as parallel node arrays, the layout tree learners
//! export: node `i` splits on `feature[i]` at `threshold[i]`, descending to
//! `children_left[i]` when `x[feature] <= threshold` and to
//! `children_right[i]` otherwise. A node whose left child is `-1` is a leaf;
//! `value[i]` then holds per-class weights (counts or fractions).

use serde::{Deserialize, Serialize};

use crate::{check_width, Classifier, ModelError};

pub const LEAF: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    /// A single-leaf tree that always votes `value`.
    pub fn leaf(value: Vec<f64>) -> Self {
        Self {
            children_left: vec![LEAF],
            children_right: vec![LEAF],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![value],
        }
    }

    /// A depth-one tree splitting on `feature` at `threshold`.
    pub fn stump(feature: usize, threshold: f64, left: Vec<f64>, right: Vec<f64>) -> Self {
        Self {
            children_left: vec![1, LEAF, LEAF],
            children_right: vec![2, LEAF, LEAF],
            feature: vec![feature as i64, -2, -2],
            threshold: vec![threshold, -2.0, -2.0],
            value: vec![vec![0.0; left.len()], left, right],
        }
    }

    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err("node arrays differ in length".into());
        }
        for i in 0..n {
            let (l, r) = (self.children_left[i], self.children_right[i]);
            if l == LEAF {
                if r != LEAF {
                    return Err(format!("node {i} has only a right child"));
                }
                let v = &self.value[i];
                if v.len() != n_classes {
                    return Err(format!(
                        "leaf {i} has {} class weights, expected {n_classes}",
                        v.len()
                    ));
                }
                let total: f64 = v.iter().sum();
                if v.iter().any(|w| !w.is_finite() || *w < 0.0) || total <= 0.0 {
                    return Err(format!("leaf {i} has invalid class weights"));
                }
                continue;
            }
            // Children always come after their parent, so traversal terminates.
            for child in [l, r] {
                if child <= i as i64 || child >= n as i64 {
                    return Err(format!("node {i} has out-of-order child {child}"));
                }
            }
            let f = self.feature[i];
            if f < 0 || f as usize >= n_features {
                return Err(format!("node {i} splits on unknown feature {f}"));
            }
            if !self.threshold[i].is_finite() {
                return Err(format!("node {i} has a non-finite threshold"));
            }
        }
        Ok(())
    }

    /// Leaf reached by `row`. A node pointing at a missing feature or child,
    /// or back up the tree, fails with [`ModelError::MalformedTree`].
    pub fn apply(&self, row: &[f64]) -> Result<usize, ModelError> {
        let mut node = 0usize;
        loop {
            let malformed = ModelError::MalformedTree { node };
            let left = *self.children_left.get(node).ok_or(malformed.clone())?;
            if left == LEAF {
                return Ok(node);
            }
            let x = self
                .feature
                .get(node)
                .and_then(|&f| usize::try_from(f).ok())
                .and_then(|f| row.get(f))
                .ok_or(malformed.clone())?;
            let threshold = self.threshold.get(node).ok_or(malformed.clone())?;
            let next = if x <= threshold {
                left
            } else {
                *self.children_right.get(node).ok_or(malformed.clone())?
            };
            // Children come after their parent, so descent terminates.
            if next <= node as i64 {
                return Err(malformed);
            }
            node = next as usize;
        }
    }

    /// Normalised class distribution at the leaf reached by `row`.
    pub fn predict_proba_row(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        let leaf = self.apply(row)?;
        let v = self
            .value
            .get(leaf)
            .ok_or(ModelError::MalformedTree { node: leaf })?;
        let total: f64 = v.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(ModelError::MalformedTree { node: leaf });
        }
        Ok(v.iter().map(|w| w / total).collect())
    }
}

/// Soft-voting ensemble: class probabilities are the mean of per-tree
/// leaf distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub classes: Vec<i64>,
    pub n_features_in: usize,
    #[serde(default)]
    pub feature_names_in: Option<Vec<String>>,
    pub estimators: Vec<DecisionTree>,
}

impl RandomForest {
    /// Structural checks run when the forest is loaded from an artifact.
    pub fn validate(&self) -> Result<(), String> {
        if self.classes.is_empty() {
            return Err("no classes".into());
        }
        if self.estimators.is_empty() {
            return Err("forest has no estimators".into());
        }
        if let Some(names) = &self.feature_names_in {
            if names.len() != self.n_features_in {
                return Err(format!(
                    "{} feature names but n_features_in is {}",
                    names.len(),
                    self.n_features_in
                ));
            }
        }
        for (i, tree) in self.estimators.iter().enumerate() {
            tree.validate(self.n_features_in, self.classes.len())
                .map_err(|e| format!("estimator {i}: {e}"))?;
        }
        Ok(())
    }
}

impl Classifier for RandomForest {
    fn feature_names_in(&self) -> Option<&[String]> {
        self.feature_names_in.as_deref()
    }

    fn n_features_in(&self) -> usize {
        self.n_features_in
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict_proba(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError> {
        check_width(rows, self.n_features_in)?;
        let n_trees = self.estimators.len() as f64;
        rows.iter()
            .map(|row| -> Result<Vec<f64>, ModelError> {
                let mut acc = vec![0.0; self.classes.len()];
                for tree in &self.estimators {
                    let p = tree.predict_proba_row(row)?;
                    if p.len() != acc.len() {
                        return Err(ModelError::ClassCount {
                            expected: acc.len(),
                            found: p.len(),
                        });
                    }
                    for (a, p) in acc.iter_mut().zip(p) {
                        *a += p;
                    }
                }
                Ok(acc.iter().map(|a| a / n_trees).collect())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn two_stump_forest() -> RandomForest {
        RandomForest {
            classes: vec![0, 1],
            n_features_in: 2,
            feature_names_in: None,
            estimators: vec![
                // low x0 -> positive
                DecisionTree::stump(0, 0.0, vec![10.0, 30.0], vec![35.0, 5.0]),
                // high x1 -> positive
                DecisionTree::stump(1, 0.5, vec![0.9, 0.1], vec![0.2, 0.8]),
            ],
        }
    }

    #[test]
    fn stump_routes_on_less_or_equal() {
        let tree = DecisionTree::stump(0, 1.0, vec![1.0, 0.0], vec![0.0, 1.0]);
        assert_eq!(tree.apply(&[1.0]), Ok(1));
        assert_eq!(tree.apply(&[1.0000001]), Ok(2));
    }

    #[test]
    fn unvalidated_tree_fails_instead_of_panicking() {
        let tree = DecisionTree::stump(7, 0.0, vec![1.0, 0.0], vec![0.0, 1.0]);
        assert_eq!(tree.apply(&[0.5]), Err(ModelError::MalformedTree { node: 0 }));

        let mut cyclic = DecisionTree::stump(0, 0.0, vec![1.0, 0.0], vec![0.0, 1.0]);
        cyclic.children_left[0] = 0;
        assert_eq!(cyclic.apply(&[-1.0]), Err(ModelError::MalformedTree { node: 0 }));

        let forest = RandomForest {
            classes: vec![0, 1],
            n_features_in: 1,
            feature_names_in: None,
            estimators: vec![
                DecisionTree::stump(0, 0.0, vec![1.0, 0.0], vec![0.0, 1.0]),
                DecisionTree::leaf(vec![0.0, 0.0]),
            ],
        };
        assert_eq!(
            forest.predict_proba(&[vec![1.0]]),
            Err(ModelError::MalformedTree { node: 0 })
        );
    }

    #[test]
    fn forest_averages_normalised_leaf_values() {
        let forest = two_stump_forest();
        forest.validate().unwrap();
        let p = forest.predict_proba(&[vec![-1.0, 1.0]]).unwrap();
        // tree 0: [0.25, 0.75], tree 1: [0.2, 0.8]
        assert!((p[0][0] - 0.225).abs() < 1e-12);
        assert!((p[0][1] - 0.775).abs() < 1e-12);
        assert_eq!(forest.predict(&[vec![-1.0, 1.0]]).unwrap(), vec![1]);
        assert_eq!(forest.predict(&[vec![1.0, 0.0]]).unwrap(), vec![0]);
    }

    #[test]
    fn validation_rejects_backward_child_and_bad_feature() {
        let mut tree = DecisionTree::stump(0, 0.0, vec![1.0, 0.0], vec![0.0, 1.0]);
        tree.children_left[0] = 0;
        assert!(tree.validate(1, 2).unwrap_err().contains("out-of-order"));

        let tree = DecisionTree::stump(3, 0.0, vec![1.0, 0.0], vec![0.0, 1.0]);
        assert!(tree.validate(2, 2).unwrap_err().contains("unknown feature"));
    }

    #[test]
    fn validation_rejects_leaf_with_wrong_class_count() {
        let tree = DecisionTree::leaf(vec![1.0, 1.0, 1.0]);
        assert!(tree.validate(1, 2).is_err());
        let tree = DecisionTree::leaf(vec![0.0, 0.0]);
        assert!(tree.validate(1, 2).is_err());
    }

    proptest! {
        #[test]
        fn probabilities_sum_to_one(x0 in -5.0f64..5.0, x1 in -5.0f64..5.0) {
            let forest = two_stump_forest();
            let p = forest.predict_proba(&[vec![x0, x1]]).unwrap();
            prop_assert!((p[0].iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }
}
