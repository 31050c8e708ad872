use serde::{Deserialize, Serialize};

use crate::{check_width, Classifier, ModelError};

/// Logistic regression. Binary models carry one coefficient row and use a
/// sigmoid; multi-class models carry one row per class and use a softmax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub classes: Vec<i64>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    #[serde(default)]
    pub feature_names_in: Option<Vec<String>>,
}

impl LogisticRegression {
    /// Structural checks run when the model is loaded from an artifact.
    pub fn validate(&self) -> Result<(), String> {
        let expected_rows = if self.classes.len() == 2 {
            1
        } else {
            self.classes.len()
        };
        if self.classes.len() < 2 {
            return Err("need at least two classes".into());
        }
        if self.coef.len() != expected_rows || self.intercept.len() != expected_rows {
            return Err(format!(
                "expected {expected_rows} coefficient rows and intercepts for {} classes",
                self.classes.len()
            ));
        }
        let width = self.n_features_in();
        if self.coef.iter().any(|row| row.len() != width) {
            return Err("coefficient rows differ in width".into());
        }
        if let Some(names) = &self.feature_names_in {
            if names.len() != width {
                return Err(format!("{} feature names for {width} coefficients", names.len()));
            }
        }
        Ok(())
    }

    fn decision(&self, row: &[f64]) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(w, b)| w.iter().zip(row).map(|(w, x)| w * x).sum::<f64>() + b)
            .collect()
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn softmax(z: &[f64]) -> Vec<f64> {
    let max = z.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = z.iter().map(|v| (v - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

impl Classifier for LogisticRegression {
    fn feature_names_in(&self) -> Option<&[String]> {
        self.feature_names_in.as_deref()
    }

    fn n_features_in(&self) -> usize {
        self.coef.first().map_or(0, Vec::len)
    }

    fn classes(&self) -> &[i64] {
        &self.classes
    }

    fn predict_proba(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError> {
        check_width(rows, self.n_features_in())?;
        rows.iter()
            .map(|row| -> Result<Vec<f64>, ModelError> {
                let z = self.decision(row);
                if self.classes.len() != 2 {
                    return Ok(softmax(&z));
                }
                let &[z0] = z.as_slice() else {
                    return Err(ModelError::ClassCount {
                        expected: 1,
                        found: z.len(),
                    });
                };
                let p = sigmoid(z0);
                Ok(vec![1.0 - p, p])
            })
            .collect()
    }
}
