//! Column-wise scalers exported from a fitted preprocessing step.

use serde::{Deserialize, Serialize};

use crate::{check_width, ModelError, Scaler};

fn default_true() -> bool {
    true
}

/// Standardization: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    #[serde(default)]
    pub feature_names_in: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub with_mean: bool,
    #[serde(default = "default_true")]
    pub with_std: bool,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self {
            mean,
            scale,
            feature_names_in: None,
            with_mean: true,
            with_std: true,
        }
    }

    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names_in = Some(names);
        self
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.mean.len() != self.scale.len() {
            return Err(format!(
                "mean has {} entries but scale has {}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if let Some(names) = &self.feature_names_in {
            if names.len() != self.mean.len() {
                return Err(format!(
                    "{} feature names for {} columns",
                    names.len(),
                    self.mean.len()
                ));
            }
        }
        if let Some(i) = self.scale.iter().position(|s| !s.is_finite() || *s == 0.0) {
            return Err(format!("scale[{i}] must be finite and non-zero"));
        }
        if let Some(i) = self.mean.iter().position(|m| !m.is_finite()) {
            return Err(format!("mean[{i}] must be finite"));
        }
        Ok(())
    }
}

impl Scaler for StandardScaler {
    fn feature_names_in(&self) -> Option<&[String]> {
        self.feature_names_in.as_deref()
    }

    fn n_features_in(&self) -> usize {
        self.mean.len()
    }

    fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError> {
        check_width(rows, self.n_features_in())?;
        Ok(rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(self.mean.iter().zip(&self.scale))
                    .map(|(&x, (&m, &s))| {
                        let centered = if self.with_mean { x - m } else { x };
                        if self.with_std {
                            centered / s
                        } else {
                            centered
                        }
                    })
                    .collect()
            })
            .collect())
    }
}

/// Range scaling: `x * scale + min`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub scale: Vec<f64>,
    pub min: Vec<f64>,
    #[serde(default)]
    pub feature_names_in: Option<Vec<String>>,
}

impl MinMaxScaler {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.scale.len() != self.min.len() {
            return Err(format!(
                "scale has {} entries but min has {}",
                self.scale.len(),
                self.min.len()
            ));
        }
        if let Some(names) = &self.feature_names_in {
            if names.len() != self.scale.len() {
                return Err(format!(
                    "{} feature names for {} columns",
                    names.len(),
                    self.scale.len()
                ));
            }
        }
        if self
            .scale
            .iter()
            .chain(&self.min)
            .any(|v| !v.is_finite())
        {
            return Err("scale and min must be finite".into());
        }
        Ok(())
    }
}

impl Scaler for MinMaxScaler {
    fn feature_names_in(&self) -> Option<&[String]> {
        self.feature_names_in.as_deref()
    }

    fn n_features_in(&self) -> usize {
        self.scale.len()
    }

    fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, ModelError> {
        check_width(rows, self.n_features_in())?;
        Ok(rows
            .iter()
            .map(|row| {
                row.iter()
                    .zip(self.scale.iter().zip(&self.min))
                    .map(|(&x, (&s, &m))| x * s + m)
                    .collect()
            })
            .collect())
    }
}
