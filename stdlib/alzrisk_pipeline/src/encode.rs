//! Encoding and scaling of an input record into the model's feature row.

use alzrisk_model::Scaler;
use alzrisk_schema::{FeatureKind, FeatureSchema};
use serde::Serialize;

use crate::error::PipelineError;
use crate::input::{InputRecord, RawValue};

/// Single-row table whose columns follow the schema order exactly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncodedVector {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl EncodedVector {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.position(column).map(|i| self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    #[cfg(test)]
    pub(crate) fn without_column(&self, column: &str) -> Self {
        let (columns, values) = self
            .iter()
            .filter(|(c, _)| *c != column)
            .map(|(c, v)| (c.to_string(), v))
            .unzip();
        Self { columns, values }
    }
}

/// Walks the schema in order and substitutes codebook codes for labels.
pub fn encode(schema: &FeatureSchema, record: &InputRecord) -> Result<EncodedVector, PipelineError> {
    let mut columns = Vec::with_capacity(schema.len());
    let mut values = Vec::with_capacity(schema.len());

    for feature in schema.features() {
        let raw = record
            .get(&feature.name)
            .ok_or_else(|| PipelineError::MissingValue(feature.name.clone()))?;
        let value = match (&feature.kind, raw) {
            (FeatureKind::Categorical { codebook }, RawValue::Label(label)) => {
                codebook.code(label).ok_or_else(|| PipelineError::UnknownLabel {
                    feature: feature.name.clone(),
                    label: label.clone(),
                })? as f64
            }
            (FeatureKind::Categorical { .. }, RawValue::Number(_)) => {
                return Err(PipelineError::WrongValueKind {
                    feature: feature.name.clone(),
                    expected: "label",
                });
            }
            (FeatureKind::Numeric { .. }, RawValue::Number(v)) => *v,
            (FeatureKind::Numeric { .. }, RawValue::Label(_)) => {
                return Err(PipelineError::WrongValueKind {
                    feature: feature.name.clone(),
                    expected: "numeric",
                });
            }
        };
        columns.push(feature.name.clone());
        values.push(value);
    }

    log::debug!("encoded {} columns", values.len());
    Ok(EncodedVector { columns, values })
}

/// Replaces the numeric-subset columns with their scaled values. Categorical
/// columns are copied through untouched.
pub fn scale(
    schema: &FeatureSchema,
    vector: &EncodedVector,
    scaler: &dyn Scaler,
) -> Result<EncodedVector, PipelineError> {
    let numeric = schema.numeric_names();
    let positions: Vec<usize> = numeric
        .iter()
        .map(|name| {
            vector
                .position(name)
                .ok_or_else(|| PipelineError::MissingValue(name.to_string()))
        })
        .collect::<Result<_, _>>()?;

    scaler
        .check_feature_names(&numeric)
        .map_err(PipelineError::Scaling)?;
    let raw: Vec<f64> = positions.iter().map(|&i| vector.values[i]).collect();
    let scaled = scaler
        .transform(&[raw])
        .map_err(PipelineError::Scaling)?
        .into_iter()
        .next()
        .unwrap_or_default();

    if scaled.len() != positions.len() {
        return Err(PipelineError::Scaling(
            alzrisk_model::ModelError::ShapeMismatch {
                expected: positions.len(),
                found: scaled.len(),
            },
        ));
    }
    if let Some(i) = scaled.iter().position(|v| !v.is_finite()) {
        return Err(PipelineError::Scaling(
            alzrisk_model::ModelError::NonFinite { column: positions[i] },
        ));
    }

    let mut out = vector.clone();
    for (&i, v) in positions.iter().zip(scaled) {
        out.values[i] = v;
    }
    log::debug!("scaled {} numeric columns", positions.len());
    Ok(out)
}

pub fn encode_and_scale(
    schema: &FeatureSchema,
    record: &InputRecord,
    scaler: &dyn Scaler,
) -> Result<EncodedVector, PipelineError> {
    let encoded = encode(schema, record)?;
    scale(schema, &encoded, scaler)
}
