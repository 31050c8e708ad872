use serde::{Deserialize, Serialize};

/// Ordered label-to-code mapping for one categorical feature.
///
/// Labels keep their declaration order; the first label is the default
/// choice offered by the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Codebook {
    entries: Vec<(String, i64)>,
}

impl Codebook {
    pub fn new<L: Into<String>>(entries: impl IntoIterator<Item = (L, i64)>) -> Self {
        Self {
            entries: entries.into_iter().map(|(l, c)| (l.into(), c)).collect(),
        }
    }

    /// The two-valued `No`/`Yes` codebook shared by the clinical flags.
    pub fn yes_no() -> Self {
        Self::new([("No", 0), ("Yes", 1)])
    }

    pub fn code(&self, label: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, c)| *c)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn entries(&self) -> &[(String, i64)] {
        &self.entries
    }

    pub fn default_label(&self) -> Option<&str> {
        self.entries.first().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Documented clinical range for a numeric field. Advisory only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidRange {
    pub min: f64,
    pub max: f64,
}

impl ValidRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Input hints for a continuous feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericField {
    /// Lower bound enforced by the numeric control.
    pub min: f64,
    pub step: f64,
    pub placeholder: String,
    pub caption: Option<String>,
    pub valid_range: Option<ValidRange>,
}

impl NumericField {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            min: 0.0,
            step: 0.1,
            placeholder: placeholder.into(),
            caption: None,
            valid_range: None,
        }
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.valid_range = Some(ValidRange::new(min, max));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeatureKind {
    Categorical { codebook: Codebook },
    Numeric { field: NumericField },
}

/// One named slot of the feature schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDescriptor {
    pub name: String,
    #[serde(flatten)]
    pub kind: FeatureKind,
}

impl FeatureDescriptor {
    pub fn categorical(name: impl Into<String>, codebook: Codebook) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Categorical { codebook },
        }
    }

    pub fn numeric(name: impl Into<String>, field: NumericField) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Numeric { field },
        }
    }

    pub fn codebook(&self) -> Option<&Codebook> {
        match &self.kind {
            FeatureKind::Categorical { codebook } => Some(codebook),
            FeatureKind::Numeric { .. } => None,
        }
    }

    pub fn numeric_field(&self) -> Option<&NumericField> {
        match &self.kind {
            FeatureKind::Numeric { field } => Some(field),
            FeatureKind::Categorical { .. } => None,
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self.kind, FeatureKind::Categorical { .. })
    }
}
