use std::collections::BTreeSet;
use std::fmt;

use alzrisk_model::ModelError;
use serde::Serialize;
use thiserror::Error;

/// Position of a request in its lifecycle.
///
/// `Idle → Collecting → Submitted → Encoding → Scaling → Validating →
/// Predicting → Presenting`; a failure from `Submitted` onwards moves
/// straight to `ErrorPresenting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Idle,
    Collecting,
    Submitted,
    Encoding,
    Scaling,
    Validating,
    Predicting,
    Presenting,
    ErrorPresenting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Idle => "idle",
            Stage::Collecting => "collecting",
            Stage::Submitted => "submitted",
            Stage::Encoding => "encoding",
            Stage::Scaling => "scaling",
            Stage::Validating => "validating",
            Stage::Predicting => "predicting",
            Stage::Presenting => "presenting",
            Stage::ErrorPresenting => "error_presenting",
        };
        f.write_str(s)
    }
}

impl Stage {
    /// Stage a finished run settles in: `Presenting` on success,
    /// `ErrorPresenting` on any failure.
    pub fn settled<T>(result: &Result<T, PipelineError>) -> Stage {
        match result {
            Ok(_) => Stage::Presenting,
            Err(_) => Stage::ErrorPresenting,
        }
    }
}

/// Failure of one encode → scale → validate → predict run.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("{feature}: label {label:?} is not in the codebook")]
    UnknownLabel { feature: String, label: String },
    #[error("{0}: no value supplied")]
    MissingValue(String),
    #[error("{feature}: expected a {expected} value")]
    WrongValueKind {
        feature: String,
        expected: &'static str,
    },
    #[error("scaling failed: {0}")]
    Scaling(#[source] ModelError),
    #[error("Missing columns in input: {}", format_missing(.missing))]
    SchemaMismatch { missing: BTreeSet<String> },
    #[error("prediction failed: {0}")]
    Prediction(#[source] ModelError),
}

fn format_missing(missing: &BTreeSet<String>) -> String {
    let names: Vec<&str> = missing.iter().map(String::as_str).collect();
    format!("{{{}}}", names.join(", "))
}

impl PipelineError {
    /// Stage the run was in when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Input(_) => Stage::Submitted,
            PipelineError::UnknownLabel { .. }
            | PipelineError::MissingValue(_)
            | PipelineError::WrongValueKind { .. } => Stage::Encoding,
            PipelineError::Scaling(_) => Stage::Scaling,
            PipelineError::SchemaMismatch { .. } => Stage::Validating,
            PipelineError::Prediction(_) => Stage::Predicting,
        }
    }
}

/// A submitted form value that violates its control's constraints.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InputError {
    #[error("{feature}: {value:?} is not a number")]
    NotANumber { feature: String, value: String },
    #[error("{feature}: {value} is below the minimum of {min}")]
    BelowMinimum { feature: String, value: f64, min: f64 },
}
