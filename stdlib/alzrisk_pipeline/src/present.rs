//! Presentation of a finished run: tables, probability line, verdict.

use std::fmt::Write as _;

use serde::Serialize;

use crate::encode::EncodedVector;
use crate::error::{InputError, PipelineError};
use crate::input::RangeNotice;
use crate::predict::Prediction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BannerStyle {
    Success,
    Error,
}

impl BannerStyle {
    pub fn css_class(&self) -> &'static str {
        match self {
            BannerStyle::Success => "success",
            BannerStyle::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub style: BannerStyle,
    pub message: String,
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            style: BannerStyle::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            style: BannerStyle::Error,
            message: message.into(),
        }
    }
}

pub const POSITIVE_VERDICT: &str = "Patient is suspected of having Alzheimer's";
pub const NEGATIVE_VERDICT: &str = "Patient does not show signs of Alzheimer's";

/// Positive verdicts are error-styled, negative ones success-styled.
pub fn verdict(prediction: &Prediction) -> Banner {
    if prediction.is_positive() {
        Banner::error(POSITIVE_VERDICT)
    } else {
        Banner::success(NEGATIVE_VERDICT)
    }
}

pub fn probability_line(prediction: &Prediction) -> String {
    format!(
        "Probability: No Alzheimer's = {:.4}, Alzheimer's = {:.4}",
        prediction.probabilities.no_alzheimers, prediction.probabilities.alzheimers
    )
}

/// Banner for a failed run. Schema mismatches keep their own wording; every
/// other failure gets the generic message with the error text.
pub fn error_banner(err: &PipelineError) -> Banner {
    match err {
        PipelineError::SchemaMismatch { .. } => Banner::error(err.to_string()),
        other => Banner::error(format!(
            "An error occurred while processing the data: {other}"
        )),
    }
}

pub fn input_error_banner(err: &InputError) -> Banner {
    Banner::error(format!(
        "An error occurred while processing the data: {err}"
    ))
}

/// Everything shown after a successful run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionReport {
    pub before_scaling: EncodedVector,
    pub after_scaling: EncodedVector,
    pub prediction: Prediction,
    pub probability_line: String,
    pub verdict: Banner,
    pub notices: Vec<RangeNotice>,
}

impl PredictionReport {
    pub fn new(
        before_scaling: EncodedVector,
        after_scaling: EncodedVector,
        prediction: Prediction,
        notices: Vec<RangeNotice>,
    ) -> Self {
        Self {
            probability_line: probability_line(&prediction),
            verdict: verdict(&prediction),
            before_scaling,
            after_scaling,
            prediction,
            notices,
        }
    }
}

fn write_table(out: &mut String, title: &str, vector: &EncodedVector) {
    let width = vector
        .columns()
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0);
    let _ = writeln!(out, "{title}");
    for (column, value) in vector.iter() {
        let _ = writeln!(out, "  {column:<width$}  {value}");
    }
}

/// Plain-text rendering for terminals.
pub fn render_text(report: &PredictionReport) -> String {
    let mut out = String::new();
    write_table(&mut out, "Input data before scaling:", &report.before_scaling);
    out.push('\n');
    write_table(&mut out, "Data after scaling:", &report.after_scaling);
    out.push('\n');
    if !report.notices.is_empty() {
        out.push_str("Notices:\n");
        for notice in &report.notices {
            let _ = writeln!(out, "  {}", notice.message());
        }
        out.push('\n');
    }
    let _ = writeln!(out, "{}", report.probability_line);
    let marker = match report.verdict.style {
        BannerStyle::Error => "[!]",
        BannerStyle::Success => "[ok]",
    };
    let _ = writeln!(out, "{marker} {}", report.verdict.message);
    out
}
