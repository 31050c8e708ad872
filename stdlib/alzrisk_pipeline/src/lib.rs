//! Encode → scale → validate → predict → present, for one patient record.
//!
//! Each run is independent: nothing survives a submission apart from the
//! shared, read-only [`Pipeline`]. Failures come back as a typed
//! [`PipelineError`] that the presentation layer matches on.

pub mod encode;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod predict;
pub mod present;

pub use encode::{encode, encode_and_scale, scale, EncodedVector};
pub use error::{InputError, PipelineError, Stage};
pub use input::{range_notices, InputRecord, RangeNotice, RawValue};
pub use pipeline::Pipeline;
pub use predict::{check_classes, missing_columns, predict, Prediction, ProbabilityPair};
pub use present::{
    error_banner, input_error_banner, render_text, Banner, BannerStyle, PredictionReport,
};
