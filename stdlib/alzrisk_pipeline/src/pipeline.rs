use std::sync::Arc;

use alzrisk_model::Artifacts;
use alzrisk_schema::FeatureSchema;

use crate::encode::{encode, scale};
use crate::error::{PipelineError, Stage};
use crate::input::{range_notices, InputRecord};
use crate::predict::predict;
use crate::present::PredictionReport;

/// Schema plus loaded artifacts. Immutable once built and shared across
/// requests.
#[derive(Debug, Clone)]
pub struct Pipeline {
    schema: Arc<FeatureSchema>,
    artifacts: Artifacts,
}

impl Pipeline {
    pub fn new(schema: Arc<FeatureSchema>, artifacts: Artifacts) -> Self {
        Self { schema, artifacts }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn artifacts(&self) -> &Artifacts {
        &self.artifacts
    }

    /// Runs one submission to completion. Records that did not come through
    /// the form are held to the same numeric control constraints first.
    pub fn run(&self, record: &InputRecord) -> Result<PredictionReport, PipelineError> {
        let result = self.run_stages(record);
        match &result {
            Ok(report) => log::info!(
                "stage={} label={} p={:.4}",
                Stage::settled(&result),
                report.prediction.label,
                report.prediction.probabilities.alzheimers
            ),
            Err(err) => log::error!(
                "stage={} failed in {}: {err}",
                Stage::settled(&result),
                err.stage()
            ),
        }
        result
    }

    fn run_stages(&self, record: &InputRecord) -> Result<PredictionReport, PipelineError> {
        log::debug!("stage={}", Stage::Submitted);
        record.check_controls(&self.schema)?;

        log::debug!("stage={}", Stage::Encoding);
        let before = encode(&self.schema, record)?;

        log::debug!("stage={}", Stage::Scaling);
        let after = scale(&self.schema, &before, self.artifacts.scaler.as_ref())?;

        log::debug!("stage={} then {}", Stage::Validating, Stage::Predicting);
        let prediction = predict(self.artifacts.classifier.as_ref(), &after)?;

        let notices = range_notices(&self.schema, record);
        Ok(PredictionReport::new(before, after, prediction, notices))
    }
}
