use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of samples in one simulated day (one per second).
pub const SAMPLES_PER_DAY: usize = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: i64, // ms since epoch
    pub value: f64,
}

/// One day of generated samples, in timestamp order.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSeries {
    pub start_ms: i64,
    pub points: Vec<DataPoint>,
}

impl SampleSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&DataPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&DataPoint> {
        self.points.last()
    }
}

/// Resource sent to the time series store on create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesDescriptor {
    pub external_id: String,
    pub name: String,
    pub description: String,
    pub data_set_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failure,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RunStatus::Success => write!(f, "success"),
            RunStatus::Failure => write!(f, "failure"),
        }
    }
}

/// Outcome of the compute/publish phase, forwarded to the status sink.
#[derive(Debug, Clone, PartialEq)]
pub enum RunResult {
    Success { message: String },
    Failure { message: String, error: String },
}

impl RunResult {
    pub fn status(&self) -> RunStatus {
        match self {
            RunResult::Success { .. } => RunStatus::Success,
            RunResult::Failure { .. } => RunStatus::Failure,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            RunResult::Success { message } => message,
            RunResult::Failure { message, .. } => message,
        }
    }
}

/// Invocation payload handed to the function by its runtime.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_id: Option<String>,
    /// Key set by the CDF functions runtime.
    #[serde(rename = "ExtractionPipelineExtId", default, skip_serializing_if = "Option::is_none")]
    pub extraction_pipeline_ext_id: Option<String>,
}

impl InvocationPayload {
    /// Pipeline to run for; `pipeline_id` wins when both keys are set.
    pub fn pipeline_id(&self) -> Option<&str> {
        self.pipeline_id
            .as_deref()
            .or(self.extraction_pipeline_ext_id.as_deref())
    }
}

/// What the function returns to its runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HandlerResponse {
    Succeeded,
    Failed { error: String },
}

impl From<&RunResult> for HandlerResponse {
    fn from(result: &RunResult) -> Self {
        match result {
            RunResult::Success { .. } => HandlerResponse::Succeeded,
            RunResult::Failure { error, .. } => HandlerResponse::Failed {
                error: error.clone(),
            },
        }
    }
}
