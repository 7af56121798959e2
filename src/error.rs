use crate::cognite::adapter::StoreError;
use crate::engine::state_machine::StateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("No configuration found in pipeline {pipeline_id}")]
    ConfigurationMissing { pipeline_id: String },

    #[error("Not able to load pipeline {pipeline_id} configuration: {reason}")]
    ConfigurationFetchFailed { pipeline_id: String, reason: String },

    #[error("Sine calculation failed: {0}")]
    ComputationFailed(String),

    #[error("Publishing time series {external_id} failed during {step}: {source}")]
    PublishFailed {
        external_id: String,
        step: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Reporting run status to pipeline {pipeline_id} failed: {source}")]
    StatusReportFailed {
        pipeline_id: String,
        #[source]
        source: StoreError,
    },

    #[error("Invalid invocation payload: {0}")]
    InvalidPayload(String),

    #[error(transparent)]
    InvalidTransition(#[from] StateError),
}

impl HandlerError {
    /// Configuration failures end the invocation without a status report.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            HandlerError::ConfigurationMissing { .. } | HandlerError::ConfigurationFetchFailed { .. }
        )
    }
}
