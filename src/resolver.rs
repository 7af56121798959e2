use serde::Deserialize;
use serde_yaml::Value;
use std::sync::Arc;
use tracing::{error, info};

use crate::cognite::adapter::ConfigStore;
use crate::error::HandlerError;
use crate::model::InvocationPayload;

pub const DEFAULT_AMPLITUDE: f64 = 0.5;
pub const DEFAULT_PERIOD: f64 = 1.0;
pub const DEFAULT_TS_EXTERNAL_ID: &str = "cdf_hub_sine_1.num";
pub const DEFAULT_TS_NAME: &str = "sine_1.num";
pub const DEFAULT_PIPELINE_ID: &str = "sine-function";

/// Parameters of one invocation, resolved once and passed down by value.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionConfig {
    pub amplitude: f64,
    pub period: f64,
    pub ts_external_id: String,
    pub ts_name: String,
    pub pipeline_id: String,
}

impl Default for FunctionConfig {
    fn default() -> Self {
        Self {
            amplitude: DEFAULT_AMPLITUDE,
            period: DEFAULT_PERIOD,
            ts_external_id: DEFAULT_TS_EXTERNAL_ID.to_string(),
            ts_name: DEFAULT_TS_NAME.to_string(),
            pipeline_id: DEFAULT_PIPELINE_ID.to_string(),
        }
    }
}

/// Recognized keys of the pipeline config `data` block. Anything else is ignored.
#[derive(Debug, Default, Deserialize)]
struct PipelineData {
    amplitude: Option<f64>,
    period: Option<f64>,
    ts_external_id: Option<String>,
    ts_name: Option<String>,
}

impl FunctionConfig {
    /// Defaults bound to a specific pipeline.
    pub fn for_pipeline(pipeline_id: impl Into<String>) -> Self {
        Self {
            pipeline_id: pipeline_id.into(),
            ..Self::default()
        }
    }

    /// Overlay the `data` block of a pipeline config document on these values.
    pub fn with_pipeline_yaml(mut self, blob: &str) -> Result<Self, HandlerError> {
        let fetch_failed = |reason: String| HandlerError::ConfigurationFetchFailed {
            pipeline_id: self.pipeline_id.clone(),
            reason,
        };

        let document: Value =
            serde_yaml::from_str(blob).map_err(|e| fetch_failed(format!("invalid YAML: {}", e)))?;

        let data = match document.get("data") {
            None => return Err(fetch_failed("missing `data` section".to_string())),
            Some(Value::Null) => PipelineData::default(),
            Some(value) => serde_yaml::from_value(value.clone())
                .map_err(|e| fetch_failed(format!("invalid `data` section: {}", e)))?,
        };

        info!(
            pipeline_id = %self.pipeline_id,
            "[INFO] Config from pipeline: {:?}",
            data
        );

        match data.amplitude {
            Some(amplitude) => self.amplitude = amplitude,
            None => self.log_default("amplitude", &self.amplitude.to_string()),
        }
        match data.period {
            Some(period) => self.period = period,
            None => self.log_default("period", &self.period.to_string()),
        }
        match data.ts_external_id {
            Some(id) => self.ts_external_id = id,
            None => self.log_default("ts_external_id", &self.ts_external_id),
        }
        match data.ts_name {
            Some(name) => self.ts_name = name,
            None => self.log_default("ts_name", &self.ts_name),
        }

        Ok(self)
    }

    fn log_default(&self, key: &str, value: &str) {
        info!(
            "[INFO] {} not found in input configuration in pipeline {}, using default value: {}",
            key, self.pipeline_id, value
        );
    }
}

/// Resolves [`FunctionConfig`] from the invocation payload and the pipeline config store.
pub struct ConfigResolver {
    store: Arc<dyn ConfigStore>,
}

impl ConfigResolver {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, payload: &InvocationPayload) -> Result<FunctionConfig, HandlerError> {
        let pipeline_id = match payload.pipeline_id() {
            Some(id) => id.to_string(),
            None => {
                info!(
                    "[INFO] pipeline_id not found in input function configuration, using default value: {}",
                    DEFAULT_PIPELINE_ID
                );
                DEFAULT_PIPELINE_ID.to_string()
            }
        };

        let blob = self
            .store
            .fetch_pipeline_config(&pipeline_id)
            .await
            .map_err(|e| {
                error!(
                    "[ERROR] Not able to load pipeline : {} configuration - {}",
                    pipeline_id, e
                );
                HandlerError::ConfigurationFetchFailed {
                    pipeline_id: pipeline_id.clone(),
                    reason: e.to_string(),
                }
            })?;

        let blob = match blob {
            Some(text) if !text.trim().is_empty() => text,
            _ => {
                error!(
                    "[ERROR] Not able to load pipeline : {} configuration - No configuration found in pipeline",
                    pipeline_id
                );
                return Err(HandlerError::ConfigurationMissing { pipeline_id });
            }
        };

        FunctionConfig::for_pipeline(pipeline_id).with_pipeline_yaml(&blob)
    }
}
