//! End-to-end handler scenarios against an in-memory CDF.
//!
//! Covers the success path, a missing pipeline config and a failing delete.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sine_function::cognite::adapter::{ConfigStore, PipelineStore, StatusSink, StoreError, TimeSeriesStore};
use sine_function::context::FunctionContext;
use sine_function::model::{DataPoint, RunStatus, SampleSeries, TimeSeriesDescriptor, SAMPLES_PER_DAY};
use sine_function::{HandlerError, HandlerResponse, SineFunction, Stores};

const START_MS: i64 = 1_704_067_200_000; // 2024-01-01T00:00:00Z

#[derive(Default)]
struct InMemoryCdf {
    configs: HashMap<String, String>,
    fail_step: Option<&'static str>,
    data_set_id: i64,
    calls: Mutex<Vec<String>>,
    series: Mutex<HashMap<String, (TimeSeriesDescriptor, Vec<DataPoint>)>>,
    runs: Mutex<Vec<(String, RunStatus, String)>>,
}

impl InMemoryCdf {
    fn with_config(pipeline_id: &str, yaml: &str) -> Self {
        let mut configs = HashMap::new();
        configs.insert(pipeline_id.to_string(), yaml.to_string());
        Self {
            configs,
            data_set_id: 4242,
            ..Default::default()
        }
    }

    fn seed_series(&self, external_id: &str) {
        self.series.lock().unwrap().insert(
            external_id.to_string(),
            (
                TimeSeriesDescriptor {
                    external_id: external_id.to_string(),
                    name: "old".into(),
                    description: "old".into(),
                    data_set_id: 1,
                },
                vec![DataPoint { timestamp: 0, value: 9.9 }],
            ),
        );
    }

    fn step(&self, name: &'static str) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(name.to_string());
        if self.fail_step == Some(name) {
            return Err(StoreError::Api(format!("CDF request failed 500: {} rejected", name)));
        }
        Ok(())
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConfigStore for InMemoryCdf {
    async fn fetch_pipeline_config(&self, pipeline_id: &str) -> Result<Option<String>, StoreError> {
        self.step("config")?;
        Ok(self.configs.get(pipeline_id).cloned())
    }
}

#[async_trait]
impl TimeSeriesStore for InMemoryCdf {
    async fn exists(&self, external_id: &str) -> Result<bool, StoreError> {
        self.step("exists")?;
        Ok(self.series.lock().unwrap().contains_key(external_id))
    }

    async fn delete(&self, external_id: &str) -> Result<(), StoreError> {
        self.step("delete")?;
        self.series.lock().unwrap().remove(external_id);
        Ok(())
    }

    async fn create(&self, descriptor: TimeSeriesDescriptor) -> Result<(), StoreError> {
        self.step("create")?;
        self.series
            .lock()
            .unwrap()
            .insert(descriptor.external_id.clone(), (descriptor, Vec::new()));
        Ok(())
    }

    async fn insert_points(&self, external_id: &str, series: &SampleSeries) -> Result<(), StoreError> {
        self.step("insert")?;
        let mut all = self.series.lock().unwrap();
        let entry = all
            .get_mut(external_id)
            .ok_or_else(|| StoreError::NotFound(external_id.to_string()))?;
        entry.1.extend_from_slice(&series.points);
        Ok(())
    }
}

#[async_trait]
impl PipelineStore for InMemoryCdf {
    async fn owning_dataset(&self, _pipeline_id: &str) -> Result<i64, StoreError> {
        self.step("dataset")?;
        Ok(self.data_set_id)
    }
}

#[async_trait]
impl StatusSink for InMemoryCdf {
    async fn report(&self, pipeline_id: &str, status: RunStatus, message: &str) -> Result<(), StoreError> {
        self.step("report")?;
        self.runs
            .lock()
            .unwrap()
            .push((pipeline_id.to_string(), status, message.to_string()));
        Ok(())
    }
}

fn function_for(cdf: Arc<InMemoryCdf>) -> SineFunction {
    SineFunction::new(Stores::from_client(cdf), FunctionContext::new_simulated(START_MS))
}

#[tokio::test]
async fn test_default_pipeline_success_overwrites_series() {
    let cdf = Arc::new(InMemoryCdf::with_config(
        "sine-function",
        "data:\n  amplitude: 1.0\n  period: 2\n",
    ));
    cdf.seed_series("cdf_hub_sine_1.num");
    let function = function_for(cdf.clone());

    let response = function.handle_json(&json!({})).await.unwrap();
    assert_eq!(response, HandlerResponse::Succeeded);
    assert_eq!(serde_json::to_value(&response).unwrap(), json!({"status": "succeeded"}));

    assert_eq!(
        cdf.calls(),
        vec!["config", "exists", "delete", "dataset", "create", "insert", "report"]
    );

    let all = cdf.series.lock().unwrap();
    let (descriptor, points) = all.get("cdf_hub_sine_1.num").unwrap();
    assert_eq!(descriptor.name, "sine_1.num");
    assert_eq!(descriptor.data_set_id, 4242);
    assert_eq!(descriptor.description, "Function sine_wave generated time series");
    assert_eq!(points.len(), SAMPLES_PER_DAY);
    assert_eq!(points[0].timestamp, START_MS);
    assert!(points.iter().all(|p| (-1.0..=1.0).contains(&p.value)));
    assert!(points.iter().any(|p| p.value > 0.999));

    let runs = cdf.runs.lock().unwrap();
    assert_eq!(runs.len(), 1);
    let (pipeline_id, status, message) = &runs[0];
    assert_eq!(pipeline_id, "sine-function");
    assert_eq!(*status, RunStatus::Success);
    assert_eq!(
        message,
        "Function: Sine Function: complete -  Number of data points : 86400 created from : 2024-01-01 00:00:00+00:00 for time series: cdf_hub_sine_1.num"
    );
}

#[tokio::test]
async fn test_missing_series_is_created_without_delete() {
    let cdf = Arc::new(InMemoryCdf::with_config(
        "custom-pipe",
        "data:\n  ts_external_id: custom.num\n  ts_name: custom\n",
    ));
    let function = function_for(cdf.clone());

    let response = function
        .handle_json(&json!({"pipeline_id": "custom-pipe"}))
        .await
        .unwrap();
    assert_eq!(response, HandlerResponse::Succeeded);
    assert_eq!(
        cdf.calls(),
        vec!["config", "exists", "dataset", "create", "insert", "report"]
    );

    let all = cdf.series.lock().unwrap();
    let (descriptor, points) = all.get("custom.num").unwrap();
    assert_eq!(descriptor.name, "custom");
    // default amplitude
    assert!(points.iter().all(|p| p.value.abs() <= 0.5 + 1e-12));
    assert_eq!(cdf.runs.lock().unwrap()[0].0, "custom-pipe");
}

#[tokio::test]
async fn test_missing_config_propagates_without_report() {
    let cdf = Arc::new(InMemoryCdf {
        data_set_id: 1,
        ..Default::default()
    });
    let function = function_for(cdf.clone());

    let err = function.handle_json(&json!({})).await.unwrap_err();
    assert!(matches!(
        err,
        HandlerError::ConfigurationMissing { ref pipeline_id } if pipeline_id == "sine-function"
    ));
    assert_eq!(cdf.calls(), vec!["config"]);
    assert!(cdf.runs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_config_fetch_error_propagates_without_report() {
    let cdf = Arc::new(InMemoryCdf {
        fail_step: Some("config"),
        ..InMemoryCdf::with_config("sine-function", "data: {}\n")
    });
    let function = function_for(cdf.clone());

    let err = function.handle_json(&json!({})).await.unwrap_err();
    assert!(matches!(err, HandlerError::ConfigurationFetchFailed { .. }));
    assert!(cdf.runs.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_failure_is_reported_and_returned() {
    let cdf = Arc::new(InMemoryCdf {
        fail_step: Some("delete"),
        ..InMemoryCdf::with_config("sine-function", "data:\n  amplitude: 1.0\n")
    });
    cdf.seed_series("cdf_hub_sine_1.num");
    let function = function_for(cdf.clone());

    let response = function.handle_json(&json!({})).await.unwrap();
    let error = match &response {
        HandlerResponse::Failed { error } => error.clone(),
        other => panic!("expected failure, got {:?}", other),
    };
    assert!(error.contains("delete"));
    assert!(error.contains("delete rejected"));

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["status"], "failed");
    assert_eq!(value["error"], json!(error));

    // nothing after the failed delete ran, except the report
    assert_eq!(cdf.calls(), vec!["config", "exists", "delete", "report"]);

    let runs = cdf.runs.lock().unwrap();
    let (_, status, message) = &runs[0];
    assert_eq!(*status, RunStatus::Failure);
    assert!(message.starts_with("Function: Sine Function: failed - message: PublishFailed"));
    // the backtrace pushes the message past the cap
    assert_eq!(message.chars().count(), 998);
    assert!(message.ends_with("..."));
}

#[tokio::test]
async fn test_computation_failure_is_reported() {
    let cdf = Arc::new(InMemoryCdf::with_config("sine-function", "data:\n  amplitude: .nan\n"));
    let function = function_for(cdf.clone());

    let response = function.handle_json(&json!({})).await.unwrap();
    assert!(matches!(response, HandlerResponse::Failed { .. }));
    assert_eq!(cdf.calls(), vec!["config", "report"]);
    assert_eq!(cdf.runs.lock().unwrap()[0].1, RunStatus::Failure);
}

#[tokio::test]
async fn test_status_report_failure_surfaces_error() {
    let cdf = Arc::new(InMemoryCdf {
        fail_step: Some("report"),
        ..InMemoryCdf::with_config("sine-function", "data: {}\n")
    });
    let function = function_for(cdf.clone());

    let err = function.handle_json(&json!({})).await.unwrap_err();
    assert!(matches!(err, HandlerError::StatusReportFailed { .. }));
}

#[tokio::test]
async fn test_runtime_alias_selects_pipeline() {
    let cdf = Arc::new(InMemoryCdf::with_config("other-pipe", "data: {}\n"));
    let function = function_for(cdf.clone());

    let response = function
        .handle_json(&json!({"ExtractionPipelineExtId": "other-pipe"}))
        .await
        .unwrap();
    assert_eq!(response, HandlerResponse::Succeeded);
    assert_eq!(cdf.runs.lock().unwrap()[0].0, "other-pipe");
}

#[tokio::test]
async fn test_pipeline_id_wins_over_runtime_key() {
    let mut cdf = InMemoryCdf::with_config("a", "data:\n  ts_external_id: a.num\n");
    cdf.configs
        .insert("b".to_string(), "data:\n  ts_external_id: b.num\n".to_string());
    let cdf = Arc::new(cdf);
    let function = function_for(cdf.clone());

    let response = function
        .handle_json(&json!({"pipeline_id": "a", "ExtractionPipelineExtId": "b"}))
        .await
        .unwrap();
    assert_eq!(response, HandlerResponse::Succeeded);
    assert_eq!(cdf.runs.lock().unwrap()[0].0, "a");

    let all = cdf.series.lock().unwrap();
    assert!(all.contains_key("a.num"));
    assert!(!all.contains_key("b.num"));
}

#[tokio::test]
async fn test_invalid_payload_rejected() {
    let cdf = Arc::new(InMemoryCdf::default());
    let function = function_for(cdf.clone());

    let err = function
        .handle_json(&json!({"pipeline_id": 17}))
        .await
        .unwrap_err();
    assert!(matches!(err, HandlerError::InvalidPayload(_)));
    assert!(cdf.calls().is_empty());
}
