use crate::model::{RunStatus, SampleSeries, TimeSeriesDescriptor};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Source of extraction pipeline configuration blobs.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Fetch the raw YAML config of a pipeline. `None` when the pipeline has no config.
    async fn fetch_pipeline_config(&self, pipeline_id: &str) -> Result<Option<String>, StoreError>;
}

#[async_trait]
pub trait TimeSeriesStore: Send + Sync {
    async fn exists(&self, external_id: &str) -> Result<bool, StoreError>;

    async fn delete(&self, external_id: &str) -> Result<(), StoreError>;

    async fn create(&self, descriptor: TimeSeriesDescriptor) -> Result<(), StoreError>;

    /// Write all points of the series in a single request
    async fn insert_points(&self, external_id: &str, series: &SampleSeries) -> Result<(), StoreError>;
}

#[async_trait]
pub trait PipelineStore: Send + Sync {
    /// Dataset id the pipeline belongs to
    async fn owning_dataset(&self, pipeline_id: &str) -> Result<i64, StoreError>;
}

#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn report(&self, pipeline_id: &str, status: RunStatus, message: &str) -> Result<(), StoreError>;
}
