use std::sync::Arc;
use tracing::info;

use crate::cognite::adapter::{PipelineStore, StoreError, TimeSeriesStore};
use crate::error::HandlerError;
use crate::model::{SampleSeries, TimeSeriesDescriptor};
use crate::resolver::FunctionConfig;

pub const TS_DESCRIPTION: &str = "Function sine_wave generated time series";

/// Replaces the target time series with a freshly computed series.
///
/// The steps (existence check, delete, dataset lookup, create, insert) are
/// separate remote calls. A failure part way through can leave the time series
/// missing or empty until the next successful run.
pub struct TimeSeriesPublisher {
    time_series: Arc<dyn TimeSeriesStore>,
    pipelines: Arc<dyn PipelineStore>,
}

impl TimeSeriesPublisher {
    pub fn new(time_series: Arc<dyn TimeSeriesStore>, pipelines: Arc<dyn PipelineStore>) -> Self {
        Self {
            time_series,
            pipelines,
        }
    }

    /// Returns the number of points written.
    pub async fn publish(&self, config: &FunctionConfig, series: &SampleSeries) -> Result<usize, HandlerError> {
        let external_id = config.ts_external_id.as_str();
        let failed = |step: &'static str| {
            move |source: StoreError| HandlerError::PublishFailed {
                external_id: external_id.to_string(),
                step,
                source,
            }
        };

        if self.time_series.exists(external_id).await.map_err(failed("exists"))? {
            info!(external_id, "[INFO] Deleting existing time series");
            self.time_series
                .delete(external_id)
                .await
                .map_err(failed("delete"))?;
        }

        let data_set_id = self
            .pipelines
            .owning_dataset(&config.pipeline_id)
            .await
            .map_err(failed("dataset lookup"))?;

        self.time_series
            .create(TimeSeriesDescriptor {
                external_id: external_id.to_string(),
                name: config.ts_name.clone(),
                description: TS_DESCRIPTION.to_string(),
                data_set_id,
            })
            .await
            .map_err(failed("create"))?;

        self.time_series
            .insert_points(external_id, series)
            .await
            .map_err(failed("insert"))?;

        info!(
            external_id,
            data_set_id,
            "[FINISHED] Calculate Sine curve data points, num data points: {}",
            series.len()
        );

        Ok(series.len())
    }
}
