use std::sync::Arc;
use tracing::{debug, error, info};

use crate::cognite::adapter::{ConfigStore, PipelineStore, StatusSink, TimeSeriesStore};
use crate::context::FunctionContext;
use crate::engine::state_machine::{HandlerState, HandlerStateMachine};
use crate::error::HandlerError;
use crate::model::{HandlerResponse, InvocationPayload, RunResult};
use crate::publisher::TimeSeriesPublisher;
use crate::report::{failure_message, format_start, success_message, truncate_message, FUNCTION_NAME};
use crate::resolver::{ConfigResolver, FunctionConfig};
use crate::signal::SineGenerator;

/// The remote capabilities one invocation needs.
#[derive(Clone)]
pub struct Stores {
    pub config: Arc<dyn ConfigStore>,
    pub time_series: Arc<dyn TimeSeriesStore>,
    pub pipelines: Arc<dyn PipelineStore>,
    pub status: Arc<dyn StatusSink>,
}

impl Stores {
    /// Use a single client for every capability.
    pub fn from_client<C>(client: Arc<C>) -> Self
    where
        C: ConfigStore + TimeSeriesStore + PipelineStore + StatusSink + 'static,
    {
        Self {
            config: client.clone(),
            time_series: client.clone(),
            pipelines: client.clone(),
            status: client,
        }
    }
}

/// usage:
/// let function = SineFunction::new(Stores::from_client(client), FunctionContext::new_system());
/// let response = function.handle(&payload).await?;
pub struct SineFunction {
    resolver: ConfigResolver,
    publisher: TimeSeriesPublisher,
    status: Arc<dyn StatusSink>,
    ctx: FunctionContext,
}

impl SineFunction {
    pub fn new(stores: Stores, ctx: FunctionContext) -> Self {
        Self {
            resolver: ConfigResolver::new(stores.config),
            publisher: TimeSeriesPublisher::new(stores.time_series, stores.pipelines),
            status: stores.status,
            ctx,
        }
    }

    /// Entry point for a raw JSON invocation payload.
    pub async fn handle_json(&self, data: &serde_json::Value) -> Result<HandlerResponse, HandlerError> {
        let payload: InvocationPayload = serde_json::from_value(data.clone())
            .map_err(|e| HandlerError::InvalidPayload(e.to_string()))?;
        self.handle(&payload).await
    }

    /// Run one invocation.
    ///
    /// Configuration failures are returned as `Err` without a status report.
    /// Computation and publish failures are reported to the pipeline and come
    /// back as `Ok(HandlerResponse::Failed { .. })`.
    pub async fn handle(&self, payload: &InvocationPayload) -> Result<HandlerResponse, HandlerError> {
        info!("[STARTING] {}", FUNCTION_NAME);
        let mut state = HandlerState::Idle;

        state = advance(state, HandlerState::ResolvingConfig)?;
        info!("[STARTING] Extracting input data");
        let config = match self.resolver.resolve(payload).await {
            Ok(config) => config,
            Err(e) => {
                error!("[FAILED] Get state from last run. Error: {}", e);
                return Err(e);
            }
        };
        info!("[FINISHED] Extracting input parameters");

        state = advance(state, HandlerState::Computing)?;
        let result = match self.compute_and_publish(&config, &mut state).await {
            Ok(message) => RunResult::Success { message },
            Err(e) => {
                let message = truncate_message(&failure_message(&e));
                error!("[FAILED] {}", message);
                RunResult::Failure {
                    message,
                    error: e.to_string(),
                }
            }
        };

        state = advance(state, HandlerState::Reporting)?;
        self.report(&config.pipeline_id, &result).await?;

        advance(state, HandlerState::Done)?;
        if let RunResult::Success { message } = &result {
            info!("[FINISHED] {} : {}", FUNCTION_NAME, message);
        }

        Ok(HandlerResponse::from(&result))
    }

    async fn compute_and_publish(
        &self,
        config: &FunctionConfig,
        state: &mut HandlerState,
    ) -> Result<String, HandlerError> {
        let start = self.ctx.series_start();
        info!(
            "[START] Calculate Sine curve data points, for one day starting at: {}",
            format_start(&start)
        );
        info!(
            "[INFO] For calculation use, amplitude: {} (curve height) and periods: {} (number of curves)",
            config.amplitude, config.period
        );
        let series = SineGenerator::new(config.amplitude, config.period).generate(start.timestamp_millis())?;

        *state = advance(*state, HandlerState::Publishing)?;
        let num_points = self.publisher.publish(config, &series).await?;

        Ok(success_message(num_points, &start, &config.ts_external_id))
    }

    async fn report(&self, pipeline_id: &str, result: &RunResult) -> Result<(), HandlerError> {
        let message = truncate_message(result.message());
        self.status
            .report(pipeline_id, result.status(), &message)
            .await
            .map_err(|source| {
                error!(
                    pipeline_id,
                    "[FAILED] Writing run status {} failed: {}",
                    result.status(),
                    source
                );
                HandlerError::StatusReportFailed {
                    pipeline_id: pipeline_id.to_string(),
                    source,
                }
            })
    }
}

fn advance(current: HandlerState, next: HandlerState) -> Result<HandlerState, HandlerError> {
    let state = HandlerStateMachine::transition(current, next)?;
    debug!(from = %current, to = %state, "handler state");
    Ok(state)
}
