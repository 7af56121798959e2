use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

use crate::cognite::adapter::{ConfigStore, PipelineStore, StatusSink, StoreError, TimeSeriesStore};
use crate::cognite::types::{
    ByIdsRequest, DatapointsInsert, ExtPipeConfig, ExtPipeItem, ExtPipeRunCreate, ExternalIdRef, Items,
    TimeSeriesItem, TokenInspection,
};
use crate::config::ClientSettings;
use crate::model::{RunStatus, SampleSeries, TimeSeriesDescriptor};

/// Thin CDF v1 REST client covering the calls the sine function makes.
pub struct CogniteClient {
    client: Client,
    base_url: Url,
    project_url: Url,
    client_name: String,
    token: String,
}

impl CogniteClient {
    pub fn new(client: Client, settings: &ClientSettings, token: String) -> Result<Self, StoreError> {
        let base_url = Url::parse(&format!("{}/", settings.base_url))
            .map_err(|e| StoreError::Configuration(format!("invalid base url {}: {}", settings.base_url, e)))?;
        let project_url = base_url
            .join(&format!("api/v1/projects/{}/", settings.project))
            .map_err(|e| StoreError::Configuration(format!("invalid project {}: {}", settings.project, e)))?;

        Ok(Self {
            client,
            base_url,
            project_url,
            client_name: settings.client_name.clone(),
            token,
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.project_url
            .join(path)
            .map_err(|e| StoreError::Configuration(format!("invalid path {}: {}", path, e)))
    }

    async fn send(&self, method: Method, url: Url, body: Option<String>) -> Result<(StatusCode, String), StoreError> {
        debug!(%method, %url, "CDF request");
        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("x-cdp-app", &self.client_name)
            .header("Content-Type", "application/json");

        if let Some(body) = body {
            request = request.body(body);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok((status, text))
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, StoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        let payload = serde_json::to_string(body).map_err(|e| StoreError::Decode(e.to_string()))?;
        let (status, text) = self.send(Method::POST, url, Some(payload)).await?;
        check_status(status, &text)?;
        decode(&text)
    }

    /// Who the current token belongs to and which projects it can reach.
    pub async fn inspect_token(&self) -> Result<TokenInspection, StoreError> {
        let url = self
            .base_url
            .join("api/v1/token/inspect")
            .map_err(|e| StoreError::Configuration(e.to_string()))?;
        let (status, text) = self.send(Method::GET, url, None).await?;
        check_status(status, &text)?;
        decode(&text)
    }
}

fn check_status(status: StatusCode, text: &str) -> Result<(), StoreError> {
    if status == StatusCode::NOT_FOUND {
        return Err(StoreError::NotFound(text.to_string()));
    }
    if !status.is_success() {
        return Err(StoreError::Api(format!("CDF request failed {}: {}", status, text)));
    }
    Ok(())
}

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, StoreError> {
    serde_json::from_str(text)
        .map_err(|e| StoreError::Decode(format!("Failed to parse response: {} | body: {}", e, text)))
}

fn by_external_id(external_id: &str) -> ExternalIdRef {
    ExternalIdRef {
        external_id: external_id.to_string(),
    }
}

/// Body for a single bulk datapoints insert.
pub fn datapoints_payload(external_id: &str, series: &SampleSeries) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(Items::one(DatapointsInsert {
        external_id,
        datapoints: &series.points,
    }))
    .map_err(|e| StoreError::Decode(e.to_string()))
}

/// Body for an extraction pipeline run.
pub fn run_payload(pipeline_id: &str, status: RunStatus, message: &str) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(Items::one(ExtPipeRunCreate {
        extpipe_external_id: pipeline_id,
        status,
        message,
    }))
    .map_err(|e| StoreError::Decode(e.to_string()))
}

/// Interpret the `extpipes/config` response. A missing or blank config is `None`.
pub fn parse_config_response(status: StatusCode, text: &str) -> Result<Option<String>, StoreError> {
    match check_status(status, text) {
        Err(StoreError::NotFound(_)) => return Ok(None),
        Err(e) => return Err(e),
        Ok(()) => {}
    }
    let config: ExtPipeConfig = decode(text)?;
    Ok(config.config.filter(|c| !c.trim().is_empty()))
}

/// Pull the dataset id out of an `extpipes/byids` response.
pub fn parse_dataset(pipeline_id: &str, pipes: Items<ExtPipeItem>) -> Result<i64, StoreError> {
    let pipe = pipes
        .items
        .into_iter()
        .find(|p| p.external_id == pipeline_id)
        .ok_or_else(|| StoreError::NotFound(format!("extraction pipeline {}", pipeline_id)))?;
    pipe.data_set_id
        .ok_or_else(|| StoreError::Api(format!("extraction pipeline {} has no data set", pipeline_id)))
}

#[async_trait]
impl ConfigStore for CogniteClient {
    async fn fetch_pipeline_config(&self, pipeline_id: &str) -> Result<Option<String>, StoreError> {
        let mut url = self.endpoint("extpipes/config")?;
        url.query_pairs_mut().append_pair("externalId", pipeline_id);
        let (status, text) = self.send(Method::GET, url, None).await?;
        parse_config_response(status, &text)
    }
}

#[async_trait]
impl TimeSeriesStore for CogniteClient {
    async fn exists(&self, external_id: &str) -> Result<bool, StoreError> {
        let request = ByIdsRequest {
            items: vec![by_external_id(external_id)],
            ignore_unknown_ids: true,
        };
        let found: Items<TimeSeriesItem> = self.post("timeseries/byids", &request).await?;
        Ok(found
            .items
            .iter()
            .any(|ts| ts.external_id.as_deref() == Some(external_id)))
    }

    async fn delete(&self, external_id: &str) -> Result<(), StoreError> {
        let _: serde_json::Value = self
            .post("timeseries/delete", &Items::one(by_external_id(external_id)))
            .await?;
        Ok(())
    }

    async fn create(&self, descriptor: TimeSeriesDescriptor) -> Result<(), StoreError> {
        let created: Items<TimeSeriesItem> = self.post("timeseries", &Items::one(descriptor)).await?;
        if let Some(ts) = created.items.first() {
            info!(id = ts.id, "Created time series {:?}", ts.external_id);
        }
        Ok(())
    }

    async fn insert_points(&self, external_id: &str, series: &SampleSeries) -> Result<(), StoreError> {
        let payload = datapoints_payload(external_id, series)?;
        let _: serde_json::Value = self.post("timeseries/data", &payload).await?;
        Ok(())
    }
}

#[async_trait]
impl PipelineStore for CogniteClient {
    async fn owning_dataset(&self, pipeline_id: &str) -> Result<i64, StoreError> {
        let request = ByIdsRequest {
            items: vec![by_external_id(pipeline_id)],
            ignore_unknown_ids: false,
        };
        let pipes: Items<ExtPipeItem> = self.post("extpipes/byids", &request).await?;
        parse_dataset(pipeline_id, pipes)
    }
}

#[async_trait]
impl StatusSink for CogniteClient {
    async fn report(&self, pipeline_id: &str, status: RunStatus, message: &str) -> Result<(), StoreError> {
        let payload = run_payload(pipeline_id, status, message)?;
        let _: serde_json::Value = self.post("extpipes/runs", &payload).await?;
        Ok(())
    }
}
