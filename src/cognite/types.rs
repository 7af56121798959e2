//! CDF v1 request/response bodies used by the client.

use serde::{Deserialize, Serialize};

use crate::model::{DataPoint, RunStatus};

#[derive(Debug, Serialize, Deserialize)]
pub struct Items<T> {
    pub items: Vec<T>,
}

impl<T> Items<T> {
    pub fn one(item: T) -> Self {
        Self { items: vec![item] }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalIdRef {
    pub external_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ByIdsRequest {
    pub items: Vec<ExternalIdRef>,
    pub ignore_unknown_ids: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesItem {
    pub id: i64,
    pub external_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtPipeItem {
    pub external_id: String,
    pub data_set_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtPipeConfig {
    pub external_id: Option<String>,
    pub config: Option<String>,
    pub revision: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatapointsInsert<'a> {
    pub external_id: &'a str,
    pub datapoints: &'a [DataPoint],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtPipeRunCreate<'a> {
    pub extpipe_external_id: &'a str,
    pub status: RunStatus,
    pub message: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenInspection {
    pub subject: String,
    #[serde(default)]
    pub projects: Vec<ProjectAccess>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectAccess {
    pub project_url_name: String,
}
