use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::cognite::adapter::StoreError;

pub const DEFAULT_BASE_URL: &str = "https://api.cognitedata.com";
pub const DEFAULT_CLIENT_NAME: &str = "sine-function";

/// Deployment settings for the local runner. The handler itself never reads these.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    pub cognite: Option<CogniteConfig>,
    pub function: Option<FunctionSettings>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CogniteConfig {
    pub project: Option<String>,
    #[serde(alias = "baseUrl")]
    pub base_url: Option<String>,
    #[serde(alias = "clientName")]
    pub client_name: Option<String>,
    #[serde(alias = "tenantId")]
    pub tenant_id: Option<String>,
    #[serde(alias = "clientId")]
    pub client_id: Option<String>,
    #[serde(alias = "clientSecret")]
    pub client_secret: Option<String>,
    #[serde(alias = "tokenUrl")]
    pub token_url: Option<String>,
    pub scopes: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FunctionSettings {
    #[serde(default)]
    pub log_json: bool,
    pub log_level: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            // 1. Project config from config/config.{toml,json,ini}
            .add_source(File::with_name("config/config").required(false))
            // 2. Local overrides (not checked in)
            .add_source(File::with_name("config/local").required(false))
            // 3. Environment, e.g. SINE_COGNITE__PROJECT
            .add_source(Environment::with_prefix("SINE").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn log_json(&self) -> bool {
        self.function.as_ref().map(|f| f.log_json).unwrap_or(false)
    }

    pub fn log_level(&self) -> String {
        self.function
            .as_ref()
            .and_then(|f| f.log_level.clone())
            .unwrap_or_else(|| "info".to_string())
    }
}

/// OAuth client-credentials grant parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
}

/// Fully resolved connection settings for [`crate::cognite::client::CogniteClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    pub project: String,
    pub base_url: String,
    pub client_name: String,
    pub credentials: Credentials,
}

impl ClientSettings {
    /// Resolve from settings, falling back to the plain `COGNITE_*`/`TENANT_ID`/`CLIENT_*` variables.
    pub fn from_config(config: Option<&CogniteConfig>) -> Result<Self, StoreError> {
        Self::from_config_with(config, |key| env::var(key).ok())
    }

    pub fn from_config_with<F>(config: Option<&CogniteConfig>, lookup: F) -> Result<Self, StoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let field = |pick: &dyn Fn(&CogniteConfig) -> Option<String>, var: &str| {
            config.and_then(|c| pick(c)).or_else(|| lookup(var))
        };
        let required = |value: Option<String>, var: &str| {
            value.ok_or_else(|| {
                StoreError::Configuration(format!("{} not set (check config file or env)", var))
            })
        };

        let project = required(field(&|c| c.project.clone(), "COGNITE_PROJECT"), "COGNITE_PROJECT")?;
        let base_url = field(&|c| c.base_url.clone(), "COGNITE_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let client_name = field(&|c| c.client_name.clone(), "COGNITE_CLIENT_NAME")
            .unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string());
        let client_id = required(field(&|c| c.client_id.clone(), "CLIENT_ID"), "CLIENT_ID")?;
        let client_secret = required(field(&|c| c.client_secret.clone(), "CLIENT_SECRET"), "CLIENT_SECRET")?;

        let token_url = match field(&|c| c.token_url.clone(), "TOKEN_URL") {
            Some(url) => url,
            None => {
                let tenant = required(field(&|c| c.tenant_id.clone(), "TENANT_ID"), "TENANT_ID")?;
                format!("https://login.microsoftonline.com/{}/oauth2/v2.0/token", tenant)
            }
        };

        let scopes = config
            .and_then(|c| c.scopes.clone())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| vec![format!("{}/.default", base_url)]);

        Ok(Self {
            project,
            base_url,
            client_name,
            credentials: Credentials {
                token_url,
                client_id,
                client_secret,
                scopes,
            },
        })
    }
}
