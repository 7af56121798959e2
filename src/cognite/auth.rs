use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cognite::adapter::StoreError;
use crate::config::Credentials;

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    scope: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Form body for the OAuth client-credentials grant.
pub fn token_request_body(credentials: &Credentials) -> Result<String, StoreError> {
    let request = TokenRequest {
        grant_type: "client_credentials",
        client_id: &credentials.client_id,
        client_secret: &credentials.client_secret,
        scope: credentials.scopes.join(" "),
    };
    serde_urlencoded::to_string(&request).map_err(|e| StoreError::Configuration(e.to_string()))
}

/// Acquire a bearer token with the client-credentials grant.
pub async fn fetch_token(http: &Client, credentials: &Credentials) -> Result<String, StoreError> {
    let body = token_request_body(credentials)?;

    let resp = http
        .post(&credentials.token_url)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(body)
        .send()
        .await
        .map_err(|e| StoreError::Network(e.to_string()))?;
    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| StoreError::Network(e.to_string()))?;

    if !status.is_success() {
        return Err(StoreError::Api(format!("Token request failed {}: {}", status, text)));
    }

    let token: TokenResponse = serde_json::from_str(&text)
        .map_err(|e| StoreError::Decode(format!("Failed to parse token response: {}", e)))?;
    info!(
        expires_in = ?token.expires_in,
        "Acquired {} token for client {}",
        token.token_type.as_deref().unwrap_or("Bearer"),
        credentials.client_id
    );

    Ok(token.access_token)
}
