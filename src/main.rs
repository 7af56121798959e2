use std::env;
use std::sync::Arc;

use sine_function::cognite::auth;
use sine_function::cognite::client::CogniteClient;
use sine_function::config::{ClientSettings, Settings};
use sine_function::context::FunctionContext;
use sine_function::{SineFunction, Stores};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_PAYLOAD: &str = r#"{"ExtractionPipelineExtId": "sine-function"}"#;

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(settings.log_level()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if settings.log_json() {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Payload JSON from the first argument, then `SINE_PAYLOAD`, then the default pipeline.
fn read_payload() -> Result<serde_json::Value, serde_json::Error> {
    let raw = env::args()
        .nth(1)
        .or_else(|| env::var("SINE_PAYLOAD").ok())
        .unwrap_or_else(|| DEFAULT_PAYLOAD.to_string());
    serde_json::from_str(&raw)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv::dotenv().ok();

    let settings = Settings::new()?;
    init_tracing(&settings);

    info!("---------------------------------------START--------------------------------------------");

    let client_settings = ClientSettings::from_config(settings.cognite.as_ref())?;
    let http = reqwest::Client::new();
    let token = auth::fetch_token(&http, &client_settings.credentials).await?;
    let client = Arc::new(CogniteClient::new(http, &client_settings, token)?);

    match client.inspect_token().await {
        Ok(inspection) => info!(
            "[INFO] Cognite Client login status: subject {} with access to {} project(s)",
            inspection.subject,
            inspection.projects.len()
        ),
        Err(e) => warn!("[INFO] Cognite Client login status unavailable: {}", e),
    }

    let payload = read_payload()?;
    let function = SineFunction::new(Stores::from_client(client), FunctionContext::new_system());

    match function.handle_json(&payload).await {
        Ok(response) => {
            println!("{}", serde_json::to_string(&response)?);
            Ok(())
        }
        Err(e) => {
            error!("❌ {}", e);
            std::process::exit(1);
        }
    }
}
