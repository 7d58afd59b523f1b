//! AWS Lambda entry point for Slot Alert
//!
//! Deploy with `cargo lambda build --release --features lambda`
//! Schedule with an EventBridge rule; each invocation runs one pass.

use std::sync::Arc;

use lambda_runtime::{Error as LambdaError, LambdaEvent, service_fn};

use serde_json::Value;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use slot_alert::models::Config;
use slot_alert::pipeline;

/// Main entry point for the AWS Lambda function.
#[tokio::main]
async fn main() -> Result<(), LambdaError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    info!("Slot Alert Lambda starting...");
    lambda_runtime::run(service_fn(handler)).await
}

/// Handler for scheduled Lambda events.
///
/// In-run failures come back as an "error" status in the response body rather
/// than a failed invocation, so the schedule keeps firing.
async fn handler(event: LambdaEvent<Value>) -> Result<Value, LambdaError> {
    info!("Received event: {:?}", event.payload);

    let config_path =
        std::env::var("SLOT_ALERT_CONFIG").unwrap_or_else(|_| "data/config.toml".to_string());
    let config = Arc::new(Config::load_or_default(&config_path));

    match pipeline::run_check(config).await {
        Ok(report) => {
            info!(
                "Lambda execution successful: {} checked, {} notified",
                report.checked_count(),
                report.notified.len()
            );
            Ok(serde_json::json!({
                "status": "success",
                "courses_checked": report.checked_count(),
                "available": report.available_courses(),
                "notified": report.notified,
                "aborted": report.aborted,
            }))
        }
        Err(e) => {
            error!("Lambda execution failed: {}", e);
            Ok(serde_json::json!({
                "status": "error",
                "message": e.to_string()
            }))
        }
    }
}
