use std::sync::Arc;

use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

use azure_log_analytics_sink::env::{
    env_or, AZURE_LOG_API_VERSION_ENV, AZURE_LOG_CUSTOMER_ID_ENV, AZURE_LOG_SHARED_KEY_ENV,
    AZURE_LOG_TYPE_ENV,
};
use azure_log_analytics_sink::layer::PublishLayer;
use azure_log_analytics_sink::publisher::{AzureConfig, AzurePublisher, DEFAULT_API_VERSION};

/// Manual end-to-end check: point the environment variables at a real
/// workspace and watch the events arrive in the configured custom log.
fn main() {
    let mut config = AzureConfig::new(
        env_or(AZURE_LOG_CUSTOMER_ID_ENV, "00000000-0000-0000-0000-000000000000"),
        env_or(AZURE_LOG_SHARED_KEY_ENV, ""),
        env_or(AZURE_LOG_TYPE_ENV, "ConsoleDemo"),
    );
    config.api_version = env_or(AZURE_LOG_API_VERSION_ENV, DEFAULT_API_VERSION);

    let publisher = Arc::new(AzurePublisher::new(config));
    let layer = PublishLayer::new(publisher, Level::DEBUG, "console-demo");
    let subscriber = Registry::default()
        .with(layer)
        .with(tracing_subscriber::fmt::layer());
    tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");

    info!("Info message.");
    debug!("Debug message.");
    warn!("Warning message.");
    error!(
        exception = "ArgumentNullException: args must not be null",
        "Error message."
    );
}
