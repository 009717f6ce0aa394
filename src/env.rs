/// Environment variable names used by this crate for convenient
/// configuration of the publisher from services and demos.
///
/// These are purely helpers; the core publisher types remain decoupled
/// from environment access.

/// Workspace (customer) id.
pub const AZURE_LOG_CUSTOMER_ID_ENV: &str = "AZURE_LOG_CUSTOMER_ID";

/// Base64-encoded shared key.
pub const AZURE_LOG_SHARED_KEY_ENV: &str = "AZURE_LOG_SHARED_KEY";

/// Target custom log table (`Log-Type` header value).
pub const AZURE_LOG_TYPE_ENV: &str = "AZURE_LOG_TYPE";

/// Optional Data Collector API version override.
pub const AZURE_LOG_API_VERSION_ENV: &str = "AZURE_LOG_API_VERSION";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
