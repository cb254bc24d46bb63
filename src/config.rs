use std::env;

/// Local development backend, same default the web client ships with.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

const BASE_URL_ENV: &str = "TEAMFLOW_API_URL";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Reads `TEAMFLOW_API_URL`, falling back to the local development backend.
    pub fn from_env() -> Self {
        let base_url = env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self { base_url }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
