//! Default values for configuration

/// Environment variable holding the backend base URL
pub const API_BASE_URL_ENV: &str = "DOCQA_API_BASE_URL";

/// Default seconds between registry polls while documents are processing
pub fn default_poll_interval_secs() -> u64 {
    5
}

/// Base URL suggested by `docqa init` when none is given
pub fn suggested_api_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}
