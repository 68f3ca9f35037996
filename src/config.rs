use std::path::PathBuf;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Triagecare";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

const DEFAULT_MODEL_ID: &str = "nova-2-pro-v1";
const DEFAULT_API_BASE_URL: &str = "https://api.nova.amazon.com";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Runtime settings, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bearer key for the model provider. Required for the HTTP client.
    pub api_key: Option<String>,
    pub model_id: String,
    pub api_base_url: String,
    pub db_path: PathBuf,
    pub knowledge_path: Option<PathBuf>,
    pub bind_addr: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let api_key = std::env::var("TRIAGE_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());
        let model_id =
            std::env::var("TRIAGE_MODEL_ID").unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string());
        let api_base_url = std::env::var("TRIAGE_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let db_path = std::env::var("TRIAGE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| app_data_dir().join("triagecare.db"));
        let knowledge_path = std::env::var("TRIAGE_KNOWLEDGE_PATH").ok().map(PathBuf::from);
        let bind_addr =
            std::env::var("TRIAGE_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        Self {
            api_key,
            model_id,
            api_base_url,
            db_path,
            knowledge_path,
            bind_addr,
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
impl AppConfig {
    /// Fixed configuration for unit tests; never touches the environment.
    pub fn default_for_tests() -> Self {
        Self {
            api_key: Some("test-key".to_string()),
            model_id: DEFAULT_MODEL_ID.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            db_path: PathBuf::from(":memory:"),
            knowledge_path: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(60),
        }
    }
}

/// Get the application data directory (~/Triagecare/).
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join(APP_NAME)
}
