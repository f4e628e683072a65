use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub storage_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let api_base_url = env::var("API_BASE_URL").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                "http://localhost:8080".to_string()
            } else {
                "https://api.diaoyanshe.com".to_string()
            }
        });

        let request_timeout_secs = env::var("REQUEST_TIMEOUT")
            .ok()
            .and_then(|v| v.trim_end_matches('s').parse().ok())
            .unwrap_or(10);

        let storage_dir = env::var("STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".diaoyanshe"));

        Config {
            api_base_url,
            request_timeout_secs,
            storage_dir,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
