use std::path::PathBuf;

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub network: NetworkConfig,
    pub filters: FilterConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub data_path: String,
    pub insights_path: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            data_path: "/api/data".to_string(),
            insights_path: "/api/insights".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilterConfig {
    /// Length of the range written into the date fields on initial load.
    pub default_range_days: i64,
    pub max_range_days: i64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            default_range_days: 30,
            max_range_days: 730,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    pub csv_filename: String,
    pub json_filename: String,
    /// Directory for downloads; the user's download directory when unset.
    pub output_dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            csv_filename: "airline_data.csv".to_string(),
            json_filename: "airline_data.json".to_string(),
            output_dir: None,
        }
    }
}

impl ExportConfig {
    pub fn resolved_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // Load .env file (silently ignore if not present)
        let _ = dotenvy::dotenv();

        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fare-trends");

        let builder = Config::builder()
            // 1. Load default values
            // Backend
            .set_default("backend.base_url", "http://127.0.0.1:5000")?
            .set_default("backend.data_path", "/api/data")?
            .set_default("backend.insights_path", "/api/insights")?
            // Network
            .set_default("network.request_timeout_secs", 30)?
            .set_default("network.connect_timeout_secs", 10)?
            // Filters
            .set_default("filters.default_range_days", 30)?
            .set_default("filters.max_range_days", 730)?
            // Export
            .set_default("export.csv_filename", "airline_data.csv")?
            .set_default("export.json_filename", "airline_data.json")?
            .set_default("export.output_dir", None::<String>)?

            // 2. Load from local config file (optional, lowest priority)
            .add_source(File::from(PathBuf::from("config.toml")).required(false))

            // 3. Load from user config directory (optional, overrides local)
            .add_source(File::from(config_dir.join("config.toml")).required(false))

            // 4. Load from Environment variables (FARE__BACKEND__BASE_URL=...)
            .add_source(Environment::with_prefix("FARE").separator("__"));

        let s = builder.build()?;
        Ok(s.try_deserialize()?)
    }
}
