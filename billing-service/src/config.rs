use std::{fs, time::Duration};

use billing_client::{ApiClient, ApiError};
use serde::Deserialize;

use crate::allocation::NegativePoolPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub http_bind_addr: String,
}

/// How the shared pool is split across rooms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharePolicyKind {
    #[default]
    Equal,
    Proportional,
    LaundryUsage,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AllocationConfig {
    #[serde(default)]
    pub share_policy: SharePolicyKind,
    #[serde(default)]
    pub negative_pool: NegativePoolPolicy,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadConfig {
    /// Overrides `<api.base_url>/auth/google`.
    pub auth_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    pub batch_size: usize,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            max_retries: 3,
            retry_backoff_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    pub bind_addr: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub allocation: AllocationConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub import: ImportConfig,
    pub metrics: Option<MetricsConfig>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        let path = env::var("BILLING_CONFIG").unwrap_or_else(|_| "billing-config.toml".to_string());
        let contents = fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("failed to read config '{path}': {e}"))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        if cfg.import.batch_size == 0 {
            anyhow::bail!("import.batch_size must be at least 1");
        }
        Ok(cfg)
    }

    pub fn api_client(&self) -> Result<ApiClient, ApiError> {
        ApiClient::new(&self.api.base_url, Duration::from_millis(self.api.timeout_ms))
    }

    pub fn upload_url(&self, api: &ApiClient) -> String {
        use billing_client::BillingApi;

        self.upload
            .auth_url
            .clone()
            .unwrap_or_else(|| api.drive_upload_url())
    }
}
