use std::time::Duration;

use serde::Deserialize;

/// Which `QueueStore` implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Shared Redis instance (production).
    Redis,
    /// In-process store; state is lost on restart.
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" => Ok(StoreBackend::Redis),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow::anyhow!(
                "STORE_BACKEND must be 'redis' or 'memory', got '{}'",
                other
            )),
        }
    }
}

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listening port
    pub port: u16,

    /// Redis connection string
    pub redis_url: String,

    /// Name reported by the health endpoint
    pub service_name: String,

    /// Delay between delivery worker iterations in milliseconds (default: 1000)
    pub worker_poll_interval_ms: u64,

    /// Store implementation to use
    pub store_backend: StoreBackend,

    /// Optional webhook that receives every delivered notification
    pub webhook_url: Option<String>,

    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let redis_url = match var("REDIS_URL") {
            Some(url) => url,
            None => {
                let host = var("REDIS_HOST").unwrap_or_else(|| "redis".to_string());
                let port: u16 = var("REDIS_PORT")
                    .unwrap_or_else(|| "6379".to_string())
                    .parse()
                    .map_err(|_| anyhow::anyhow!("REDIS_PORT must be a valid u16"))?;
                format!("redis://{}:{}", host, port)
            }
        };

        Ok(Self {
            port: var("PORT")
                .unwrap_or_else(|| "8084".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid u16"))?,
            redis_url,
            service_name: var("SERVICE_NAME")
                .unwrap_or_else(|| "hvitops-notifications".to_string()),
            worker_poll_interval_ms: var("WORKER_POLL_INTERVAL_MS")
                .unwrap_or_else(|| "1000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("WORKER_POLL_INTERVAL_MS must be a valid u64"))?,
            store_backend: var("STORE_BACKEND")
                .unwrap_or_else(|| "redis".to_string())
                .parse()?,
            webhook_url: var("NOTIFICATION_WEBHOOK_URL").filter(|url| !url.is_empty()),
            log_json: var("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        })
    }

    pub fn worker_poll_interval(&self) -> Duration {
        Duration::from_millis(self.worker_poll_interval_ms)
    }
}
