use serde::Deserialize;

/// Configuration options of the attendance service.
///
/// Loaded from `config/default.yaml`, an optional `config/{APP_ENV}.yaml` and
/// `APP__`-prefixed environment variables, in that order.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Used when `port` is already bound.
    #[serde(default = "default_fallback_port")]
    pub fallback_port: u16,
    /// Directory holding one SQLite file per store.
    #[serde(default = "default_database_dir")]
    pub database_dir: String,
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,
    /// Base URL printed in the QR code when no peer is configured.
    #[serde(default)]
    pub public_url: Option<String>,
    /// Remote host exposing the same sync endpoints.
    #[serde(default)]
    pub peer_url: Option<String>,
    /// Shared secret mixed into the daily token digest.
    #[serde(default)]
    pub token_secret: Option<String>,
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub replication: ReplicationConfig,
}

/// Alert monitor tuning.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub interval_secs: u64,
    pub expiry_window_days: i64,
    pub contract_window_days: i64,
    /// Critical threshold as a fraction of a product's minimum stock.
    pub critical_stock_ratio: f64,
    pub retention_days: i64,
    pub max_active_per_kind: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 300,
            expiry_window_days: 30,
            contract_window_days: 30,
            critical_stock_ratio: 0.5,
            retention_days: 30,
            max_active_per_kind: 100,
        }
    }
}

/// Replication bridge tuning.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ReplicationConfig {
    pub pull_interval_secs: u64,
    pub timeout_secs: u64,
    pub retry_backoff_ms: u64,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            pull_interval_secs: 30,
            timeout_secs: 10,
            retry_backoff_ms: 2000,
        }
    }
}

fn default_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_fallback_port() -> u16 {
    5001
}

fn default_database_dir() -> String {
    "database".to_string()
}

fn default_templates_dir() -> String {
    "templates/**/*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            fallback_port: default_fallback_port(),
            database_dir: default_database_dir(),
            templates_dir: default_templates_dir(),
            public_url: None,
            peer_url: None,
            token_secret: None,
            monitor: MonitorConfig::default(),
            replication: ReplicationConfig::default(),
        }
    }
}
