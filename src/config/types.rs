// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub simulation: SimulationConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub max_connections: Option<u64>,
    /// Seconds to wait for in-flight responses after a shutdown signal
    pub shutdown_grace_period: u64,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
}

/// Payload generation settings shared by the download endpoints
#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    /// Bytes per streamed chunk; also the unit of `size` and `abortAfter`
    pub chunk_size: usize,
    /// Pause between streamed chunks
    pub chunk_delay_ms: u64,
    pub default_size_mb: u64,
    pub default_error_code: u16,
    pub max_size_mb: u64,
    /// Cap on `size` for payloads held in memory as one block (redirect target)
    pub max_block_size_mb: u64,
    pub max_redirects: u64,
}

impl SimulationConfig {
    pub const fn chunk_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.chunk_delay_ms)
    }
}
