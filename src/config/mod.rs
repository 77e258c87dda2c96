// Configuration module entry point
// Loads layered configuration and exposes the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{Config, SimulationConfig};

/// Default config file, resolved without extension by the `config` crate
pub const DEFAULT_CONFIG_PATH: &str = "config";

impl Config {
    /// Load configuration from specified file path (without extension)
    /// layered under `DLSIM_*` environment variables, e.g. `DLSIM_SERVER__PORT=8080`
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = Self::builder()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("DLSIM")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Built-in defaults with no file or environment layered on top
    #[cfg(test)]
    pub fn defaults() -> Result<Self, config::ConfigError> {
        Self::builder()?.build()?.try_deserialize()
    }

    fn builder(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.shutdown_grace_period", 5)?
            .set_default("http.server_name", "dlsim")?
            .set_default("http.enable_cors", true)?
            .set_default("simulation.chunk_size", 1_048_576)? // 1MiB
            .set_default("simulation.chunk_delay_ms", 100)?
            .set_default("simulation.default_size_mb", 10)?
            .set_default("simulation.default_error_code", 401)?
            .set_default("simulation.max_size_mb", 4096)?
            .set_default("simulation.max_block_size_mb", 256)?
            .set_default("simulation.max_redirects", 100)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_behavior() {
        let cfg = Config::defaults().expect("defaults should deserialize");
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.server.workers, None);
        assert_eq!(cfg.simulation.chunk_size, 1024 * 1024);
        assert_eq!(cfg.simulation.chunk_delay_ms, 100);
        assert_eq!(cfg.simulation.default_size_mb, 10);
        assert_eq!(cfg.simulation.default_error_code, 401);
        assert_eq!(cfg.simulation.max_size_mb, 4096);
        assert_eq!(cfg.simulation.max_block_size_mb, 256);
        assert!(cfg.http.enable_cors);
        assert!(cfg.logging.access_log);
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.logging.access_log_file, None);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let cfg = Config::load_from("does-not-exist/dlsim").expect("file is optional");
        assert_eq!(cfg.simulation.max_redirects, 100);
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::defaults().unwrap();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:5000".parse::<SocketAddr>().unwrap()
        );

        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
