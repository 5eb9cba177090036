//! Configuration for BreezeKV
//!
//! Centralized configuration with sensible defaults.

use crate::error::{BreezeError, Result};

/// Main configuration for a BreezeKV server instance
///
/// The store itself is purely in-memory and needs no configuration; all
/// settings concern the network boundary.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP listen address
    pub listen_addr: String,

    /// Max queued connections awaiting a worker
    pub max_connections: usize,

    /// Number of connection-handling worker threads
    pub worker_threads: usize,

    /// Connection read timeout (milliseconds); 0 disables
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds); 0 disables
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:7379".to_string(),
            max_connections: 1024,
            worker_threads: 8,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(BreezeError::Config(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(BreezeError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of queued connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the number of worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = Config::builder()
            .listen_addr("0.0.0.0:9000")
            .max_connections(16)
            .worker_threads(2)
            .build();

        assert_eq!(config.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.max_connections, 16);
        assert_eq!(config.worker_threads, 2);
        // untouched fields keep their defaults
        assert_eq!(config.read_timeout_ms, 5000);
    }

    #[test]
    fn zero_workers_is_rejected() {
        let config = Config::builder().worker_threads(0).build();
        assert!(config.validate().is_err());
    }
}
