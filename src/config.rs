use std::{env, net::SocketAddr, num::NonZeroUsize, thread};

use thiserror::Error;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PAYLOAD_SIZE: usize = 1024 * 10;
/// Largest accepted `PAYLOAD_SIZE`, 1 GiB.
pub const MAX_PAYLOAD_SIZE: usize = 1 << 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind_addr: String,
    pub bind_port: u16,
    /// Runtime worker threads serving requests.
    pub workers: usize,
    /// Length of the `/work` response body in bytes.
    pub payload_size: usize,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PORT must be a valid u16")]
    InvalidPort,
    #[error("WORKERS must be a positive integer")]
    InvalidWorkers,
    #[error("PAYLOAD_SIZE must be an integer between 0 and 1073741824")]
    InvalidPayloadSize,
    #[error("invalid bind address or port")]
    InvalidSocket,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            bind_port: DEFAULT_PORT,
            workers: available_workers(),
            payload_size: DEFAULT_PAYLOAD_SIZE,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr =
            non_empty_var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_port = non_empty_var("PORT")
            .map(|value| value.parse::<u16>().map_err(|_| ConfigError::InvalidPort))
            .transpose()?
            .unwrap_or(DEFAULT_PORT);
        let workers = non_empty_var("WORKERS")
            .map(|value| {
                value
                    .parse::<NonZeroUsize>()
                    .map(NonZeroUsize::get)
                    .map_err(|_| ConfigError::InvalidWorkers)
            })
            .transpose()?
            .unwrap_or_else(available_workers);
        let payload_size = non_empty_var("PAYLOAD_SIZE")
            .map(|value| {
                value
                    .parse::<usize>()
                    .ok()
                    .filter(|size| *size <= MAX_PAYLOAD_SIZE)
                    .ok_or(ConfigError::InvalidPayloadSize)
            })
            .transpose()?
            .unwrap_or(DEFAULT_PAYLOAD_SIZE);

        let config = Self {
            bind_addr,
            bind_port,
            workers,
            payload_size,
        };

        let _ = config.bind_socket()?;
        Ok(config)
    }

    pub fn bind_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.bind_port)
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidSocket)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn available_workers() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    // Tests below mutate process-wide environment variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in ["BIND_ADDR", "PORT", "WORKERS", "PAYLOAD_SIZE"] {
            env::remove_var(key);
        }
    }

    #[test]
    fn parse_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let config = Config::from_env().expect("config should parse");
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.bind_port, 8080);
        assert_eq!(config.payload_size, 10240);
        assert_eq!(config.workers, available_workers());
        assert!(config.workers >= 1);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn overrides_are_read() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("BIND_ADDR", "127.0.0.1");
        env::set_var("PORT", "9090");
        env::set_var("WORKERS", "3");
        env::set_var("PAYLOAD_SIZE", "42");

        let config = Config::from_env().expect("config should parse");
        clear_env();

        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.bind_port, 9090);
        assert_eq!(config.workers, 3);
        assert_eq!(config.payload_size, 42);
        assert_eq!(
            config.bind_socket().expect("valid socket"),
            "127.0.0.1:9090".parse().expect("valid socket")
        );
    }

    #[test]
    fn blank_port_falls_back_to_default() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("PORT", "  ");

        let config = Config::from_env().expect("config should parse");
        clear_env();

        assert_eq!(config.bind_port, 8080);
    }

    #[test]
    fn invalid_port_fails() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("PORT", "70000");

        let err = Config::from_env().expect_err("expected invalid port error");
        clear_env();

        assert!(matches!(err, ConfigError::InvalidPort));
    }

    #[test]
    fn zero_workers_fails() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("WORKERS", "0");

        let err = Config::from_env().expect_err("expected invalid workers error");
        clear_env();

        assert!(matches!(err, ConfigError::InvalidWorkers));
    }

    #[test]
    fn invalid_payload_size_fails() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("PAYLOAD_SIZE", "-1");

        let err = Config::from_env().expect_err("expected invalid payload size error");
        clear_env();

        assert!(matches!(err, ConfigError::InvalidPayloadSize));
    }

    #[test]
    fn oversized_payload_size_fails() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("PAYLOAD_SIZE", "18446744073709551615");

        let err = Config::from_env().expect_err("expected invalid payload size error");
        clear_env();

        assert!(matches!(err, ConfigError::InvalidPayloadSize));
    }

    #[test]
    fn payload_size_at_maximum_is_accepted() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("PAYLOAD_SIZE", MAX_PAYLOAD_SIZE.to_string());

        let config = Config::from_env().expect("config should parse");
        clear_env();

        assert_eq!(config.payload_size, MAX_PAYLOAD_SIZE);
    }

    #[test]
    fn invalid_bind_addr_fails() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        env::set_var("BIND_ADDR", "not an address");

        let err = Config::from_env().expect_err("expected invalid socket error");
        clear_env();

        assert!(matches!(err, ConfigError::InvalidSocket));
    }
}
