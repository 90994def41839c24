//! Service configuration read from the environment at startup.
//!
//! # Environment Variables
//!
//! - `VROOM_BINARY`: path to the VROOM binary (default `/usr/local/bin/vroom`)
//! - `VROOM_MODE`: `file` (default) or `inline`
//! - `VROOM_USE_ROUTING_LIB`: pass `-l` to VROOM (default `true`)
//! - `VROOM_THREADS`: value for `-t` (default: available parallelism)
//! - `VROOM_TIMEOUT_SECS`: kill runs after this many seconds (default: no limit)
//! - `VROOM_MAX_CONCURRENT`: cap on simultaneous VROOM processes (default: no cap)
//! - `SERVICE_PORT`: HTTP port (default 8080)

use std::time::Duration;

use tracing::warn;
use vroomapi_lib::{InvocationMode, OptimizerConfig};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;

/// Everything the route service needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub port: u16,
    pub optimizer: OptimizerConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup.
    ///
    /// Unparseable values are logged and replaced by their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let mut optimizer = default.optimizer.clone();

        if let Some(binary) = lookup("VROOM_BINARY").filter(|v| !v.trim().is_empty()) {
            optimizer.binary = binary.trim().into();
        }

        if let Some(raw) = lookup("VROOM_MODE") {
            match raw.parse::<InvocationMode>() {
                Ok(mode) => optimizer.mode = mode,
                Err(_) => warn!(value = %raw, "unknown VROOM_MODE, using file mode"),
            }
        }

        if let Some(raw) = lookup("VROOM_USE_ROUTING_LIB") {
            match parse_bool(&raw) {
                Some(enabled) => optimizer.use_routing_lib = enabled,
                None => warn!(value = %raw, "invalid VROOM_USE_ROUTING_LIB, keeping default"),
            }
        }

        if let Some(threads) = parse_positive(&lookup, "VROOM_THREADS") {
            optimizer.threads = threads as usize;
        }

        optimizer.timeout = parse_positive(&lookup, "VROOM_TIMEOUT_SECS").map(Duration::from_secs);
        optimizer.max_concurrent =
            parse_positive(&lookup, "VROOM_MAX_CONCURRENT").map(|n| n as usize);

        let port = lookup("SERVICE_PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(default.port);

        Self { port, optimizer }
    }
}

/// Parse `true`/`false` (and `1`/`0`, `yes`/`no`), ignoring case.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

/// Positive integer setting; zero and garbage mean "unset".
fn parse_positive<F>(lookup: &F, key: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(0) => None,
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring non-numeric setting");
            None
        }
    }
}
