//! # Server Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file (or no file at all) yields a working server.

use crate::error::{ServerError, ServerResult};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Server configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Item catalog to load.
    pub catalog_path: PathBuf,
    /// Default log filter, overridden by `RUST_LOG`.
    pub log_filter: String,
    /// Store round trips one session may have in flight.
    pub max_pending_continuations: usize,
    /// Outbound messages buffered per session before new ones are dropped.
    pub outbound_queue: usize,
    /// Worker threads for the store runtime.
    pub worker_threads: usize,
    /// First item id handed out by the allocator.
    pub first_item_id: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("data/catalog.toml"),
            log_filter: "info".to_string(),
            max_pending_continuations: 64,
            outbound_queue: 1024,
            worker_threads: 2,
            first_item_id: 1,
        }
    }
}

impl ServerConfig {
    /// Parses and validates a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ConfigParse`] for malformed TOML and
    /// [`ServerError::ConfigValue`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> ServerResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::ConfigIo`] if the file cannot be read, plus the
    /// errors of [`ServerConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> ServerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ServerError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> ServerResult<()> {
        if self.max_pending_continuations == 0 {
            return Err(ServerError::ConfigValue(
                "max_pending_continuations must be at least 1".to_string(),
            ));
        }
        if self.outbound_queue == 0 {
            return Err(ServerError::ConfigValue(
                "outbound_queue must be at least 1".to_string(),
            ));
        }
        if self.worker_threads == 0 {
            return Err(ServerError::ConfigValue(
                "worker_threads must be at least 1".to_string(),
            ));
        }
        if self.first_item_id == 0 {
            return Err(ServerError::ConfigValue(
                "first_item_id 0 is reserved for empty slots".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ServerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = ServerConfig::from_toml_str(
            r#"
            catalog_path = "/srv/satchel/catalog.toml"
            log_filter = "satchel_inventory=debug,info"
            max_pending_continuations = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.catalog_path, PathBuf::from("/srv/satchel/catalog.toml"));
        assert_eq!(config.log_filter, "satchel_inventory=debug,info");
        assert_eq!(config.max_pending_continuations, 8);
        assert_eq!(config.outbound_queue, 1024);
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let result = ServerConfig::from_toml_str("tick_rate = 60");
        assert!(matches!(result, Err(ServerError::ConfigParse(_))));
    }

    #[test]
    fn test_rejects_zero_bounds() {
        for text in [
            "max_pending_continuations = 0",
            "outbound_queue = 0",
            "worker_threads = 0",
            "first_item_id = 0",
        ] {
            assert!(
                matches!(ServerConfig::from_toml_str(text), Err(ServerError::ConfigValue(_))),
                "{text}"
            );
        }
    }

    #[test]
    fn test_missing_file() {
        let result = ServerConfig::load("/nonexistent/satchel.toml");
        assert!(matches!(result, Err(ServerError::ConfigIo { .. })));
    }
}
