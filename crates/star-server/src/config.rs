//! Server configuration read from the environment.

use std::env;
use std::path::PathBuf;

use star_core::PAGE_SIZE;

/// Bind address used when `STARAPP_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Runtime settings for the star search server.
///
/// | variable            | field          | default         |
/// |---------------------|----------------|-----------------|
/// | `STARAPP_ADDR`      | `bind_addr`    | `0.0.0.0:5000`  |
/// | `STARAPP_CATALOG`   | `catalog_path` | none            |
/// | `STARAPP_PAGE_SIZE` | `page_size`    | [`PAGE_SIZE`]   |
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// JSON catalog to load at startup; `None` serves an empty catalog.
    pub catalog_path: Option<PathBuf>,
    pub page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            catalog_path: None,
            page_size: PAGE_SIZE,
        }
    }
}

impl ServerConfig {
    /// Reads the configuration from `STARAPP_*` environment variables.
    ///
    /// Invalid values are logged and replaced by their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = lookup("STARAPP_ADDR")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.bind_addr);

        let catalog_path = lookup("STARAPP_CATALOG")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let page_size = match lookup("STARAPP_PAGE_SIZE") {
            None => defaults.page_size,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!(
                        value = %raw,
                        fallback = defaults.page_size,
                        "invalid STARAPP_PAGE_SIZE"
                    );
                    defaults.page_size
                }
            },
        };

        Self {
            bind_addr,
            catalog_path,
            page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(ServerConfig::from_lookup(lookup(&[])), ServerConfig::default());
    }

    #[test]
    fn reads_all_variables() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("STARAPP_ADDR", "127.0.0.1:8080"),
            ("STARAPP_CATALOG", "/data/stars.json"),
            ("STARAPP_PAGE_SIZE", "25"),
        ]));
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.catalog_path, Some(PathBuf::from("/data/stars.json")));
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn invalid_page_size_falls_back() {
        for raw in ["zero", "0", "-3", ""] {
            let config = ServerConfig::from_lookup(lookup(&[("STARAPP_PAGE_SIZE", raw)]));
            assert_eq!(config.page_size, PAGE_SIZE, "value {raw:?}");
        }
    }

    #[test]
    fn blank_address_falls_back() {
        let config = ServerConfig::from_lookup(lookup(&[("STARAPP_ADDR", "  ")]));
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    }
}
