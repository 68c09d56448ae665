//! Runtime configuration from the environment.
//!
//! `.env` is loaded by the binary (via `dotenvy`) before [`AppConfig::from_env`]
//! runs; command line flags override individual values afterwards.

use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::{GridStore, DEFAULT_GRID_DIR};
use crate::error::ConfigError;
use crate::transform::DEFAULT_SAMPLE_ROWS;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STATIC_DIR: &str = "frontend/dist";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the GTX geoid grids
    pub grid_dir: PathBuf,
    /// Base URL missing grids are downloaded from
    pub grid_url: Option<String>,
    /// Built frontend served at `/`
    pub static_dir: PathBuf,
    /// Rows kept in inspection samples
    pub sample_rows: usize,
    /// Multipart body limit
    pub max_upload_mb: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            grid_dir: PathBuf::from(DEFAULT_GRID_DIR),
            grid_url: None,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            sample_rows: DEFAULT_SAMPLE_ROWS,
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
        }
    }
}

impl AppConfig {
    /// Read `CAMCONV_*` variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Ok(Self {
            host: var("CAMCONV_HOST").unwrap_or(defaults.host),
            port: parse_var("CAMCONV_PORT", var("CAMCONV_PORT"))?.unwrap_or(defaults.port),
            grid_dir: var("CAMCONV_GRID_DIR").map(PathBuf::from).unwrap_or(defaults.grid_dir),
            grid_url: var("CAMCONV_GRID_URL"),
            static_dir: var("CAMCONV_STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            sample_rows: parse_var("CAMCONV_SAMPLE_ROWS", var("CAMCONV_SAMPLE_ROWS"))?
                .unwrap_or(defaults.sample_rows),
            max_upload_mb: parse_var("CAMCONV_MAX_UPLOAD_MB", var("CAMCONV_MAX_UPLOAD_MB"))?
                .unwrap_or(defaults.max_upload_mb),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn grid_store(&self) -> GridStore {
        GridStore::with_dir(&self.grid_dir).with_source(self.grid_url.clone())
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

fn parse_var<T: FromStr>(name: &str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        value.parse::<T>().map_err(|e| ConfigError {
            name: name.to_string(),
            reason: e.to_string(),
            value,
        })
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("CAMCONV_PORT", "8080"),
            ("CAMCONV_GRID_DIR", "/srv/grids"),
            ("CAMCONV_GRID_URL", "https://example.org/grids"),
            ("CAMCONV_SAMPLE_ROWS", "10"),
            ("CAMCONV_HOST", "  "),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.grid_dir, PathBuf::from("/srv/grids"));
        assert_eq!(config.grid_url.as_deref(), Some("https://example.org/grids"));
        assert_eq!(config.sample_rows, 10);
        assert_eq!(config.host, DEFAULT_HOST);
    }

    #[test]
    fn test_invalid_number() {
        let err = AppConfig::from_lookup(lookup(&[("CAMCONV_PORT", "eighty")])).unwrap_err();
        assert_eq!(err.name, "CAMCONV_PORT");
        assert_eq!(err.value, "eighty");
    }
}
