use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str = "https://620de95120ac3a4eedcd0e23.mockapi.io/users";
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;
pub const DEFAULT_MAX_RESULTS: usize = 8;

/// Lookup settings, loaded leniently from an optional `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub endpoint: String,
    pub debounce_ms: u64,
    pub max_results: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl Config {
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path_ref = path.as_ref();
        if !path_ref.exists() {
            return Self::default();
        }
        match fs::read_to_string(path_ref) {
            Ok(contents) => match Self::from_toml_str(&contents) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!(
                        "Failed to parse config file '{}': {err}. Using defaults.",
                        path_ref.display()
                    );
                    Self::default()
                }
            },
            Err(err) => {
                eprintln!(
                    "Failed to read config file '{}': {err}. Using defaults.",
                    path_ref.display()
                );
                Self::default()
            }
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        let cfg: ConfigToml = toml::from_str(s)?;
        let defaults = Self::default();
        let lookup = cfg.lookup.unwrap_or_default();
        Ok(Self {
            endpoint: lookup.endpoint.unwrap_or(defaults.endpoint),
            debounce_ms: lookup.debounce_ms.unwrap_or(defaults.debounce_ms),
            max_results: lookup.max_results.unwrap_or(defaults.max_results),
        })
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigToml {
    lookup: Option<LookupToml>,
}

#[derive(Debug, Default, Deserialize)]
struct LookupToml {
    endpoint: Option<String>,
    debounce_ms: Option<u64>,
    max_results: Option<usize>,
}
