//! Shared input handling: config location, JSON documents, randomness.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::de::DeserializeOwned;
use std::io::Read;
use std::path::Path;
use studyplan_config::{AppConfig, ConfigError};

/// Load the config from `path` when given, else from the default location.
/// Environment overrides apply either way.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    }
}

/// Read a JSON document from a file, or from stdin when `path` is "-".
pub fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, String> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("Failed to read {what} from stdin: {e}"))?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {what} at {}: {e}", path.display()))?
    };

    serde_json::from_str(&content).map_err(|e| format!("Invalid {what} JSON: {e}"))
}

/// A seeded generator when a seed is given, otherwise one seeded from the OS.
pub fn session_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
