// crates/neptune-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for neptune-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use neptune_config::ConfigError;
use neptune_config::NeptuneConfig;

/// Parses a TOML string into a `NeptuneConfig` for tests.
pub fn config_from_toml(toml_str: &str) -> Result<NeptuneConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal config with all defaults applied.
pub fn minimal_config() -> Result<NeptuneConfig, toml::de::Error> {
    config_from_toml("")
}

/// Writes `content` to `neptune.toml` under `dir` and returns the path.
pub fn write_config(dir: &Path, content: &[u8]) -> Result<PathBuf, String> {
    let path = dir.join("neptune.toml");
    fs::write(&path, content).map_err(|err| err.to_string())?;
    Ok(path)
}

/// Asserts that `result` failed with a message containing `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> Result<(), String> {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
