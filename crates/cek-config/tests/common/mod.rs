// crates/cek-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for gateway config validation tests.
// Purpose: Reduce duplication across integration tests for cek-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use cek_config::ConfigError;
use cek_config::GatewayConfig;

/// Application identifier used across config tests.
pub const APPLICATION_ID: &str = "com.yourdomain.extension.pizzabot";

/// Result type used by config tests.
pub type TestResult = Result<(), String>;

/// Parses a TOML string into a `GatewayConfig` without validating it.
pub fn config_from_toml(toml_str: &str) -> Result<GatewayConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal config with only the application identifier set.
pub fn minimal_config() -> Result<GatewayConfig, toml::de::Error> {
    config_from_toml(&format!("[extension]\napplication_id = \"{APPLICATION_ID}\"\n"))
}

/// Asserts that `result` is an error whose message contains `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
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
