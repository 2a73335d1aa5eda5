//! Config loading and gateway construction tests for cek-config.
// crates/cek-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Tests
// Description: Load configuration from disk and build gateways from it.
// Purpose: Ensure file limits hold and built gateways honor every setting.
// =============================================================================

use std::fs;
use std::path::Path;

use cek_config::GatewayConfig;
use cek_config::MAX_CONFIG_FILE_SIZE;
use cek_core::CEK_PUBLIC_KEY_PEM;
use cek_core::GatewayError;
use cek_core::PublicKey;

mod common;

use crate::common::TestResult;
use crate::common::assert_invalid;

const LAUNCH_BODY: &[u8] = br#"{"version":"1.0","session":{"new":true,"sessionAttributes":{},"sessionId":"s","user":{"userId":"u"}},"context":{"System":{"application":{"applicationId":"com.yourdomain.extension.pizzabot"},"device":{"deviceId":"d"},"user":{"userId":"u"}}},"request":{"type":"LaunchRequest"}}"#;

fn write_config(dir: &Path, content: &str) -> Result<std::path::PathBuf, String> {
    let path = dir.join("cek-gateway.toml");
    fs::write(&path, content).map_err(|err| err.to_string())?;
    Ok(path)
}

fn temp_dir() -> Result<tempfile::TempDir, String> {
    tempfile::tempdir().map_err(|err| err.to_string())
}

#[test]
fn load_reads_explicit_path() -> TestResult {
    let dir = temp_dir()?;
    let path = write_config(
        dir.path(),
        &format!("[extension]\napplication_id = \"{}\"\n", common::APPLICATION_ID),
    )?;
    let config = GatewayConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if config.extension.application_id != common::APPLICATION_ID {
        return Err("application_id not loaded".to_string());
    }
    Ok(())
}

#[test]
fn load_missing_file_is_io_error() -> TestResult {
    let dir = temp_dir()?;
    assert_invalid(GatewayConfig::load(Some(&dir.path().join("absent.toml"))), "config io error")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let dir = temp_dir()?;
    let padding = "#".repeat(MAX_CONFIG_FILE_SIZE);
    let path = write_config(
        dir.path(),
        &format!("[extension]\napplication_id = \"a\"\n{padding}\n"),
    )?;
    assert_invalid(GatewayConfig::load(Some(&path)), "config file exceeds size limit")
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let dir = temp_dir()?;
    let path = dir.path().join("cek-gateway.toml");
    fs::write(&path, [0xff, 0xfe, 0x00]).map_err(|err| err.to_string())?;
    assert_invalid(GatewayConfig::load(Some(&path)), "config file must be utf-8")
}

#[test]
fn load_validates_after_parsing() -> TestResult {
    let dir = temp_dir()?;
    let path = write_config(dir.path(), "[extension]\napplication_id = \"\"\n")?;
    assert_invalid(GatewayConfig::load(Some(&path)), "extension.application_id must be non-empty")
}

#[test]
fn built_gateway_defaults_to_platform_key() -> TestResult {
    let config = common::minimal_config().map_err(|err| err.to_string())?;
    let gateway = config.build_gateway().map_err(|err| err.to_string())?;
    let platform = PublicKey::from_pem(CEK_PUBLIC_KEY_PEM).map_err(|err| err.to_string())?;
    if gateway.verifier().public_key() != &platform {
        return Err("gateway should use the platform key".to_string());
    }
    if gateway.application_id() != common::APPLICATION_ID || gateway.debug_mode() {
        return Err("gateway identity settings not applied".to_string());
    }
    match gateway.handle(LAUNCH_BODY, "") {
        Err(GatewayError::Signature) => Ok(()),
        Err(err) => Err(format!("expected signature rejection, got {err}")),
        Ok(_) => Err("unsigned request accepted".to_string()),
    }
}

#[test]
fn built_gateway_reads_key_file_and_limits() -> TestResult {
    let dir = temp_dir()?;
    let key_path = dir.path().join("cek.pem");
    fs::write(&key_path, CEK_PUBLIC_KEY_PEM).map_err(|err| err.to_string())?;
    let toml = format!(
        "[extension]\napplication_id = \"{}\"\nmax_body_bytes = 512\n\n[signature]\npublic_key_path = '{}'\n",
        common::APPLICATION_ID,
        key_path.to_string_lossy()
    );
    let config = GatewayConfig::from_toml_str(&toml).map_err(|err| err.to_string())?;
    let gateway = config.build_gateway().map_err(|err| err.to_string())?;
    if gateway.max_body_bytes() != 512 {
        return Err("max_body_bytes not applied".to_string());
    }
    let platform = PublicKey::from_pem(CEK_PUBLIC_KEY_PEM).map_err(|err| err.to_string())?;
    if gateway.verifier().public_key() != &platform {
        return Err("key file not applied".to_string());
    }
    Ok(())
}

#[test]
fn padded_key_path_is_opened_as_validated() -> TestResult {
    let dir = temp_dir()?;
    let key_path = dir.path().join("cek.pem");
    fs::write(&key_path, CEK_PUBLIC_KEY_PEM).map_err(|err| err.to_string())?;
    let toml = format!(
        "[extension]\napplication_id = \"a\"\n\n[signature]\npublic_key_path = '  {}\t'\n",
        key_path.to_string_lossy()
    );
    let config = GatewayConfig::from_toml_str(&toml).map_err(|err| err.to_string())?;
    config.build_gateway().map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn built_gateway_reports_missing_key_file() -> TestResult {
    let dir = temp_dir()?;
    let toml = format!(
        "[extension]\napplication_id = \"a\"\n\n[signature]\npublic_key_path = '{}'\n",
        dir.path().join("missing.pem").to_string_lossy()
    );
    let config = GatewayConfig::from_toml_str(&toml).map_err(|err| err.to_string())?;
    assert_invalid(config.build_gateway(), "config io error")
}

#[test]
fn debug_gateway_with_file_sink_accepts_and_logs() -> TestResult {
    let dir = temp_dir()?;
    let audit_path = dir.path().join("audit.jsonl");
    let toml = format!(
        "[extension]\napplication_id = \"{}\"\ndebug_mode = true\n\n[audit]\nsink = \"file\"\npath = '{}'\n",
        common::APPLICATION_ID,
        audit_path.to_string_lossy()
    );
    let config = GatewayConfig::from_toml_str(&toml).map_err(|err| err.to_string())?;
    let gateway = config.build_gateway().map_err(|err| err.to_string())?;
    gateway.handle(LAUNCH_BODY, "").map_err(|err| err.to_string())?;
    let log = fs::read_to_string(&audit_path).map_err(|err| err.to_string())?;
    if log.lines().count() != 1 || !log.contains("\"outcome\":\"accept\"") {
        return Err(format!("unexpected audit log: {log}"));
    }
    Ok(())
}
