// crates/cek-config/src/config.rs
// ============================================================================
// Module: CEK Gateway Configuration
// Description: Configuration loading and validation for the CEK gateway.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: cek-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Missing or invalid configuration fails closed. A validated config builds a
//! [`Gateway`] with its verifier and audit sink wired in.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use cek_core::DEFAULT_MAX_BODY_BYTES;
use cek_core::FileAuditSink;
use cek_core::Gateway;
use cek_core::GatewayAuditSink;
use cek_core::NoopAuditSink;
use cek_core::SignatureVerifier;
use cek_core::StderrAuditSink;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "cek-gateway.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "CEK_GATEWAY_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of the application identifier.
pub(crate) const MAX_APPLICATION_ID_LENGTH: usize = 256;
/// Upper bound for `extension.max_body_bytes`.
pub const MAX_BODY_BYTES_LIMIT: usize = 16 * 1024 * 1024;
/// Maximum size of a public key file in bytes.
pub(crate) const MAX_PUBLIC_KEY_FILE_SIZE: usize = 64 * 1024;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Gateway configuration root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Extension identity and request limits.
    pub extension: ExtensionConfig,
    /// Optional signature key override; the CEK platform key when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<SignatureConfig>,
    /// Audit log routing.
    #[serde(default)]
    pub audit: AuditConfig,
}

impl GatewayConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order: `path`, then `CEK_GATEWAY_CONFIG`, then
    /// `cek-gateway.toml` in the working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.extension.validate()?;
        if let Some(signature) = &self.signature {
            signature.validate()?;
        }
        self.audit.validate()
    }

    /// Builds a gateway from the validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when validation fails, the key cannot be read
    /// or parsed, or the audit log cannot be opened.
    pub fn build_gateway(&self) -> Result<Gateway, ConfigError> {
        self.validate()?;
        let verifier = match &self.signature {
            Some(signature) => signature.verifier()?,
            None => SignatureVerifier::cek()
                .map_err(|err| ConfigError::Invalid(format!("signature key: {err}")))?,
        };
        Ok(Gateway::new(self.extension.application_id.trim(), verifier)
            .with_debug_mode(self.extension.debug_mode)
            .with_max_body_bytes(self.extension.max_body_bytes)
            .with_audit_sink(self.audit.sink()?))
    }
}

// ============================================================================
// SECTION: Extension
// ============================================================================

/// Extension identity and request limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ExtensionConfig {
    /// Application identifier inbound requests must carry.
    pub application_id: String,
    /// Skip signature verification. Local testing only.
    #[serde(default)]
    pub debug_mode: bool,
    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl ExtensionConfig {
    /// Validates extension settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let application_id = self.application_id.trim();
        if application_id.is_empty() {
            return Err(ConfigError::Invalid(
                "extension.application_id must be non-empty".to_string(),
            ));
        }
        if application_id.len() > MAX_APPLICATION_ID_LENGTH {
            return Err(ConfigError::Invalid(
                "extension.application_id exceeds max length".to_string(),
            ));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid(
                "extension.max_body_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "extension.max_body_bytes must be at most {MAX_BODY_BYTES_LIMIT}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Signature
// ============================================================================

/// Public key override for signature verification.
///
/// Exactly one of `public_key_path` and `public_key_pem` must be set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SignatureConfig {
    /// Path to a PEM-encoded SPKI public key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_path: Option<PathBuf>,
    /// Inline PEM-encoded SPKI public key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key_pem: Option<String>,
}

impl SignatureConfig {
    /// Validates that exactly one key source is configured.
    fn validate(&self) -> Result<(), ConfigError> {
        match (&self.public_key_path, &self.public_key_pem) {
            (Some(_), Some(_)) => Err(ConfigError::Invalid(
                "signature.public_key_path and signature.public_key_pem are mutually exclusive"
                    .to_string(),
            )),
            (None, None) => Err(ConfigError::Invalid(
                "signature requires public_key_path or public_key_pem".to_string(),
            )),
            (Some(path), None) => {
                checked_path("signature.public_key_path", path).map(|_| ())
            }
            (None, Some(pem)) if pem.trim().is_empty() => Err(ConfigError::Invalid(
                "signature.public_key_pem must be non-empty".to_string(),
            )),
            (None, Some(_)) => Ok(()),
        }
    }

    /// Loads the configured key and builds a verifier.
    fn verifier(&self) -> Result<SignatureVerifier, ConfigError> {
        let pem = match (&self.public_key_path, &self.public_key_pem) {
            (_, Some(pem)) => pem.clone(),
            (Some(path), None) => {
                read_key_file(&checked_path("signature.public_key_path", path)?)?
            }
            (None, None) => {
                return Err(ConfigError::Invalid(
                    "signature requires public_key_path or public_key_pem".to_string(),
                ));
            }
        };
        SignatureVerifier::from_pem(&pem)
            .map_err(|err| ConfigError::Invalid(format!("signature key: {err}")))
    }
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// Discard audit events.
    #[default]
    None,
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to a file.
    File,
}

/// Audit log routing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink receiving gateway audit events.
    #[serde(default)]
    pub sink: AuditSinkKind,
    /// Log file path; required for the file sink only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl AuditConfig {
    /// Validates that `path` is set exactly when the sink needs it.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("file audit sink requires path".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => {
                checked_path("audit.path", path).map(|_| ())
            }
            (AuditSinkKind::None | AuditSinkKind::Stderr, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only valid for the file sink".to_string(),
            )),
            (AuditSinkKind::None | AuditSinkKind::Stderr, None) => Ok(()),
        }
    }

    /// Opens the configured sink.
    fn sink(&self) -> Result<Arc<dyn GatewayAuditSink>, ConfigError> {
        match (self.sink, &self.path) {
            (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
            (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
            (AuditSinkKind::File, Some(path)) => {
                let sink = FileAuditSink::new(&checked_path("audit.path", path)?)
                    .map_err(|err| ConfigError::Io(format!("audit log: {err}")))?;
                Ok(Arc::new(sink))
            }
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("file audit sink requires path".to_string()))
            }
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration or referenced files.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Default request body limit.
pub(crate) const fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Resolves the config path from the caller, the environment, or the default
/// filename, and applies the path limits.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let candidate = match path {
        Some(path) => path.to_path_buf(),
        None => env::var_os(CONFIG_ENV_VAR)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_NAME), PathBuf::from),
    };
    checked_path("config path", &candidate)
}

/// Trims `path` and checks it against the length limits.
///
/// Returns the trimmed path, which is the one callers must open.
fn checked_path(field: &str, path: &Path) -> Result<PathBuf, ConfigError> {
    let text = path.to_string_lossy();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let checked = PathBuf::from(trimmed);
    let too_long = checked
        .components()
        .any(|component| component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH);
    if too_long {
        return Err(ConfigError::Invalid(format!("{field} component too long")));
    }
    Ok(checked)
}

/// Reads a public key file with a size cap.
fn read_key_file(path: &Path) -> Result<String, ConfigError> {
    let bytes = fs::read(path).map_err(|err| ConfigError::Io(format!("signature key: {err}")))?;
    if bytes.len() > MAX_PUBLIC_KEY_FILE_SIZE {
        return Err(ConfigError::Invalid("signature key file exceeds size limit".to_string()));
    }
    String::from_utf8(bytes)
        .map_err(|_| ConfigError::Invalid("signature key file must be utf-8".to_string()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
