// crates/cek-core/src/gateway.rs
// ============================================================================
// Module: CEK Extension Gateway
// Description: Verify, decode, and identity-check inbound extension requests.
// Purpose: Single fail-closed entry point between the transport and handlers.
// Dependencies: crate::{audit, decode, request, signature}
// ============================================================================

//! ## Overview
//! [`Gateway::handle`] runs a strictly ordered pipeline over the raw body:
//! signature verification (skipped only in debug mode), two-phase decoding,
//! then the application identifier check. Verification always runs over the
//! untouched bytes before any parsing.
//!
//! Each call is independent. A shared gateway is safe to use concurrently as
//! long as its configuration is not mutated at the same time; the only
//! mutation path is the scoped key override, which requires `&mut`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::ops::Deref;
use std::sync::Arc;

use thiserror::Error;

use crate::audit::AuditOutcome;
use crate::audit::GatewayAuditEvent;
use crate::audit::GatewayAuditEventParams;
use crate::audit::GatewayAuditSink;
use crate::audit::NoopAuditSink;
use crate::decode::DecodeError;
use crate::decode::decode_request;
use crate::request::RequestEnvelope;
use crate::request::RequestType;
use crate::signature::KeyError;
use crate::signature::SignatureVerifier;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Transport header carrying the base64 request signature.
pub const SIGNATURE_HEADER: &str = "SignatureCEK";
/// Default maximum request body size in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Reasons a request is rejected. Every variant is terminal for the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Request body could not be read.
    #[error("request body unreadable: {0}")]
    Io(String),
    /// Signature did not verify. No cause is exposed.
    #[error("invalid signature")]
    Signature,
    /// Body failed to decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Decoded application identifier is absent or differs from the expected one.
    #[error("invalid application")]
    ApplicationMismatch,
}

impl GatewayError {
    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Signature => "signature",
            Self::Decode(err) => err.kind(),
            Self::ApplicationMismatch => "application_mismatch",
        }
    }
}

// ============================================================================
// SECTION: Gateway
// ============================================================================

/// Entry point for inbound extension requests.
///
/// # Invariants
/// - `debug_mode` is fixed at construction.
/// - The verifier changes only through [`Gateway::override_public_key`].
pub struct Gateway {
    /// Application identifier requests must carry.
    application_id: String,
    /// Skip signature verification (local testing only).
    debug_mode: bool,
    /// Request signature verifier.
    verifier: SignatureVerifier,
    /// Maximum body size accepted by [`Gateway::handle_reader`].
    max_body_bytes: usize,
    /// Audit sink receiving one event per call.
    audit: Arc<dyn GatewayAuditSink>,
}

impl Gateway {
    /// Creates a gateway that verifies signatures with `verifier`.
    #[must_use]
    pub fn new(application_id: impl Into<String>, verifier: SignatureVerifier) -> Self {
        Self {
            application_id: application_id.into(),
            debug_mode: false,
            verifier,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            audit: Arc::new(NoopAuditSink),
        }
    }

    /// Creates a gateway that verifies signatures with the CEK platform key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] if the embedded key fails to parse.
    pub fn cek(application_id: impl Into<String>) -> Result<Self, KeyError> {
        Ok(Self::new(application_id, SignatureVerifier::cek()?))
    }

    /// Returns a copy with debug mode set. Debug mode skips signature checks.
    #[must_use]
    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    /// Returns a copy with the body size limit set.
    #[must_use]
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Returns a copy with the audit sink set.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn GatewayAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the expected application identifier.
    #[must_use]
    pub fn application_id(&self) -> &str {
        &self.application_id
    }

    /// Returns true when signature verification is skipped.
    #[must_use]
    pub const fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// Returns the body size limit.
    #[must_use]
    pub const fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Returns the active signature verifier.
    #[must_use]
    pub const fn verifier(&self) -> &SignatureVerifier {
        &self.verifier
    }

    /// Installs a different public key until the returned guard is dropped.
    ///
    /// The previous verifier is restored on every exit path, including
    /// unwinding. Intended for test setups that sign with their own key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] when `pem` is not a valid key; the gateway is left
    /// unchanged.
    pub fn override_public_key(&mut self, pem: &str) -> Result<PublicKeyOverride<'_>, KeyError> {
        let verifier = SignatureVerifier::from_pem(pem)?;
        let previous = std::mem::replace(&mut self.verifier, verifier);
        Ok(PublicKeyOverride {
            gateway: self,
            previous: Some(previous),
        })
    }

    /// Reads the body once from `reader`, then runs [`Gateway::handle`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Io`] when reading fails or the body exceeds the
    /// size limit, otherwise any error from [`Gateway::handle`].
    pub fn handle_reader<R: Read>(
        &self,
        reader: R,
        signature: &str,
    ) -> Result<RequestEnvelope, GatewayError> {
        match read_body(reader, self.max_body_bytes) {
            Ok(body) => self.handle(&body, signature),
            Err((err, request_bytes)) => {
                self.record(&Err(err.clone()), None, request_bytes);
                Err(err)
            }
        }
    }

    /// Verifies, decodes, and identity-checks a raw request body.
    ///
    /// `signature` is the `SignatureCEK` header value; pass an empty string
    /// when the header is missing.
    ///
    /// # Errors
    ///
    /// Returns the first failing stage as a [`GatewayError`].
    pub fn handle(&self, body: &[u8], signature: &str) -> Result<RequestEnvelope, GatewayError> {
        let mut request_type = None;
        let result = self.run(body, signature, &mut request_type);
        self.record(&result, request_type, body.len());
        result
    }

    /// Pipeline body; records the decoded request type for auditing.
    fn run(
        &self,
        body: &[u8],
        signature: &str,
        request_type: &mut Option<RequestType>,
    ) -> Result<RequestEnvelope, GatewayError> {
        if !self.debug_mode {
            self.verifier.verify(signature, body).map_err(|_| GatewayError::Signature)?;
        }
        let envelope = decode_request(body)?;
        *request_type = Some(envelope.request_type());
        if envelope.application_id() != Some(self.application_id.as_str()) {
            return Err(GatewayError::ApplicationMismatch);
        }
        Ok(envelope)
    }

    /// Emits the audit event for one call.
    fn record(
        &self,
        result: &Result<RequestEnvelope, GatewayError>,
        request_type: Option<RequestType>,
        request_bytes: usize,
    ) {
        let (outcome, error_kind) = match result {
            Ok(_) => (AuditOutcome::Accept, None),
            Err(err) => (AuditOutcome::Reject, Some(err.kind())),
        };
        self.audit.record(&GatewayAuditEvent::new(GatewayAuditEventParams {
            outcome,
            error_kind,
            request_type: request_type.map(RequestType::as_str),
            application_id: &self.application_id,
            signature_checked: !self.debug_mode,
            request_bytes,
        }));
    }
}

// ============================================================================
// SECTION: Scoped Key Override
// ============================================================================

/// Guard returned by [`Gateway::override_public_key`].
///
/// Dereferences to the gateway; restores the previous verifier when dropped.
pub struct PublicKeyOverride<'a> {
    /// Gateway under override.
    gateway: &'a mut Gateway,
    /// Verifier to restore; `None` only after restoration.
    previous: Option<SignatureVerifier>,
}

impl Deref for PublicKeyOverride<'_> {
    type Target = Gateway;

    fn deref(&self) -> &Self::Target {
        &*self.gateway
    }
}

impl Drop for PublicKeyOverride<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.gateway.verifier = previous;
        }
    }
}

// ============================================================================
// SECTION: Body Reading
// ============================================================================

/// Reads the full body, failing when it exceeds `max_bytes`.
///
/// On failure returns the error and the number of bytes read.
fn read_body<R: Read>(reader: R, max_bytes: usize) -> Result<Vec<u8>, (GatewayError, usize)> {
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX).saturating_add(1);
    let mut body = Vec::new();
    if let Err(err) = reader.take(limit).read_to_end(&mut body) {
        return Err((GatewayError::Io(err.to_string()), body.len()));
    }
    if body.len() > max_bytes {
        return Err((GatewayError::Io("request body exceeds size limit".to_string()), body.len()));
    }
    Ok(body)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions."
    )]

    use std::io;
    use std::io::Cursor;
    use std::io::Read;

    use super::GatewayError;
    use super::read_body;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("connection reset"))
        }
    }

    #[test]
    fn read_body_accepts_payload_at_limit() {
        let body = read_body(Cursor::new(b"0123456789".to_vec()), 10).unwrap();
        assert_eq!(body, b"0123456789");
    }

    #[test]
    fn read_body_rejects_payload_over_limit() {
        let (err, read) = read_body(Cursor::new(b"0123456789".to_vec()), 9).unwrap_err();
        assert_eq!(err.kind(), "io");
        assert_eq!(read, 10);
    }

    #[test]
    fn read_body_surfaces_reader_errors() {
        let (err, _) = read_body(FailingReader, 10).unwrap_err();
        assert!(matches!(err, GatewayError::Io(message) if message.contains("connection reset")));
    }
}
