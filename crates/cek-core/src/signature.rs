// crates/cek-core/src/signature.rs
// ============================================================================
// Module: CEK Signature Verification
// Description: RSA PKCS#1 v1.5 / SHA-256 verification of raw request bodies.
// Purpose: Authenticate that a request body was sent by the CEK platform.
// Dependencies: base64, rsa, sha2
// ============================================================================

//! ## Overview
//! The platform signs the exact request body bytes and sends the base64
//! signature in the `SignatureCEK` header. Verification hashes the bytes as
//! received, without any normalization, and checks the digest against the
//! signature with the configured public key.
//!
//! Security posture: every failure (bad base64, unusable key material, digest
//! mismatch) collapses into one [`VerificationError`] so callers cannot act as
//! an oracle for which stage failed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64;
use rsa::Pkcs1v15Sign;
use rsa::RsaPublicKey;
use rsa::pkcs8::DecodePublicKey;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Public key the CEK platform signs requests with (PEM-encoded SPKI).
pub const CEK_PUBLIC_KEY_PEM: &str = "-----BEGIN PUBLIC KEY-----
MIIBIjANBgkqhkiG9w0BAQEFAAOCAQ8AMIIBCgKCAQEAwiMvQNKD/WQcX9KiWNMb
nSR+dJYTWL6TmqqwWFia69TyiobVIfGfxFSefxYyMTcFznoGCpg8aOCAkMxUH58N
0/UtWWvfq0U5FQN9McE3zP+rVL3Qul9fbC2mxvazxpv5KT7HEp780Yew777cVPUv
3+I73z2t0EHnkwMesmpUA/2Rp8fW8vZE4jfiTRm5vSVmW9F37GC5TEhPwaiIkIin
KCrH0rXbfe3jNWR7qKOvVDytcWgRHJqRUuWhwJuAnuuqLvqTyAawqEslhKZ5t+1Z
0GN8b2zMENSuixa1M9K0ZKUw3unzHpvgBlYmXRGPTSuq/EaGYWyckYz8CBq5Lz2Q
UwIDAQAB
-----END PUBLIC KEY-----
";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Request signature did not verify.
///
/// Deliberately carries no cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("signature verification failed")]
pub struct VerificationError;

/// Public key material could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// PEM text is not an RSA SPKI public key.
    #[error("invalid rsa public key: {0}")]
    InvalidPem(String),
}

// ============================================================================
// SECTION: Public Key
// ============================================================================

/// Parsed RSA public key used for request verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    /// RSA key.
    key: RsaPublicKey,
}

impl PublicKey {
    /// Parses a PEM-encoded SPKI RSA public key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidPem`] when the text is not a valid key.
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        let key = RsaPublicKey::from_public_key_pem(pem.trim())
            .map_err(|err| KeyError::InvalidPem(err.to_string()))?;
        Ok(Self {
            key,
        })
    }

    /// Returns the CEK platform key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] if the embedded key fails to parse.
    pub fn cek() -> Result<Self, KeyError> {
        Self::from_pem(CEK_PUBLIC_KEY_PEM)
    }

    /// Verifies `signature` over the SHA-256 digest of `body`.
    fn verify(&self, signature: &[u8], body: &[u8]) -> Result<(), VerificationError> {
        let digest = Sha256::digest(body);
        self.key
            .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, signature)
            .map_err(|_| VerificationError)
    }
}

// ============================================================================
// SECTION: Verifier
// ============================================================================

/// Verifies request signatures against one configured public key.
///
/// # Invariants
/// - The key is fixed for the lifetime of the verifier; swapping keys means
///   building a new verifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureVerifier {
    /// Configured key.
    key: PublicKey,
}

impl SignatureVerifier {
    /// Creates a verifier for `key`.
    #[must_use]
    pub const fn new(key: PublicKey) -> Self {
        Self {
            key,
        }
    }

    /// Creates a verifier from PEM-encoded key material.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] when the key cannot be parsed.
    pub fn from_pem(pem: &str) -> Result<Self, KeyError> {
        PublicKey::from_pem(pem).map(Self::new)
    }

    /// Creates a verifier for the CEK platform key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] if the embedded key fails to parse.
    pub fn cek() -> Result<Self, KeyError> {
        PublicKey::cek().map(Self::new)
    }

    /// Returns the configured key.
    #[must_use]
    pub const fn public_key(&self) -> &PublicKey {
        &self.key
    }

    /// Verifies a base64 signature over the exact body bytes.
    ///
    /// Carriage returns and line feeds inside the signature text are ignored,
    /// so folded or newline-terminated header values still decode.
    ///
    /// # Errors
    ///
    /// Returns [`VerificationError`] on any failure.
    pub fn verify(&self, signature_base64: &str, body: &[u8]) -> Result<(), VerificationError> {
        let signature = decode_signature(signature_base64)?;
        self.key.verify(&signature, body)
    }
}

/// Verifies a base64 signature over `body` with PEM-encoded key material.
///
/// Parses the key on every call; prefer [`SignatureVerifier`] for repeated use.
///
/// # Errors
///
/// Returns [`VerificationError`] on any failure, including unusable key
/// material.
pub fn verify_signature(
    signature_base64: &str,
    body: &[u8],
    public_key_pem: &str,
) -> Result<(), VerificationError> {
    let verifier = SignatureVerifier::from_pem(public_key_pem).map_err(|_| VerificationError)?;
    verifier.verify(signature_base64, body)
}

/// Decodes standard base64, skipping embedded line breaks.
fn decode_signature(signature_base64: &str) -> Result<Vec<u8>, VerificationError> {
    let decoded = if signature_base64.contains(['\r', '\n']) {
        let compact: String =
            signature_base64.chars().filter(|c| !matches!(c, '\r' | '\n')).collect();
        Base64.decode(compact)
    } else {
        Base64.decode(signature_base64)
    };
    decoded.map_err(|_| VerificationError)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
