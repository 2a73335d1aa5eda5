// crates/cek-core/tests/common/mod.rs
// =============================================================================
// Module: CEK Test Helpers
// Description: Shared fixtures and signing helpers for cek-core tests.
// Purpose: Reduce duplication across integration tests for cek-core.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test helpers fail fast on broken fixtures."
)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64;
use rsa::Pkcs1v15Sign;
use rsa::RsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use sha2::Digest;
use sha2::Sha256;

/// Application identifier used by every fixture body.
pub const APPLICATION_ID: &str = "com.yourdomain.extension.pizzabot";

/// Test public key (SPKI PEM) matching [`PRIVATE_KEY_PEM`].
pub const PUBLIC_KEY_PEM: &str = include_str!("../fixtures/public.pem");
/// Test private key (PKCS#8 PEM).
pub const PRIVATE_KEY_PEM: &str = include_str!("../fixtures/private.pem");

/// Pretty-printed `EventRequest` body.
pub const EVENT_REQUEST: &str = include_str!("../fixtures/event_request.json");
/// Pretty-printed `IntentRequest` body.
pub const INTENT_REQUEST: &str = include_str!("../fixtures/intent_request.json");
/// Pretty-printed `LaunchRequest` body.
pub const LAUNCH_REQUEST: &str = include_str!("../fixtures/launch_request.json");
/// Pretty-printed `SessionEndedRequest` body.
pub const SESSION_ENDED_REQUEST: &str = include_str!("../fixtures/session_ended_request.json");
/// Compact `LaunchRequest` body used for signature tests.
pub const LAUNCH_REQUEST_COMPACT: &[u8] = include_bytes!("../fixtures/launch_request_compact.json");

/// Signs `body` with the test private key and returns the base64 signature.
pub fn sign(body: &[u8]) -> String {
    let key = RsaPrivateKey::from_pkcs8_pem(PRIVATE_KEY_PEM).expect("test private key");
    let digest = Sha256::digest(body);
    let signature = key.sign(Pkcs1v15Sign::new::<Sha256>(), &digest).expect("sign body");
    Base64.encode(signature)
}
