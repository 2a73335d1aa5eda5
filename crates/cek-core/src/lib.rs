// crates/cek-core/src/lib.rs
// ============================================================================
// Module: CEK Core Library
// Description: Public API surface for the CEK extension message layer.
// Purpose: Expose request decoding, signature checks, and response builders.
// Dependencies: crate::{audit, builder, decode, gateway, request, response, signature}
// ============================================================================

//! ## Overview
//! CEK core authenticates inbound extension webhook calls, decodes them into a
//! closed set of typed request variants, and builds well-formed responses. It
//! is transport-agnostic: callers hand in raw body bytes and the signature
//! header value, and send back the serialized response themselves.
//!
//! ```
//! use cek_core::OutputSpeechBuilder;
//! use cek_core::ResponseBuilder;
//! use cek_core::SpeechLang;
//!
//! let response = ResponseBuilder::new()
//!     .output_speech(
//!         OutputSpeechBuilder::new().add_speech_text("Hi, nice to meet you", SpeechLang::En).build(),
//!     )
//!     .build();
//! assert_eq!(response.version, "1.0");
//! ```

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod builder;
pub mod decode;
pub mod gateway;
pub mod request;
pub mod response;
pub mod signature;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::GatewayAuditEvent;
pub use audit::GatewayAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use builder::OutputSpeechBuilder;
pub use builder::ResponseBuilder;
pub use decode::DecodeError;
pub use decode::decode_request;
pub use gateway::DEFAULT_MAX_BODY_BYTES;
pub use gateway::Gateway;
pub use gateway::GatewayError;
pub use gateway::PublicKeyOverride;
pub use gateway::SIGNATURE_HEADER;
pub use request::*;
pub use response::*;
pub use signature::CEK_PUBLIC_KEY_PEM;
pub use signature::KeyError;
pub use signature::PublicKey;
pub use signature::SignatureVerifier;
pub use signature::VerificationError;
pub use signature::verify_signature;
