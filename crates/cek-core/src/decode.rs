// crates/cek-core/src/decode.rs
// ============================================================================
// Module: CEK Request Decoder
// Description: Two-phase JSON decoding of CEK request envelopes.
// Purpose: Dispatch the `request` object to its variant by peeking `type` first.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The shape of `request` depends on its sibling `type` field, so decoding runs
//! in two phases: the envelope frame is parsed with `request` kept as raw JSON,
//! the discriminator is peeked, and only then is the raw object decoded into
//! the selected variant. The discriminator itself is not part of any variant.
//!
//! Security posture: request bodies are untrusted. Unknown discriminators fail
//! closed rather than defaulting to an empty variant.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::value::RawValue;
use thiserror::Error;

use crate::request::Context;
use crate::request::RequestEnvelope;
use crate::request::RequestType;
use crate::request::RequestVariant;
use crate::request::Session;
use crate::request::null_as_default;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while decoding a request envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Body is not valid JSON or a field has the wrong shape.
    #[error("malformed request json: {0}")]
    MalformedJson(String),
    /// `request.type` is outside the recognized set.
    #[error("unrecognized request type: {0}")]
    UnrecognizedRequestType(String),
}

impl DecodeError {
    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MalformedJson(_) => "malformed_json",
            Self::UnrecognizedRequestType(_) => "unrecognized_request_type",
        }
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedJson(err.to_string())
    }
}

// ============================================================================
// SECTION: Wire Frames
// ============================================================================

/// Envelope with the `request` object left undecoded.
#[derive(Deserialize)]
struct EnvelopeFrame<'a> {
    /// Message format version.
    #[serde(default)]
    version: String,
    /// Session state; `null` or absent yields the default session.
    #[serde(default, deserialize_with = "null_as_default")]
    session: Session,
    /// Device and application context; `null` or absent yields an empty context.
    #[serde(default, deserialize_with = "null_as_default")]
    context: Context,
    /// Raw `request` object, decoded once its type is known.
    #[serde(borrow)]
    request: &'a RawValue,
}

/// Discriminator peek over the raw `request` object.
#[derive(Deserialize)]
struct RequestTag {
    /// Wire discriminator.
    #[serde(rename = "type")]
    kind: String,
}

// ============================================================================
// SECTION: Decoding
// ============================================================================

/// Decodes raw request bytes into a typed envelope.
///
/// The bytes are read as-is; callers verifying signatures must do so before
/// calling this function, over the same buffer.
///
/// # Errors
///
/// Returns [`DecodeError::MalformedJson`] when the body or any field fails to
/// parse, and [`DecodeError::UnrecognizedRequestType`] when `request.type` is
/// not one of the four recognized literals.
pub fn decode_request(body: &[u8]) -> Result<RequestEnvelope, DecodeError> {
    let frame: EnvelopeFrame<'_> = serde_json::from_slice(body)?;
    let tag: RequestTag = serde_json::from_str(frame.request.get())?;
    let Some(request_type) = RequestType::parse(&tag.kind) else {
        return Err(DecodeError::UnrecognizedRequestType(tag.kind));
    };
    let request = decode_variant(request_type, frame.request)?;
    Ok(RequestEnvelope {
        version: frame.version,
        session: frame.session,
        context: frame.context,
        request,
    })
}

/// Decodes the raw `request` object into the variant selected by `request_type`.
fn decode_variant(
    request_type: RequestType,
    raw: &RawValue,
) -> Result<RequestVariant, DecodeError> {
    let variant = match request_type {
        RequestType::Event => RequestVariant::Event(parse_raw(raw)?),
        RequestType::Intent => RequestVariant::Intent(parse_raw(raw)?),
        RequestType::Launch => RequestVariant::Launch(parse_raw(raw)?),
        RequestType::SessionEnded => RequestVariant::SessionEnded(parse_raw(raw)?),
    };
    Ok(variant)
}

/// Parses a raw JSON fragment into `T`.
fn parse_raw<T: DeserializeOwned>(raw: &RawValue) -> Result<T, DecodeError> {
    Ok(serde_json::from_str(raw.get())?)
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

    use super::DecodeError;
    use super::decode_request;
    use crate::request::RequestVariant;

    #[test]
    fn request_must_be_an_object_with_type() {
        let body = br#"{"version":"1.0","request":"LaunchRequest"}"#;
        let err = decode_request(body).unwrap_err();
        assert_eq!(err.kind(), "malformed_json");
    }

    #[test]
    fn missing_type_is_malformed_not_unrecognized() {
        let body = br#"{"version":"1.0","request":{}}"#;
        let err = decode_request(body).unwrap_err();
        assert!(matches!(err, DecodeError::MalformedJson(_)));
    }

    #[test]
    fn minimal_envelope_defaults_session_and_context() {
        let body = br#"{"version":"1.0","request":{"type":"SessionEndedRequest"}}"#;
        let envelope = decode_request(body).unwrap();
        assert!(matches!(envelope.request, RequestVariant::SessionEnded(_)));
        assert!(envelope.session.attributes.is_empty());
        assert!(envelope.application_id().is_none());
    }
}
