// crates/cek-core/src/response.rs
// ============================================================================
// Module: CEK Response Model
// Description: Response envelope, output speech shapes, and directives.
// Purpose: Serialize extension responses in the exact CEK wire format.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Responses are value objects assembled by [`crate::ResponseBuilder`]. The
//! output speech has three mutually exclusive encodings, modelled as a closed
//! enum tagged by `type`. Collection fields always serialize as containers,
//! never as `null` or absent keys.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Response message format version.
pub const RESPONSE_VERSION: &str = "1.0";

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// Top-level response message returned by an extension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    /// Message format version; always [`RESPONSE_VERSION`] when built.
    pub version: String,
    /// Attributes the platform echoes back on the next request.
    pub session_attributes: BTreeMap<String, String>,
    /// Response body.
    pub response: Response,
}

impl ResponseEnvelope {
    /// Serializes the envelope to JSON bytes for the transport.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if a card or directive payload cannot be
    /// serialized.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Primary output speech.
    pub output_speech: Option<OutputSpeech>,
    /// Speech played when the user does not answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<Reprompt>,
    /// Directives, in emission order.
    #[serde(default)]
    pub directives: Vec<Directive>,
    /// Card payload; an empty object when unused.
    #[serde(default = "empty_card")]
    pub card: Value,
    /// Whether the platform should close the session.
    #[serde(default)]
    pub should_end_session: bool,
}

/// Reprompt wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reprompt {
    /// Speech to play on reprompt.
    pub output_speech: OutputSpeech,
}

/// Returns the default card value.
pub(crate) fn empty_card() -> Value {
    Value::Object(Map::new())
}

// ============================================================================
// SECTION: Directives
// ============================================================================

/// Client directive attached to a response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Directive {
    /// Directive header.
    pub header: DirectiveHeader,
    /// Directive-specific payload.
    #[serde(default)]
    pub payload: Value,
}

impl Directive {
    /// Creates a directive.
    #[must_use]
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        message_id: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            header: DirectiveHeader {
                message_id: message_id.into(),
                name: name.into(),
                namespace: namespace.into(),
            },
            payload,
        }
    }
}

/// Directive header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectiveHeader {
    /// Message identifier.
    pub message_id: String,
    /// Directive name.
    pub name: String,
    /// Directive namespace.
    pub namespace: String,
}

// ============================================================================
// SECTION: Output Speech
// ============================================================================

/// Output speech in one of its three encodings.
///
/// The encoding is chosen by [`crate::OutputSpeechBuilder::build`], not by
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutputSpeech {
    /// A single speech entry.
    SimpleSpeech {
        /// The entry.
        values: SpeechInfo,
    },
    /// Entries played in order.
    SpeechList {
        /// The entries, in playback order.
        values: Vec<SpeechInfo>,
    },
    /// Brief and verbose renditions for devices with and without a screen.
    SpeechSet {
        /// Brief rendition.
        brief: SpeechInfo,
        /// Verbose rendition.
        verbose: Verbose,
    },
}

/// Verbose part of a speech set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Verbose {
    /// A single speech entry.
    SimpleSpeech {
        /// The entry.
        values: SpeechInfo,
    },
    /// Entries played in order.
    SpeechList {
        /// The entries, in playback order.
        values: Vec<SpeechInfo>,
    },
}

impl Verbose {
    /// Wraps one entry.
    #[must_use]
    pub const fn simple(info: SpeechInfo) -> Self {
        Self::SimpleSpeech {
            values: info,
        }
    }

    /// Wraps an ordered list of entries.
    #[must_use]
    pub const fn list(infos: Vec<SpeechInfo>) -> Self {
        Self::SpeechList {
            values: infos,
        }
    }
}

/// One speech entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechInfo {
    /// Language of a plain-text entry; empty for URLs.
    pub lang: SpeechLang,
    /// Entry kind.
    #[serde(rename = "type")]
    pub kind: SpeechInfoType,
    /// Text to speak or audio URL.
    pub value: String,
}

impl SpeechInfo {
    /// Creates a plain-text entry.
    #[must_use]
    pub fn plain_text(text: impl Into<String>, lang: SpeechLang) -> Self {
        Self {
            lang,
            kind: SpeechInfoType::PlainText,
            value: text.into(),
        }
    }

    /// Creates an audio URL entry.
    #[must_use]
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            lang: SpeechLang::Unspecified,
            kind: SpeechInfoType::Url,
            value: url.into(),
        }
    }
}

/// Speech languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeechLang {
    /// English.
    #[serde(rename = "en")]
    En,
    /// Japanese.
    #[serde(rename = "ja")]
    Ja,
    /// Korean.
    #[serde(rename = "ko")]
    Ko,
    /// No language (URL entries).
    #[serde(rename = "")]
    Unspecified,
}

/// Speech entry kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeechInfoType {
    /// Text synthesized by the platform.
    PlainText,
    /// Audio file at a URL.
    #[serde(rename = "URL")]
    Url,
}
