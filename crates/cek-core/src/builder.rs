// crates/cek-core/src/builder.rs
// ============================================================================
// Module: CEK Response Builders
// Description: Fluent builders for response envelopes and output speech.
// Purpose: Assemble well-formed responses with a fixed speech-shape policy.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`OutputSpeechBuilder`] accumulates speech entries and resolves the final
//! encoding at build time:
//! - a brief/verbose pair yields `SpeechSet`;
//! - otherwise exactly one entry yields `SimpleSpeech`;
//! - otherwise (zero, two, or more entries) yields `SpeechList`.
//!
//! [`ResponseBuilder`] accumulates the response fields with non-null
//! collection defaults. Neither builder performs I/O or can fail.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;

use crate::response::Directive;
use crate::response::OutputSpeech;
use crate::response::RESPONSE_VERSION;
use crate::response::Reprompt;
use crate::response::Response;
use crate::response::ResponseEnvelope;
use crate::response::SpeechInfo;
use crate::response::SpeechLang;
use crate::response::Verbose;
use crate::response::empty_card;

// ============================================================================
// SECTION: Output Speech Builder
// ============================================================================

/// Builder for [`OutputSpeech`].
#[derive(Debug, Clone, Default)]
pub struct OutputSpeechBuilder {
    /// Accumulated entries, in insertion order.
    speeches: Vec<SpeechInfo>,
    /// Brief/verbose pair; takes precedence over `speeches`.
    speech_set: Option<(SpeechInfo, Verbose)>,
}

impl OutputSpeechBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a plain-text entry.
    #[must_use]
    pub fn add_speech_text(mut self, text: impl Into<String>, lang: SpeechLang) -> Self {
        self.speeches.push(SpeechInfo::plain_text(text, lang));
        self
    }

    /// Appends an audio URL entry.
    #[must_use]
    pub fn add_speech_url(mut self, url: impl Into<String>) -> Self {
        self.speeches.push(SpeechInfo::url(url));
        self
    }

    /// Sets the brief/verbose pair, replacing any earlier pair.
    #[must_use]
    pub fn speech_set(mut self, brief: SpeechInfo, verbose: Verbose) -> Self {
        self.speech_set = Some((brief, verbose));
        self
    }

    /// Resolves the configured entries into an [`OutputSpeech`].
    #[must_use]
    pub fn build(self) -> OutputSpeech {
        if let Some((brief, verbose)) = self.speech_set {
            return OutputSpeech::SpeechSet {
                brief,
                verbose,
            };
        }
        let mut speeches = self.speeches;
        if speeches.len() == 1
            && let Some(values) = speeches.pop()
        {
            return OutputSpeech::SimpleSpeech {
                values,
            };
        }
        OutputSpeech::SpeechList {
            values: speeches,
        }
    }
}

// ============================================================================
// SECTION: Response Builder
// ============================================================================

/// Builder for [`ResponseEnvelope`].
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    /// Session attributes to echo back.
    session_attributes: BTreeMap<String, String>,
    /// Card payload.
    card: Value,
    /// Directives, in emission order.
    directives: Vec<Directive>,
    /// Primary output speech.
    output_speech: Option<OutputSpeech>,
    /// Reprompt speech.
    reprompt: Option<OutputSpeech>,
    /// Session termination flag.
    should_end_session: bool,
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self {
            session_attributes: BTreeMap::new(),
            card: empty_card(),
            directives: Vec::new(),
            output_speech: None,
            reprompt: None,
            should_end_session: false,
        }
    }
}

impl ResponseBuilder {
    /// Creates a builder with empty collections and `should_end_session = false`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the session attributes.
    #[must_use]
    pub fn session_attributes(mut self, attributes: BTreeMap<String, String>) -> Self {
        self.session_attributes = attributes;
        self
    }

    /// Sets one session attribute.
    #[must_use]
    pub fn session_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.session_attributes.insert(key.into(), value.into());
        self
    }

    /// Replaces the card payload.
    #[must_use]
    pub fn card(mut self, card: Value) -> Self {
        self.card = card;
        self
    }

    /// Appends a directive.
    #[must_use]
    pub fn add_directive(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }

    /// Sets the primary output speech.
    #[must_use]
    pub fn output_speech(mut self, speech: OutputSpeech) -> Self {
        self.output_speech = Some(speech);
        self
    }

    /// Sets the reprompt speech.
    #[must_use]
    pub fn reprompt(mut self, speech: OutputSpeech) -> Self {
        self.reprompt = Some(speech);
        self
    }

    /// Sets whether the session should end after this response.
    #[must_use]
    pub fn should_end_session(mut self, value: bool) -> Self {
        self.should_end_session = value;
        self
    }

    /// Produces the response envelope.
    #[must_use]
    pub fn build(self) -> ResponseEnvelope {
        ResponseEnvelope {
            version: RESPONSE_VERSION.to_string(),
            session_attributes: self.session_attributes,
            response: Response {
                output_speech: self.output_speech,
                reprompt: self.reprompt.map(|output_speech| Reprompt {
                    output_speech,
                }),
                directives: self.directives,
                card: self.card,
                should_end_session: self.should_end_session,
            },
        }
    }
}
