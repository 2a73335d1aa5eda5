// crates/cek-core/src/request.rs
// ============================================================================
// Module: CEK Request Model
// Description: Typed request envelope and request variants sent by CEK.
// Purpose: Give extension handlers a closed, exhaustively matchable request model.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The request envelope carries session, device context, and exactly one of
//! four request variants selected by the `request.type` discriminator. Values
//! in this module are produced by [`crate::decode_request`] and are immutable
//! once handed to the caller.
//!
//! Wire names follow the CEK message format, including the capitalised
//! `System` and `AudioPlayer` keys under `context`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Envelope
// ============================================================================

/// Top-level request message delivered to an extension.
///
/// # Invariants
/// - `request` is always one of the four recognized variants.
/// - Collection fields are never null; absent maps decode as empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestEnvelope {
    /// Message format version.
    pub version: String,
    /// Session state supplied by the platform.
    pub session: Session,
    /// Device and application context.
    pub context: Context,
    /// Concrete request payload.
    pub request: RequestVariant,
}

impl RequestEnvelope {
    /// Returns the application identifier embedded in the context, if present.
    #[must_use]
    pub fn application_id(&self) -> Option<&str> {
        self.context
            .system
            .as_ref()
            .and_then(|system| system.application.as_ref())
            .map(|application| application.application_id.as_str())
    }

    /// Returns the discriminator of the carried request.
    #[must_use]
    pub const fn request_type(&self) -> RequestType {
        self.request.request_type()
    }
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Conversation session state.
///
/// The session is opaque to this crate; it is passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// True when this request opened the session.
    #[serde(rename = "new", default)]
    pub is_new: bool,
    /// Attributes echoed back from the previous response.
    #[serde(rename = "sessionAttributes", default, deserialize_with = "null_as_default")]
    pub attributes: BTreeMap<String, String>,
    /// Session identifier.
    #[serde(default)]
    pub session_id: String,
    /// User who owns the session.
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: User,
}

/// Platform user identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User identifier.
    #[serde(default)]
    pub user_id: String,
    /// Account-link access token, when the user has linked an account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Client context at the time of the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    /// System-level context. Absent on malformed or foreign requests.
    #[serde(rename = "System", default, skip_serializing_if = "Option::is_none")]
    pub system: Option<System>,
    /// Audio player state, only sent by devices with a media player.
    #[serde(rename = "AudioPlayer", default, skip_serializing_if = "Option::is_none")]
    pub audio_player: Option<AudioPlayerState>,
}

/// System context: invoked application, device, and user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct System {
    /// Invoked application.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<Application>,
    /// Client device.
    #[serde(default, deserialize_with = "null_as_default")]
    pub device: Device,
    /// Device user.
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: User,
}

/// Invoked application (extension) identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// Extension identifier registered with the platform.
    #[serde(default)]
    pub application_id: String,
}

/// Client device description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Device identifier.
    #[serde(default)]
    pub device_id: String,
    /// Display capabilities, if the device has a screen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<Display>,
}

/// Display capabilities of a client device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Display {
    /// Display size class.
    #[serde(default)]
    pub size: DisplaySize,
    /// Screen orientation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,
    /// Dots per inch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpi: Option<u32>,
    /// Usable content area in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_layer: Option<ContentLayer>,
}

/// Display size classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplaySize {
    /// No display.
    #[default]
    None,
    /// Small display.
    S100,
    /// Medium display.
    M100,
    /// Large display.
    L100,
    /// Extra-large display.
    Xl100,
    /// Non-standard display; see `content_layer`.
    Custom,
    /// Size class this crate does not know.
    #[serde(other)]
    Unknown,
}

/// Screen orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Landscape orientation.
    Landscape,
    /// Portrait orientation.
    Portrait,
    /// Orientation this crate does not know.
    #[serde(other)]
    Unknown,
}

/// Usable content area of a display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentLayer {
    /// Width in pixels.
    #[serde(default)]
    pub width: u32,
    /// Height in pixels.
    #[serde(default)]
    pub height: u32,
}

/// Audio player state reported by media-capable devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioPlayerState {
    /// Playback position of the current stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_in_milliseconds: Option<u64>,
    /// Current player activity.
    #[serde(default)]
    pub player_activity: PlayerActivity,
    /// Stream descriptor as sent by the platform.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<Value>,
    /// Total length of the current stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_in_milliseconds: Option<u64>,
}

/// Audio player activity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerActivity {
    /// Nothing loaded.
    #[default]
    Idle,
    /// Playing a stream.
    Playing,
    /// Playback paused.
    Paused,
    /// Playback stopped.
    Stopped,
    /// Activity this crate does not know.
    #[serde(other)]
    Unknown,
}

// ============================================================================
// SECTION: Request Variants
// ============================================================================

/// Request discriminator values carried in `request.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    /// `EventRequest`.
    Event,
    /// `IntentRequest`.
    Intent,
    /// `LaunchRequest`.
    Launch,
    /// `SessionEndedRequest`.
    SessionEnded,
}

impl RequestType {
    /// Parses a wire discriminator. Unknown values yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "EventRequest" => Some(Self::Event),
            "IntentRequest" => Some(Self::Intent),
            "LaunchRequest" => Some(Self::Launch),
            "SessionEndedRequest" => Some(Self::SessionEnded),
            _ => None,
        }
    }

    /// Returns the wire discriminator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Event => "EventRequest",
            Self::Intent => "IntentRequest",
            Self::Launch => "LaunchRequest",
            Self::SessionEnded => "SessionEndedRequest",
        }
    }
}

/// Closed set of request payloads.
///
/// Serialization writes the discriminator as `type`; decoding goes through
/// [`crate::decode_request`], which peeks the discriminator first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum RequestVariant {
    /// Platform event (skill enabled, audio player events, ...).
    #[serde(rename = "EventRequest")]
    Event(EventRequest),
    /// User utterance resolved to an intent.
    #[serde(rename = "IntentRequest")]
    Intent(IntentRequest),
    /// Extension launched without an intent.
    #[serde(rename = "LaunchRequest")]
    Launch(LaunchRequest),
    /// Session closed by the platform or user.
    #[serde(rename = "SessionEndedRequest")]
    SessionEnded(SessionEndedRequest),
}

impl RequestVariant {
    /// Returns the discriminator for this variant.
    #[must_use]
    pub const fn request_type(&self) -> RequestType {
        match self {
            Self::Event(_) => RequestType::Event,
            Self::Intent(_) => RequestType::Intent,
            Self::Launch(_) => RequestType::Launch,
            Self::SessionEnded(_) => RequestType::SessionEnded,
        }
    }
}

/// Event request payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    /// Event descriptor.
    #[serde(default, deserialize_with = "null_as_default")]
    pub event: Event,
    /// Request identifier.
    #[serde(default)]
    pub request_id: String,
    /// Event timestamp (ISO 8601).
    #[serde(default)]
    pub timestamp: String,
}

/// Platform event descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event namespace.
    #[serde(default)]
    pub namespace: String,
    /// Event name.
    #[serde(default)]
    pub name: String,
    /// Event-specific payload; `null` when the event carries none.
    #[serde(default)]
    pub payload: Value,
}

/// Intent request payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentRequest {
    /// Resolved intent.
    #[serde(default, deserialize_with = "null_as_default")]
    pub intent: Intent,
}

/// Resolved intent with its slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// Intent name.
    #[serde(default)]
    pub name: String,
    /// Slots keyed by slot name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub slots: BTreeMap<String, Slot>,
}

/// Named, typed argument extracted from an utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    /// Slot name.
    #[serde(default)]
    pub name: String,
    /// Slot value as recognized.
    #[serde(default)]
    pub value: String,
    /// Value type for temporal slots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<SlotValueType>,
    /// Unit for measured slots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Value types for temporal slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotValueType {
    /// Time of day.
    #[serde(rename = "TIME")]
    Time,
    /// Calendar date.
    #[serde(rename = "DATE")]
    Date,
    /// Date and time.
    #[serde(rename = "DATETIME")]
    DateTime,
    /// Time range.
    #[serde(rename = "TIME.INTERVAL")]
    TimeInterval,
    /// Date range.
    #[serde(rename = "DATE.INTERVAL")]
    DateInterval,
    /// Date-time range.
    #[serde(rename = "DATETIME.INTERVAL")]
    DateTimeInterval,
    /// Value type this crate does not know.
    #[serde(other)]
    Unknown,
}

/// Launch request payload (no fields).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {}

/// Session-ended request payload (no fields).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEndedRequest {}

// ============================================================================
// SECTION: Serde Helpers
// ============================================================================

/// Deserializes a value that may be `null` on the wire as its default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
