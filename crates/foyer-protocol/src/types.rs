//! Identity types, login credentials, responses and registration shapes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Plain-text notice sent as soon as a connection is accepted.
pub const WELCOME_NOTICE: &str = "Please login!";

/// Plain-text notice sent once the login message has been verified.
pub const LOGIN_NOTICE: &str = "Logged in successfully!";

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A player's unique name. Doubles as the key of the player record.
///
/// `#[serde(transparent)]` keeps it a plain JSON string on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in characters, not bytes.
    pub fn char_len(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A store-generated room identifier. The paired chat log shares it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty id means "no room".
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// The first message on every connection: who the client claims to be.
///
/// A missing `password` decodes as an empty string and simply fails the
/// comparison; a missing `name` is a malformed login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub name: PlayerName,

    #[serde(rename = "password", alias = "credential", default)]
    pub credential: String,

    /// The room the client believes it is in, if any.
    #[serde(
        rename = "roomId",
        alias = "roomRef",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub room_ref: Option<RoomId>,
}

impl Credentials {
    /// Returns the claimed room, treating an empty id as none.
    pub fn room(&self) -> Option<&RoomId> {
        self.room_ref.as_ref().filter(|id| !id.is_empty())
    }
}

/// Why the server closed a connection during login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// The login message could not be parsed.
    InvalidPayload,
    /// No player record exists under the claimed name.
    InvalidPlayer,
    /// The credential did not match the record.
    InvalidCredential,
}

impl CloseReason {
    /// The reason text carried in the close frame.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidPayload => "Invalid json",
            Self::InvalidPlayer => "Invalid player",
            Self::InvalidCredential => "Invalid password",
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    Success,
    Error,
}

/// The reply to one command: `{"type": "success" | "error", "payload"?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "type")]
    pub kind: ResponseKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl Response {
    /// A bare success with no payload.
    pub fn ok() -> Self {
        Self {
            kind: ResponseKind::Success,
            payload: None,
        }
    }

    /// A success carrying a value, e.g. the id of a created room.
    pub fn ok_with(payload: impl Into<serde_json::Value>) -> Self {
        Self {
            kind: ResponseKind::Success,
            payload: Some(payload.into()),
        }
    }

    /// An error carrying a short human-readable reason.
    pub fn error(reason: &str) -> Self {
        Self {
            kind: ResponseKind::Error,
            payload: Some(serde_json::Value::String(reason.to_owned())),
        }
    }

    pub fn is_success(&self) -> bool {
        self.kind == ResponseKind::Success
    }
}

// ---------------------------------------------------------------------------
// Registration boundary
// ---------------------------------------------------------------------------

/// What a client submits to register a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
}

/// What a successful registration hands back: the name and the generated
/// credential the client must present when it logs in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub name: PlayerName,
    #[serde(rename = "password")]
    pub credential: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_name_serializes_as_plain_string() {
        let json = serde_json::to_string(&PlayerName::new("alice")).unwrap();
        assert_eq!(json, "\"alice\"");
    }

    #[test]
    fn test_player_name_char_len_counts_characters() {
        assert_eq!(PlayerName::new("zoë").char_len(), 3);
    }

    #[test]
    fn test_credentials_accept_room_id_and_credential_aliases() {
        let json = r#"{"name":"bob","credential":"pw","roomRef":"R1"}"#;
        let creds: Credentials = serde_json::from_str(json).unwrap();
        assert_eq!(creds.credential, "pw");
        assert_eq!(creds.room(), Some(&RoomId::new("R1")));
    }

    #[test]
    fn test_credentials_missing_password_defaults_to_empty() {
        let creds: Credentials = serde_json::from_str(r#"{"name":"bob"}"#).unwrap();
        assert!(creds.credential.is_empty());
        assert!(creds.room().is_none());
    }

    #[test]
    fn test_credentials_empty_room_id_means_no_room() {
        let json = r#"{"name":"bob","password":"pw","roomId":""}"#;
        let creds: Credentials = serde_json::from_str(json).unwrap();
        assert!(creds.room().is_none());
    }

    #[test]
    fn test_credentials_missing_name_is_rejected() {
        let result: Result<Credentials, _> = serde_json::from_str(r#"{"password":"pw"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_response_success_without_payload_omits_field() {
        let json = serde_json::to_value(Response::ok()).unwrap();
        assert_eq!(json, serde_json::json!({"type": "success"}));
    }

    #[test]
    fn test_response_success_with_room_id() {
        let json = serde_json::to_value(Response::ok_with("abc123")).unwrap();
        assert_eq!(json, serde_json::json!({"type": "success", "payload": "abc123"}));
    }

    #[test]
    fn test_response_error_json_format() {
        let json = serde_json::to_value(Response::error("Can't join room")).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["payload"], "Can't join room");
    }

    #[test]
    fn test_registration_exposes_credential_as_password() {
        let reg = Registration {
            name: PlayerName::new("alice"),
            credential: "abc".into(),
        };
        let json = serde_json::to_value(&reg).unwrap();
        assert_eq!(json, serde_json::json!({"name": "alice", "password": "abc"}));
    }

    #[test]
    fn test_close_reason_text() {
        assert_eq!(CloseReason::InvalidPayload.as_str(), "Invalid json");
        assert_eq!(CloseReason::InvalidPlayer.to_string(), "Invalid player");
        assert_eq!(CloseReason::InvalidCredential.as_str(), "Invalid password");
    }
}
