//! Inbound command messages.
//!
//! Wire shape is a JSON object with a `command` name and an optional numeric
//! `seconds` payload. For `setEnd` the payload is an absolute end time in epoch
//! milliseconds despite the field name.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// A command accepted by the timer engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    /// Begin a countdown of `seconds` from now.
    Start { seconds: f64 },
    /// Cancel the countdown and clear the end time.
    Stop,
    /// Replace the end time without touching the schedule.
    SetEnd {
        #[serde(rename = "seconds")]
        end_ms: i64,
    },
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    seconds: Option<f64>,
}

impl Command {
    /// Decode a raw JSON message.
    pub fn decode(raw: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(raw)?;
        Self::from_envelope(envelope)
    }

    /// Decode an already-parsed JSON message.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_value(value)?;
        Self::from_envelope(envelope)
    }

    /// Encode to the wire shape.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    fn from_envelope(envelope: Envelope) -> Result<Self, ProtocolError> {
        let command = envelope.command.ok_or(ProtocolError::MissingCommand)?;
        match command.as_str() {
            "start" => {
                let seconds = finite_seconds("start", envelope.seconds)?;
                Ok(Command::Start { seconds })
            }
            "stop" => Ok(Command::Stop),
            "setEnd" => {
                let end = finite_seconds("setEnd", envelope.seconds)?;
                Ok(Command::SetEnd {
                    end_ms: end.round() as i64,
                })
            }
            _ => Err(ProtocolError::UnknownCommand(command)),
        }
    }
}

fn finite_seconds(command: &'static str, value: Option<f64>) -> Result<f64, ProtocolError> {
    let value = value.ok_or(ProtocolError::MissingField {
        command,
        field: "seconds",
    })?;
    if !value.is_finite() {
        return Err(ProtocolError::NotFinite {
            command,
            field: "seconds",
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_start() {
        let cmd = Command::decode(r#"{"command":"start","seconds":1500}"#).unwrap();
        assert_eq!(cmd, Command::Start { seconds: 1500.0 });
    }

    #[test]
    fn decodes_fractional_start() {
        let cmd = Command::decode(r#"{"command":"start","seconds":0.25}"#).unwrap();
        assert_eq!(cmd, Command::Start { seconds: 0.25 });
    }

    #[test]
    fn stop_ignores_payload() {
        let cmd = Command::decode(r#"{"command":"stop","seconds":3}"#).unwrap();
        assert_eq!(cmd, Command::Stop);
    }

    #[test]
    fn set_end_reads_absolute_time_from_seconds_field() {
        let cmd = Command::decode(r#"{"command":"setEnd","seconds":1700000000123}"#).unwrap();
        assert_eq!(
            cmd,
            Command::SetEnd {
                end_ms: 1_700_000_000_123
            }
        );
    }

    #[test]
    fn rejects_unknown_command() {
        let err = Command::decode(r#"{"command":"pause"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::UnknownCommand(ref c) if c == "pause"));
    }

    #[test]
    fn rejects_missing_command() {
        let err = Command::decode(r#"{"seconds":5}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingCommand));
    }

    #[test]
    fn rejects_start_without_seconds() {
        let err = Command::decode(r#"{"command":"start"}"#).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::MissingField {
                command: "start",
                ..
            }
        ));
    }

    #[test]
    fn rejects_null_set_end() {
        let err = Command::decode(r#"{"command":"setEnd","seconds":null}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField { .. }));
    }

    #[test]
    fn rejects_non_numeric_seconds() {
        let err = Command::decode(r#"{"command":"start","seconds":"5"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn rejects_non_object() {
        assert!(Command::decode("start").is_err());
        assert!(Command::decode("[1,2]").is_err());
    }

    #[test]
    fn encodes_wire_shape() {
        let start = serde_json::to_value(Command::Start { seconds: 5.0 }).unwrap();
        assert_eq!(start, serde_json::json!({ "command": "start", "seconds": 5.0 }));

        assert_eq!(Command::Stop.to_json().unwrap(), r#"{"command":"stop"}"#);

        let set_end = serde_json::to_value(Command::SetEnd { end_ms: 99 }).unwrap();
        assert_eq!(set_end, serde_json::json!({ "command": "setEnd", "seconds": 99 }));
    }
}
