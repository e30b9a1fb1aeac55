use serde::{Deserialize, Serialize};

/// Remaining-seconds value reported when no countdown is set.
pub const IDLE_SENTINEL: i64 = -1;

/// Outbound message from the engine to its host.
///
/// Serializes to the wire shape `{"type": "tick", "seconds": 5}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Event {
    Tick { seconds: i64 },
}

impl Event {
    pub fn tick(seconds: i64) -> Self {
        Event::Tick { seconds }
    }

    pub fn idle() -> Self {
        Event::Tick {
            seconds: IDLE_SENTINEL,
        }
    }

    pub fn seconds(&self) -> i64 {
        match self {
            Event::Tick { seconds } => *seconds,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_uses_wire_shape() {
        let json = serde_json::to_value(Event::tick(42)).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "tick", "seconds": 42 }));
    }

    #[test]
    fn idle_tick_carries_sentinel() {
        let json = serde_json::to_string(&Event::idle()).unwrap();
        assert_eq!(json, r#"{"type":"tick","seconds":-1}"#);
    }
}
