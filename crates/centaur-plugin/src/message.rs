//! Inbound remote-UI messages.
//!
//! A message is a JSON object whose keys are independent requests:
//!
//! ```json
//! { "web_menu": true, "battery": 17, "web_move": { "source": "e2", "target": "e4" },
//!   "web_button": 2, "sys": "homescreen" }
//! ```
//!
//! [`decode`] turns one message into a list of typed [`WebRequest`]s in a
//! fixed order. Each key is decoded on its own, so a malformed value only
//! loses that key's request.

use crate::error::PluginError;
use centaur_types::{Button, Square};
use serde::Deserialize;
use serde_json::{Map, Value};

const WEB_MENU: &str = "web_menu";
const BATTERY: &str = "battery";
const WEB_MOVE: &str = "web_move";
const WEB_BUTTON: &str = "web_button";
const SYS: &str = "sys";

/// Keys in dispatch order.
const KNOWN_KEYS: [&str; 5] = [WEB_MENU, BATTERY, WEB_MOVE, WEB_BUTTON, SYS];

/// `sys` value that sends the board back to the home screen.
pub const SYS_HOMESCREEN: &str = "homescreen";

/// One request carried by a remote-UI message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebRequest {
    /// Re-send the initial UI description.
    RefreshMenu,
    /// Battery level in percent for the display.
    Battery(u8),
    /// A move made on the web board.
    Move { source: Square, target: Square },
    /// A button pressed on the web UI.
    Button(Button),
    /// Return to the home screen.
    Homescreen,
    /// A key (or `sys` value) this router does not handle.
    Ignored(String),
}

#[derive(Deserialize)]
struct RawMove {
    source: String,
    target: String,
}

/// Decodes every request in `message`.
///
/// Known keys come first in a fixed order, then unknown keys as
/// [`WebRequest::Ignored`]. A non-object message yields a single error.
pub fn decode(message: &Value) -> Vec<Result<WebRequest, PluginError>> {
    let Some(fields) = message.as_object() else {
        return vec![Err(PluginError::malformed("<message>", "expected a JSON object"))];
    };

    let mut requests: Vec<_> = KNOWN_KEYS
        .iter()
        .filter_map(|key| fields.get(*key).map(|value| decode_field(key, value)))
        .collect();

    requests.extend(
        unknown_keys(fields).map(|key| Ok(WebRequest::Ignored(key.to_string()))),
    );
    requests
}

fn unknown_keys(fields: &Map<String, Value>) -> impl Iterator<Item = &str> {
    fields
        .keys()
        .map(String::as_str)
        .filter(|key| !KNOWN_KEYS.contains(key))
}

fn decode_field(key: &str, value: &Value) -> Result<WebRequest, PluginError> {
    match key {
        WEB_MENU => Ok(WebRequest::RefreshMenu),
        BATTERY => {
            let level = f64::deserialize(value).map_err(|e| PluginError::malformed(key, e))?;
            Ok(WebRequest::Battery(battery_percent(level)))
        }
        WEB_MOVE => {
            let raw = RawMove::deserialize(value).map_err(|e| PluginError::malformed(key, e))?;
            Ok(WebRequest::Move {
                source: raw.source.parse()?,
                target: raw.target.parse()?,
            })
        }
        WEB_BUTTON => {
            let code = u8::deserialize(value).map_err(|e| PluginError::malformed(key, e))?;
            Ok(WebRequest::Button(Button::try_from(code)?))
        }
        SYS => match value.as_str() {
            Some(SYS_HOMESCREEN) => Ok(WebRequest::Homescreen),
            Some(other) => Ok(WebRequest::Ignored(format!("{SYS}={other}"))),
            None => Err(PluginError::malformed(key, "expected a string")),
        },
        _ => Ok(WebRequest::Ignored(key.to_string())),
    }
}

/// Any JSON number, rounded and clamped to `0..=100`.
fn battery_percent(level: f64) -> u8 {
    if level.is_nan() {
        return 0;
    }
    // In range after the clamp, so the cast is exact.
    level.round().clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sq(name: &str) -> Square {
        name.parse().expect("valid square")
    }

    #[test]
    fn battery_accepts_any_number() {
        assert_eq!(decode(&json!({"battery": 87.5})), vec![Ok(WebRequest::Battery(88))]);
        assert_eq!(decode(&json!({"battery": 42.2})), vec![Ok(WebRequest::Battery(42))]);
        assert_eq!(decode(&json!({"battery": 250})), vec![Ok(WebRequest::Battery(100))]);
        assert_eq!(decode(&json!({"battery": -3})), vec![Ok(WebRequest::Battery(0))]);
    }

    #[test]
    fn web_move_decodes_squares() {
        let requests = decode(&json!({"web_move": {"source": "e2", "target": "e4"}}));
        assert_eq!(
            requests,
            vec![Ok(WebRequest::Move {
                source: sq("e2"),
                target: sq("e4"),
            })]
        );
    }

    #[test]
    fn known_keys_in_fixed_order_then_unknown() {
        let requests = decode(&json!({
            "sys": "homescreen",
            "theme": "dark",
            "web_button": 2,
            "battery": 12,
            "web_menu": false,
        }));
        assert_eq!(
            requests,
            vec![
                Ok(WebRequest::RefreshMenu),
                Ok(WebRequest::Battery(12)),
                Ok(WebRequest::Button(Button::Tick)),
                Ok(WebRequest::Homescreen),
                Ok(WebRequest::Ignored("theme".into())),
            ]
        );
    }

    #[test]
    fn malformed_key_does_not_affect_others() {
        let requests = decode(&json!({
            "battery": "full",
            "web_move": {"source": "e2", "target": "z9"},
            "web_button": 99,
            "sys": "homescreen",
        }));
        assert_eq!(requests.len(), 4);
        assert!(matches!(
            requests[0],
            Err(PluginError::MalformedMessage { ref key, .. }) if key == "battery"
        ));
        assert!(matches!(requests[1], Err(PluginError::InvalidSquare(_))));
        assert!(matches!(requests[2], Err(PluginError::InvalidButton(_))));
        assert_eq!(requests[3], Ok(WebRequest::Homescreen));
    }

    #[test]
    fn web_move_missing_target() {
        let requests = decode(&json!({"web_move": {"source": "e2"}}));
        assert!(matches!(
            requests[0],
            Err(PluginError::MalformedMessage { ref key, .. }) if key == "web_move"
        ));
    }

    #[test]
    fn other_sys_values_ignored() {
        assert_eq!(
            decode(&json!({"sys": "reboot"})),
            vec![Ok(WebRequest::Ignored("sys=reboot".into()))]
        );
    }

    #[test]
    fn non_object_is_malformed() {
        let requests = decode(&json!(["web_menu"]));
        assert_eq!(requests.len(), 1);
        assert!(requests[0].is_err());
    }

    #[test]
    fn empty_object_has_no_requests() {
        assert!(decode(&json!({})).is_empty());
    }
}
