//! Remote (web) UI seam.
//!
//! The transport is external: it delivers inbound messages already parsed
//! into JSON values and serializes [`UiUpdate`]s on the way out.

use crate::menu::MenuEntry;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Receives inbound remote-UI messages.
///
/// Called from the transport's listener thread.
pub trait RemoteUiHandler: Send + Sync {
    fn on_message(&self, message: &serde_json::Value);
}

/// Connection to the remote UI.
pub trait RemoteUi: Send + Sync {
    /// Starts delivering inbound messages to `handler`.
    fn connect(&self, handler: Arc<dyn RemoteUiHandler>);

    /// Sends an update. Delivery failures are the transport's concern.
    fn send_message(&self, update: &UiUpdate);

    fn disconnect(&self);
}

/// Outbound UI update. Absent fields are left unchanged by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear_board_graphic_moves: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_screen: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_menu: Option<Vec<MenuEntry>>,
}

impl UiUpdate {
    /// An update that only sets the caption.
    pub fn caption(text: impl Into<String>) -> Self {
        Self {
            turn_caption: Some(text.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn caption_only_serializes_one_field() {
        let json = serde_json::to_value(UiUpdate::caption("White to move")).expect("serialize");
        assert_eq!(json, json!({"turn_caption": "White to move"}));
    }

    #[test]
    fn full_update_shape() {
        let update = UiUpdate {
            turn_caption: Some("Plugin demo".into()),
            clear_board_graphic_moves: Some(false),
            loading_screen: Some(false),
            evaluation_disabled: Some(true),
            update_menu: Some(vec![MenuEntry::new("homescreen", "Home")]),
        };
        let json = serde_json::to_value(&update).expect("serialize");
        assert_eq!(
            json,
            json!({
                "turn_caption": "Plugin demo",
                "clear_board_graphic_moves": false,
                "loading_screen": false,
                "evaluation_disabled": true,
                "update_menu": [{"id": "homescreen", "label": "Home"}],
            })
        );
    }
}
