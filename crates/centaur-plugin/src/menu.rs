//! Menu definitions pushed to the remote UI.

use serde::{Deserialize, Serialize};

/// Entries that every plugin menu shows on the web UI.
pub const BASELINE_MENU: [&str; 5] = ["homescreen", "links", "settings", "system", "plugin_edit"];

/// Where a menu entry is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuTag {
    OnlyWeb,
    OnlyBoard,
}

/// One menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuEntry {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing)]
    pub tags: Vec<MenuTag>,
}

impl MenuEntry {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn tagged(mut self, tag: MenuTag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn has_tag(&self, tag: MenuTag) -> bool {
        self.tags.contains(&tag)
    }
}

/// The full menu definition, supplied by the host application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub entries: Vec<MenuEntry>,
}

impl Menu {
    pub fn new(entries: Vec<MenuEntry>) -> Self {
        Self { entries }
    }

    /// Entries carrying `tag` plus those whose id is in `always`, in
    /// definition order.
    pub fn select(&self, tag: MenuTag, always: &[&str]) -> Vec<MenuEntry> {
        self.entries
            .iter()
            .filter(|e| e.has_tag(tag) || always.contains(&e.id.as_str()))
            .cloned()
            .collect()
    }
}
