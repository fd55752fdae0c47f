//! Plugin framework for the DGT Centaur board.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  centaur-types  : Square, Button, PieceAction, ErrorCode    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  centaur-engine : EngineSupervisor, UCI process driver      │
//! │  centaur-plugin : Plugin event router, hooks, collaborators │ ◄── HERE
//! ├─────────────────────────────────────────────────────────────┤
//! │  centaur-cli    : `centaur` binary                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A [`Plugin`] is built from a [`PluginHooks`] implementation and a
//! [`PluginContext`] holding its collaborators: the board driver, the
//! screen, the remote UI connection, a game-session factory and the menu.
//! The plugin subscribes itself to the board and remote UI and routes
//! their notifications to the hooks.
//!
//! # Routing
//!
//! | Source | Notification | Goes to |
//! |--------|--------------|---------|
//! | board / session | back button | [`Plugin::stop`], always handled |
//! | board / session | other button | [`PluginHooks::on_key`] |
//! | board | lift / place | [`PluginHooks::on_field`] (`from_web = false`) |
//! | remote UI | `web_move` | `on_field` lift + place (`from_web = true`) |
//! | remote UI | `web_button` / `sys: homescreen` | button press via the board |
//! | remote UI | `web_menu` | initial UI description re-sent |
//! | remote UI | `battery` | [`Screen::set_battery_value`] |
//! | session | event / move | [`PluginHooks::on_event`] / [`PluginHooks::on_move`] |
//!
//! Hook and message failures are logged and never stop routing.

mod board;
mod centaur;
mod error;
mod hooks;
mod menu;
mod message;
mod plugin;
mod remote;
mod screen;
mod session;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use board::{BoardDriver, BoardListener};
pub use centaur::{Centaur, FIRST_ROW, HEADER_ROW};
pub use error::PluginError;
pub use hooks::{NoHooks, PluginHooks};
pub use menu::{Menu, MenuEntry, MenuTag, BASELINE_MENU};
pub use message::{decode as decode_message, WebRequest, SYS_HOMESCREEN};
pub use plugin::{LifecycleState, Plugin, PluginContext};
pub use remote::{RemoteUi, RemoteUiHandler, UiUpdate};
pub use screen::{Font, Screen};
pub use session::{GameInfo, GameSession, MoveEvent, SessionFactory, SessionListener};
