//! Plugin behaviour.

use crate::error::PluginError;
use crate::plugin::Plugin;
use crate::session::MoveEvent;
use centaur_types::{Button, GameEvent, PieceAction, Square};

/// Handlers a concrete plugin supplies to the [`Plugin`] router.
///
/// Every method has a default, so a plugin implements only what it needs.
/// Handlers receive the plugin itself so they can start a game, print to
/// the screen or stop.
///
/// The back button never reaches [`on_key`](Self::on_key): the router
/// always handles it by stopping the plugin.
///
/// An `Err` from any handler is logged by the router, which then falls
/// back to the default result.
///
/// # Example
///
/// ```
/// use centaur_plugin::{Plugin, PluginError, PluginHooks};
/// use centaur_types::Button;
///
/// struct Hinter;
///
/// impl PluginHooks for Hinter {
///     fn on_start(&self, plugin: &Plugin) -> Result<(), PluginError> {
///         plugin.start_engine(Default::default(), Default::default())
///     }
///
///     fn on_key(&self, plugin: &Plugin, button: Button) -> Result<bool, PluginError> {
///         if button == Button::Help {
///             plugin.hint()?;
///             return Ok(true);
///         }
///         Ok(false)
///     }
/// }
/// ```
pub trait PluginHooks: Send + Sync {
    /// Called once when the plugin starts running.
    fn on_start(&self, _plugin: &Plugin) -> Result<(), PluginError> {
        Ok(())
    }

    /// Any button except back. Returns `true` when handled.
    fn on_key(&self, _plugin: &Plugin, _button: Button) -> Result<bool, PluginError> {
        Ok(false)
    }

    /// A piece was lifted or placed. `from_web` marks moves made on the
    /// remote UI rather than on the physical board.
    fn on_field(
        &self,
        _plugin: &Plugin,
        _square: Square,
        _action: PieceAction,
        _from_web: bool,
    ) -> Result<(), PluginError> {
        Ok(())
    }

    fn on_event(&self, _plugin: &Plugin, _event: GameEvent) -> Result<(), PluginError> {
        Ok(())
    }

    /// A move was played in the session. Returns `false` to reject it.
    fn on_move(&self, _plugin: &Plugin, _event: &MoveEvent) -> Result<bool, PluginError> {
        Ok(true)
    }
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHooks;

impl PluginHooks for NoHooks {}
