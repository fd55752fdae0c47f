//! Board hardware seam.

use centaur_types::{Button, PieceAction, Sound, Square};
use std::sync::Arc;

/// Receives hardware notifications.
///
/// Called from the driver's notification thread.
pub trait BoardListener: Send + Sync {
    /// A button was pressed. Returns `true` when the press was handled.
    fn on_key(&self, button: Button) -> bool;

    /// A piece was lifted from or placed on `square`.
    fn on_field(&self, square: Square, action: PieceAction);
}

/// Board LEDs, buzzer, buttons and piece sensing.
pub trait BoardDriver: Send + Sync {
    /// Routes button and field notifications to `listener`, replacing any
    /// previous subscriber.
    fn subscribe_events(&self, listener: Arc<dyn BoardListener>);

    /// Stops delivering notifications.
    fn unsubscribe_events(&self);

    /// Injects a button press as if it came from the hardware.
    fn push_button(&self, button: Button);

    fn led(&self, square: Square);

    fn led_from_to(&self, from: Square, to: Square);

    fn leds_off(&self);

    fn beep(&self, sound: Sound);
}
