//! Recording collaborators for plugin tests.
//!
//! Every mock records what it was asked to do. [`MockBoard`] and
//! [`MockRemoteUi`] can also play the notification source: they deliver
//! to whatever listener the plugin subscribed.
//!
//! ```
//! use centaur_plugin::testing::{HookCall, RecordingHooks, TestRig};
//! use centaur_types::{Button, PieceAction};
//! use serde_json::json;
//!
//! let rig = TestRig::new();
//! let hooks = RecordingHooks::new();
//! let log = hooks.log();
//! let plugin = rig.plugin("demo", hooks);
//!
//! rig.remote.deliver(&json!({"web_move": {"source": "e2", "target": "e4"}}));
//! assert_eq!(log.calls().len(), 2);
//!
//! assert_eq!(rig.board.fire_key(Button::Back), Some(true));
//! assert!(!plugin.is_running());
//! ```

use crate::board::{BoardDriver, BoardListener};
use crate::error::PluginError;
use crate::hooks::PluginHooks;
use crate::menu::{Menu, MenuEntry, MenuTag};
use crate::plugin::{Plugin, PluginContext};
use crate::remote::{RemoteUi, RemoteUiHandler, UiUpdate};
use crate::screen::{Font, Screen};
use crate::session::{GameInfo, GameSession, MoveEvent, SessionFactory, SessionListener};
use centaur_types::{BoardOptions, Button, GameEvent, PieceAction, Sound, Square};
use parking_lot::Mutex;
use std::sync::Arc;

// === Board ===

/// A call made on [`MockBoard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardCall {
    Subscribe,
    Unsubscribe,
    PushButton(Button),
    Led(Square),
    LedFromTo(Square, Square),
    LedsOff,
    Beep(Sound),
}

/// Board driver double.
///
/// `push_button` is delivered synchronously to the subscribed listener,
/// like a hardware press.
#[derive(Default)]
pub struct MockBoard {
    calls: Mutex<Vec<BoardCall>>,
    listener: Mutex<Option<Arc<dyn BoardListener>>>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<BoardCall> {
        self.calls.lock().clone()
    }

    pub fn is_subscribed(&self) -> bool {
        self.listener.lock().is_some()
    }

    /// Simulates a physical button press. `None` when nobody listens.
    pub fn fire_key(&self, button: Button) -> Option<bool> {
        let listener = self.listener.lock().clone();
        listener.map(|l| l.on_key(button))
    }

    /// Simulates a piece being lifted or placed. Returns `false` when
    /// nobody listens.
    pub fn fire_field(&self, square: Square, action: PieceAction) -> bool {
        let listener = self.listener.lock().clone();
        match listener {
            Some(l) => {
                l.on_field(square, action);
                true
            }
            None => false,
        }
    }

    fn record(&self, call: BoardCall) {
        self.calls.lock().push(call);
    }
}

impl BoardDriver for MockBoard {
    fn subscribe_events(&self, listener: Arc<dyn BoardListener>) {
        self.record(BoardCall::Subscribe);
        *self.listener.lock() = Some(listener);
    }

    fn unsubscribe_events(&self) {
        self.record(BoardCall::Unsubscribe);
        *self.listener.lock() = None;
    }

    fn push_button(&self, button: Button) {
        self.record(BoardCall::PushButton(button));
        let _ = self.fire_key(button);
    }

    fn led(&self, square: Square) {
        self.record(BoardCall::Led(square));
    }

    fn led_from_to(&self, from: Square, to: Square) {
        self.record(BoardCall::LedFromTo(from, to));
    }

    fn leds_off(&self) {
        self.record(BoardCall::LedsOff);
    }

    fn beep(&self, sound: Sound) {
        self.record(BoardCall::Beep(sound));
    }
}

// === Screen ===

/// A call made on [`MockScreen`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenCall {
    Clear,
    Write(u8, String, Font),
    Battery(u8),
}

#[derive(Default)]
pub struct MockScreen {
    calls: Mutex<Vec<ScreenCall>>,
}

impl MockScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ScreenCall> {
        self.calls.lock().clone()
    }
}

impl Screen for MockScreen {
    fn clear_area(&self) {
        self.calls.lock().push(ScreenCall::Clear);
    }

    fn write_text(&self, row: u8, text: &str, font: Font) {
        self.calls
            .lock()
            .push(ScreenCall::Write(row, text.to_string(), font));
    }

    fn set_battery_value(&self, level: u8) {
        self.calls.lock().push(ScreenCall::Battery(level));
    }
}

// === Remote UI ===

/// Remote UI double. Records outbound updates and delivers inbound
/// messages to the connected handler.
#[derive(Default)]
pub struct MockRemoteUi {
    sent: Mutex<Vec<UiUpdate>>,
    handler: Mutex<Option<Arc<dyn RemoteUiHandler>>>,
    disconnects: Mutex<u32>,
}

impl MockRemoteUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<UiUpdate> {
        self.sent.lock().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.handler.lock().is_some()
    }

    pub fn disconnects(&self) -> u32 {
        *self.disconnects.lock()
    }

    /// Delivers an inbound message. Returns `false` when disconnected.
    pub fn deliver(&self, message: &serde_json::Value) -> bool {
        let handler = self.handler.lock().clone();
        match handler {
            Some(h) => {
                h.on_message(message);
                true
            }
            None => false,
        }
    }
}

impl RemoteUi for MockRemoteUi {
    fn connect(&self, handler: Arc<dyn RemoteUiHandler>) {
        *self.handler.lock() = Some(handler);
    }

    fn send_message(&self, update: &UiUpdate) {
        self.sent.lock().push(update.clone());
    }

    fn disconnect(&self) {
        *self.handler.lock() = None;
        *self.disconnects.lock() += 1;
    }
}

// === Session ===

/// A call made on [`MockSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCall {
    Start,
    Stop,
    Board,
    FlashHint,
    ComputerMove(String),
}

/// FEN reported by [`MockSession::board`].
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Game session double.
pub struct MockSession {
    pub info: GameInfo,
    pub options: BoardOptions,
    listener: Arc<dyn SessionListener>,
    calls: Mutex<Vec<SessionCall>>,
}

impl MockSession {
    pub fn calls(&self) -> Vec<SessionCall> {
        self.calls.lock().clone()
    }

    /// Simulates a key press seen by the session.
    pub fn fire_key(&self, button: Button) -> bool {
        self.listener.on_key(button)
    }

    pub fn fire_event(&self, event: GameEvent) {
        self.listener.on_event(event);
    }

    pub fn fire_move(&self, event: &MoveEvent) -> bool {
        self.listener.on_move(event)
    }

    fn record(&self, call: SessionCall) {
        self.calls.lock().push(call);
    }
}

impl GameSession for MockSession {
    fn start(&self) {
        self.record(SessionCall::Start);
    }

    fn stop(&self) {
        self.record(SessionCall::Stop);
    }

    fn board(&self) -> String {
        self.record(SessionCall::Board);
        START_FEN.to_string()
    }

    fn flash_hint(&self) {
        self.record(SessionCall::FlashHint);
    }

    fn set_computer_move(&self, uci_move: &str) {
        self.record(SessionCall::ComputerMove(uci_move.to_string()));
    }
}

/// Creates [`MockSession`]s and keeps every one it created.
#[derive(Default)]
pub struct MockSessionFactory {
    created: Mutex<Vec<Arc<MockSession>>>,
}

impl MockSessionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> Vec<Arc<MockSession>> {
        self.created.lock().clone()
    }

    /// The most recently created session.
    pub fn last(&self) -> Option<Arc<MockSession>> {
        self.created.lock().last().cloned()
    }
}

impl SessionFactory for MockSessionFactory {
    fn create(
        &self,
        info: GameInfo,
        options: BoardOptions,
        listener: Arc<dyn SessionListener>,
    ) -> Arc<dyn GameSession> {
        let session = Arc::new(MockSession {
            info,
            options,
            listener,
            calls: Mutex::new(Vec::new()),
        });
        self.created.lock().push(Arc::clone(&session));
        session
    }
}

// === Hooks ===

/// A hook invocation seen by [`RecordingHooks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookCall {
    Start,
    Key(Button),
    Field(Square, PieceAction, bool),
    Event(GameEvent),
    Move(MoveEvent),
}

/// Shared view of the calls recorded by [`RecordingHooks`].
#[derive(Clone, Default)]
pub struct HookLog(Arc<Mutex<Vec<HookCall>>>);

impl HookLog {
    pub fn calls(&self) -> Vec<HookCall> {
        self.0.lock().clone()
    }

    fn push(&self, call: HookCall) {
        self.0.lock().push(call);
    }
}

/// Hooks that record every call.
///
/// `on_key` reports every button as handled unless configured otherwise;
/// a failing instance returns [`PluginError::Hook`] from every handler.
pub struct RecordingHooks {
    log: HookLog,
    keys_handled: bool,
    fail: bool,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self {
            log: HookLog::default(),
            keys_handled: true,
            fail: false,
        }
    }

    /// Every handler records its call and then fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn keys_handled(mut self, handled: bool) -> Self {
        self.keys_handled = handled;
        self
    }

    pub fn log(&self) -> HookLog {
        self.log.clone()
    }

    fn outcome<T>(&self, call: HookCall, value: T) -> Result<T, PluginError> {
        self.log.push(call);
        if self.fail {
            Err(PluginError::hook("recording hook failure"))
        } else {
            Ok(value)
        }
    }
}

impl Default for RecordingHooks {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginHooks for RecordingHooks {
    fn on_start(&self, _plugin: &Plugin) -> Result<(), PluginError> {
        self.outcome(HookCall::Start, ())
    }

    fn on_key(&self, _plugin: &Plugin, button: Button) -> Result<bool, PluginError> {
        self.outcome(HookCall::Key(button), self.keys_handled)
    }

    fn on_field(
        &self,
        _plugin: &Plugin,
        square: Square,
        action: PieceAction,
        from_web: bool,
    ) -> Result<(), PluginError> {
        self.outcome(HookCall::Field(square, action, from_web), ())
    }

    fn on_event(&self, _plugin: &Plugin, event: GameEvent) -> Result<(), PluginError> {
        self.outcome(HookCall::Event(event), ())
    }

    fn on_move(&self, _plugin: &Plugin, event: &MoveEvent) -> Result<bool, PluginError> {
        self.outcome(HookCall::Move(event.clone()), true)
    }
}

// === Rig ===

/// All collaborator doubles, ready to build plugins.
pub struct TestRig {
    pub board: Arc<MockBoard>,
    pub screen: Arc<MockScreen>,
    pub remote: Arc<MockRemoteUi>,
    pub sessions: Arc<MockSessionFactory>,
    pub menu: Menu,
}

impl TestRig {
    /// A rig with a small menu: one web-only entry, one board-only entry
    /// and two baseline entries.
    pub fn new() -> Self {
        Self {
            board: Arc::new(MockBoard::new()),
            screen: Arc::new(MockScreen::new()),
            remote: Arc::new(MockRemoteUi::new()),
            sessions: Arc::new(MockSessionFactory::new()),
            menu: Menu::new(vec![
                MenuEntry::new("homescreen", "Home"),
                MenuEntry::new("pgn", "Download PGN").tagged(MenuTag::OnlyWeb),
                MenuEntry::new("play", "Play").tagged(MenuTag::OnlyBoard),
                MenuEntry::new("settings", "Settings"),
            ]),
        }
    }

    pub fn context(&self) -> PluginContext {
        PluginContext {
            board: self.board.clone(),
            screen: self.screen.clone(),
            remote: self.remote.clone(),
            sessions: self.sessions.clone(),
            menu: self.menu.clone(),
        }
    }

    pub fn plugin(&self, id: &str, hooks: impl PluginHooks + 'static) -> Arc<Plugin> {
        Plugin::new(id, hooks, self.context())
    }
}

impl Default for TestRig {
    fn default() -> Self {
        Self::new()
    }
}
