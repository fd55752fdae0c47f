//! Plugin event router and lifecycle.
//!
//! ```text
//! board driver ──on_key/on_field──┐
//! remote UI ─────on_message───────┼──► RouterLink ──► Plugin ──► PluginHooks
//! game session ──on_key/event/move┘        (weak)        │
//!                                                        └──► GameSession (0..1)
//! ```
//!
//! Lifecycle: `Constructed → Running → Stopped`. `Stopped` is terminal.
//!
//! Two notification sources call in concurrently: the board driver thread
//! and the remote UI listener. Session creation and teardown are serialized
//! by a reentrant lifecycle lock, so a back press arriving while a session
//! is being started (even from inside the session itself) tears down
//! exactly once.

use crate::board::{BoardDriver, BoardListener};
use crate::centaur::Centaur;
use crate::error::PluginError;
use crate::hooks::PluginHooks;
use crate::menu::{Menu, MenuTag, BASELINE_MENU};
use crate::message::{self, WebRequest};
use crate::remote::{RemoteUi, RemoteUiHandler, UiUpdate};
use crate::screen::Screen;
use crate::session::{GameInfo, GameSession, MoveEvent, SessionFactory, SessionListener};
use centaur_types::{split_uci_move, BoardOptions, Button, ErrorCode, GameEvent, PieceAction, Square};
use parking_lot::{Condvar, Mutex, ReentrantMutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Collaborators a plugin is wired to.
#[derive(Clone)]
pub struct PluginContext {
    pub board: Arc<dyn BoardDriver>,
    pub screen: Arc<dyn Screen>,
    pub remote: Arc<dyn RemoteUi>,
    pub sessions: Arc<dyn SessionFactory>,
    pub menu: Menu,
}

/// Plugin lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Constructed,
    Running,
    Stopped,
}

/// A running plugin: routes board, remote UI and session notifications to
/// its [`PluginHooks`] and owns at most one [`GameSession`].
pub struct Plugin {
    id: String,
    hooks: Box<dyn PluginHooks>,
    board: Arc<dyn BoardDriver>,
    screen: Arc<dyn Screen>,
    remote: Arc<dyn RemoteUi>,
    sessions: Arc<dyn SessionFactory>,
    menu: Menu,
    centaur: Centaur,
    link: Arc<RouterLink>,
    lifecycle: ReentrantMutex<()>,
    state: Mutex<LifecycleState>,
    stopped: Condvar,
    session: RwLock<Option<Arc<dyn GameSession>>>,
    stopping: AtomicBool,
    exit_requested: AtomicBool,
}

impl Plugin {
    /// Creates the plugin and wires it up.
    ///
    /// Clears the screen, subscribes to board events, connects to the
    /// remote UI and sends the initial UI description.
    pub fn new(id: impl Into<String>, hooks: impl PluginHooks + 'static, ctx: PluginContext) -> Arc<Self> {
        let id = id.into();
        let plugin = Arc::new_cyclic(|weak| Self {
            centaur: Centaur::new(
                Arc::clone(&ctx.board),
                Arc::clone(&ctx.screen),
                Arc::clone(&ctx.remote),
            ),
            id,
            hooks: Box::new(hooks),
            board: ctx.board,
            screen: ctx.screen,
            remote: ctx.remote,
            sessions: ctx.sessions,
            menu: ctx.menu,
            link: Arc::new(RouterLink {
                plugin: weak.clone(),
            }),
            lifecycle: ReentrantMutex::new(()),
            state: Mutex::new(LifecycleState::Constructed),
            stopped: Condvar::new(),
            session: RwLock::new(None),
            stopping: AtomicBool::new(false),
            exit_requested: AtomicBool::new(false),
        });

        plugin.centaur.clear_screen();
        plugin.board.subscribe_events(plugin.link.clone());
        plugin.remote.connect(plugin.link.clone());
        plugin.send_initial_ui();
        debug!(plugin = %plugin.id, "plugin constructed");

        plugin
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Screen, LED and sound helper.
    pub fn centaur(&self) -> &Centaur {
        &self.centaur
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock()
    }

    /// True until [`stop`](Self::stop) completes.
    pub fn is_running(&self) -> bool {
        !self.exit_requested.load(Ordering::SeqCst)
    }

    /// Blocks the calling thread until the plugin is stopped.
    pub fn wait_until_stopped(&self) {
        let mut state = self.state.lock();
        while *state != LifecycleState::Stopped {
            self.stopped.wait(&mut state);
        }
    }

    /// Like [`wait_until_stopped`](Self::wait_until_stopped), giving up
    /// after `timeout`. Returns true if the plugin stopped.
    pub fn wait_stopped_for(&self, timeout: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            self.wait_until_stopped();
            return true;
        };

        let mut state = self.state.lock();
        while *state != LifecycleState::Stopped {
            if self.stopped.wait_until(&mut state, deadline).timed_out() {
                return *state == LifecycleState::Stopped;
            }
        }
        true
    }

    /// Moves the plugin to `Running` and calls the `on_start` hook.
    ///
    /// Calling it again while running does nothing.
    ///
    /// # Errors
    ///
    /// [`PluginError::Stopped`] after [`stop`](Self::stop); otherwise
    /// whatever `on_start` returns.
    pub fn start(&self) -> Result<(), PluginError> {
        {
            let mut state = self.state.lock();
            match *state {
                LifecycleState::Stopped => return Err(PluginError::Stopped),
                LifecycleState::Running => return Ok(()),
                LifecycleState::Constructed => *state = LifecycleState::Running,
            }
        }

        info!(plugin = %self.id, "starting plugin");
        self.hooks.on_start(self)
    }

    /// Starts a game session unless one is already active.
    ///
    /// # Errors
    ///
    /// [`PluginError::Stopped`] after [`stop`](Self::stop).
    pub fn start_engine(&self, info: GameInfo, options: BoardOptions) -> Result<(), PluginError> {
        let _lifecycle = self.lifecycle.lock();

        if self.stopping.load(Ordering::SeqCst) {
            return Err(PluginError::Stopped);
        }
        if self.session.read().is_some() {
            debug!(plugin = %self.id, "game session already active");
            return Ok(());
        }

        info!(
            plugin = %self.id,
            event = %info.event,
            white = %info.white,
            black = %info.black,
            "starting game session"
        );
        let session = self.sessions.create(info, options, self.link.clone());
        *self.session.write() = Some(Arc::clone(&session));
        session.start();
        Ok(())
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<Arc<dyn GameSession>> {
        self.session.read().clone()
    }

    /// Current position as FEN.
    ///
    /// # Errors
    ///
    /// [`PluginError::SessionNotStarted`] without an active session.
    pub fn board(&self) -> Result<String, PluginError> {
        Ok(self.active_session()?.board())
    }

    /// Flashes a suggested move on the board.
    ///
    /// # Errors
    ///
    /// [`PluginError::SessionNotStarted`] without an active session.
    pub fn hint(&self) -> Result<(), PluginError> {
        self.active_session()?.flash_hint();
        Ok(())
    }

    /// Hands the computer's move to the session.
    ///
    /// # Errors
    ///
    /// [`PluginError::SessionNotStarted`] without an active session,
    /// [`PluginError::InvalidSquare`] if `uci_move` is not a move.
    pub fn play_computer_move(&self, uci_move: &str) -> Result<(), PluginError> {
        let session = self.active_session()?;
        split_uci_move(uci_move)?;
        session.set_computer_move(uci_move);
        Ok(())
    }

    /// Stops the session, detaches from the board and remote UI, and marks
    /// the plugin as stopped. Idempotent.
    pub fn stop(&self) {
        let _lifecycle = self.lifecycle.lock();

        if self.stopping.swap(true, Ordering::SeqCst) {
            debug!(plugin = %self.id, "plugin already stopping");
            return;
        }

        info!(plugin = %self.id, "stopping plugin");

        let session = self.session.write().take();
        if let Some(session) = session {
            session.stop();
        }

        self.board.unsubscribe_events();
        self.remote.disconnect();

        let mut state = self.state.lock();
        *state = LifecycleState::Stopped;
        self.exit_requested.store(true, Ordering::SeqCst);
        self.stopped.notify_all();
    }

    fn active_session(&self) -> Result<Arc<dyn GameSession>, PluginError> {
        self.session.read().clone().ok_or(PluginError::SessionNotStarted)
    }

    fn initial_ui(&self) -> UiUpdate {
        UiUpdate {
            turn_caption: Some(format!("Plugin {}", self.id)),
            clear_board_graphic_moves: Some(false),
            loading_screen: Some(false),
            evaluation_disabled: Some(true),
            update_menu: Some(self.menu.select(MenuTag::OnlyWeb, &BASELINE_MENU)),
        }
    }

    fn send_initial_ui(&self) {
        self.remote.send_message(&self.initial_ui());
    }

    // === Routing ===

    fn route_key(&self, button: Button) -> bool {
        if button == Button::Back {
            self.stop();
            return true;
        }

        match self.hooks.on_key(self, button) {
            Ok(handled) => handled,
            Err(e) => {
                self.hook_failed("on_key", &e);
                false
            }
        }
    }

    fn route_field(&self, square: Square, action: PieceAction, from_web: bool) {
        if let Err(e) = self.hooks.on_field(self, square, action, from_web) {
            self.hook_failed("on_field", &e);
        }
    }

    fn route_event(&self, event: GameEvent) {
        if let Err(e) = self.hooks.on_event(self, event) {
            self.hook_failed("on_event", &e);
        }
    }

    fn route_move(&self, event: &MoveEvent) -> bool {
        match self.hooks.on_move(self, event) {
            Ok(accepted) => accepted,
            Err(e) => {
                self.hook_failed("on_move", &e);
                true
            }
        }
    }

    fn route_message(&self, message: &serde_json::Value) {
        for request in message::decode(message) {
            match request {
                Ok(request) => self.apply(request),
                Err(e) => warn!(
                    plugin = %self.id,
                    code = e.code(),
                    error = %e,
                    "dropping remote request"
                ),
            }
        }
    }

    fn apply(&self, request: WebRequest) {
        match request {
            WebRequest::RefreshMenu => self.send_initial_ui(),
            WebRequest::Battery(level) => self.screen.set_battery_value(level),
            WebRequest::Move { source, target } => {
                self.route_field(source, PieceAction::Lift, true);
                self.route_field(target, PieceAction::Place, true);
            }
            WebRequest::Button(button) => self.board.push_button(button),
            WebRequest::Homescreen => self.board.push_button(Button::Back),
            WebRequest::Ignored(key) => {
                debug!(plugin = %self.id, key = %key, "ignoring remote request");
            }
        }
    }

    fn hook_failed(&self, hook: &'static str, err: &PluginError) {
        warn!(
            plugin = %self.id,
            hook,
            code = err.code(),
            error = %err,
            "plugin hook failed"
        );
    }
}

impl Drop for Plugin {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Listener handed to collaborators. Holds the plugin weakly so that
/// subscriptions never keep it alive.
struct RouterLink {
    plugin: Weak<Plugin>,
}

impl RouterLink {
    fn with_plugin<R>(&self, fallback: R, f: impl FnOnce(&Plugin) -> R) -> R {
        match self.plugin.upgrade() {
            Some(plugin) => f(&plugin),
            None => {
                debug!("notification after plugin was dropped");
                fallback
            }
        }
    }
}

impl BoardListener for RouterLink {
    fn on_key(&self, button: Button) -> bool {
        self.with_plugin(false, |p| p.route_key(button))
    }

    fn on_field(&self, square: Square, action: PieceAction) {
        self.with_plugin((), |p| p.route_field(square, action, false));
    }
}

impl RemoteUiHandler for RouterLink {
    fn on_message(&self, message: &serde_json::Value) {
        self.with_plugin((), |p| p.route_message(message));
    }
}

impl SessionListener for RouterLink {
    fn on_key(&self, button: Button) -> bool {
        self.with_plugin(false, |p| p.route_key(button))
    }

    fn on_event(&self, event: GameEvent) {
        self.with_plugin((), |p| p.route_event(event));
    }

    fn on_move(&self, event: &MoveEvent) -> bool {
        self.with_plugin(true, |p| p.route_move(event))
    }
}
