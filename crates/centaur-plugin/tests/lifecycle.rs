//! Plugin lifecycle and game session ownership.

use centaur_plugin::testing::{
    BoardCall, HookCall, RecordingHooks, SessionCall, TestRig, START_FEN,
};
use centaur_plugin::{GameInfo, LifecycleState, Plugin, PluginError, PluginHooks};
use centaur_types::{BoardOptions, Button, GameEvent};
use std::sync::Arc;
use std::time::Duration;

fn start_session(plugin: &Plugin) {
    plugin
        .start_engine(
            GameInfo::new("Casual", "Kitchen table", "Player", "Stockfish"),
            BoardOptions::default(),
        )
        .expect("session starts");
}

// ─── Start ─────────────────────────────────────────────────────────

#[test]
fn start_runs_hook_once() {
    let rig = TestRig::new();
    let hooks = RecordingHooks::new();
    let log = hooks.log();
    let plugin = rig.plugin("demo", hooks);
    assert_eq!(plugin.state(), LifecycleState::Constructed);

    plugin.start().expect("starts");
    plugin.start().expect("second start is a no-op");

    assert_eq!(plugin.state(), LifecycleState::Running);
    assert_eq!(log.calls(), vec![HookCall::Start]);
}

#[test]
fn start_after_stop_fails() {
    let rig = TestRig::new();
    let plugin = rig.plugin("demo", RecordingHooks::new());
    plugin.stop();

    assert_eq!(plugin.start(), Err(PluginError::Stopped));
    assert_eq!(plugin.state(), LifecycleState::Stopped);
}

#[test]
fn start_propagates_hook_error() {
    let rig = TestRig::new();
    let plugin = rig.plugin("demo", RecordingHooks::failing());
    assert!(matches!(plugin.start(), Err(PluginError::Hook(_))));
    assert_eq!(plugin.state(), LifecycleState::Running);
}

// ─── Session ───────────────────────────────────────────────────────

#[test]
fn start_engine_is_idempotent() {
    let rig = TestRig::new();
    let plugin = rig.plugin("demo", RecordingHooks::new());

    start_session(&plugin);
    let first = plugin.session().expect("session active");
    start_session(&plugin);
    let second = plugin.session().expect("session active");

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(rig.sessions.created().len(), 1);
    assert_eq!(
        rig.sessions.last().expect("created").calls(),
        vec![SessionCall::Start]
    );
}

#[test]
fn session_gets_metadata_and_flags() {
    let rig = TestRig::new();
    let plugin = rig.plugin("demo", RecordingHooks::new());
    start_session(&plugin);

    let session = rig.sessions.last().expect("created");
    assert_eq!(session.info.event, "Casual");
    assert_eq!(session.info.site, "Kitchen table");
    assert_eq!(session.info.round, "");
    assert_eq!(session.info.white, "Player");
    assert_eq!(session.info.black, "Stockfish");
    assert!(session.options.contains(BoardOptions::CAN_FORCE_MOVES));
    assert!(session.options.contains(BoardOptions::CAN_UNDO_MOVES));
}

#[test]
fn custom_flags_are_passed_through() {
    let rig = TestRig::new();
    let plugin = rig.plugin("demo", RecordingHooks::new());
    plugin
        .start_engine(GameInfo::default(), BoardOptions::CAN_UNDO_MOVES)
        .expect("session starts");

    let session = rig.sessions.last().expect("created");
    assert!(!session.options.contains(BoardOptions::CAN_FORCE_MOVES));
    assert!(session.options.contains(BoardOptions::CAN_UNDO_MOVES));
}

#[test]
fn session_operations_require_session() {
    let rig = TestRig::new();
    let plugin = rig.plugin("demo", RecordingHooks::new());

    assert_eq!(plugin.board(), Err(PluginError::SessionNotStarted));
    assert_eq!(plugin.hint(), Err(PluginError::SessionNotStarted));
    assert_eq!(
        plugin.play_computer_move("e2e4"),
        Err(PluginError::SessionNotStarted)
    );
}

#[test]
fn session_operations_forward() {
    let rig = TestRig::new();
    let plugin = rig.plugin("demo", RecordingHooks::new());
    start_session(&plugin);

    assert_eq!(plugin.board().as_deref(), Ok(START_FEN));
    plugin.hint().expect("hint");
    plugin.play_computer_move("e7e5").expect("valid move");
    assert!(matches!(
        plugin.play_computer_move("castle"),
        Err(PluginError::InvalidSquare(_))
    ));

    assert_eq!(
        rig.sessions.last().expect("created").calls(),
        vec![
            SessionCall::Start,
            SessionCall::Board,
            SessionCall::FlashHint,
            SessionCall::ComputerMove("e7e5".into()),
        ]
    );
}

// ─── Stop ──────────────────────────────────────────────────────────

#[test]
fn stop_tears_everything_down() {
    let rig = TestRig::new();
    let plugin = rig.plugin("demo", RecordingHooks::new());
    plugin.start().expect("starts");
    start_session(&plugin);

    plugin.stop();

    assert!(!plugin.is_running());
    assert_eq!(plugin.state(), LifecycleState::Stopped);
    assert!(plugin.session().is_none());
    assert!(!rig.board.is_subscribed());
    assert!(!rig.remote.is_connected());
    assert_eq!(
        rig.sessions.last().expect("created").calls(),
        vec![SessionCall::Start, SessionCall::Stop]
    );
    assert_eq!(plugin.board(), Err(PluginError::SessionNotStarted));
}

#[test]
fn stop_is_idempotent() {
    let rig = TestRig::new();
    let plugin = rig.plugin("demo", RecordingHooks::new());
    start_session(&plugin);

    plugin.stop();
    plugin.stop();
    assert_eq!(rig.board.fire_key(Button::Back), None, "unsubscribed");

    let unsubscribes = rig
        .board
        .calls()
        .iter()
        .filter(|c| **c == BoardCall::Unsubscribe)
        .count();
    assert_eq!(unsubscribes, 1);
    assert_eq!(rig.remote.disconnects(), 1);
    assert_eq!(
        rig.sessions.last().expect("created").calls(),
        vec![SessionCall::Start, SessionCall::Stop]
    );
}

#[test]
fn start_engine_after_stop_fails() {
    let rig = TestRig::new();
    let plugin = rig.plugin("demo", RecordingHooks::new());
    plugin.stop();

    assert_eq!(
        plugin.start_engine(GameInfo::default(), BoardOptions::default()),
        Err(PluginError::Stopped)
    );
    assert!(rig.sessions.created().is_empty());
}

#[test]
fn drop_stops_plugin() {
    let rig = TestRig::new();
    let plugin = rig.plugin("demo", RecordingHooks::new());
    start_session(&plugin);
    drop(plugin);

    assert!(!rig.board.is_subscribed());
    assert_eq!(rig.board.fire_key(Button::Tick), None);
    assert_eq!(
        rig.sessions.last().expect("created").calls().last(),
        Some(&SessionCall::Stop)
    );
}

#[test]
fn concurrent_back_presses_tear_down_once() {
    let rig = Arc::new(TestRig::new());
    let plugin = rig.plugin("demo", RecordingHooks::new());
    start_session(&plugin);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let rig = Arc::clone(&rig);
            std::thread::spawn(move || {
                if i % 2 == 0 {
                    rig.board.fire_key(Button::Back);
                } else {
                    rig.remote.deliver(&serde_json::json!({"sys": "homescreen"}));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("no panic");
    }

    assert!(!plugin.is_running());
    let stops = rig
        .sessions
        .last()
        .expect("created")
        .calls()
        .iter()
        .filter(|c| **c == SessionCall::Stop)
        .count();
    assert_eq!(stops, 1);
    assert_eq!(rig.remote.disconnects(), 1);
}

#[test]
fn wait_until_stopped_returns_after_back() {
    let rig = Arc::new(TestRig::new());
    let plugin = rig.plugin("demo", RecordingHooks::new());
    plugin.start().expect("starts");

    let presser = {
        let rig = Arc::clone(&rig);
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            rig.board.fire_key(Button::Back);
        })
    };

    plugin.wait_until_stopped();
    assert!(!plugin.is_running());
    presser.join().expect("no panic");
}

#[test]
fn wait_wakes_as_soon_as_stopped() {
    let rig = Arc::new(TestRig::new());
    let plugin = rig.plugin("demo", RecordingHooks::new());
    plugin.start().expect("starts");

    assert!(!plugin.wait_stopped_for(Duration::from_millis(20)));

    let presser = {
        let rig = Arc::clone(&rig);
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            rig.remote.deliver(&serde_json::json!({"sys": "homescreen"}));
        })
    };

    let start = std::time::Instant::now();
    assert!(plugin.wait_stopped_for(Duration::from_secs(10)));
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(plugin.state(), LifecycleState::Stopped);
    presser.join().expect("no panic");

    assert!(plugin.wait_stopped_for(Duration::ZERO));
}

/// Stops from inside a hook, the way a plugin ends itself on game over.
struct QuitOnTermination;

impl PluginHooks for QuitOnTermination {
    fn on_start(&self, plugin: &Plugin) -> Result<(), PluginError> {
        plugin.start_engine(GameInfo::default(), BoardOptions::default())
    }

    fn on_event(&self, plugin: &Plugin, event: GameEvent) -> Result<(), PluginError> {
        if event == GameEvent::Termination {
            plugin.stop();
        }
        Ok(())
    }
}

#[test]
fn hook_can_stop_plugin_from_session_callback() {
    let rig = TestRig::new();
    let plugin = rig.plugin("demo", QuitOnTermination);
    plugin.start().expect("starts");

    let session = rig.sessions.last().expect("created in on_start");
    session.fire_event(GameEvent::Play);
    assert!(plugin.is_running());

    session.fire_event(GameEvent::Termination);
    assert!(!plugin.is_running());
    assert_eq!(session.calls(), vec![SessionCall::Start, SessionCall::Stop]);
}
