//! Tests for client input reaching the server, edge settling, and the
//! menu gate on gameplay mode

use std::collections::BTreeMap;

use arbor_server::{ServerConfig, ServerEvent};
use arbor_shared::{
    ClientInputUpdate, InputMode, ModalTracker, NetworkId, NetworkMessage, PressState, Vec2,
};
use arbor_test::{
    test_protocol::{FIRE, JUMP},
    ScriptedInput, TestSession,
};

struct AlwaysInMenu;

impl ModalTracker for AlwaysInMenu {
    fn is_in_menu(&self, _player: Option<NetworkId>) -> bool {
        true
    }
}

fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

/// A session whose only client controls a freshly spawned player.
fn session_with_player() -> (TestSession, NetworkId) {
    let mut session = TestSession::new(1);
    let (player, _) = session.spawn_counter("Player", 0);
    let id = session
        .server
        .register_player(TestSession::connection(0), &player)
        .expect("register player");
    session.step();
    (session, id)
}

fn pressing(action: &str) -> ScriptedInput {
    let mut input = ScriptedInput::new();
    input.press(action);
    input
}

#[test]
fn client_learns_its_player_from_owner_entries() {
    init_logging();
    let (session, id) = session_with_player();

    assert_eq!(session.client(0).input().local_player(), Some(id));
}

#[test]
fn press_and_release_edges_reach_the_server() {
    init_logging();
    let (mut session, id) = session_with_player();
    let idle = ScriptedInput::new();

    let events = session.step_with(&idle, &[pressing(JUMP)]);
    assert!(events
        .server
        .contains(&ServerEvent::InputUpdated { player: id }));
    let input = session.server.input();
    assert!(input.action_just_pressed(JUMP, InputMode::Ui, Some(id)));
    assert!(!input.action_pressed(FIRE, InputMode::Ui, Some(id)));

    session.step_with(&idle, &[pressing(JUMP)]);
    let input = session.server.input();
    assert!(input.action_pressed(JUMP, InputMode::Ui, Some(id)));
    assert!(!input.action_just_pressed(JUMP, InputMode::Ui, Some(id)));

    session.step_with(&idle, &[]);
    let input = session.server.input();
    assert!(input.action_just_released(JUMP, InputMode::Ui, Some(id)));

    session.step_with(&idle, &[]);
    let input = session.server.input();
    assert!(!input.action_just_released(JUMP, InputMode::Ui, Some(id)));
    assert!(!input.action_pressed(JUMP, InputMode::Ui, Some(id)));
}

#[test]
fn held_input_carries_the_pointer_position() {
    init_logging();
    let (mut session, id) = session_with_player();
    let idle = ScriptedInput::new();

    let mut held = pressing(FIRE);
    session.step_with(&idle, &[held.clone()]);
    held.move_pointer(Vec2::new(5.0, 6.0));
    session.step_with(&idle, &[held.clone()]);
    session.step_with(&idle, &[held]);

    assert_eq!(
        session.server.input().pointer_position(Some(id)),
        Some(Vec2::new(5.0, 6.0))
    );
}

#[test]
fn gameplay_mode_is_refused_while_in_a_menu() {
    init_logging();
    let (mut session, id) = session_with_player();
    session.server.set_modal_tracker(Box::new(AlwaysInMenu));

    session
        .client_mut(0)
        .input_mut()
        .set_mode(None, InputMode::Gameplay);
    session.step();

    assert_eq!(session.server.input().mode(Some(id)), Some(InputMode::Ui));
}

#[test]
fn gameplay_mode_is_applied_without_menus() {
    init_logging();
    let (mut session, id) = session_with_player();

    session
        .client_mut(0)
        .input_mut()
        .set_mode(None, InputMode::Gameplay);
    session.step();

    assert_eq!(
        session.server.input().mode(Some(id)),
        Some(InputMode::Gameplay)
    );
}

#[test]
fn input_for_another_connections_player_is_ignored() {
    init_logging();
    let (mut session, id) = session_with_player();
    session.connect_client();
    session.deliver();

    let mut actions = BTreeMap::new();
    actions.insert(JUMP.to_string(), PressState::JustPressed);
    let spoofed = NetworkMessage::ClientInputUpdate(ClientInputUpdate {
        owner: id,
        actions,
        pointers: BTreeMap::new(),
        mode: None,
        pointer_position: None,
    });
    session.hub.inject_to_server(
        TestSession::connection(1),
        spoofed.encode().expect("encode"),
    );
    let events = session.server.receive().expect("receive");

    assert!(!events.has_input_from(&id));
    assert!(!session
        .server
        .input()
        .action_just_pressed(JUMP, InputMode::Ui, Some(id)));
}

#[test]
fn no_input_is_sent_before_full_sync() {
    init_logging();
    let config = ServerConfig {
        full_sync_on_connect: false,
        ..Default::default()
    };
    let mut session = TestSession::with_config(config, 1);

    let now = session.advance(std::time::Duration::from_millis(50));
    session
        .client_mut(0)
        .tick(now, &pressing(JUMP))
        .expect("client ticks");

    assert!(session.hub.peek_server().is_empty());
}

#[test]
fn server_host_samples_its_own_input() {
    init_logging();
    let mut session = TestSession::new(0);
    let (player, _) = session.spawn_counter("Host", 0);
    session
        .server
        .set_local_player(&player)
        .expect("local player");

    let now = session.advance(std::time::Duration::from_millis(50));
    session
        .server
        .tick(now, &pressing(JUMP))
        .expect("server ticks");

    assert!(session
        .server
        .input()
        .action_just_pressed(JUMP, InputMode::Ui, None));
}

#[test]
fn removed_player_loses_its_input_state() {
    init_logging();
    let (mut session, id) = session_with_player();
    assert!(session.server.input().is_registered(&id));

    let player = session.server.world().entity(&id).expect("player entity");
    session.server.remove_entity(&player).expect("remove player");
    assert!(!session.server.input().is_registered(&id));

    session.server.disconnect(&TestSession::connection(0));
    assert!(!session.server.input().is_registered(&id));
}

#[test]
fn disconnect_drops_player_input_state() {
    init_logging();
    let (mut session, id) = session_with_player();

    session.server.disconnect(&TestSession::connection(0));

    assert!(!session.server.input().is_registered(&id));
}
