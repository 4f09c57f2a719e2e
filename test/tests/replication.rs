//! Tests for snapshot, add, remove and periodic update replication between
//! a server and its clients

use std::time::Duration;

use arbor_client::ClientEvent;
use arbor_server::ServerConfig;
use arbor_shared::{groups, NetworkMessage, Node, Transform3D};
use arbor_test::{Counter, ScriptedInput, TestSession};

fn init_logging() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init()
        .ok();
}

fn client_counter(session: &TestSession, index: usize, id: &arbor_shared::NetworkId) -> Option<i64> {
    let client = session.client(index);
    let key = client.entity(id)?;
    client
        .scene()
        .node(&key)?
        .behavior_as::<Counter>()
        .map(|counter| counter.value)
}

#[test]
fn accepted_client_receives_full_sync() {
    init_logging();
    let mut session = TestSession::new(1);
    assert!(!session.client(0).has_full_server_data());

    let events = session.deliver();

    assert!(session.client(0).has_full_server_data());
    assert!(events.client_saw(0, &ClientEvent::FullSyncReceived));
}

#[test]
fn entities_spawned_before_connect_arrive_in_full_sync() {
    init_logging();
    let mut session = TestSession::new(0);
    let (_, id) = session.spawn_counter("Score", 7);

    session.connect_client();
    session.deliver();

    assert_eq!(client_counter(&session, 0, &id), Some(7));
}

#[test]
fn server_add_after_sync_materializes_under_owner() {
    init_logging();
    let mut session = TestSession::new(1);
    session.deliver();

    let (_, id) = session.spawn_counter("Score", 5);
    let events = session.deliver();

    assert_eq!(client_counter(&session, 0, &id), Some(5));
    let client = session.client(0);
    let key = client.entity(&id).expect("replicated entity");
    assert_eq!(client.scene().parent(&key), Some(client.root()));
    assert!(events.client_saw(0, &ClientEvent::EntityAdded(key)));
}

#[test]
fn nested_children_keep_their_server_ids() {
    init_logging();
    let mut session = TestSession::new(1);
    session.deliver();

    let server_scene = session.server.scene_mut();
    let parent = server_scene.spawn(Node::plain("Tree"));
    let child = server_scene
        .spawn_child(&parent, Node::plain("Branch"))
        .expect("spawn child");
    let root = session.server.root();
    session
        .server
        .add_entity(&root, &parent, Default::default())
        .expect("add tree");
    let child_id = session.server.world().id_of(&child).expect("child id");
    session.deliver();

    let client = session.client(0);
    let replica = client.entity(&child_id).expect("child replicated");
    assert_eq!(client.scene().node(&replica).map(|node| node.name()), Some("Branch"));
}

#[test]
fn dirty_replicable_is_sent_on_next_interval() {
    init_logging();
    let mut session = TestSession::new(1);
    let (key, id) = session.spawn_counter("Score", 1);
    session.deliver();

    let node = session.server.scene_mut().node_mut(&key).expect("counter");
    node.behavior_as_mut::<Counter>().expect("counter").value = 42;
    node.mark_dirty();
    let events = session.step();

    assert_eq!(client_counter(&session, 0, &id), Some(42));
    assert!(events.client_saw(0, &ClientEvent::EntitiesUpdated(1)));
    assert!(!session.server.scene().node(&key).expect("counter").is_dirty());
}

#[test]
fn clean_world_broadcasts_nothing() {
    init_logging();
    let mut session = TestSession::new(1);
    session.spawn_counter("Score", 1);
    session.deliver();

    let now = session.advance(Duration::from_millis(100));
    session
        .server
        .tick(now, &ScriptedInput::new())
        .expect("server ticks");

    let waiting = session.hub.peek_client(&TestSession::connection(0));
    assert!(waiting
        .iter()
        .all(|message| !matches!(message, NetworkMessage::ServerUpdate(_))));
}

#[test]
fn no_broadcast_below_peer_minimum() {
    init_logging();
    let config = ServerConfig {
        min_connected_peers: 3,
        ..Default::default()
    };
    let mut session = TestSession::with_config(config, 1);
    let (key, _) = session.spawn_counter("Score", 1);
    session.deliver();

    session
        .server
        .scene_mut()
        .node_mut(&key)
        .expect("counter")
        .mark_dirty();
    let now = session.advance(Duration::from_millis(100));
    session
        .server
        .tick(now, &ScriptedInput::new())
        .expect("server ticks");

    assert!(session.hub.peek_client(&TestSession::connection(0)).is_empty());
}

#[test]
fn server_remove_clears_ids_everywhere() {
    init_logging();
    let mut session = TestSession::new(2);
    let (key, id) = session.spawn_counter("Score", 3);
    session.deliver();
    assert!(session.client(1).entity(&id).is_some());

    session.server.remove_entity(&key).expect("remove");
    let events = session.deliver();

    assert!(session.server.world().entity(&id).is_none());
    for index in 0..2 {
        assert!(session.client(index).entity(&id).is_none());
        assert!(events.client_saw(index, &ClientEvent::EntityRemoved(id)));
    }
}

#[test]
fn server_add_before_full_sync_is_ignored() {
    init_logging();
    let config = ServerConfig {
        full_sync_on_connect: false,
        ..Default::default()
    };
    let mut session = TestSession::with_config(config, 1);

    let (_, id) = session.spawn_counter("Score", 9);
    let events = session.deliver();

    assert!(!session.client(0).has_full_server_data());
    assert!(session.client(0).entity(&id).is_none());
    assert!(events.clients[0].is_empty());
}

#[test]
fn forced_update_sends_clean_replicables() {
    init_logging();
    let mut session = TestSession::new(1);
    let (key, id) = session.spawn_counter("Score", 1);
    session.deliver();

    session
        .server
        .scene_mut()
        .node_mut(&key)
        .and_then(|node| node.behavior_as_mut::<Counter>())
        .expect("counter")
        .value = 11;
    assert!(session.server.force_update_clients().expect("force update"));
    session.deliver();

    assert_eq!(client_counter(&session, 0, &id), Some(11));
}

#[test]
fn update_for_unknown_entity_triggers_resync() {
    init_logging();
    let mut session = TestSession::new(1);
    session.deliver();

    // the client never hears about this entity
    let (key, id) = session.spawn_counter("Lost", 4);
    session.hub.clear_client(&TestSession::connection(0));
    session
        .server
        .scene_mut()
        .node_mut(&key)
        .expect("counter")
        .mark_dirty();

    let events = session.step();
    assert!(events.client_saw(0, &ClientEvent::UpdateDropped { missing: id }));
    assert_eq!(events.server.len(), 1);

    session.deliver();
    assert_eq!(client_counter(&session, 0, &id), Some(4));
}

#[test]
fn hidden_children_do_not_stall_updates() {
    init_logging();
    let mut session = TestSession::new(1);
    let (visible, visible_id) = session.spawn_counter("Score", 1);

    let props = session
        .server
        .scene_mut()
        .spawn(Node::plain("Props").with_group(groups::IGNORE_CHILDREN_NETWORK));
    let hidden = session
        .server
        .scene_mut()
        .spawn_child(
            &props,
            Node::node_3d("Hidden", Transform3D::default()).with_behavior(Counter::new(0)),
        )
        .expect("spawn hidden counter");
    let root = session.server.root();
    session
        .server
        .add_entity(&root, &props, Default::default())
        .expect("add props");
    session.deliver();

    for round in 0..3 {
        let value = 100 + round;
        for key in [visible, hidden] {
            let node = session.server.scene_mut().node_mut(&key).expect("counter");
            node.behavior_as_mut::<Counter>().expect("counter").value = value;
            node.mark_dirty();
        }
        let events = session.step();

        assert_eq!(client_counter(&session, 0, &visible_id), Some(value));
        assert!(events.server.is_empty());
        assert!(events.clients[0]
            .iter()
            .all(|event| !matches!(event, ClientEvent::UpdateDropped { .. })));
    }
}
