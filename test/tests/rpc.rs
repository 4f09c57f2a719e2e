//! Tests for remote calls in both directions, and for the calls a host
//! must drop or refuse

use arbor_client::{ArborClientError, ClientEvent};
use arbor_server::{ArborServerError, ServerEvent};
use arbor_shared::{NetworkId, NetworkMessage, Node, RpcCall, RpcError, RpcValue};
use arbor_test::{Counter, Sun, TestSession};

fn sun_on_client(session: &TestSession, index: usize, id: &NetworkId) -> Sun {
    let client = session.client(index);
    let key = client.entity(id).expect("sun replicated");
    client
        .scene()
        .node(&key)
        .and_then(|node| node.behavior_as::<Sun>())
        .cloned()
        .expect("sun behavior")
}

fn encoded_call(caller: NetworkId, method: &str, params: Vec<RpcValue>) -> Vec<u8> {
    NetworkMessage::RpcCall(RpcCall {
        caller,
        method: method.to_string(),
        params,
    })
    .encode()
    .expect("encode call")
}

#[test]
fn client_call_runs_on_server_counterpart() {
    let mut session = TestSession::new(1);
    let (server_sun, id) = session.spawn_sun("Sun");
    session.deliver();

    let client_sun = session.client(0).entity(&id).expect("sun replicated");
    session
        .client_mut(0)
        .rpc_server(&client_sun, "set_brightness", vec![0.75.into()])
        .expect("queue call");
    let events = session.step();

    assert!(events.server.contains(&ServerEvent::RpcInvoked {
        caller: id,
        method: "set_brightness".to_string(),
    }));
    let sun = session
        .server
        .scene()
        .node(&server_sun)
        .and_then(|node| node.behavior_as::<Sun>())
        .expect("sun");
    assert_eq!(sun.brightness, 0.75);
}

#[test]
fn server_call_reaches_every_client() {
    let mut session = TestSession::new(2);
    let (sun, id) = session.spawn_sun("Sun");
    session.deliver();

    session
        .server
        .rpc_clients(&sun, "flare", Vec::new())
        .expect("queue call");
    session.step();

    assert_eq!(sun_on_client(&session, 0, &id).flares, 1);
    assert_eq!(sun_on_client(&session, 1, &id).flares, 1);
}

#[test]
fn targeted_call_reaches_one_client() {
    let mut session = TestSession::new(2);
    let (sun, id) = session.spawn_sun("Sun");
    session.deliver();

    session
        .server
        .rpc_client(TestSession::connection(1), &sun, "flare", Vec::new())
        .expect("queue call");
    session.step();

    assert_eq!(sun_on_client(&session, 0, &id).flares, 0);
    assert_eq!(sun_on_client(&session, 1, &id).flares, 1);
}

#[test]
fn calls_are_held_until_the_rpc_stage() {
    let mut session = TestSession::new(1);
    let (sun, id) = session.spawn_sun("Sun");
    session.deliver();

    session
        .server
        .rpc_clients(&sun, "flare", Vec::new())
        .expect("queue call");
    session.deliver();
    assert_eq!(sun_on_client(&session, 0, &id).flares, 0);

    session.step();
    assert_eq!(sun_on_client(&session, 0, &id).flares, 1);
}

#[test]
fn call_from_unknown_caller_is_dropped() {
    let mut session = TestSession::new(1);
    session.deliver();

    let stranger = NetworkId::new(4_000);
    session.hub.inject_to_server(
        TestSession::connection(0),
        encoded_call(stranger, "flare", Vec::new()),
    );
    let events = session.server.receive().expect("receive");

    assert_eq!(
        events.iter().cloned().collect::<Vec<_>>(),
        vec![ServerEvent::RpcDropped {
            caller: stranger,
            method: "flare".to_string(),
        }]
    );
}

#[test]
fn unknown_method_is_reported() {
    let mut session = TestSession::new(1);
    let (_, id) = session.spawn_sun("Sun");
    session.deliver();

    session.hub.inject_to_server(
        TestSession::connection(0),
        encoded_call(id, "explode", Vec::new()),
    );
    let events = session.server.receive().expect("receive");

    assert!(matches!(
        events.iter().next(),
        Some(ServerEvent::RpcFailed {
            error: RpcError::UnknownMethod { .. },
            ..
        })
    ));
}

#[test]
fn wrong_argument_type_is_reported() {
    let mut session = TestSession::new(1);
    let (_, id) = session.spawn_counter("Score", 0);
    session.deliver();

    session.hub.inject_to_server(
        TestSession::connection(0),
        encoded_call(id, "add", vec!["three".into()]),
    );
    let events = session.server.receive().expect("receive");

    assert!(matches!(
        events.iter().next(),
        Some(ServerEvent::RpcFailed {
            error: RpcError::ArgumentType { index: 0, .. },
            ..
        })
    ));
}

#[test]
fn failed_call_does_not_hide_its_neighbours() {
    let mut session = TestSession::new(1);
    let (sun, id) = session.spawn_sun("Sun");
    session.deliver();

    for method in ["flare", "explode", "flare"] {
        session.hub.inject_to_server(
            TestSession::connection(0),
            encoded_call(id, method, Vec::new()),
        );
    }
    let events: Vec<ServerEvent> = session
        .server
        .receive()
        .expect("receive")
        .into_iter()
        .collect();

    assert_eq!(events.len(), 3);
    assert_eq!(
        events[0],
        ServerEvent::RpcInvoked {
            caller: id,
            method: "flare".to_string(),
        }
    );
    assert!(matches!(events[1], ServerEvent::RpcFailed { .. }));
    assert_eq!(events[2], events[0]);
    let flares = session
        .server
        .scene()
        .node(&sun)
        .and_then(|node| node.behavior_as::<Sun>())
        .map(|sun| sun.flares);
    assert_eq!(flares, Some(2));
}

#[test]
fn client_keeps_draining_after_a_failed_call() {
    let mut session = TestSession::new(1);
    let (_, id) = session.spawn_sun("Sun");
    session.deliver();

    let connection = TestSession::connection(0);
    session
        .hub
        .inject_to_client(&connection, encoded_call(id, "explode", Vec::new()));
    session
        .hub
        .inject_to_client(&connection, encoded_call(id, "flare", Vec::new()));
    let events: Vec<ClientEvent> = session
        .client_mut(0)
        .receive()
        .expect("receive")
        .into_iter()
        .collect();

    assert!(matches!(
        events[0],
        ClientEvent::MessageFailed {
            message: "RpcCall",
            error: ArborClientError::Rpc(RpcError::UnknownMethod { .. }),
        }
    ));
    assert_eq!(
        events[1],
        ClientEvent::RpcInvoked {
            caller: id,
            method: "flare".to_string(),
        }
    );
    assert_eq!(sun_on_client(&session, 0, &id).flares, 1);
}

#[test]
fn self_entities_cannot_call() {
    let mut session = TestSession::new(1);
    let root = session.server.root();
    let local = session
        .server
        .scene_mut()
        .spawn(Node::plain("Cursor").with_behavior(Counter::new(0)));
    let id = session
        .server
        .add_self_entity(&root, &local)
        .expect("add self entity");
    assert!(id.is_self());

    let result = session.server.rpc_clients(&local, "add", vec![1.into()]);

    assert_eq!(
        result,
        Err(ArborServerError::Rpc(RpcError::SelfOnlyCaller { id }))
    );
}

#[test]
fn packets_from_unaccepted_connections_are_ignored() {
    let mut session = TestSession::new(1);
    let (sun, id) = session.spawn_sun("Sun");
    session.deliver();

    session.hub.inject_to_server(
        arbor_shared::ConnectionId(99),
        encoded_call(id, "flare", Vec::new()),
    );
    let events = session.server.receive().expect("receive");

    assert!(events.is_empty());
    let flares = session
        .server
        .scene()
        .node(&sun)
        .and_then(|node| node.behavior_as::<Sun>())
        .map(|sun| sun.flares);
    assert_eq!(flares, Some(0));
}
