//! Tests for identity allocation across server entities, self entities and
//! replicas

use std::collections::HashSet;

use proptest::prelude::*;

use arbor_shared::{groups, Node, FIRST_SELF_ID, ROOT_ID};
use arbor_test::{Counter, TestSession};

#[test]
fn roots_share_the_reserved_id() {
    let session = TestSession::new(1);

    let server_root = session.server.root();
    let client_root = session.client(0).root();
    assert_eq!(session.server.world().id_of(&server_root), Ok(ROOT_ID));
    assert_eq!(session.client(0).world().id_of(&client_root), Ok(ROOT_ID));
}

#[test]
fn client_self_entities_stay_local() {
    let mut session = TestSession::new(1);
    session.deliver();

    let client = session.client_mut(0);
    let root = client.root();
    let marker = client.scene_mut().spawn(Node::plain("Marker"));
    let id = client.add_self_entity(&root, &marker).expect("self entity");

    assert!(id.is_self());
    assert!(id.value() >= FIRST_SELF_ID);
    let node = client.scene().node(&marker).expect("marker");
    assert!(node.in_group(groups::SELF_ONLY));

    client.remove_self_entity(&marker).expect("remove self entity");
    assert!(client.entity(&id).is_none());
    assert!(session.hub.peek_server().is_empty());
}

#[test]
fn server_self_entities_are_not_announced() {
    let mut session = TestSession::new(1);
    session.deliver();

    let root = session.server.root();
    let local = session.server.scene_mut().spawn(Node::plain("Debug"));
    session
        .server
        .add_self_entity(&root, &local)
        .expect("self entity");

    assert!(session.hub.peek_client(&TestSession::connection(0)).is_empty());
    let data = session.server.world().full_server_data().expect("full data");
    assert!(data.entities.iter().all(|record| record.name != "Debug"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn server_ids_are_unique_and_mirrored(sizes in prop::collection::vec(0usize..4, 1..8)) {
        let mut session = TestSession::new(1);
        session.deliver();

        let mut ids = HashSet::new();
        for (index, children) in sizes.iter().enumerate() {
            let scene = session.server.scene_mut();
            let parent = scene.spawn(Node::plain(format!("Group{}", index)));
            for child in 0..*children {
                let item = Node::plain(format!("Item{}", child))
                    .with_behavior(Counter::new(child as i64));
                scene.spawn_child(&parent, item).expect("spawn child");
            }
            let root = session.server.root();
            session
                .server
                .add_entity(&root, &parent, Default::default())
                .expect("add entity");
            for key in session.server.scene().descendants(&parent) {
                let id = session.server.world().id_of(&key).expect("id");
                prop_assert!(id.is_server());
                prop_assert!(id != ROOT_ID);
                prop_assert!(ids.insert(id));
            }
        }
        session.deliver();

        for id in &ids {
            let replica = session.client(0).entity(id);
            prop_assert!(replica.is_some());
        }
    }
}
