#![cfg(test)]

use std::sync::Arc;

use marginalia_api::{Comment, Identity, OpData, ReplicaId, Target};
use marginalia_client::{
    CommentModel, CommentRegistry, Config, DocumentPath, MemoryStore, ModelManager, NewComment,
    TargetSource,
};
use marginalia_mock_server::{settle, Collaborator, MockHub};

fn doc() -> DocumentPath {
    DocumentPath::new("/notebooks/foo.ipynb")
}

fn collaborator(hub: &mut MockHub) -> Collaborator {
    let model = CommentModel::new(
        doc(),
        Arc::new(CommentRegistry::with_defaults()),
        ReplicaId::new(),
    );
    Collaborator::join(hub, model)
}

fn add(model: &CommentModel, text: &str) -> Comment {
    model
        .add_comment(NewComment {
            kind: String::from("document"),
            text: String::from(text),
            identity: Identity::new(text, "#000000"),
            source: TargetSource::Target(Target::Null),
        })
        .unwrap()
}

#[test]
fn concurrent_adds_both_survive_once() {
    let mut hub = MockHub::new();
    let mut peers = vec![collaborator(&mut hub), collaborator(&mut hub)];
    let a = add(&peers[0].model, "from a");
    let b = add(&peers[1].model, "from b");
    settle(&mut hub, &mut peers);

    for p in peers.iter() {
        let comments = p.model.comments();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments.iter().filter(|c| c.id == a.id).count(), 1);
        assert_eq!(comments.iter().filter(|c| c.id == b.id).count(), 1);
    }
    assert_eq!(peers[0].model.comments(), peers[1].model.comments());
}

#[test]
fn delete_wins_over_concurrent_reply() {
    // both delivery orders: deleter pushes first, then replier pushes first
    for deleter_first in [true, false] {
        let mut hub = MockHub::new();
        let mut deleter = collaborator(&mut hub);
        let mut replier = collaborator(&mut hub);
        let c = add(&deleter.model, "parent");
        deleter.push(&mut hub);
        replier.pull();

        assert!(deleter.model.delete_comment(&c.id));
        replier
            .model
            .reply(&c.id, String::from("late"), Identity::stub())
            .unwrap();

        if deleter_first {
            deleter.push(&mut hub);
            replier.push(&mut hub);
        } else {
            replier.push(&mut hub);
            deleter.push(&mut hub);
        }
        deleter.pull();
        replier.pull();

        assert!(deleter.model.comments().is_empty());
        assert!(replier.model.comments().is_empty());
    }
}

#[test]
fn reply_never_shows_before_its_parent() {
    let mut hub = MockHub::new();
    let mut a = collaborator(&mut hub);
    let b = collaborator(&mut hub);
    let c = add(&a.model, "parent");
    a.model
        .reply(&c.id, String::from("child"), Identity::stub())
        .unwrap();
    a.push(&mut hub);

    // deliver out of order, bypassing the hub
    let mut ops = a.model.ops();
    ops.reverse();
    assert!(matches!(ops[0].data, OpData::AddReply { .. }));
    assert!(b.model.apply_remote(ops[0].clone()));
    assert!(b.model.comments().is_empty());
    assert!(b.model.apply_remote(ops[1].clone()));
    assert_eq!(b.model.comments(), a.model.comments());
}

#[test]
fn redelivery_changes_nothing() {
    let mut hub = MockHub::new();
    let mut a = collaborator(&mut hub);
    let mut b = collaborator(&mut hub);
    add(&a.model, "once");
    a.push(&mut hub);
    assert_eq!(b.pull(), 1);

    let mut changes = b.model.subscribe();
    let before = b.model.comments();
    for op in a.model.ops() {
        assert!(!b.model.apply_remote(op.clone()));
        hub.submit(op);
    }
    assert_eq!(b.pull(), 0);
    assert_eq!(b.model.comments(), before);
    assert!(changes.try_recv().is_err());
}

#[test]
fn partitioned_peer_converges_after_heal() {
    let mut hub = MockHub::new();
    let mut peers = vec![
        collaborator(&mut hub),
        collaborator(&mut hub),
        collaborator(&mut hub),
    ];
    let cut = peers[2].model.replica();
    hub.partition(cut);

    let c = add(&peers[0].model, "before heal");
    settle(&mut hub, &mut peers);
    peers[1]
        .model
        .reply(&c.id, String::from("seen by 1"), Identity::stub())
        .unwrap();
    add(&peers[2].model, "from the cut peer");
    settle(&mut hub, &mut peers);
    assert_eq!(peers[2].model.comments().len(), 1);

    hub.heal(cut);
    settle(&mut hub, &mut peers);
    let expected = peers[0].model.comments();
    assert_eq!(expected.len(), 2);
    assert_eq!(peers[2].model.find(&c.id).unwrap().replies.len(), 1);
    for p in peers.iter() {
        assert_eq!(p.model.comments(), expected);
    }
}

#[tokio::test]
async fn collaborators_sharing_a_saved_file() {
    let store = Arc::new(MemoryStore::new());
    let registry = Arc::new(CommentRegistry::with_defaults());

    let mut first = ModelManager::new(store.clone(), registry.clone(), Config::default());
    let model = first.load_model(&doc()).await.unwrap();
    let saved = add(&model, "saved");
    first.save(&doc()).await.unwrap();

    let mut second = ModelManager::new(store.clone(), registry, Config::default());
    let other = second.load_model(&doc()).await.unwrap();
    assert_eq!(other.comments(), vec![saved.clone()]);
    assert_ne!(first.replica(), second.replica());

    // ops exchanged after loading apply on top of the shared snapshot
    let mut hub = MockHub::new();
    let mut peers = vec![
        Collaborator::join(&mut hub, model.clone()),
        Collaborator::join(&mut hub, other.clone()),
    ];
    other
        .reply(&saved.id, String::from("on the snapshot"), Identity::stub())
        .unwrap();
    add(&model, "after load");
    settle(&mut hub, &mut peers);
    assert_eq!(model.comments(), other.comments());
    assert_eq!(model.find(&saved.id).unwrap().replies.len(), 1);
}
