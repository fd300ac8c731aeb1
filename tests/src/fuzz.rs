#![cfg(test)]

use std::{collections::HashSet, sync::Arc};

use marginalia_api::{Identity, Op, ReplicaId, Target};
use marginalia_client::{CommentModel, CommentRegistry, DocumentPath, NewComment, TargetSource};
use tokio::sync::mpsc;

const NUM_PEERS: usize = 3;

#[derive(Clone, Debug, bolero::generator::TypeGenerator)]
enum FuzzOp {
    AddComment {
        peer: u8,
    },
    AddReply {
        peer: u8,
        parent: u8,
    },
    DeleteComment {
        peer: u8,
        comment: u8,
    },
    DeleteReply {
        peer: u8,
        comment: u8,
        reply: u8,
    },
    EditComment {
        peer: u8,
        comment: u8,
    },
    /// Delivers one of the ops in flight towards `peer`, picked by `pick`
    Deliver {
        peer: u8,
        pick: u8,
    },
}

struct Peer {
    model: CommentModel,
    outgoing: mpsc::UnboundedReceiver<Op>,
    in_flight: Vec<Op>,
}

/// Peers exchanging ops with arbitrary reordering, as a network without any
/// ordering guarantee would
struct Network {
    peers: Vec<Peer>,
    counter: usize,
}

impl Network {
    fn new() -> Network {
        let registry = Arc::new(CommentRegistry::with_defaults());
        let peers = (0..NUM_PEERS)
            .map(|_| {
                let model = CommentModel::new(
                    DocumentPath::new("doc.md"),
                    registry.clone(),
                    ReplicaId::new(),
                );
                Peer {
                    outgoing: model.subscribe_ops(),
                    model,
                    in_flight: Vec::new(),
                }
            })
            .collect();
        Network { peers, counter: 0 }
    }

    fn text(&mut self) -> String {
        self.counter += 1;
        format!("text {}", self.counter)
    }

    fn broadcast(&mut self) {
        for from in 0..NUM_PEERS {
            while let Ok(op) = self.peers[from].outgoing.try_recv() {
                for (to, p) in self.peers.iter_mut().enumerate() {
                    if to != from {
                        p.in_flight.push(op.clone());
                    }
                }
            }
        }
    }

    fn execute_fuzz_op(&mut self, op: FuzzOp) {
        match op {
            FuzzOp::AddComment { peer } => {
                let text = self.text();
                let model = &self.peers[peer as usize % NUM_PEERS].model;
                model
                    .add_comment(NewComment {
                        kind: String::from("document"),
                        text,
                        identity: Identity::stub(),
                        source: TargetSource::Target(Target::Null),
                    })
                    .expect("adding a document comment");
            }
            FuzzOp::AddReply { peer, parent } => {
                let text = self.text();
                let model = &self.peers[peer as usize % NUM_PEERS].model;
                let comments = model.comments();
                if !comments.is_empty() {
                    let parent = &comments[parent as usize % comments.len()];
                    model
                        .reply(&parent.id, text, Identity::stub())
                        .expect("replying to a visible comment");
                }
            }
            FuzzOp::DeleteComment { peer, comment } => {
                let model = &self.peers[peer as usize % NUM_PEERS].model;
                let comments = model.comments();
                if !comments.is_empty() {
                    let c = &comments[comment as usize % comments.len()];
                    assert!(model.delete_comment(&c.id));
                    assert!(model.find(&c.id).is_none());
                }
            }
            FuzzOp::DeleteReply {
                peer,
                comment,
                reply,
            } => {
                let model = &self.peers[peer as usize % NUM_PEERS].model;
                let comments = model.comments();
                if !comments.is_empty() {
                    let c = &comments[comment as usize % comments.len()];
                    if !c.replies.is_empty() {
                        let r = &c.replies[reply as usize % c.replies.len()];
                        assert!(model.delete_reply(&c.id, &r.id));
                    }
                }
            }
            FuzzOp::EditComment { peer, comment } => {
                let text = self.text();
                let model = &self.peers[peer as usize % NUM_PEERS].model;
                let comments = model.comments();
                if !comments.is_empty() {
                    let c = &comments[comment as usize % comments.len()];
                    assert!(model.edit_comment(&c.id, text));
                }
            }
            FuzzOp::Deliver { peer, pick } => {
                let p = &mut self.peers[peer as usize % NUM_PEERS];
                if !p.in_flight.is_empty() {
                    let op = p.in_flight.remove(pick as usize % p.in_flight.len());
                    p.model.apply_remote(op);
                }
            }
        }
        self.broadcast();
        self.check_unique_ids();
    }

    fn check_unique_ids(&self) {
        for p in self.peers.iter() {
            let mut seen = HashSet::new();
            for c in p.model.comments() {
                for id in c.ids() {
                    assert!(seen.insert(id.clone()), "id {id} appears twice");
                }
            }
        }
    }

    fn deliver_everything(&mut self) {
        for p in self.peers.iter_mut() {
            for op in std::mem::take(&mut p.in_flight) {
                p.model.apply_remote(op);
            }
        }
    }
}

#[test]
fn replicas_converge_whatever_the_delivery_order() {
    bolero::check!()
        .with_type::<Vec<FuzzOp>>()
        .cloned()
        .for_each(|ops| {
            let mut net = Network::new();
            for op in ops {
                net.execute_fuzz_op(op);
            }
            net.deliver_everything();
            let expected = net.peers[0].model.comments();
            for p in net.peers.iter() {
                assert_eq!(p.model.comments(), expected);
            }
        })
}
