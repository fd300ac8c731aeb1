use std::collections::{BTreeMap, HashSet};

use marginalia_client::{
    api::{Op, OpId, ReplicaId},
    CommentModel,
};
use tokio::sync::mpsc;

/// In-process relay standing in for the collaboration server: every op
/// submitted by one replica is forwarded to all the others, and replicas
/// joining late first receive the whole history.
#[derive(Debug, Default)]
pub struct MockHub {
    peers: BTreeMap<ReplicaId, Peer>,
    history: Vec<Op>,
    seen: HashSet<OpId>,
}

#[derive(Debug, Default)]
struct Peer {
    feeds: Vec<mpsc::UnboundedSender<Op>>,
    partitioned: bool,
    pending: Vec<Op>,
}

impl Peer {
    fn relay_op(&mut self, op: Op) {
        if self.partitioned {
            self.pending.push(op);
            return;
        }
        self.feeds.retain_mut(|f| matches!(f.send(op.clone()), Ok(())));
    }
}

impl MockHub {
    pub fn new() -> MockHub {
        MockHub::default()
    }

    /// Returns the feed of ops submitted by the other replicas, starting
    /// with everything submitted so far
    pub fn connect(&mut self, replica: ReplicaId) -> mpsc::UnboundedReceiver<Op> {
        let (sender, receiver) = mpsc::unbounded_channel();
        for op in self.history.iter().filter(|op| op.id.replica != replica) {
            // the receiver is still in scope, this cannot fail
            let _ = sender.send(op.clone());
        }
        self.peers.entry(replica).or_default().feeds.push(sender);
        tracing::debug!(?replica, history = self.history.len(), "replica connected");
        receiver
    }

    pub fn submit(&mut self, op: Op) {
        if !self.seen.insert(op.id) {
            tracing::trace!(?op.id, "dropping op submitted twice");
            return;
        }
        self.history.push(op.clone());
        for (replica, peer) in self.peers.iter_mut() {
            if *replica != op.id.replica {
                peer.relay_op(op.clone());
            }
        }
    }

    /// Holds back everything sent to `replica` until `heal` is called
    pub fn partition(&mut self, replica: ReplicaId) {
        self.peers.entry(replica).or_default().partitioned = true;
    }

    pub fn heal(&mut self, replica: ReplicaId) {
        let peer = self.peers.entry(replica).or_default();
        peer.partitioned = false;
        let pending = std::mem::take(&mut peer.pending);
        tracing::debug!(?replica, pending = pending.len(), "healing partition");
        for op in pending {
            peer.relay_op(op);
        }
    }

    pub fn history(&self) -> &[Op] {
        &self.history
    }

    pub fn test_num_peers(&self) -> usize {
        self.peers.len()
    }
}

/// A comment model wired to a hub
#[derive(Debug)]
pub struct Collaborator {
    pub model: CommentModel,
    outgoing: mpsc::UnboundedReceiver<Op>,
    incoming: mpsc::UnboundedReceiver<Op>,
}

impl Collaborator {
    pub fn join(hub: &mut MockHub, model: CommentModel) -> Collaborator {
        Collaborator {
            outgoing: model.subscribe_ops(),
            incoming: hub.connect(model.replica()),
            model,
        }
    }

    /// Sends the ops generated locally since the last push. Returns how many
    /// were sent.
    pub fn push(&mut self, hub: &mut MockHub) -> usize {
        let mut n = 0;
        while let Ok(op) = self.outgoing.try_recv() {
            hub.submit(op);
            n += 1;
        }
        n
    }

    /// Applies the ops received since the last pull. Returns how many were
    /// new to this replica.
    pub fn pull(&mut self) -> usize {
        let mut n = 0;
        while let Ok(op) = self.incoming.try_recv() {
            if self.model.apply_remote(op) {
                n += 1;
            }
        }
        n
    }
}

/// Pushes and pulls until no collaborator has anything left to exchange
pub fn settle(hub: &mut MockHub, collaborators: &mut [Collaborator]) {
    loop {
        let mut moved = 0;
        for c in collaborators.iter_mut() {
            moved += c.push(hub);
        }
        for c in collaborators.iter_mut() {
            moved += c.pull();
        }
        if moved == 0 {
            return;
        }
    }
}
