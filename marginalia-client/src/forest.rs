use std::collections::{BTreeMap, HashSet};

use crate::api::{Comment, CommentId, Op, OpData, OpId, Reply, ReplicaId};

/// Replicated comment forest.
///
/// Every mutation is an op stamped with a lamport clock. The visible forest
/// is the replay of the loaded snapshot followed by all known ops in `OpId`
/// order, so any two replicas that know the same ops show the same forest
/// whatever order the ops were received in.
///
/// Merge policy:
/// - concurrent adds all survive, top-level comments in `OpId` order
/// - deletes win: a reply to a deleted comment is dropped whether it is
///   ordered before or after the delete
/// - deleted ids are tombstoned and never come back
/// - edits are last-writer-wins in `OpId` order
/// - a reply whose parent is unknown is not shown until the parent arrives
#[derive(Clone, Debug)]
pub struct Forest {
    replica: ReplicaId,
    clock: u64,
    base: Vec<Comment>,
    log: BTreeMap<OpId, OpData>,
    comments: Vec<Comment>,
    tombstones: HashSet<CommentId>,
}

impl Forest {
    pub fn new(replica: ReplicaId) -> Forest {
        Forest::from_snapshot(replica, Vec::new())
    }

    /// Seeds the forest with a persisted snapshot. Comments and replies
    /// reusing an already-seen id are dropped.
    pub fn from_snapshot(replica: ReplicaId, snapshot: Vec<Comment>) -> Forest {
        let mut seen = HashSet::new();
        let mut base = Vec::with_capacity(snapshot.len());
        for mut c in snapshot {
            if !seen.insert(c.id.clone()) {
                tracing::warn!(id = %c.id, "dropping comment with duplicate id from snapshot");
                continue;
            }
            c.replies.retain(|r| {
                let fresh = seen.insert(r.id.clone());
                if !fresh {
                    tracing::warn!(id = %r.id, "dropping reply with duplicate id from snapshot");
                }
                fresh
            });
            base.push(c);
        }
        Forest {
            replica,
            clock: 0,
            comments: base.clone(),
            base,
            log: BTreeMap::new(),
            tombstones: HashSet::new(),
        }
    }

    pub fn replica(&self) -> ReplicaId {
        self.replica
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn find(&self, id: &CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == *id)
    }

    /// Whether `id` is used by a comment or reply, live or deleted
    pub fn is_used(&self, id: &CommentId) -> bool {
        self.tombstones.contains(id) || contains_id(&self.comments, id)
    }

    pub fn ops(&self) -> impl Iterator<Item = Op> + '_ {
        self.log.iter().map(|(id, data)| Op {
            id: *id,
            data: data.clone(),
        })
    }

    pub fn apply_local(&mut self, data: OpData) -> Op {
        self.clock += 1;
        let id = OpId {
            lamport: self.clock,
            replica: self.replica,
        };
        self.log.insert(id, data.clone());
        self.refresh();
        Op { id, data }
    }

    /// Merges an op from another replica. Returns `false` if the op was
    /// already known.
    pub fn apply_remote(&mut self, op: Op) -> bool {
        self.clock = self.clock.max(op.id.lamport);
        if self.log.contains_key(&op.id) {
            return false;
        }
        self.log.insert(op.id, op.data);
        self.refresh();
        true
    }

    fn refresh(&mut self) {
        let mut comments = self.base.clone();
        let mut tombstones = HashSet::new();
        for (op, data) in self.log.iter() {
            match data {
                OpData::AddComment(c) => {
                    if tombstones.contains(&c.id) || contains_id(&comments, &c.id) {
                        tracing::debug!(?op, id = %c.id, "ignoring add of a used comment id");
                        continue;
                    }
                    comments.push(c.clone());
                }
                OpData::AddReply { parent, reply } => {
                    if tombstones.contains(&reply.id) || contains_id(&comments, &reply.id) {
                        tracing::debug!(?op, id = %reply.id, "ignoring add of a used reply id");
                        continue;
                    }
                    match find_mut(&mut comments, parent) {
                        Some(p) => p.replies.push(reply.clone()),
                        None => {
                            tracing::debug!(?op, %parent, "dropping reply to absent comment")
                        }
                    }
                }
                OpData::DeleteComment(id) => {
                    if let Some(pos) = comments.iter().position(|c| c.id == *id) {
                        let c = comments.remove(pos);
                        tombstones.extend(c.ids().cloned());
                    }
                    tombstones.insert(id.clone());
                }
                OpData::DeleteReply { parent, reply } => {
                    if let Some(p) = find_mut(&mut comments, parent) {
                        p.replies.retain(|r| r.id != *reply);
                    }
                    tombstones.insert(reply.clone());
                }
                OpData::EditComment { id, text } => {
                    if let Some(c) = find_mut(&mut comments, id) {
                        c.text = text.clone();
                    }
                }
                OpData::EditReply {
                    parent,
                    reply,
                    text,
                } => {
                    if let Some(r) = find_reply_mut(&mut comments, parent, reply) {
                        r.text = text.clone();
                    }
                }
            }
        }
        self.comments = comments;
        self.tombstones = tombstones;
    }
}

fn contains_id(comments: &[Comment], id: &CommentId) -> bool {
    comments.iter().any(|c| c.ids().any(|i| i == id))
}

fn find_mut<'a>(comments: &'a mut [Comment], id: &CommentId) -> Option<&'a mut Comment> {
    comments.iter_mut().find(|c| c.id == *id)
}

fn find_reply_mut<'a>(
    comments: &'a mut [Comment],
    parent: &CommentId,
    reply: &CommentId,
) -> Option<&'a mut Reply> {
    find_mut(comments, parent)?
        .replies
        .iter_mut()
        .find(|r| r.id == *reply)
}
