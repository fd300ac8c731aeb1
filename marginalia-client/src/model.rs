use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::{
    api::{
        validate_string, Comment, CommentFile, CommentId, Identity, Op, OpData, Reply, ReplicaId,
        Target,
    },
    document::DocumentPath,
    factory::LiveRegion,
    forest::Forest,
    registry::CommentRegistry,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Origin {
    Local,
    Remote,
}

/// Sent to subscribers after every change to the forest. Consumers are
/// expected to re-read `comments()`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Change {
    pub origin: Origin,
}

#[derive(Clone, Debug)]
pub enum TargetSource<'a> {
    /// Region of an open document, turned into a descriptor by the factory
    Live(LiveRegion<'a>),

    /// Already-built descriptor, stored as is
    Target(Target),
}

#[derive(Clone, Debug)]
pub struct NewComment<'a> {
    pub kind: String,
    pub text: String,
    pub identity: Identity,
    pub source: TargetSource<'a>,
}

#[derive(Debug)]
struct ModelState {
    document: DocumentPath,
    /// Other open documents whose comments live in the same file
    sharers: Vec<DocumentPath>,
    registry: Arc<CommentRegistry>,
    forest: Forest,
    version: u64,
    saved_version: u64,
    changes: Vec<mpsc::UnboundedSender<Change>>,
    op_feeds: Vec<mpsc::UnboundedSender<Op>>,
}

impl ModelState {
    fn commit(&mut self, data: OpData) {
        let op = self.forest.apply_local(data);
        self.version += 1;
        self.op_feeds
            .retain_mut(|f| matches!(f.send(op.clone()), Ok(())));
        self.notify(Origin::Local);
    }

    fn notify(&mut self, origin: Origin) {
        self.changes
            .retain_mut(|f| matches!(f.send(Change { origin }), Ok(())));
    }
}

/// The comment forest of one document.
///
/// This is a handle: clones share the same forest, so every view of a
/// document sees the same comments. The forest can only be changed through
/// the methods below, which turn each change into a replicated op.
///
/// Mutations on missing comments or replies are logged and ignored rather
/// than returned as errors, so that a stale UI action never takes down the
/// host.
#[derive(Clone, Debug)]
pub struct CommentModel(Arc<Mutex<ModelState>>);

impl CommentModel {
    pub fn new(
        document: DocumentPath,
        registry: Arc<CommentRegistry>,
        replica: ReplicaId,
    ) -> CommentModel {
        CommentModel::from_file(document, registry, replica, CommentFile::default())
    }

    pub fn from_file(
        document: DocumentPath,
        registry: Arc<CommentRegistry>,
        replica: ReplicaId,
        file: CommentFile,
    ) -> CommentModel {
        CommentModel(Arc::new(Mutex::new(ModelState {
            document,
            sharers: Vec::new(),
            registry,
            forest: Forest::from_snapshot(replica, file.comments),
            version: 0,
            saved_version: 0,
            changes: Vec::new(),
            op_feeds: Vec::new(),
        })))
    }

    pub fn document(&self) -> DocumentPath {
        self.0.lock().document.clone()
    }

    /// Lets regions of `document` be commented on through this model too
    pub(crate) fn share_with(&self, document: &DocumentPath) {
        let mut this = self.0.lock();
        if this.document != *document && !this.sharers.contains(document) {
            this.sharers.push(document.clone());
        }
    }

    pub(crate) fn unshare(&self, document: &DocumentPath) {
        self.0.lock().sharers.retain(|d| d != document);
    }

    pub fn registry(&self) -> Arc<CommentRegistry> {
        self.0.lock().registry.clone()
    }

    pub fn replica(&self) -> ReplicaId {
        self.0.lock().forest.replica()
    }

    /// Whether both handles point to the same forest
    pub fn same_model(&self, other: &CommentModel) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn comments(&self) -> Vec<Comment> {
        self.0.lock().forest.comments().to_vec()
    }

    pub fn find(&self, id: &CommentId) -> Option<Comment> {
        self.0.lock().forest.find(id).cloned()
    }

    pub fn add_comment(&self, new: NewComment<'_>) -> Option<Comment> {
        let mut this = self.0.lock();
        let kind = new.kind;
        let comment = match new.source {
            TargetSource::Live(region) => {
                let path = region.path();
                if *path != this.document && !this.sharers.contains(path) {
                    tracing::warn!(
                        %kind,
                        region = %path,
                        document = %this.document,
                        "region belongs to another document"
                    );
                    return None;
                }
                match this
                    .registry
                    .create_comment(&kind, &region, new.text, new.identity)
                {
                    Ok(c) => c,
                    Err(err) => {
                        tracing::warn!(%kind, ?err, "failed creating comment");
                        return None;
                    }
                }
            }
            TargetSource::Target(target) => {
                if this.registry.get_factory(&kind).is_none() {
                    tracing::debug!(%kind, "adding comment of a type with no registered factory");
                }
                Comment::new(kind, target, new.text, new.identity)
            }
        };
        if let Err(err) = comment.validate() {
            tracing::warn!(?err, "refusing invalid comment");
            return None;
        }
        if this.forest.is_used(&comment.id) {
            tracing::warn!(id = %comment.id, "comment id already used");
            return None;
        }
        this.commit(OpData::AddComment(comment.clone()));
        Some(comment)
    }

    /// Appends `reply` to the replies of `parent`. Returns whether it was
    /// added.
    pub fn add_reply(&self, reply: Reply, parent: &CommentId) -> bool {
        let mut this = self.0.lock();
        if this.forest.find(parent).is_none() {
            tracing::warn!(%parent, "replying to a comment that does not exist");
            return false;
        }
        if this.forest.is_used(&reply.id) {
            tracing::warn!(%parent, id = %reply.id, "reply id already used");
            return false;
        }
        if let Err(err) = reply.validate() {
            tracing::warn!(%parent, ?err, "refusing invalid reply");
            return false;
        }
        this.commit(OpData::AddReply {
            parent: parent.clone(),
            reply,
        });
        true
    }

    /// Builds a reply of the same type as its parent and appends it
    pub fn reply(&self, parent: &CommentId, text: String, identity: Identity) -> Option<Reply> {
        let kind = match self.find(parent) {
            Some(p) => p.kind,
            None => {
                tracing::warn!(%parent, "replying to a comment that does not exist");
                return None;
            }
        };
        let reply = Reply::new(kind, text, identity);
        self.add_reply(reply.clone(), parent).then_some(reply)
    }

    pub fn delete_comment(&self, id: &CommentId) -> bool {
        let mut this = self.0.lock();
        if this.forest.find(id).is_none() {
            tracing::warn!(%id, "deleting a comment that does not exist");
            return false;
        }
        this.commit(OpData::DeleteComment(id.clone()));
        true
    }

    pub fn delete_reply(&self, parent: &CommentId, reply: &CommentId) -> bool {
        let mut this = self.0.lock();
        if !has_reply(&this.forest, parent, reply) {
            tracing::warn!(%parent, %reply, "deleting a reply that does not exist");
            return false;
        }
        this.commit(OpData::DeleteReply {
            parent: parent.clone(),
            reply: reply.clone(),
        });
        true
    }

    pub fn edit_comment(&self, id: &CommentId, text: String) -> bool {
        if let Err(err) = validate_string(&text) {
            tracing::warn!(%id, ?err, "refusing invalid comment text");
            return false;
        }
        let mut this = self.0.lock();
        if this.forest.find(id).is_none() {
            tracing::warn!(%id, "editing a comment that does not exist");
            return false;
        }
        this.commit(OpData::EditComment {
            id: id.clone(),
            text,
        });
        true
    }

    pub fn edit_reply(&self, parent: &CommentId, reply: &CommentId, text: String) -> bool {
        if let Err(err) = validate_string(&text) {
            tracing::warn!(%parent, %reply, ?err, "refusing invalid reply text");
            return false;
        }
        let mut this = self.0.lock();
        if !has_reply(&this.forest, parent, reply) {
            tracing::warn!(%parent, %reply, "editing a reply that does not exist");
            return false;
        }
        this.commit(OpData::EditReply {
            parent: parent.clone(),
            reply: reply.clone(),
            text,
        });
        true
    }

    /// Notifications for every change, local or remote. The feed is dropped
    /// from the model once the receiver is.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Change> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.0.lock().changes.push(sender);
        receiver
    }

    /// Every op generated locally from now on, to be relayed to the other
    /// replicas
    pub fn subscribe_ops(&self) -> mpsc::UnboundedReceiver<Op> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.0.lock().op_feeds.push(sender);
        receiver
    }

    /// Merges an op received from another replica. Returns `false` if the
    /// op was invalid or already known.
    pub fn apply_remote(&self, op: Op) -> bool {
        if let Err(err) = op.validate() {
            tracing::warn!(?op.id, ?err, "ignoring invalid remote op");
            return false;
        }
        let mut this = self.0.lock();
        if !this.forest.apply_remote(op) {
            tracing::trace!("ignoring already-known op");
            return false;
        }
        this.version += 1;
        this.notify(Origin::Remote);
        true
    }

    /// All ops known to this replica, in merge order
    pub fn ops(&self) -> Vec<Op> {
        self.0.lock().forest.ops().collect()
    }

    pub fn to_file(&self) -> CommentFile {
        self.snapshot().1
    }

    /// Current contents along with the version to pass to `mark_saved` once
    /// they are persisted
    pub fn snapshot(&self) -> (u64, CommentFile) {
        let this = self.0.lock();
        (
            this.version,
            CommentFile::new(this.forest.comments().to_vec()),
        )
    }

    pub fn is_dirty(&self) -> bool {
        let this = self.0.lock();
        this.version != this.saved_version
    }

    pub fn mark_saved(&self, version: u64) {
        let mut this = self.0.lock();
        this.saved_version = this.saved_version.max(version);
    }
}

fn has_reply(forest: &Forest, parent: &CommentId, reply: &CommentId) -> bool {
    forest
        .find(parent)
        .map(|p| p.reply(reply).is_some())
        .unwrap_or(false)
}
