use std::sync::Arc;

use crate::{
    anchor::Anchor,
    api::{Comment, CommentId},
    document::OpenDocuments,
    identity::IdentityProvider,
    model::CommentModel,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PanelEntry {
    pub comment: Comment,

    /// `None` when the region the comment was attached to is gone or its
    /// document is not open
    pub anchor: Option<Anchor>,
}

impl PanelEntry {
    pub fn can_jump(&self) -> bool {
        self.anchor.is_some()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PanelAction {
    Delete(CommentId),
    DeleteReply {
        parent: CommentId,
        reply: CommentId,
    },
    Reply {
        parent: CommentId,
        text: String,
    },
    Edit {
        id: CommentId,
        text: String,
    },
    EditReply {
        parent: CommentId,
        reply: CommentId,
        text: String,
    },
}

/// View over the comments of one model. Holds no comment state of its own:
/// entries are recomputed on every render and actions go straight to the
/// model.
pub struct CommentPanel {
    identity: Arc<dyn IdentityProvider>,
}

impl CommentPanel {
    pub fn new(identity: Arc<dyn IdentityProvider>) -> CommentPanel {
        CommentPanel { identity }
    }

    /// Comments with a registered type, in forest order. Comments of other
    /// types are kept in the model but not shown.
    pub fn render(&self, model: &CommentModel, docs: &OpenDocuments) -> Vec<PanelEntry> {
        let registry = model.registry();
        let document = model.document();
        model
            .comments()
            .into_iter()
            .filter(|c| {
                let known = registry.get_factory(&c.kind).is_some();
                if !known {
                    tracing::trace!(id = %c.id, kind = %c.kind, "not rendering comment of unknown type");
                }
                known
            })
            .map(|comment| PanelEntry {
                anchor: registry.resolve(&comment, &document, docs),
                comment,
            })
            .collect()
    }

    /// Returns whether the action changed the model
    pub fn dispatch(&self, model: &CommentModel, action: PanelAction) -> bool {
        tracing::debug!(?action, "panel action");
        match action {
            PanelAction::Delete(id) => model.delete_comment(&id),
            PanelAction::DeleteReply { parent, reply } => model.delete_reply(&parent, &reply),
            PanelAction::Reply { parent, text } => model
                .reply(&parent, text, self.identity.identity())
                .is_some(),
            PanelAction::Edit { id, text } => model.edit_comment(&id, text),
            PanelAction::EditReply {
                parent,
                reply,
                text,
            } => model.edit_reply(&parent, &reply, text),
        }
    }
}
