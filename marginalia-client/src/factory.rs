use crate::{
    anchor::{Anchor, Range},
    api::{Comment, Error, Identity, Target},
    document::{Cell, Document, DocumentPath, Notebook, OpenDocuments, TextDocument},
};

/// A live region of an open document that a comment can be attached to
#[derive(Clone, Copy, Debug)]
pub enum LiveRegion<'a> {
    Document(&'a Document),
    Cell {
        notebook: &'a Notebook,
        cell: &'a Cell,
    },
    CellSelection {
        notebook: &'a Notebook,
        cell: &'a Cell,
        range: Range,
    },
    TextSelection {
        document: &'a TextDocument,
        range: Range,
    },
}

impl<'a> LiveRegion<'a> {
    pub fn name(&self) -> &'static str {
        match self {
            LiveRegion::Document(_) => "document",
            LiveRegion::Cell { .. } => "cell",
            LiveRegion::CellSelection { .. } => "cell-selection",
            LiveRegion::TextSelection { .. } => "text-selection",
        }
    }

    pub fn path(&self) -> &'a DocumentPath {
        match *self {
            LiveRegion::Document(d) => d.path(),
            LiveRegion::Cell { notebook, .. } | LiveRegion::CellSelection { notebook, .. } => {
                &notebook.path
            }
            LiveRegion::TextSelection { document, .. } => &document.path,
        }
    }
}

/// Creates and resolves the anchors of one comment type
pub trait TargetFactory: Send + Sync {
    /// Tag stored as the `type` of the comments this factory creates
    fn kind(&self) -> &str;

    /// Snapshots `region` into a descriptor that can be persisted
    fn target(&self, region: &LiveRegion<'_>) -> Result<Target, Error>;

    fn create_comment(
        &self,
        region: &LiveRegion<'_>,
        text: String,
        identity: Identity,
    ) -> Result<Comment, Error> {
        Ok(Comment::new(self.kind(), self.target(region)?, text, identity))
    }

    /// Finds the live region a stored descriptor points to in the document at
    /// `path`. Returns `None` when the document is not open or the region no
    /// longer exists.
    fn resolve_target(
        &self,
        target: &Target,
        path: &DocumentPath,
        docs: &OpenDocuments,
    ) -> Option<Anchor>;
}

pub(crate) fn mismatch(factory: &dyn TargetFactory, region: &LiveRegion<'_>) -> Error {
    Error::RegionMismatch {
        factory: String::from(factory.kind()),
        region: region.name(),
    }
}

pub(crate) fn parse_target<T: serde::de::DeserializeOwned>(
    factory: &dyn TargetFactory,
    target: &Target,
) -> Option<T> {
    match T::deserialize(target) {
        Ok(t) => Some(t),
        Err(err) => {
            tracing::warn!(kind = factory.kind(), %err, ?target, "malformed target descriptor");
            None
        }
    }
}
