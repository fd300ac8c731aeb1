use std::fmt;

use uuid::Uuid;

use crate::{Error, Identity};

/// Factory-specific anchor descriptor, opaque to everything but the factory
/// that produced it
pub type Target = serde_json::Value;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize, serde::Serialize)]
#[serde(transparent)]
pub struct CommentId(pub String);

impl CommentId {
    pub fn new() -> CommentId {
        CommentId(Uuid::new_v4().to_string())
    }
}

impl Default for CommentId {
    fn default() -> CommentId {
        CommentId::new()
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommentId {
    fn from(s: &str) -> CommentId {
        CommentId(String::from(s))
    }
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Comment {
    pub id: CommentId,

    /// Tag of the factory that owns `target`
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub target: Target,

    /// Author, captured at creation
    pub identity: Identity,

    pub text: String,

    /// Creation time, never updated by edits
    pub time: String,

    /// Replies in display order
    #[serde(default)]
    pub replies: Vec<Reply>,
}

impl Comment {
    pub fn new(kind: impl Into<String>, target: Target, text: String, identity: Identity) -> Comment {
        Comment {
            id: CommentId::new(),
            kind: kind.into(),
            target,
            identity,
            text,
            time: crate::now_string(),
            replies: Vec::new(),
        }
    }

    pub fn reply(&self, reply_id: &CommentId) -> Option<&Reply> {
        self.replies.iter().find(|r| r.id == *reply_id)
    }

    /// Iterates over the ids of this comment and all its replies
    pub fn ids(&self) -> impl Iterator<Item = &CommentId> {
        std::iter::once(&self.id).chain(self.replies.iter().map(|r| &r.id))
    }

    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.kind)?;
        crate::validate_string(&self.text)?;
        for r in self.replies.iter() {
            r.validate()?;
        }
        Ok(())
    }
}

/// A reply inherits the anchor of its parent and cannot itself be replied to
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Reply {
    pub id: CommentId,

    #[serde(rename = "type")]
    pub kind: String,

    pub identity: Identity,
    pub text: String,
    pub time: String,
}

impl Reply {
    pub fn new(kind: impl Into<String>, text: String, identity: Identity) -> Reply {
        Reply {
            id: CommentId::new(),
            kind: kind.into(),
            identity,
            text,
            time: crate::now_string(),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        crate::validate_string(&self.kind)?;
        crate::validate_string(&self.text)
    }
}
